//! The application engine
//!
//! Wires the vault and the tunnel controller together behind the surface
//! front-ends consume. Handles are passed in explicitly; nothing here
//! instantiates storage ad hoc.

use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, Mutex};
use tokio::task::{self, JoinHandle};
use tracing::{info, warn};

use roam_conf::TunnelConfig;
use roam_tunnel::{
    FixedGate, LogNotifier, LoopbackFactory, TunnelController, TunnelParams,
};
use roam_vault::{ConfigVault, FileKeyProvider};

use crate::error::{Error, Result};
use crate::event::{AppEvent, ConnectionState, LinkState};
use crate::settings::AppSettings;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// State shared between the engine and its background tasks
struct Shared {
    state: RwLock<ConnectionState>,
    events: broadcast::Sender<AppEvent>,
}

impl Shared {
    fn snapshot(&self) -> ConnectionState {
        self.state.read().expect("state lock poisoned").clone()
    }

    fn update(&self, apply: impl FnOnce(&mut ConnectionState)) {
        apply(&mut self.state.write().expect("state lock poisoned"));
    }

    fn emit(&self, event: AppEvent) {
        // Send only fails when no observer is subscribed; that is fine.
        let _ = self.events.send(event);
    }

    fn emit_state(&self) {
        self.emit(AppEvent::StateChanged(self.snapshot()));
    }

    fn fail(&self, message: String) {
        self.update(|state| {
            state.link = LinkState::Disconnected;
            state.error = Some(message);
        });
        self.emit_state();
    }
}

/// Main application interface
///
/// One engine per process. Operations return typed errors to the direct
/// caller; observers watching [`AppEngine::subscribe`] and
/// [`AppEngine::state`] only ever see rendered message strings, and no
/// failure is fatal: the state degrades to Disconnected and carries the
/// message until cleared.
pub struct AppEngine {
    vault: Arc<ConfigVault>,
    controller: Arc<Mutex<TunnelController>>,
    shared: Arc<Shared>,
    connect_task: Mutex<Option<JoinHandle<()>>>,
}

impl AppEngine {
    /// Create an engine over explicit vault and controller handles
    pub fn new(vault: Arc<ConfigVault>, controller: TunnelController) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            vault,
            controller: Arc::new(Mutex::new(controller)),
            shared: Arc::new(Shared {
                state: RwLock::new(ConnectionState::default()),
                events,
            }),
            connect_task: Mutex::new(None),
        }
    }

    /// Build an engine from application settings
    ///
    /// Uses the file-backed key provider, the built-in loopback
    /// interface factory, the log notifier, and a permission gate fixed
    /// to the settings' recorded grant.
    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        settings.validate()?;

        let keys = FileKeyProvider::new(settings.key_file());
        let vault = Arc::new(ConfigVault::open(settings.vault_file(), &keys)?);

        let gate: FixedGate = settings.tunnel.permission_granted.into();
        let controller = TunnelController::new(
            Arc::new(gate),
            Arc::new(LoopbackFactory),
            Arc::new(LogNotifier),
        );

        Ok(Self::new(vault, controller))
    }

    /// Current connection state snapshot
    pub fn state(&self) -> ConnectionState {
        self.shared.snapshot()
    }

    /// Subscribe to application events
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.shared.events.subscribe()
    }

    /// Clear the last failure message
    pub fn clear_error(&self) {
        self.shared.update(|state| state.error = None);
        self.shared.emit_state();
    }

    /// List every stored configuration
    pub async fn configs(&self) -> Result<Vec<TunnelConfig>> {
        let vault = self.vault.clone();
        run_blocking(move || vault.list()).await
    }

    /// Name the active pointer currently designates, if any
    pub async fn active_name(&self) -> Result<Option<String>> {
        let vault = self.vault.clone();
        run_blocking(move || vault.active()).await
    }

    /// Load the configuration stored under `name`
    pub async fn config(&self, name: &str) -> Result<TunnelConfig> {
        let vault = self.vault.clone();
        let wanted = name.to_string();
        run_blocking(move || vault.load(&wanted)).await
    }

    /// Parse and persist a configuration under `name`
    ///
    /// Saving over an existing name replaces it.
    pub async fn save_config(&self, name: &str, text: &str) -> Result<TunnelConfig> {
        let record = roam_conf::parse(name, text)?;

        let vault = self.vault.clone();
        let to_store = record.clone();
        run_blocking(move || vault.save(&to_store)).await?;

        info!(name = %record.name, peers = record.peer_count, "configuration saved");
        self.shared.emit(AppEvent::ConfigsChanged);
        Ok(record)
    }

    /// Delete the configuration stored under `name`
    ///
    /// Deleting the active configuration disconnects first and clears
    /// the active pointer; deleting an unknown name is a no-op.
    pub async fn delete_config(&self, name: &str) -> Result<()> {
        let in_use = self.shared.snapshot().active_name() == Some(name);
        let pointed_at = {
            let vault = self.vault.clone();
            run_blocking(move || vault.active()).await?
        };

        if in_use || pointed_at.as_deref() == Some(name) {
            self.disconnect().await?;
        }

        let vault = self.vault.clone();
        let to_delete = name.to_string();
        run_blocking(move || vault.delete(&to_delete)).await?;

        info!(name, "configuration deleted");
        self.shared.emit(AppEvent::ConfigsChanged);
        Ok(())
    }

    /// Connect using the configuration stored under `name`
    ///
    /// Replaces any current connection or in-flight attempt, moves the
    /// state to Connecting, and hands the rest to a single-shot
    /// background task: load the record, open the tunnel, set the active
    /// pointer, report Connected. Any failure lands in the state
    /// snapshot as a message, with the link back at Disconnected.
    pub async fn connect(&self, name: &str) -> Result<()> {
        self.disconnect().await?;

        self.shared.update(|state| {
            state.link = LinkState::Connecting;
            state.error = None;
        });
        self.shared.emit_state();

        let vault = self.vault.clone();
        let controller = self.controller.clone();
        let shared = self.shared.clone();
        let name = name.to_string();

        let task = tokio::spawn(async move {
            if let Err(e) = connect_inner(vault, controller, &shared, &name).await {
                warn!(name = %name, error = %e, "connect failed");
                shared.fail(e.to_string());
            }
        });

        *self.connect_task.lock().await = Some(task);
        Ok(())
    }

    /// Disconnect and clear the active pointer
    ///
    /// Cancels any in-flight connect attempt before tearing the tunnel
    /// down. Disconnecting while already disconnected is a no-op.
    pub async fn disconnect(&self) -> Result<()> {
        if let Some(task) = self.connect_task.lock().await.take() {
            task.abort();
            let _ = task.await;
        }

        self.controller.lock().await.stop();

        let vault = self.vault.clone();
        run_blocking(move || vault.set_active(None)).await?;

        self.shared.update(|state| {
            state.link = LinkState::Disconnected;
            state.active = None;
        });
        self.shared.emit_state();
        Ok(())
    }

    /// Restore the persisted active configuration into the state
    ///
    /// Called once at startup so front-ends show the configuration last
    /// connected to. Does not reconnect. A pointer naming a record that
    /// no longer exists is ignored.
    pub async fn restore_active(&self) -> Result<Option<TunnelConfig>> {
        let vault = self.vault.clone();
        let record = run_blocking(move || -> roam_vault::Result<Option<TunnelConfig>> {
            match vault.active()? {
                Some(name) => match vault.load(&name) {
                    Ok(record) => Ok(Some(record)),
                    Err(e) if e.is_not_found() => Ok(None),
                    Err(e) => Err(e),
                },
                None => Ok(None),
            }
        })
        .await?;

        if let Some(ref restored) = record {
            self.shared.update(|state| state.active = Some(restored.clone()));
            self.shared.emit_state();
        }
        Ok(record)
    }
}

/// The background half of a connect attempt
///
/// Everything after taking the controller lock runs without an await, so
/// a cancellation either happens before the tunnel commits or not at
/// all; `disconnect` serializes behind the same lock to undo a committed
/// attempt.
async fn connect_inner(
    vault: Arc<ConfigVault>,
    controller: Arc<Mutex<TunnelController>>,
    shared: &Shared,
    name: &str,
) -> Result<()> {
    let record = vault.load(name)?;

    let mut controller = controller.lock().await;
    controller.start(&TunnelParams::for_session(&record.name))?;

    if let Err(e) = vault.set_active(Some(name)) {
        controller.stop();
        return Err(e.into());
    }

    shared.update(|state| {
        state.link = LinkState::Connected;
        state.active = Some(record);
        state.error = None;
    });
    shared.emit_state();

    info!(name, "connected");
    Ok(())
}

/// Run vault I/O on the blocking pool and flatten the join
async fn run_blocking<T, E>(work: impl FnOnce() -> std::result::Result<T, E> + Send + 'static) -> Result<T>
where
    T: Send + 'static,
    E: Into<Error> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Task(e.to_string()))?
        .map_err(Into::into)
}
