//! Integration tests for the application engine
//!
//! These drive the real vault (in a temp directory) and the real tunnel
//! controller with the built-in loopback interface; only the permission
//! gate varies per test.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;

use roam_app_interface::{AppEngine, AppEvent, ConnectionState, LinkState};
use roam_tunnel::{FixedGate, LogNotifier, LoopbackFactory, TunnelController};
use roam_vault::{ConfigVault, StaticKeyProvider};

const SAMPLE: &str = "\
[Interface]
PrivateKey = aW50ZXJmYWNlLWtleQ==
Address = 10.0.0.2/24
DNS = 8.8.8.8

[Peer]
PublicKey = cGVlci1rZXk=
Endpoint = host:51820
AllowedIPs = 0.0.0.0/0
";

fn build_engine(granted: bool) -> (AppEngine, Arc<ConfigVault>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let keys = StaticKeyProvider::new([9u8; 32]);
    let vault = Arc::new(ConfigVault::open(dir.path().join("vault.json"), &keys).unwrap());

    let controller = TunnelController::new(
        Arc::new(FixedGate::from(granted)),
        Arc::new(LoopbackFactory),
        Arc::new(LogNotifier),
    );

    (AppEngine::new(vault.clone(), controller), vault, dir)
}

/// Wait until a state snapshot matching `pred` is broadcast
async fn wait_for_state(
    rx: &mut broadcast::Receiver<AppEvent>,
    pred: impl Fn(&ConnectionState) -> bool,
) -> ConnectionState {
    loop {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for state change")
            .expect("event channel closed");
        if let AppEvent::StateChanged(state) = event {
            if pred(&state) {
                return state;
            }
        }
    }
}

#[tokio::test]
async fn test_save_then_list_contains_record() {
    let (engine, _vault, _dir) = build_engine(true);

    let record = engine.save_config("work", SAMPLE).await.unwrap();
    assert_eq!(record.endpoint, "host:51820");
    assert_eq!(record.peer_count, 1);

    let configs = engine.configs().await.unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].name, "work");
}

#[tokio::test]
async fn test_config_by_name_and_missing() {
    let (engine, _vault, _dir) = build_engine(true);
    engine.save_config("work", SAMPLE).await.unwrap();

    assert_eq!(engine.config("work").await.unwrap().endpoint, "host:51820");
    assert!(engine.config("ghost").await.is_err());
}

#[tokio::test]
async fn test_save_emits_configs_changed() {
    let (engine, _vault, _dir) = build_engine(true);
    let mut rx = engine.subscribe();

    engine.save_config("work", SAMPLE).await.unwrap();

    let event = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .unwrap();
    assert!(matches!(event, AppEvent::ConfigsChanged));
}

#[tokio::test]
async fn test_connect_reaches_connected_and_sets_pointer() {
    let (engine, vault, _dir) = build_engine(true);
    engine.save_config("work", SAMPLE).await.unwrap();

    let mut rx = engine.subscribe();
    engine.connect("work").await.unwrap();

    let state = wait_for_state(&mut rx, |s| s.link.is_connected()).await;
    assert_eq!(state.active_name(), Some("work"));
    assert!(state.error.is_none());
    assert_eq!(vault.active().unwrap().as_deref(), Some("work"));
}

#[tokio::test]
async fn test_delete_active_config_clears_pointer() {
    // save "A" -> connect "A" -> delete "A" -> active pointer is none
    let (engine, vault, _dir) = build_engine(true);
    engine.save_config("A", SAMPLE).await.unwrap();

    let mut rx = engine.subscribe();
    engine.connect("A").await.unwrap();
    wait_for_state(&mut rx, |s| s.link.is_connected()).await;

    engine.delete_config("A").await.unwrap();

    assert_eq!(vault.active().unwrap(), None);
    let state = engine.state();
    assert_eq!(state.link, LinkState::Disconnected);
    assert!(state.active.is_none());
    assert!(engine.configs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_pointed_at_but_not_connected_clears_pointer() {
    let (engine, vault, _dir) = build_engine(true);
    engine.save_config("work", SAMPLE).await.unwrap();
    vault.set_active(Some("work")).unwrap();

    engine.delete_config("work").await.unwrap();

    assert_eq!(vault.active().unwrap(), None);
}

#[tokio::test]
async fn test_delete_unknown_name_is_noop() {
    let (engine, _vault, _dir) = build_engine(true);
    engine.save_config("work", SAMPLE).await.unwrap();

    engine.delete_config("ghost").await.unwrap();

    assert_eq!(engine.configs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_connect_unknown_name_reports_error() {
    let (engine, vault, _dir) = build_engine(true);

    let mut rx = engine.subscribe();
    engine.connect("ghost").await.unwrap();

    let state = wait_for_state(&mut rx, |s| s.error.is_some()).await;
    assert_eq!(state.link, LinkState::Disconnected);
    assert!(state.error.as_deref().unwrap().contains("not found"));
    assert_eq!(vault.active().unwrap(), None);

    engine.clear_error();
    assert!(engine.state().error.is_none());
}

#[tokio::test]
async fn test_connect_without_permission_reports_error() {
    let (engine, vault, _dir) = build_engine(false);
    engine.save_config("work", SAMPLE).await.unwrap();

    let mut rx = engine.subscribe();
    engine.connect("work").await.unwrap();

    let state = wait_for_state(&mut rx, |s| s.error.is_some()).await;
    assert_eq!(state.link, LinkState::Disconnected);
    assert!(state.error.as_deref().unwrap().contains("permission"));
    assert_eq!(vault.active().unwrap(), None);
}

#[tokio::test]
async fn test_disconnect_clears_state_and_pointer() {
    let (engine, vault, _dir) = build_engine(true);
    engine.save_config("work", SAMPLE).await.unwrap();

    let mut rx = engine.subscribe();
    engine.connect("work").await.unwrap();
    wait_for_state(&mut rx, |s| s.link.is_connected()).await;

    engine.disconnect().await.unwrap();

    let state = engine.state();
    assert_eq!(state.link, LinkState::Disconnected);
    assert!(state.active.is_none());
    assert_eq!(vault.active().unwrap(), None);
}

#[tokio::test]
async fn test_disconnect_while_disconnected_is_noop() {
    let (engine, _vault, _dir) = build_engine(true);
    engine.disconnect().await.unwrap();
    assert_eq!(engine.state().link, LinkState::Disconnected);
}

#[tokio::test]
async fn test_restore_active_populates_state_without_connecting() {
    let (engine, vault, dir) = build_engine(true);
    engine.save_config("home", SAMPLE).await.unwrap();
    vault.set_active(Some("home")).unwrap();
    drop(engine);

    // A fresh engine over the same vault, as at process startup.
    let keys = StaticKeyProvider::new([9u8; 32]);
    let vault = Arc::new(ConfigVault::open(dir.path().join("vault.json"), &keys).unwrap());
    let controller = TunnelController::new(
        Arc::new(FixedGate::granted()),
        Arc::new(LoopbackFactory),
        Arc::new(LogNotifier),
    );
    let engine = AppEngine::new(vault, controller);

    let restored = engine.restore_active().await.unwrap();
    assert_eq!(restored.unwrap().name, "home");

    let state = engine.state();
    assert_eq!(state.active_name(), Some("home"));
    assert_eq!(state.link, LinkState::Disconnected);
}

#[tokio::test]
async fn test_restore_active_ignores_dangling_pointer() {
    let (engine, vault, _dir) = build_engine(true);
    vault.set_active(Some("gone")).unwrap();

    let restored = engine.restore_active().await.unwrap();
    assert!(restored.is_none());
    assert!(engine.state().active.is_none());
}

#[tokio::test]
async fn test_connect_while_connected_switches() {
    let (engine, vault, _dir) = build_engine(true);
    engine.save_config("work", SAMPLE).await.unwrap();
    engine.save_config("home", SAMPLE).await.unwrap();

    let mut rx = engine.subscribe();
    engine.connect("work").await.unwrap();
    wait_for_state(&mut rx, |s| s.link.is_connected()).await;

    engine.connect("home").await.unwrap();
    let state = wait_for_state(&mut rx, |s| s.link.is_connected()).await;

    assert_eq!(state.active_name(), Some("home"));
    assert_eq!(vault.active().unwrap().as_deref(), Some("home"));
}

#[tokio::test]
async fn test_reconnect_to_other_config() {
    let (engine, vault, _dir) = build_engine(true);
    engine.save_config("work", SAMPLE).await.unwrap();
    engine.save_config("home", SAMPLE).await.unwrap();

    let mut rx = engine.subscribe();
    engine.connect("work").await.unwrap();
    wait_for_state(&mut rx, |s| s.link.is_connected()).await;
    engine.disconnect().await.unwrap();

    engine.connect("home").await.unwrap();
    let state = wait_for_state(&mut rx, |s| s.link.is_connected()).await;

    assert_eq!(state.active_name(), Some("home"));
    assert_eq!(vault.active().unwrap().as_deref(), Some("home"));
}
