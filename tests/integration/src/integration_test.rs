//! End-to-end scenarios for the hot reload runtime
//!
//! These tests exercise the complete flow: initialize -> external edit ->
//! selective merge into the live instance.

use std::sync::mpsc;

use hotconf_core::{Config, ConfigManager, EntrySpec, Schema, WatchEvent, WatchOptions, WatchStatus};
use hotconf_test_utils::{ConfigDir, WATCH_TIMEOUT, recv_until, wait_for};
use pretty_assertions::assert_eq;

struct Service;

impl Config for Service {
    const NAME: &'static str = "Service";

    fn entries() -> Vec<EntrySpec> {
        vec![
            EntrySpec::integer("retries", 3).reloadable(),
            EntrySpec::string("name", "svc"),
        ]
    }
}

#[test]
fn test_default_creation_then_selective_reload() {
    let dir = ConfigDir::new();
    let path = dir.path("cfg.json5");

    let config = ConfigManager::new().initialize::<Service>(&path).unwrap();

    // Created with defaults
    let written: serde_json::Value = serde_json::from_str(&dir.read("cfg.json5")).unwrap();
    assert_eq!(written, serde_json::json!({"retries": 3, "name": "svc"}));
    assert_eq!(config.get::<i64>("retries").unwrap(), 3);

    // External edit touches both entries
    dir.replace("cfg.json5", r#"{"retries": 5, "name": "renamed"}"#);

    assert!(wait_for(WATCH_TIMEOUT, || config.get::<i64>("retries").unwrap() == 5));
    assert_eq!(config.get::<String>("name").unwrap(), "svc");
    assert_eq!(config.watch_status(), Some(WatchStatus::Watching));
}

#[test]
fn test_owner_writes_and_reloads_coexist() {
    let dir = ConfigDir::new();
    let manager = ConfigManager::new();
    let schema = Schema::of::<Service>().unwrap();
    let (tx, rx) = mpsc::channel();
    let config = manager
        .initialize_schema_with(dir.path("cfg.yaml"), &schema, WatchOptions::new().with_events(tx))
        .unwrap();

    // Non-reloadable entries stay under the owner's control
    config.set("name", "owner").unwrap();
    dir.replace("cfg.yaml", "retries: 8\nname: external\n");

    let applied = recv_until(&rx, WATCH_TIMEOUT, |e| matches!(e, WatchEvent::Applied(_)));
    assert!(applied.is_some());
    assert_eq!(config.get::<i64>("retries").unwrap(), 8);
    assert_eq!(config.get::<String>("name").unwrap(), "owner");

    // Saving persists the owner's view, which the session then re-reads
    manager.save(dir.path("cfg.yaml"), &config).unwrap();
    let reloaded = manager.reload(dir.path("cfg.yaml"), &schema).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_mid_save_garbage_does_not_end_the_session() {
    let dir = ConfigDir::new();
    let (tx, rx) = mpsc::channel();
    let schema = Schema::of::<Service>().unwrap();
    let config = ConfigManager::new()
        .initialize_schema_with(dir.path("cfg.toml"), &schema, WatchOptions::new().with_events(tx))
        .unwrap();

    dir.replace("cfg.toml", "retries = \n");
    assert!(recv_until(&rx, WATCH_TIMEOUT, |e| matches!(e, WatchEvent::ReloadFailed(_))).is_some());

    dir.replace("cfg.toml", "retries = 4\nname = \"other\"\n");
    assert!(recv_until(&rx, WATCH_TIMEOUT, |e| matches!(e, WatchEvent::Applied(_))).is_some());

    assert_eq!(config.get::<i64>("retries").unwrap(), 4);
    assert_eq!(config.get::<String>("name").unwrap(), "svc");
    assert!(config.watch_stats().unwrap().failures >= 1);
}
