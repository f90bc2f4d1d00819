//! Integration tests for the AttributePlus bridge loaded from a stats file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use servant_attributes::{
    AttributePlusProvider, AttributeProvider, BridgeConfig, MockAttributeBackend,
    ProviderRegistry, StatsConfig, DEFAULT_STATS_TOML,
};
use servant_core::EntityId;

fn temp_stats_path(tag: &str) -> PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join(format!("servant_stats_{tag}_{id}"))
        .join("stats.toml")
}

fn cleanup(path: &Path) {
    if let Some(dir) = path.parent() {
        std::fs::remove_dir_all(dir).ok();
    }
}

fn bridge_at(path: &Path, backend: &MockAttributeBackend) -> AttributePlusProvider<MockAttributeBackend> {
    AttributePlusProvider::new(
        backend.clone(),
        BridgeConfig {
            stats_path: path.to_path_buf(),
            ..BridgeConfig::default()
        },
    )
}

#[test]
fn test_missing_file_is_bootstrapped_once() {
    let path = temp_stats_path("bootstrap");
    assert!(!path.exists());

    assert!(StatsConfig::bootstrap(&path).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_STATS_TOML);

    // An edited file survives a second bootstrap.
    std::fs::write(&path, "[stats.armor]\nmapping.attributeplus = \"护甲\"\n").unwrap();
    assert!(!StatsConfig::bootstrap(&path).unwrap());

    let backend = MockAttributeBackend::new();
    let provider = bridge_at(&path, &backend);
    assert_eq!(provider.mapping().len(), 1);
    assert_eq!(provider.get_mapped_attribute_name("armor"), Some("护甲"));

    cleanup(&path);
}

#[test]
fn test_failed_bootstrap_leaves_no_stats_file() {
    let path = temp_stats_path("failed_bootstrap");
    let staging = StatsConfig::staging_path(&path);

    // A directory squatting on the staging name makes the write fail.
    std::fs::create_dir_all(&staging).unwrap();
    assert!(StatsConfig::bootstrap(&path).is_err());
    assert!(!path.exists());

    // The next start retries and gets the full default.
    std::fs::remove_dir(&staging).unwrap();
    assert!(StatsConfig::bootstrap(&path).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_STATS_TOML);
    assert!(!staging.exists());

    let backend = MockAttributeBackend::new();
    assert_eq!(bridge_at(&path, &backend).mapping().len(), 6);

    cleanup(&path);
}

#[test]
fn test_every_configured_key_resolves() {
    let path = temp_stats_path("resolve");
    let backend = MockAttributeBackend::new();
    let provider = bridge_at(&path, &backend);
    assert!(path.exists());

    let config = StatsConfig::from_toml_str(DEFAULT_STATS_TOML).unwrap();
    for (key, entry) in &config.stats {
        assert_eq!(
            provider.get_mapped_attribute_name(key),
            entry.mapping.get("attributeplus").map(String::as_str),
            "mapping for {key}"
        );
    }
    assert_eq!(provider.get_mapped_attribute_name("not_a_stat"), None);

    cleanup(&path);
}

#[test]
fn test_round_trip_through_backend_format() {
    let path = temp_stats_path("roundtrip");
    let backend = MockAttributeBackend::new();
    let provider = bridge_at(&path, &backend);

    let attributes: HashMap<String, f64> = [
        ("physical_damage".to_string(), 12.5),
        ("max_health".to_string(), 40.0),
        ("crit_chance".to_string(), 0.25),
    ]
    .into_iter()
    .collect();

    let back = provider.map_attributes_back(&provider.map_attributes(&attributes));
    assert_eq!(back, attributes);

    cleanup(&path);
}

#[test]
fn test_malformed_file_bridges_nothing() {
    let path = temp_stats_path("malformed");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[stats.max_health\nmapping.attributeplus = ").unwrap();

    let backend = MockAttributeBackend::new();
    let entity = EntityId::new(1);
    backend.register_entity(entity);
    let provider = bridge_at(&path, &backend);

    assert!(provider.mapping().is_empty());
    provider.set_value(entity, "max_health", 10.0);
    assert_eq!(backend.call_count(), 0);

    cleanup(&path);
}

#[test]
fn test_registry_falls_back_when_backend_unloads() {
    let path = temp_stats_path("registry");
    let backend = MockAttributeBackend::new();
    let entity = EntityId::new(8);
    backend.register_entity(entity);

    let registry = ProviderRegistry::new();
    registry.register(Arc::new(bridge_at(&path, &backend)));

    let active = registry.active().expect("backend is loaded");
    active.set_value(entity, "movement_speed", 0.2);
    assert!((active.get_value(entity, "movement_speed") - 0.2).abs() < f64::EPSILON);

    backend.set_loaded(false);
    assert!(registry.active().is_none());

    cleanup(&path);
}
