use super::*;

#[test]
fn partial_toml_keeps_defaults_for_missing_keys() {
    let config = GateConfig::from_toml_str(
        r#"
        idle_threshold_min = 100
        idle_threshold_max = 200
        unknown_key = "ignored"
        "#,
    )
    .expect("parse");

    assert_eq!(config.idle_threshold_min, 100);
    assert_eq!(config.idle_threshold_max, 200);
    assert_eq!(config.unload_spacing_min, 10);
    assert_eq!(config.unload_spacing_max, 80);
    assert_eq!(config.registry_capacity, ADDRESS_REGISTRY_CAPACITY);
}

#[test]
fn sanitized_repairs_inverted_ranges_and_zero_intervals() {
    let config = GateConfig {
        unload_spacing_min: 50,
        unload_spacing_max: 5,
        idle_threshold_min: 3_000,
        idle_threshold_max: 10,
        hazard_interval_ticks: 0,
        evacuation_search_attempts: 0,
        region_size_hint: RegionSize { width: 0, depth: 9 },
        ..GateConfig::default()
    }
    .sanitized();

    assert_eq!(config.unload_spacing_max, 50);
    assert_eq!(config.idle_threshold_max, 3_000);
    assert_eq!(config.hazard_interval_ticks, 1);
    assert_eq!(config.evacuation_search_attempts, 1);
    assert_eq!(config.region_size_hint, RegionSize { width: 1, depth: 9 });
}

#[test]
fn nested_region_size_table_parses() {
    let config = GateConfig::from_toml_str(
        r#"
        hazard_radius = 2

        [region_size_hint]
        width = 120
        depth = 90
        "#,
    )
    .expect("parse");
    assert_eq!(config.hazard_radius, 2);
    assert_eq!(config.region_size_hint, RegionSize { width: 120, depth: 90 });
}

#[test]
fn config_file_errors_carry_the_path() {
    let dir = temp_dir("config");
    std::fs::create_dir_all(&dir).expect("mkdir");

    let missing = dir.join("missing.toml");
    assert!(matches!(
        GateConfig::from_config_file(&missing),
        Err(ConfigError::Read { path, .. }) if path.contains("missing.toml")
    ));

    let broken = dir.join("broken.toml");
    std::fs::write(&broken, "idle_threshold_min = \"soon\"").expect("write");
    assert!(matches!(
        GateConfig::from_config_file(&broken),
        Err(ConfigError::Parse { .. })
    ));

    let good = dir.join(DEFAULT_CONFIG_FILE_NAME);
    std::fs::write(&good, "unstable_window_ticks = 60").expect("write");
    let config = GateConfig::from_config_file(&good).expect("load");
    assert_eq!(config.unstable_window_ticks, 60);

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn kernel_uses_configured_registry_capacity() {
    let config = GateConfig {
        registry_capacity: 1,
        ..GateConfig::default()
    };
    let world = twin_world_with(config, 71);
    assert_eq!(world.kernel.registry().capacity(), 1);
    assert!(world.kernel.registry().contains(ADDRESS_A));
    assert!(!world.kernel.registry().contains(ADDRESS_B));
}
