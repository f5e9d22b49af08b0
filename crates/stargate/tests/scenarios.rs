use stargate::simulator::{
    EntityLocation, GateConfig, GateEventKind, GateScenario, DEFAULT_DIAL_DELAY,
};

fn destination_region(world: &stargate::simulator::ScenarioWorld) -> stargate::RegionId {
    let destination = world.destination.expect("destination gate");
    world
        .kernel
        .endpoint(destination)
        .expect("destination endpoint")
        .region()
}

#[test]
fn scenario_names_roundtrip() {
    for name in GateScenario::variants() {
        let scenario = GateScenario::parse(name).expect("known scenario");
        assert_eq!(scenario.as_str(), *name);
    }
    assert_eq!(GateScenario::parse("Twin-Gates"), Some(GateScenario::TwinGates));
    assert_eq!(GateScenario::parse("nowhere"), None);
}

#[test]
fn twin_gates_delivers_the_traveller() {
    let mut world = GateScenario::TwinGates
        .build(GateConfig::default(), 11)
        .expect("build");
    let outcome = world.run(DEFAULT_DIAL_DELAY, 500).expect("run");

    assert_eq!(outcome.opened_at, Some(DEFAULT_DIAL_DELAY));
    assert!(outcome.origin_active);
    let region = destination_region(&world);
    assert!(matches!(
        outcome.traveller,
        Some(EntityLocation::Placed { region: r, .. }) if r == region
    ));
    assert_eq!(world.host.redrafts(), &[world.traveller]);
}

#[test]
fn lazy_destination_generates_the_region_first() {
    let mut world = GateScenario::LazyDestination
        .build(GateConfig::default(), 12)
        .expect("build");
    assert_eq!(world.kernel.endpoint_count(), 1);

    let outcome = world.run(DEFAULT_DIAL_DELAY, 500).expect("run");

    assert_eq!(outcome.opened_at, Some(DEFAULT_DIAL_DELAY + 6));
    assert_eq!(world.kernel.endpoint_count(), 2);
    let region = destination_region(&world);
    assert!(matches!(
        outcome.traveller,
        Some(EntityLocation::Placed { region: r, .. }) if r == region
    ));
    assert!(world
        .kernel
        .journal()
        .iter()
        .any(|event| matches!(event.kind, GateEventKind::RegionRequested { .. })));
}

#[test]
fn iris_defense_destroys_the_traveller() {
    let mut world = GateScenario::IrisDefense
        .build(GateConfig::default(), 13)
        .expect("build");
    let outcome = world.run(DEFAULT_DIAL_DELAY, 500).expect("run");

    assert!(outcome.opened_at.is_some());
    assert_eq!(outcome.traveller, Some(EntityLocation::Destroyed));
}

#[test]
fn connection_times_out_after_the_traveller_arrives() {
    let mut world = GateScenario::TwinGates
        .build(GateConfig::default(), 14)
        .expect("build");
    let outcome = world
        .run(DEFAULT_DIAL_DELAY, DEFAULT_DIAL_DELAY + 80 + 2_501)
        .expect("run");

    assert!(!outcome.origin_active);
    assert!(world
        .kernel
        .journal()
        .iter()
        .any(|event| matches!(event.kind, GateEventKind::IdleTimeout { .. })));
}

#[test]
fn lazy_destination_refuses_to_build_without_registry_room() {
    let config = GateConfig {
        registry_capacity: 0,
        ..GateConfig::default()
    };
    let err = GateScenario::LazyDestination
        .build(config, 15)
        .map(|_| ())
        .unwrap_err();
    assert_eq!(
        err,
        stargate::GateError::InvalidAddress {
            address: stargate::simulator::LAZY_ADDRESS
        }
    );
}
