use super::*;
use proptest::prelude::*;

#[test]
fn idle_receiver_closes_within_threshold_bounds() {
    let mut world = twin_world(21);
    open_twin(&mut world, 1);

    world.kernel.tick_n(1_899, &mut world.host);
    assert!(world.kernel.is_active(world.a));
    assert!(world.kernel.is_active(world.b));

    world.kernel.tick_n(601, &mut world.host);
    assert!(!world.kernel.is_active(world.b));
    assert!(!world.kernel.is_active(world.a), "timeout cascades to the dialer");
    assert!(world
        .kernel
        .journal()
        .iter()
        .any(|event| matches!(event.kind, GateEventKind::IdleTimeout { endpoint, .. } if endpoint == world.b)));
}

#[test]
fn external_hold_keeps_connection_open() {
    let mut world = twin_world(22);
    open_twin(&mut world, 1);
    assert_eq!(world.kernel.push_external_hold(world.b), Ok(1));

    world.kernel.tick_n(3_000, &mut world.host);
    assert!(world.kernel.is_active(world.b));
    assert!(world.kernel.is_active(world.a));

    assert_eq!(world.kernel.pop_external_hold(world.b), Ok(0));
    world.kernel.tick(&mut world.host);
    assert!(!world.kernel.is_active(world.b));
}

#[test]
fn pop_external_hold_saturates_at_zero() {
    let mut world = twin_world(22);
    assert_eq!(world.kernel.pop_external_hold(world.a), Ok(0));
    assert!(!world.kernel.has_external_hold(world.a));
}

#[test]
fn arrivals_reset_the_idle_counter() {
    let config = GateConfig {
        idle_threshold_min: 20,
        idle_threshold_max: 20,
        unload_spacing_min: 10,
        unload_spacing_max: 10,
        ..GateConfig::default()
    };
    let mut world = twin_world_with(config, 23);
    open_twin(&mut world, 1);

    world.kernel.tick_n(15, &mut world.host);
    let item = world.host.spawn_item(world.region_a, Cell::new(2, 2));
    world
        .kernel
        .enqueue_send(world.a, item, false, &mut world.host)
        .expect("enqueue");
    world.kernel.tick_n(10, &mut world.host);
    assert!(world.kernel.is_active(world.b));
    assert!(matches!(
        world.host.location(item),
        Some(EntityLocation::Placed { region, .. }) if region == world.region_b
    ));
    assert!(world
        .kernel
        .endpoint(world.b)
        .is_some_and(|b| b.ticks_since_buffer_unloaded() < 20));

    world.kernel.tick_n(20, &mut world.host);
    assert!(!world.kernel.is_active(world.b));
}

#[test]
fn dialer_closes_when_its_peer_goes_away() {
    let mut world = twin_world(24);
    open_twin(&mut world, 1);

    world
        .kernel
        .force_close(world.b, false, &mut world.host)
        .expect("close B");
    world.kernel.tick(&mut world.host);

    assert!(!world.kernel.is_active(world.a));
    assert!(world
        .kernel
        .journal()
        .iter()
        .any(|event| matches!(event.kind, GateEventKind::PeerLost { endpoint } if endpoint == world.a)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// The receiver never closes before 1900 idle ticks and always by 2501.
    #[test]
    fn prop_idle_timeout_stays_in_bounds(seed in any::<u64>()) {
        let mut world = twin_world(seed);
        open_twin(&mut world, 1);
        let threshold = world.kernel.endpoint(world.b).map(GateEndpoint::idle_threshold);
        prop_assert!(threshold.is_some_and(|t| (1_900..=2_500).contains(&t)));

        world.kernel.tick_n(1_899, &mut world.host);
        prop_assert!(world.kernel.is_active(world.b));

        world.kernel.tick_n(601, &mut world.host);
        prop_assert!(!world.kernel.is_active(world.b));
    }
}
