use super::*;

#[test]
fn pattern_extends_out_of_the_gate_face() {
    let south = VortexHazard::new(Cell::new(0, 0), Rotation::South);
    assert_eq!(south.cells().len(), 13);
    assert!(south.contains(Cell::new(0, -1)));
    assert!(south.contains(Cell::new(0, -5)));
    assert!(!south.contains(Cell::new(0, 0)));
    assert!(!south.contains(Cell::new(0, 1)));

    let north = VortexHazard::new(Cell::new(0, 0), Rotation::North);
    assert!(north.contains(Cell::new(0, 5)));
    assert!(!north.contains(Cell::new(0, -1)));

    let east = VortexHazard::new(Cell::new(10, 10), Rotation::East);
    let bounds = east.bounds().expect("bounds");
    assert_eq!(bounds.max.x - bounds.min.x, 4);
    assert_eq!(bounds.max.z - bounds.min.z, 2);
}

#[test]
fn fires_every_interval_inside_the_window() {
    let config = GateConfig::default();
    let fire_ticks: Vec<u64> = (0..400)
        .filter(|tick| VortexHazard::fires_at(*tick, &config))
        .collect();
    assert_eq!(fire_ticks.len(), 15);
    assert_eq!(fire_ticks.first(), Some(&0));
    assert_eq!(fire_ticks.last(), Some(&140));
}

#[test]
fn only_the_dialing_side_is_struck() {
    let mut world = twin_world(41);
    open_twin(&mut world, 1);
    world.kernel.tick_n(200, &mut world.host);

    let damage = world.host.damage();
    assert_eq!(damage.len(), 15 * 13);
    assert!(damage
        .iter()
        .all(|call| call.region == world.region_a && call.spare == world.a));
    let strikes = world
        .kernel
        .journal()
        .iter()
        .filter(|event| matches!(event.kind, GateEventKind::VortexStruck { .. }))
        .count();
    assert_eq!(strikes, 15);
}

#[test]
fn bystander_in_the_vortex_takes_damage() {
    let mut world = twin_world(42);
    open_twin(&mut world, 1);
    let bystander = world.host.spawn_item(world.region_a, Cell::new(20, 16));
    world.kernel.tick_n(20, &mut world.host);

    assert!(world
        .host
        .entity(bystander)
        .is_some_and(|entity| entity.damage_taken > 0));
}
