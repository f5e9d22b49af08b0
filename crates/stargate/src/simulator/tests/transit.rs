use super::*;

fn arrival_order(kernel: &GateKernel) -> Vec<EntityId> {
    kernel
        .journal()
        .iter()
        .filter_map(|event| match event.kind {
            GateEventKind::EntityArrived { entity, .. } => Some(entity),
            _ => None,
        })
        .collect()
}

#[test]
fn enqueue_requires_an_active_gate() {
    let mut world = twin_world(11);
    let item = world.host.spawn_item(world.region_a, Cell::new(5, 5));
    let err = world
        .kernel
        .enqueue_send(world.a, item, false, &mut world.host)
        .unwrap_err();
    assert_eq!(err, GateError::NotActive { endpoint: world.a });
    assert!(matches!(
        world.host.location(item),
        Some(EntityLocation::Placed { .. })
    ));
}

#[test]
fn entity_cannot_be_queued_twice() {
    let mut world = twin_world(11);
    open_twin(&mut world, 3);
    let item = world.host.spawn_item(world.region_a, Cell::new(5, 5));
    world
        .kernel
        .enqueue_send(world.a, item, false, &mut world.host)
        .expect("first enqueue");
    let err = world
        .kernel
        .enqueue_send(world.a, item, false, &mut world.host)
        .unwrap_err();
    assert_eq!(err, GateError::EntityUnavailable { entity: item });
}

#[test]
fn items_arrive_once_in_send_order() {
    let mut world = twin_world(12);
    open_twin(&mut world, 3);
    let items: Vec<EntityId> = (0..4)
        .map(|i| world.host.spawn_item(world.region_a, Cell::new(2 + i, 2)))
        .collect();
    for item in &items {
        world
            .kernel
            .enqueue_send(world.a, *item, false, &mut world.host)
            .expect("enqueue");
    }

    world.kernel.tick_n(4 * 80 + 1, &mut world.host);

    assert_eq!(arrival_order(&world.kernel), items);
    for item in &items {
        assert!(matches!(
            world.host.location(*item),
            Some(EntityLocation::Placed { region, .. }) if region == world.region_b
        ));
    }
    let b = world.kernel.endpoint(world.b).expect("B");
    assert!(b.buffers().is_empty());
}

#[test]
fn unload_spacing_limits_one_item_per_unload() {
    let mut world = twin_world(13);
    open_twin(&mut world, 3);
    for i in 0..2 {
        let item = world.host.spawn_item(world.region_a, Cell::new(2 + i, 2));
        world
            .kernel
            .enqueue_send(world.a, item, false, &mut world.host)
            .expect("enqueue");
    }

    world.kernel.tick(&mut world.host);
    let b = world.kernel.endpoint(world.b).expect("B");
    assert_eq!(b.buffers().recv_len(), 2);

    let b_id = world.b;
    tick_until(&mut world, 80, |kernel, _| {
        kernel
            .endpoint(b_id)
            .is_some_and(|b| b.buffers().recv_len() < 2)
    })
    .expect("first unload");
    let b = world.kernel.endpoint(b_id).expect("B");
    assert_eq!(b.buffers().recv_len(), 1);
    assert_eq!(b.ticks_since_buffer_unloaded(), 0);
    assert!((10..=80).contains(&b.unload_spacing()));
}

#[test]
fn engaged_iris_destroys_arrivals() {
    let mut world = twin_world(14);
    world.kernel.install_iris(world.b).expect("install iris");
    world
        .kernel
        .set_iris_engaged(world.b, true)
        .expect("engage iris");
    open_twin(&mut world, 3);
    let item = world.host.spawn_item(world.region_a, Cell::new(4, 4));
    world
        .kernel
        .enqueue_send(world.a, item, false, &mut world.host)
        .expect("enqueue");

    world.kernel.tick_n(82, &mut world.host);

    assert_eq!(world.host.location(item), Some(EntityLocation::Destroyed));
    assert_eq!(world.host.cue_count(GateCue::IrisImpact, world.b), 1);
    assert!(world
        .kernel
        .journal()
        .iter()
        .any(|event| matches!(event.kind, GateEventKind::EntityStruckIris { entity, .. } if entity == item)));
}

#[test]
fn iris_toggle_requires_installation() {
    let mut world = twin_world(14);
    let err = world.kernel.set_iris_engaged(world.a, true).unwrap_err();
    assert_eq!(err, GateError::NoIris { endpoint: world.a });
}

#[test]
fn redrafted_actor_is_restored_on_arrival() {
    let mut world = twin_world(15);
    open_twin(&mut world, 3);
    let actor = world.host.spawn_actor(world.region_a, Cell::new(3, 3));
    world
        .kernel
        .enqueue_send(world.a, actor, true, &mut world.host)
        .expect("enqueue");
    assert!(world
        .kernel
        .endpoint(world.b)
        .is_some_and(|b| b.redraft_marks().contains(&actor)));

    world.kernel.tick_n(82, &mut world.host);

    assert_eq!(world.host.redrafts(), &[actor]);
    assert!(world.host.entity(actor).is_some_and(|entity| entity.drafted));
    assert!(world
        .kernel
        .endpoint(world.b)
        .is_some_and(|b| b.redraft_marks().is_empty()));
}

#[test]
fn vanished_entity_is_skipped() {
    let mut world = twin_world(16);
    open_twin(&mut world, 3);
    let gone = world.host.spawn_item(world.region_a, Cell::new(3, 3));
    let kept = world.host.spawn_item(world.region_a, Cell::new(4, 3));
    for item in [gone, kept] {
        world
            .kernel
            .enqueue_send(world.a, item, false, &mut world.host)
            .expect("enqueue");
    }
    world.host.destroy_entity(gone);

    world.kernel.tick_n(2 * 80 + 1, &mut world.host);

    assert_eq!(arrival_order(&world.kernel), vec![kept]);
    assert_eq!(world.host.location(gone), Some(EntityLocation::Destroyed));
}

#[test]
fn receiver_without_peer_discards_outgoing_items() {
    let mut world = twin_world(17);
    world
        .kernel
        .open_inbound(world.b, &mut world.host)
        .expect("open inbound");
    let item = world.host.spawn_item(world.region_b, Cell::new(3, 3));
    world
        .kernel
        .enqueue_send(world.b, item, false, &mut world.host)
        .expect("enqueue");

    world.kernel.tick(&mut world.host);

    assert_eq!(world.host.location(item), Some(EntityLocation::Destroyed));
    assert!(world
        .kernel
        .journal()
        .iter()
        .any(|event| matches!(event.kind, GateEventKind::ItemsDiscarded { count: 1, .. })));
}

#[test]
fn scripted_arrival_spawns_and_hold_release_closes() {
    let mut world = twin_world(18);
    let visitor = world.host.create_in_transit(true);
    world
        .kernel
        .enqueue_arrival(world.b, visitor, false, &mut world.host)
        .expect("arrival");
    assert!(world.kernel.is_active(world.b));
    assert!(world.kernel.has_external_hold(world.b));

    world.kernel.tick_n(81, &mut world.host);
    assert!(matches!(
        world.host.location(visitor),
        Some(EntityLocation::Placed { region, .. }) if region == world.region_b
    ));
    assert!(world.kernel.is_active(world.b));

    assert_eq!(world.kernel.pop_external_hold(world.b), Ok(0));
    world.kernel.tick(&mut world.host);
    assert!(!world.kernel.is_active(world.b));
}

#[test]
fn destroying_a_gate_returns_buffered_entities_home() {
    let mut world = twin_world(19);
    open_twin(&mut world, 3);
    let item = world.host.spawn_item(world.region_a, Cell::new(6, 6));
    world
        .kernel
        .enqueue_send(world.a, item, false, &mut world.host)
        .expect("enqueue");
    assert_eq!(world.host.location(item), Some(EntityLocation::InTransit));

    world
        .kernel
        .destroy_endpoint(world.a, &mut world.host)
        .expect("destroy");

    let Some(EntityLocation::Placed { region, cell }) = world.host.location(item) else {
        panic!("item should be back in the world");
    };
    assert_eq!(region, world.region_a);
    assert!(is_adjacent(cell, GATE_CELL.offset(Cell::new(0, -1))));
    assert!(!world.kernel.is_active(world.b));
}
