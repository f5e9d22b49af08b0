use stargate::simulator::{GateConfig, GateKernel, GateScenario, DEFAULT_DIAL_DELAY};
use std::fs;

#[test]
fn saved_world_resumes_mid_transit() {
    let mut world = GateScenario::TwinGates
        .build(GateConfig::default(), 21)
        .expect("build");
    world.run(DEFAULT_DIAL_DELAY, DEFAULT_DIAL_DELAY + 1).expect("run");
    let destination = world.destination.expect("destination");

    let dir = std::env::temp_dir().join(format!("stargate-resume-{}", std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).expect("clear dir");
    }
    world.kernel.save_to_dir(&dir).expect("save");

    let mut loaded = GateKernel::load_from_dir(&dir, &mut world.host).expect("load");
    assert_eq!(loaded.valid_peer(world.origin), Some(destination));
    assert_eq!(loaded.time(), world.kernel.time());

    loaded.tick_n(2 * 80, &mut world.host);
    assert!(loaded
        .endpoint(destination)
        .is_some_and(|gate| gate.buffers().is_empty()));

    fs::remove_dir_all(&dir).expect("cleanup");
}
