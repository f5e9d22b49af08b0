#![cfg(any(feature = "test_tier_required", feature = "test_tier_full"))]

use std::process::Command;

#[test]
fn gate_transit_demo_runs_twin_gates() {
    let bin = env!("CARGO_BIN_EXE_gate_transit_demo");
    let output = Command::new(bin)
        .args(["twin_gates", "--ticks", "450"])
        .output()
        .expect("run gate_transit_demo");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("scenario: twin_gates"));
    assert!(stdout.contains("opened_at: 360"));
}

#[test]
fn gate_transit_demo_rejects_unknown_scenario() {
    let bin = env!("CARGO_BIN_EXE_gate_transit_demo");
    let output = Command::new(bin)
        .arg("nowhere")
        .output()
        .expect("run gate_transit_demo");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown scenario: nowhere"));
}
