use std::process::{Command, Output};
use swapnet::network::Network;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_swapnet"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute swapnet")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_template_prints_terminal_test() {
    let output = run(&["template", "--target", "conway"]);
    assert!(
        output.status.success(),
        "Command failed with status: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("Target: B3/S23"));
    assert!(text.contains("birth: n2 & !n3; survive: n1 & !n3"));
    assert!(text.contains("Forbidden outputs"));
}

#[test]
fn test_verify_sorting_network() {
    let network = Network::sorting_network_8().to_string();
    let output = run(&["verify", "--network", &network]);
    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert!(stdout(&output).contains("Verified on all 256 inputs"));
}

#[test]
fn test_verify_classic_conway_with_spaced_swaps() {
    let network = Network::sorting_network_8()
        .iter()
        .map(|swap| format!("{} - {}", swap.i(), swap.j()))
        .collect::<Vec<_>>()
        .join(", ");
    let output = run(&["verify", "--network", &network, "--target", "conway-classic"]);
    let text = stdout(&output);
    assert!(output.status.success(), "stdout: {}", text);
    assert!(text.contains("Target: conway-classic"));
    assert!(text.contains("Verified on all 256 inputs"));

    let output = run(&["template", "--target", "conway-classic"]);
    let text = stdout(&output);
    assert!(text.contains("Terminal test: (n2 & !n3) | (n0 & n1 & !n3 & alive)"));
    assert!(text.contains("Forbidden outputs (122 of 256)"));
}

#[test]
fn test_verify_reports_counterexample() {
    let network = Network::sorting_network_8().truncated(14).to_string();
    let output = run(&["verify", "--network", &network, "--target", "conway"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Counterexample: input"));
}

#[test]
fn test_find_completes_prefix() {
    let prefix = Network::sorting_network_8().truncated(16).to_string();
    let output = run(&[
        "find",
        "--target",
        "conway",
        "--max-swaps",
        "19",
        "--prefix",
        &prefix,
        "--show-outputs",
    ]);
    let text = stdout(&output);
    assert!(output.status.success(), "stdout: {}", text);
    assert!(text.contains("Network found"));
    assert!(text.contains("(prefix)"));
    assert!(text.contains("Allowed outputs:"));
    assert!(text.contains("Verified on all 256 inputs"));
}

#[test]
fn test_find_parallel_small() {
    let output = run(&[
        "find",
        "--target",
        "evacuate-top",
        "--arity",
        "4",
        "--max-swaps",
        "6",
        "--algorithm",
        "parallel",
        "-j",
        "2",
    ]);
    let text = stdout(&output);
    assert!(output.status.success(), "stdout: {}", text);
    assert!(text.contains("Running parallel search"));
    assert!(text.contains("Verified on all 16 inputs"));
}

#[test]
fn test_find_without_budget_fails() {
    let output = run(&["find", "--arity", "3", "--max-swaps", "0"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("No network found."));
}

#[test]
fn test_invalid_arguments() {
    let output = run(&["template", "--target", "B9/S23", "--arity", "8"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));

    let output = run(&["find", "--prefix", "0-9"]);
    assert_eq!(output.status.code(), Some(1));
}
