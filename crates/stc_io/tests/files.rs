use stc_core::sim::Fault;
use stc_io::loader::load_stimulus;
use stc_io::scenario::{Command, VariantKind, load_scenario};
use std::fs;
use std::path::PathBuf;

fn scratch(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("stc_io_{}_{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_a_scenario_file() {
    let path = scratch(
        "press.scn",
        "variant line\nswitch 0b0001\nhold 2\nfault corrupt 3\nswitch 0b0010\nexpect runs 2\n",
    );
    let scenario = load_scenario(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(scenario.variant(), VariantKind::Line);
    assert_eq!(scenario.lines.len(), 6);
    assert_eq!(scenario.lines[3].command, Command::Fault(Fault::Corrupt { every: 3 }));
    assert_eq!(scenario.lines[5].command, Command::ExpectRuns(2));
}

#[test]
fn missing_scenario_names_the_path() {
    let err = load_scenario("/nonexistent/stc/press.scn").unwrap_err();
    assert!(err.to_string().contains("press.scn"));
}

#[test]
fn loads_a_stimulus_file() {
    let path = scratch("ramp.txt", "0 1 2 3\n0x4 0x5\n");
    let buf = load_stimulus(&path).unwrap();
    fs::remove_file(&path).ok();
    assert_eq!(buf.as_slice(), &[0, 1, 2, 3, 4, 5]);
}

#[test]
fn oversized_and_empty_stimulus_are_rejected() {
    let big = (0..300).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
    let path = scratch("big.txt", &big);
    let err = load_stimulus(&path).unwrap_err();
    fs::remove_file(&path).ok();
    assert!(err.to_string().contains("at most 256"));

    let path = scratch("empty.txt", "# nothing\n");
    let err = load_stimulus(&path).unwrap_err();
    fs::remove_file(&path).ok();
    assert!(err.to_string().contains("no samples"));
}
