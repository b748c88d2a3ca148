//! End-to-end checks against the built `tsdate` binary.
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tsdate::{Edge, Mutation, Node, Site, TreeSequence, load_tree_sequence, save_tree_sequence};

fn tsdate(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tsdate"))
        .args(args)
        .output()
        .expect("failed to launch tsdate")
}

fn tsdate_with(args: &[&Path], flags: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tsdate"))
        .args(args)
        .args(flags)
        .output()
        .expect("failed to launch tsdate")
}

/// Five samples with a caterpillar genealogy split in two trees at position 500
fn write_input(dir: &Path) -> PathBuf {
    let length = 1000.0;
    let mut ts = TreeSequence::new(length);
    ts.nodes = (0..5).map(|_| Node::sample(0.0)).collect();
    ts.nodes.extend((1..=4).map(|t| Node::ancestor(t as f64)));

    let whole = |parent, child| Edge {
        left: 0.0,
        right: length,
        parent,
        child,
    };
    ts.edges = vec![
        whole(5, 0),
        whole(5, 1),
        whole(6, 5),
        whole(6, 2),
        whole(7, 6),
        Edge {
            left: 0.0,
            right: 500.0,
            parent: 7,
            child: 3,
        },
        Edge {
            left: 500.0,
            right: length,
            parent: 8,
            child: 3,
        },
        whole(8, 7),
        whole(8, 4),
    ];
    for (site, (position, node)) in [(50.0, 0), (120.0, 5), (480.0, 6), (700.0, 3), (900.0, 7)]
        .into_iter()
        .enumerate()
    {
        ts.sites.push(Site {
            position,
            ancestral_state: "A".to_string(),
        });
        ts.mutations.push(Mutation {
            site,
            node,
            derived_state: "G".to_string(),
            time: None,
        });
    }

    let path = dir.join("input.trees");
    save_tree_sequence(&ts, &path).unwrap();
    path
}

#[test]
fn test_successful_run_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let output = dir.path().join("output.trees");

    let result = tsdate_with(&[&input, &output], &["-m", "1e-8", "-s", "30"]);

    assert!(result.status.success());
    assert_eq!(String::from_utf8_lossy(&result.stdout), "");
    assert_eq!(String::from_utf8_lossy(&result.stderr), "");

    let original = load_tree_sequence(&input).unwrap();
    let dated = load_tree_sequence(&output).unwrap();
    assert_eq!(dated.edges, original.edges);
    assert_eq!(dated.provenances.len(), 1);
    assert_eq!(dated.provenances[0].record["parameters"]["slices"], 30);
    assert!(dated.mutations.iter().all(|m| m.time.is_some()));
}

#[test]
fn test_load_failure_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("nothing_here.trees");
    let output = dir.path().join("output.trees");

    let result = tsdate(&[&input, &output]);

    assert_eq!(result.status.code(), Some(1));
    assert!(result.stdout.is_empty());
    assert!(!result.stderr.is_empty());
    assert!(!output.exists());
}

#[test]
fn test_domain_failure_leaves_existing_output_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let output = dir.path().join("output.trees");
    std::fs::write(&output, "keep me").unwrap();
    let before = std::fs::metadata(&output).unwrap().modified().unwrap();

    let result = tsdate_with(&[&input, &output], &["--recombination-rate", "-1"]);

    assert_eq!(result.status.code(), Some(1));
    assert!(result.stdout.is_empty());
    assert!(
        String::from_utf8_lossy(&result.stderr).contains("recombination rate must be positive")
    );
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");
    assert_eq!(std::fs::metadata(&output).unwrap().modified().unwrap(), before);
}

#[test]
fn test_bad_time_grid_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let output = dir.path().join("output.trees");

    let result = tsdate_with(&[&input, &output], &["--time-grid", "random"]);

    assert_eq!(result.status.code(), Some(2));
    assert!(result.stdout.is_empty());
    assert!(!result.stderr.is_empty());
    assert!(!output.exists());
}

#[test]
fn test_verbose_run_logs_to_stderr_only() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path());
    let output = dir.path().join("output.trees");

    let result = tsdate_with(&[&input, &output], &["-v"]);

    assert!(result.status.success());
    assert!(result.stdout.is_empty());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Dating"));
}
