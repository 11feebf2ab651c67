//! Integration tests for end-to-end Brainfork execution.
//!
//! These tests verify the full pipeline:
//! Clean → Load → Execute → Verify

use std::time::Duration;

use brainfork_runtime::{Error, RuntimeConfig, SyntaxError};
use brainfork_tests::TestHarness;

const HELLO_WORLD: &str = r#"
    ; classic hello world
    ++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]
    >>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.
"#;

#[test]
fn test_output_code_point_two() {
    let harness = TestHarness::new();
    harness.run_ok("++.");
    assert_eq!(harness.output_bytes(), vec![2]);
}

#[test]
fn test_clear_loop_terminates() {
    let harness = TestHarness::new();
    harness.run_ok("+[-]");
    assert_eq!(harness.cell(0), 0);
}

#[test]
fn test_hello_world() {
    let harness = TestHarness::new();
    harness.run_ok(HELLO_WORLD);
    assert_eq!(harness.output(), "Hello World!\n");
}

#[test]
fn test_echo_input() {
    let harness = TestHarness::with_input("abc");
    // read until end of input (0) and echo
    harness.run_ok(",[.,]");
    assert_eq!(harness.output(), "abc");
}

#[test]
fn test_comments_are_ignored() {
    let harness = TestHarness::new();
    harness.run_ok("+++ ; not executed: [-] {)}\n. done");
    assert_eq!(harness.output_bytes(), vec![3]);
}

#[test]
fn test_comment_ends_at_bare_carriage_return() {
    let harness = TestHarness::new();
    harness.run_ok("; classic mac line\r+.");
    assert_eq!(harness.output_bytes(), vec![1]);
}

#[test]
fn test_locked_twice_on_single_unit() {
    let harness = TestHarness::new();
    harness.run_ok("(+)(+)");
    assert_eq!(harness.cell(0), 2);
    assert!(harness.interpreter().locks().acquire_or_create(0).is_free());
}

#[test]
fn test_unlocked_race_stays_in_range() {
    let harness = TestHarness::new();
    harness.run_ok("{+|+}");
    assert!(harness.cell(0) <= 2, "cell 0 was {}", harness.cell(0));
    assert_eq!(harness.units_spawned(), 3);
}

#[test]
fn test_locked_counter_exact() {
    let harness = TestHarness::new();
    let source = format!("{{{}}}", vec!["(+)"; 8].join("|"));
    harness.run_ok(&source);
    assert_eq!(harness.cell(0), 8);
}

#[test]
fn test_children_start_from_cell_zero() {
    let harness = TestHarness::new();
    harness.run_ok(">>>>>{+|++}");
    assert!(harness.cell(0) <= 3);
    assert_eq!(harness.cell(5), 0);
}

#[test]
fn test_separator_nesting() {
    let harness = TestHarness::new();
    // outer block has two segments; the first holds its own two-way block
    harness.run_ok("{>{>>(+)|>>(+)}|>>>>>>+}");
    assert_eq!(harness.cell(2), 2);
    assert_eq!(harness.cell(6), 1);
    assert_eq!(harness.cell(1), 0);
    assert_eq!(harness.units_spawned(), 5);
}

#[test]
fn test_parallel_output_contains_every_character() {
    let harness = TestHarness::new();
    let a = "+".repeat(65);
    let b = "+".repeat(66);
    harness.run_ok(&format!("{{>{a}.|>>{b}.}}"));
    let mut out: Vec<u8> = harness.output_bytes();
    out.sort_unstable();
    assert_eq!(out, b"AB".to_vec());
}

#[test]
fn test_block_joins_before_parent_continues() {
    let harness = TestHarness::new();
    // children write cells 1 and 2 after a delay; parent reads them after }
    harness.run_ok("{~>+++|~>>++++}>[<+>-]>[<<+>>-]<<.");
    assert_eq!(harness.output_bytes(), vec![7]);
}

#[test]
fn test_structural_errors_produce_no_output() {
    for (source, expected) in [
        (".]", SyntaxError::UnmatchedLoopClose { position: 1 }),
        (".[", SyntaxError::UnmatchedLoopOpen { position: 1 }),
        (".{", SyntaxError::UnmatchedBlockOpen { position: 1 }),
        (".{+|{.[}}", SyntaxError::UnmatchedLoopOpen { position: 6 }),
    ] {
        let harness = TestHarness::new();
        match harness.run(source) {
            Err(Error::Syntax(err)) => assert_eq!(err, expected, "source {source:?}"),
            other => panic!("expected syntax error for {source:?}, got {other:?}"),
        }
        assert!(harness.output_bytes().is_empty());
        assert_eq!(harness.units_spawned(), 0);
    }
}

#[test]
fn test_stray_block_close_is_ignored() {
    let harness = TestHarness::new();
    harness.run_ok("+}.");
    assert_eq!(harness.output_bytes(), vec![1]);

    let harness = TestHarness::new();
    harness.run_ok("{+|+}}}(+)");
    assert!((2..=3).contains(&harness.cell(0)));
}

#[test]
fn test_unlock_without_lock_is_reported() {
    let harness = TestHarness::new();
    let err = harness.run("+)").unwrap_err();
    assert!(err.is_lock_discipline());
    assert!(err.to_string().contains("BF-0: unlock without lock"));
}

#[test]
fn test_unreleased_lock_is_reported() {
    let harness = TestHarness::new();
    let err = harness.run("(+").unwrap_err();
    assert!(matches!(err, Error::LocksHeldAtExit { held: 1, .. }));
    assert_eq!(harness.cell(0), 1);
}

#[test]
fn test_child_lock_error_surfaces_through_join() {
    let harness = TestHarness::new();
    let err = harness.run("{+|{(}}").unwrap_err();
    assert!(err.is_lock_discipline());
    assert!(matches!(
        err.root_cause(),
        Error::LocksHeldAtExit { held: 1, .. }
    ));
}

#[test]
fn test_interpreter_recovers_after_failure() {
    let harness = TestHarness::new();
    assert!(harness.run("{(|+}").is_err());
    // the failed unit's lock was released, so a new program can take it
    harness.run_ok("(+)");
}

#[test]
fn test_fail_fast_cancels_siblings() {
    let config = RuntimeConfig {
        delay: Duration::from_millis(5),
        fail_fast: true,
        ..RuntimeConfig::default()
    };
    let harness = TestHarness::with_config(Vec::<u8>::new(), config);
    // second child spins forever unless cancelled
    let err = harness.run("{~)|>+[]|>>+[~]}").unwrap_err();
    assert!(err.is_lock_discipline());
    match err {
        Error::ParallelBlockFailed { failed, .. } => assert_eq!(failed, 3),
        other => panic!("expected block failure, got {other:?}"),
    }
}

#[test]
fn test_fail_fast_cancels_lock_waiters() {
    let config = RuntimeConfig {
        delay: Duration::from_millis(5),
        fail_fast: true,
        ..RuntimeConfig::default()
    };
    let harness = TestHarness::with_config(Vec::<u8>::new(), config);
    // the parent holds cell 0's lock, so the first child waits on it forever
    let err = harness.run("({(|~~)})").unwrap_err();
    assert!(err.is_lock_discipline());
}
