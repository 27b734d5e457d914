use std::io::Write;
use std::process::{Command, Output, Stdio};

fn session(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tforth"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start tforth");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn end_of_input_says_goodbye() {
    let output = session(&[], ": inc 1 + ;\n5 inc .\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!(">   ok\n> 6   ok\n>  bye!\n", stdout);
}

#[test]
fn bye_exits_cleanly() {
    let output = session(&[], "1 2 + . bye\n4 .\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(Some(0), output.status.code());
    assert_eq!("> 3 bye!\n", stdout);
}

#[test]
fn underflow_terminates_the_process() {
    let output = session(&[], "drop\n1 2 + .\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(!stdout.contains("ok"), "stdout: {}", stdout);
    assert!(
        stderr.contains("Data stack underflow by 1 entries"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn unknown_words_do_not_end_the_session() {
    let output = session(&[], "frob\n0 pick\n7 .\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!("> frob?\n> pick?\n> 7   ok\n>  bye!\n", stdout);
}

#[test]
fn small_data_stack_overflows() {
    let output = session(&["--data-stack", "12"], "1 dup\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("Data stack overflow by 1 entries"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn capacity_without_usable_slots_is_rejected() {
    for flag in ["--data-stack", "--return-stack"] {
        let output = session(&[flag, "11"], "1 .\n");
        assert_eq!(Some(2), output.status.code());
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn smallest_return_stack_runs_natives() {
    // the top-level sentinel fills the only usable slot
    let output = session(&["--return-stack", "12"], "1 2 + .\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert_eq!("> 3   ok\n>  bye!\n", stdout);
}

#[test]
fn prelude_can_be_disabled() {
    let output = session(&["--no-prelude"], "push8\n");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!("> push8?\n>  bye!\n", stdout);
}
