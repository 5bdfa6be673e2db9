use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

const ARM64_TRACE: &str = r#"{"events": [
    {"pid": 10, "number": 39, "phase": "entry"},
    {"pid": 10, "number": 39, "phase": "exit", "return_value": 10},
    {"pid": 11, "personality": "arm64", "number": 172, "phase": "entry"},
    {"pid": 11, "personality": "arm64", "number": 172, "phase": "exit", "return_value": 11}
]}"#;

fn sysdecode(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sysdecode"))
        .args(args)
        .env_remove("SYSDECODE_LOG")
        .env_remove("SYSDECODE_LOG_FILE")
        .env_remove("SYSDECODE_APPEND_LOG_FILE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn unopenable_trace_file_is_fatal() {
    let out = sysdecode(&["decode", "/nonexistent/sysdecode/trace.json"], "");
    assert_eq!(Some(1), out.status.code());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[FATAL"));
    assert!(stderr.contains("Can't open trace file"));
    assert!(!stderr.contains("backtrace"));
}

#[test]
fn unsupported_personality_is_skipped() {
    let out = sysdecode(&["-v", "decode", "-"], ARM64_TRACE);
    assert!(out.status.success());
    assert_eq!("getpid() = 10\n", String::from_utf8_lossy(&out.stdout));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[WARN"));
    assert!(stderr.contains("Tracee 11: Unknown personality `arm64'"));
}

#[test]
fn fatal_errors_abort_with_backtrace() {
    let out = sysdecode(&["decode", "--fatal-errors", "-"], ARM64_TRACE);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[FATAL"));
    assert!(stderr.contains("=== Start sysdecode backtrace"));
}

#[test]
fn quiet_by_default() {
    let out = sysdecode(&["decode", "-"], ARM64_TRACE);
    assert!(out.status.success());
    assert!(!String::from_utf8_lossy(&out.stderr).contains("[WARN"));
}
