// Integration tests for the operator console

use std::fs;
use std::path::PathBuf;

use defiler::console::{CommandError, Console, LineKind};
use defiler::device::simulated::{BlockState, SimulatedDevice};
use defiler::device::TransportError;
use defiler::session::errors::{AddressError, LengthError, TableError};

fn console() -> Console<SimulatedDevice> {
    Console::new(SimulatedDevice::default())
}

/// Output lines (not inputs or errors) produced since `start`
fn outputs_since(console: &Console<SimulatedDevice>, start: usize) -> Vec<String> {
    console
        .transcript()
        .lines_since(start)
        .iter()
        .filter(|line| line.kind == LineKind::Output)
        .map(|line| line.text.clone())
        .collect()
}

/// A scratch path unique to this test process
fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("defiler-{}-{}", std::process::id(), name))
}

#[test]
fn test_get_stores_local_and_last_result() {
    let mut console = console();
    console
        .session_mut()
        .device_mut()
        .map(0x1000, &0x2000u32.to_le_bytes());

    console.execute_line("local 0x1000 foo").expect("local failed");
    console.execute_line("get 0x1000 bar").expect("get failed");

    let session = console.session();
    assert_eq!(session.locals().get("foo"), Some(0x1000));
    assert_eq!(session.locals().get("bar"), Some(0x2000));
    assert_eq!(session.last_result(), Some(0x2000));
    assert_eq!(
        session.resolve_token("%bar+0x10").map(|t| t.address),
        Ok(0x2010)
    );
}

#[test]
fn test_set_then_get_through_alias() {
    let mut console = console();
    console.execute_line("alloc data 0x10").expect("alloc failed");
    console.execute_line("local $0 buf").expect("local failed");
    console.execute_line("set %buf+4 0xCAFE").expect("set failed");
    console.execute_line("get $0+4 value").expect("get failed");

    assert_eq!(console.session().locals().get("value"), Some(0xCAFE));
    assert_eq!(console.session().last_result(), Some(0xCAFE));
}

#[test]
fn test_alloc_free_alloc_reuses_index() {
    let mut console = console();
    console.execute_line("alloc data 0x10").expect("alloc failed");
    console.execute_line("alloc data int").expect("alloc failed");
    console.execute_line("free $0").expect("free failed");

    let start = console.transcript().len();
    console.execute_line("alloc code 0x20").expect("alloc failed");
    let lines = outputs_since(&console, start);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("$0 = 0x"), "got {:?}", lines);
    assert!(console.session().variables().get(0).expect("slot").is_code);
}

#[test]
fn test_double_free_is_rejected() {
    let mut console = console();
    console.execute_line("alloc data 8").expect("alloc failed");
    console.execute_line("free $0").expect("free failed");

    let before = console.session().variables().clone();
    let result = console.execute_line("free $0");
    assert!(matches!(
        result,
        Err(CommandError::Table(TableError::UnallocatedVariable { index: 0 }))
    ));
    assert_eq!(console.session().variables(), &before);

    let last = console.transcript().lines().last().expect("no lines");
    assert_eq!(last.kind, LineKind::Error);
}

#[test]
fn test_free_by_start_address() {
    let mut console = console();
    console.execute_line("alloc data 8").expect("alloc failed");
    let address = console.session().variables().get(0).expect("slot").address;

    console
        .execute_line(&format!("free 0x{:x}", address))
        .expect("free failed");
    assert!(!console.session().variables().get(0).expect("slot").is_live());
    assert_eq!(
        console.session().device().block_state(address),
        Some(BlockState::Tombstone)
    );

    let result = console.execute_line("free 0x1234");
    assert!(matches!(
        result,
        Err(CommandError::Table(TableError::NotAllocated { address: 0x1234 }))
    ));
}

#[test]
fn test_last_result_before_any_result() {
    let mut console = console();
    let result = console.execute_line("read %# 4");
    assert!(matches!(
        result,
        Err(CommandError::Address(AddressError::NoLastResult))
    ));
}

#[test]
fn test_read_requires_length_for_raw_address() {
    let mut console = console();
    console.session_mut().device_mut().map(0x1000, b"hello");

    let result = console.execute_line("read 0x1000");
    assert!(matches!(
        result,
        Err(CommandError::Length(LengthError::LengthRequired))
    ));

    let start = console.transcript().len();
    console.execute_line("read 0x1000 5").expect("read failed");
    let lines = outputs_since(&console, start);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("0x00001000: "), "got {:?}", lines);
    assert!(lines[0].contains("68 65 6c 6c 6f"), "got {:?}", lines);
    assert!(lines[0].ends_with("|hello|"), "got {:?}", lines);
}

#[test]
fn test_read_variable_to_file() {
    let mut console = console();
    console.execute_line("alloc data 4").expect("alloc failed");
    console.execute_line("set $0 0x04030201").expect("set failed");

    let path = temp_path("read.bin");
    console
        .execute_line(&format!("read $0 {}", path.display()))
        .expect("read failed");
    assert_eq!(fs::read(&path).expect("missing dump"), vec![1, 2, 3, 4]);
    let _ = fs::remove_file(&path);
}

#[test]
fn test_writecode_marks_variable_as_code() {
    let mut console = console();
    let path = temp_path("payload.bin");
    fs::write(&path, [0x90u8; 8]).expect("write payload");

    console.execute_line("alloc data 8").expect("alloc failed");
    console
        .execute_line(&format!("writecode $0 {}", path.display()))
        .expect("writecode failed");

    let variable = *console.session().variables().get(0).expect("slot");
    assert!(variable.is_code);
    assert_eq!(console.session().device().code_writes(), &[variable.address]);

    console.execute_line("exec $0").expect("exec failed");
    assert_eq!(console.session().last_result(), Some(0));
    let _ = fs::remove_file(&path);
}

#[test]
fn test_write_rejects_short_file_and_oversized_length() {
    let mut console = console();
    let path = temp_path("short.bin");
    fs::write(&path, [1u8, 2]).expect("write payload");

    console.execute_line("alloc data 4").expect("alloc failed");
    let result = console.execute_line(&format!("write $0 4 {}", path.display()));
    assert!(matches!(
        result,
        Err(CommandError::ShortFile {
            available: 2,
            requested: 4,
            ..
        })
    ));

    fs::write(&path, [0u8; 8]).expect("write payload");
    let result = console.execute_line(&format!("write $0 {}", path.display()));
    assert!(matches!(
        result,
        Err(CommandError::Length(LengthError::ExceedsVariable { length: 8, size: 4 }))
    ));
    let _ = fs::remove_file(&path);
}

#[test]
fn test_exec_records_result_and_arguments() {
    let mut console = console();
    console.execute_line("alloc code 0x10").expect("alloc failed");
    console.execute_line("alloc data 0x10").expect("alloc failed");
    console.session_mut().device_mut().queue_return(0x99);

    let start = console.transcript().len();
    console.execute_line("exec $0 $1 7").expect("exec failed");
    assert_eq!(outputs_since(&console, start), vec!["%# = 0x99".to_string()]);
    assert_eq!(console.session().last_result(), Some(0x99));

    let data = console.session().variables().get(1).expect("slot").address;
    let calls = console.session().device().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args, vec![data, 7]);

    // Data memory is not executable
    let result = console.execute_line("exec $1");
    assert!(matches!(
        result,
        Err(CommandError::Transport(TransportError::Fault { .. }))
    ));
    assert_eq!(console.session().last_result(), Some(0x99));
}

#[test]
fn test_transport_failure_leaves_state_unchanged() {
    let mut console = console();
    console
        .session_mut()
        .device_mut()
        .fail_next(TransportError::Disconnected);

    let result = console.execute_line("alloc data 0x10");
    assert!(matches!(
        result,
        Err(CommandError::Table(TableError::AllocationFailed { .. }))
    ));
    assert!(console.session().variables().is_empty());
}

#[test]
fn test_failed_get_leaves_local_and_last_result() {
    let mut console = console();
    console
        .session_mut()
        .device_mut()
        .map(0x1000, &0x2000u32.to_le_bytes());
    console.execute_line("get 0x1000 bar").expect("get failed");

    console
        .session_mut()
        .device_mut()
        .fail_next(TransportError::Timeout);
    let result = console.execute_line("get 0x1000 bar");
    assert!(matches!(
        result,
        Err(CommandError::Transport(TransportError::Timeout))
    ));

    console
        .session_mut()
        .device_mut()
        .fail_next(TransportError::Timeout);
    assert!(console.execute_line("get 0x1000 fresh").is_err());

    let session = console.session();
    assert_eq!(session.locals().get("bar"), Some(0x2000));
    assert_eq!(session.locals().get("fresh"), None);
    assert_eq!(session.last_result(), Some(0x2000));
}

#[test]
fn test_echo_round_trips_through_device() {
    let mut console = console();
    let start = console.transcript().len();
    console.execute_line("echo hello   device").expect("echo failed");
    assert_eq!(
        outputs_since(&console, start),
        vec!["hello   device".to_string()]
    );

    console
        .session_mut()
        .device_mut()
        .fail_next(TransportError::Disconnected);
    let start = console.transcript().len();
    let result = console.execute_line("echo lost");
    assert!(matches!(
        result,
        Err(CommandError::Transport(TransportError::Disconnected))
    ));
    assert!(outputs_since(&console, start).is_empty());
}

#[test]
fn test_vars_listing() {
    let mut console = console();
    let start = console.transcript().len();
    console.execute_line("vars").expect("vars failed");
    assert_eq!(outputs_since(&console, start), vec!["(no variables)".to_string()]);

    console.execute_line("alloc data 0x10").expect("alloc failed");
    console.execute_line("local 0x1234 base").expect("local failed");
    let address = console.session().variables().get(0).expect("slot").address;

    let start = console.transcript().len();
    console.execute_line("vars").expect("vars failed");
    assert_eq!(
        outputs_since(&console, start),
        vec![
            format!("$0: 0x{:X}, size: 0x10, code: false", address),
            "%base: 0x1234".to_string(),
        ]
    );
}

#[test]
fn test_script_runs_lines_and_stops_at_first_error() {
    let mut console = console();
    let path = temp_path("setup.cmd");
    fs::write(
        &path,
        "# setup\nalloc data 8\n\nlocal $0 buf\nfree $9\necho unreachable\n",
    )
    .expect("write script");

    let result = console.execute_line(&format!("script {}", path.display()));
    match result {
        Err(CommandError::Script { line, source, .. }) => {
            assert_eq!(line, 5);
            assert!(matches!(
                *source,
                CommandError::Address(AddressError::UnknownVariable { index: 9 })
            ));
        }
        other => panic!("expected script error, got {:?}", other),
    }

    assert!(console.session().locals().get("buf").is_some());
    assert!(!console
        .transcript()
        .lines()
        .iter()
        .any(|line| line.text == "unreachable"));
    let _ = fs::remove_file(&path);
}

#[test]
fn test_recursive_script_hits_depth_limit() {
    let mut console = console();
    let path = temp_path("loop.cmd");
    fs::write(&path, format!("script {}\n", path.display())).expect("write script");

    let result = console.execute_line(&format!("script {}", path.display()));
    assert!(result.is_err());
    assert!(console
        .transcript()
        .lines()
        .iter()
        .any(|line| line.text.contains("scripts nested deeper than")));
    let _ = fs::remove_file(&path);
}

#[test]
fn test_unknown_command_and_usage_errors() {
    let mut console = console();
    assert!(matches!(
        console.execute_line("frobnicate"),
        Err(CommandError::UnknownCommand(name)) if name == "frobnicate"
    ));
    assert!(matches!(
        console.execute_line("alloc heap 4"),
        Err(CommandError::Usage { command: "alloc", .. })
    ));
    assert!(matches!(
        console.execute_line("get 0x1000"),
        Err(CommandError::Usage { command: "get", .. })
    ));
}

#[test]
fn test_quit_sets_flag() {
    let mut console = console();
    assert!(!console.should_quit());
    console.execute_line("quit").expect("quit failed");
    assert!(console.should_quit());
}
