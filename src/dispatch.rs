//! Two-phase decode of one syscall: resolve the descriptor for the tracee's
//! personality, run the decoder's entry hook, hand its state back at exit,
//! and turn the return value into text.

use crate::{
    decoders::{self, DecodeContext, EntryState, Outcome, ResultFormat},
    event::{SyscallPhase, TraceEvent},
    fd_tracker::DescriptorTracker,
    flags::Flags,
    kernel_abi::{canonical_syscallno, Personality},
    kernel_metadata::{errno_description, errno_name, is_restart_errno},
    kernel_supplement::MAX_ERRNO,
    log::LogLevel::{LogDebug, LogError, LogWarn},
    memory::MemoryAccess,
    record::{CallStatus, DecodedRecord},
    sysent::{SyscallDescriptor, SyscallFlags, MAX_ARGS},
    syscall_tables::{self, PersonalityRegistry},
    xlat,
};
use libc::pid_t;
use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// No table is built for this personality. Fatal for the tracee that
    /// reported it.
    UnknownPersonality(u32),
    /// As above, for a personality given by name.
    UnknownPersonalityName(String),
    /// An event arrived in a phase the tracee was not expecting.
    PhaseMismatch { pid: pid_t, expected: SyscallPhase },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownPersonality(p) => write!(f, "Unknown personality {}", p),
            DecodeError::UnknownPersonalityName(p) => write!(f, "Unknown personality `{}'", p),
            DecodeError::PhaseMismatch { pid, expected } => {
                write!(f, "Tracee {}: expected a syscall {} stop", pid, expected)
            }
        }
    }
}

impl Error for DecodeError {}

/// What the entry hook left for the exit hook of the same call. Only the
/// dispatcher looks inside.
#[derive(Clone, Debug)]
pub struct DecodeContinuation {
    pid: pid_t,
    personality: Personality,
    number: u64,
    args: [u64; 6],
    descriptor: Option<&'static SyscallDescriptor>,
    record: DecodedRecord,
    state: EntryState,
}

impl DecodeContinuation {
    /// The record as it stood after entry.
    pub fn partial_record(&self) -> &DecodedRecord {
        &self.record
    }

    fn matches(&self, event: &TraceEvent) -> bool {
        self.pid == event.pid && self.number == event.number && self.personality == event.personality
    }
}

pub struct EntryDecode {
    pub record: DecodedRecord,
    /// `None` when the exit half must not be decoded.
    pub continuation: Option<DecodeContinuation>,
    /// The call never returns here (exit_group). `record` is final.
    pub suppress_exit_phase: bool,
}

pub struct SyscallDispatch {
    registry: &'static PersonalityRegistry,
    flags: Flags,
    tracker: Option<Arc<DescriptorTracker>>,
}

impl SyscallDispatch {
    pub fn new(flags: Flags) -> SyscallDispatch {
        SyscallDispatch {
            registry: syscall_tables::registry(),
            flags,
            tracker: None,
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<DescriptorTracker>) -> SyscallDispatch {
        self.tracker = Some(tracker);
        self
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn tracker(&self) -> Option<&Arc<DescriptorTracker>> {
        self.tracker.as_ref()
    }

    /// `None` for numbers the personality does not define.
    pub fn lookup(&self, personality: Personality, number: u64) -> Option<&'static SyscallDescriptor> {
        let canonical = canonical_syscallno(personality, number);
        self.registry.table_for(personality).lookup(canonical)
    }

    fn name_of(&self, descriptor: Option<&SyscallDescriptor>, personality: Personality, number: u64) -> String {
        match descriptor {
            Some(d) => d.base_name().to_owned(),
            None => syscall_tables::unknown_syscall_name(canonical_syscallno(personality, number)),
        }
    }

    fn context<'a>(
        &'a self,
        event: &TraceEvent,
        memory: &'a dyn MemoryAccess,
        nargs: usize,
    ) -> DecodeContext<'a> {
        DecodeContext::new(
            event.pid,
            event.personality,
            &self.flags,
            memory,
            self.tracker.as_deref(),
            &event.args,
            nargs,
        )
    }

    /// Raw words only: used for unknown numbers and when a decoder breaks.
    fn raw_record(&self, event: &TraceEvent, descriptor: Option<&SyscallDescriptor>) -> DecodedRecord {
        let mut record = DecodedRecord::new(
            event.pid,
            event.personality,
            event.number,
            self.name_of(descriptor, event.personality, event.number),
            descriptor.map_or(SyscallFlags::empty(), |d| d.flags),
        );
        let nargs = descriptor.map_or(MAX_ARGS, |d| d.nargs());
        record.args = event.args[..nargs]
            .iter()
            .map(|w| xlat::hex(event.personality.truncate_word(*w)))
            .collect();
        record
    }

    pub fn decode_entry(
        &self,
        event: &TraceEvent,
        memory: &dyn MemoryAccess,
    ) -> Result<EntryDecode, DecodeError> {
        if event.phase != SyscallPhase::Entry {
            return Err(DecodeError::PhaseMismatch {
                pid: event.pid,
                expected: SyscallPhase::Entry,
            });
        }
        let descriptor = self.lookup(event.personality, event.number);
        let (record, state, no_return) = match descriptor {
            None => {
                log!(LogDebug, "{}: unknown syscall {:#x}", event.pid, event.number);
                (self.raw_record(event, None), EntryState::Nothing, false)
            }
            Some(d) => {
                let attempt = catch_unwind(AssertUnwindSafe(|| {
                    let mut ctx = self.context(event, memory, d.nargs());
                    let out = decoders::decode_entry(d.decoder, &mut ctx);
                    (out, ctx.into_faults())
                }));
                match attempt {
                    Ok((out, faults)) => {
                        let mut record = self.raw_record(event, Some(d));
                        record.args = out.args;
                        record.faults = faults;
                        (record, out.state, out.no_return)
                    }
                    Err(_) => {
                        log!(LogError, "{}: entry decoder for {} failed", event.pid, d.name);
                        (self.raw_record(event, Some(d)), EntryState::Nothing, false)
                    }
                }
            }
        };
        if no_return {
            let mut record = record;
            record.status = CallStatus::NoReturn;
            record.result = Some("?".into());
            return Ok(EntryDecode {
                record,
                continuation: None,
                suppress_exit_phase: true,
            });
        }
        let continuation = DecodeContinuation {
            pid: event.pid,
            personality: event.personality,
            number: event.number,
            args: event.args,
            descriptor,
            record: record.clone(),
            state,
        };
        Ok(EntryDecode {
            record,
            continuation: Some(continuation),
            suppress_exit_phase: false,
        })
    }

    /// Complete a call. Returns `None` for an exec-like call that succeeded:
    /// the image that made the call is gone and there is nothing to decode.
    /// Without a continuation only the result is decoded.
    pub fn decode_exit(
        &self,
        event: &TraceEvent,
        continuation: Option<DecodeContinuation>,
        memory: &dyn MemoryAccess,
    ) -> Result<Option<DecodedRecord>, DecodeError> {
        if event.phase != SyscallPhase::Exit {
            return Err(DecodeError::PhaseMismatch {
                pid: event.pid,
                expected: SyscallPhase::Exit,
            });
        }
        let continuation = match continuation {
            Some(c) if c.matches(event) => Some(c),
            Some(c) => {
                log!(
                    LogWarn,
                    "{}: exit of syscall {:#x} does not match pending entry of {}",
                    event.pid,
                    event.number,
                    c.record.name
                );
                None
            }
            None => None,
        };
        let (descriptor, args, mut record, state) = match continuation {
            Some(c) => (c.descriptor, c.args, c.record, c.state),
            None => {
                let descriptor = self.lookup(event.personality, event.number);
                let mut record = self.raw_record(event, descriptor);
                record.args.clear();
                record.resumed = true;
                (descriptor, event.args, record, EntryState::Nothing)
            }
        };

        if event.faulted {
            record.status = CallStatus::Unknown;
            record.result = Some("?".into());
            return Ok(Some(record));
        }
        let raw = event.personality.truncate_word(event.return_value.unwrap_or(0));
        let success = !is_error_return(event.personality, raw, descriptor);
        if success && descriptor.map_or(false, |d| d.is_exec_like()) {
            log!(LogDebug, "{}: {} succeeded, exit suppressed", event.pid, record.name);
            return Ok(None);
        }

        let outcome = Outcome { raw, success };
        let mut format = ResultFormat::Decimal;
        if let Some(d) = descriptor {
            let exit_event = TraceEvent { args, ..event.clone() };
            let attempt = catch_unwind(AssertUnwindSafe(|| {
                let mut ctx = self.context(&exit_event, memory, d.nargs());
                let mut scratch = record.clone();
                let out = decoders::decode_exit(d.decoder, &mut ctx, &mut scratch, &state, outcome);
                (out, scratch, ctx.into_faults())
            }));
            match attempt {
                Ok((out, scratch, faults)) => {
                    record = scratch;
                    for f in faults {
                        if !record.faults.contains(&f) {
                            record.faults.push(f);
                        }
                    }
                    if success {
                        if let Some(tracker) = &self.tracker {
                            tracker.apply(event.pid, d, &out.effects);
                        }
                    }
                    format = out.format;
                }
                Err(_) => {
                    log!(LogError, "{}: exit decoder for {} failed", event.pid, d.name);
                }
            }
        }
        self.finish(&mut record, event.pid, raw, success, format);
        Ok(Some(record))
    }

    fn finish(&self, record: &mut DecodedRecord, pid: pid_t, raw: u64, success: bool, format: ResultFormat) {
        let personality = record.personality;
        if !success {
            let err = (-personality.signed_word(raw)) as i32;
            let prefix = if is_restart_errno(err) {
                record.status = CallStatus::Restarted;
                "?"
            } else {
                record.status = CallStatus::Failed;
                "-1"
            };
            record.result = Some(format!("{} {}", prefix, errno_name(err)));
            record.aux_comment = Some(errno_description(err));
            return;
        }
        record.status = CallStatus::Success;
        let signed = personality.signed_word(raw);
        record.result = Some(match format {
            ResultFormat::Decimal => signed.to_string(),
            ResultFormat::Unsigned => raw.to_string(),
            ResultFormat::Hex => xlat::hex(raw),
            ResultFormat::Octal => format!("0{:02o}", raw),
            ResultFormat::Fd => {
                let fd = raw as u32 as i32;
                let hint = if self.flags.decode_fds {
                    self.tracker.as_ref().and_then(|t| t.lookup(pid, fd))
                } else {
                    None
                };
                match hint {
                    Some(h) => format!("{}<{}>", fd, h),
                    None => fd.to_string(),
                }
            }
            ResultFormat::AuxString(text) => {
                record.aux_comment = Some(text);
                signed.to_string()
            }
        });
    }
}

/// Error returns are `-1..=-4095` of the personality's word, unless the call
/// cannot fail.
pub fn is_error_return(
    personality: Personality,
    raw: u64,
    descriptor: Option<&SyscallDescriptor>,
) -> bool {
    if descriptor.map_or(false, |d| d.has_flag(SyscallFlags::SYSCALL_NEVER_FAILS)) {
        return false;
    }
    let signed = personality.signed_word(raw);
    signed < 0 && signed >= -(MAX_ERRNO as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fd_tracker::FdHint,
        memory::{MemoryFault, SnapshotMemory},
        remote_ptr::{RemotePtr, Void},
    };

    const PID: pid_t = 100;

    fn dispatch() -> SyscallDispatch {
        let mut flags = Flags::default();
        flags.decode_fds = true;
        SyscallDispatch::new(flags).with_tracker(Arc::new(DescriptorTracker::new()))
    }

    fn entry(number: u64, args: [u64; 6]) -> TraceEvent {
        TraceEvent::entry(PID, Personality::X64, number, args)
    }

    fn exit(number: u64, args: [u64; 6], ret: i64) -> TraceEvent {
        TraceEvent::exit(PID, Personality::X64, number, args, ret as u64)
    }

    fn run(d: &SyscallDispatch, mem: &SnapshotMemory, number: u64, args: [u64; 6], ret: i64) -> Option<DecodedRecord> {
        let e = d.decode_entry(&entry(number, args), mem).unwrap();
        d.decode_exit(&exit(number, args, ret), e.continuation, mem).unwrap()
    }

    #[test]
    fn open_then_close_updates_tracker() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        mem.add_c_str(PID, 0x1000, "/tmp/x");
        let r = run(&d, &mem, 2, [0x1000, 0, 0, 0, 0, 0], 5).unwrap();
        assert_eq!("open(\"/tmp/x\", O_RDONLY) = 5</tmp/x>", r.to_string());
        let tracker = d.tracker().unwrap();
        assert_eq!(Some(FdHint::Path("/tmp/x".into())), tracker.lookup(PID, 5));

        let r = run(&d, &mem, 3, [5, 0, 0, 0, 0, 0], 0).unwrap();
        assert_eq!("close(5</tmp/x>) = 0", r.to_string());
        assert_eq!(None, tracker.lookup(PID, 5));
    }

    #[test]
    fn failed_open_reports_errno() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        mem.add_c_str(PID, 0x1000, "/nope");
        let r = run(&d, &mem, 2, [0x1000, 0, 0, 0, 0, 0], -2).unwrap();
        assert_eq!(
            "open(\"/nope\", O_RDONLY) = -1 ENOENT (No such file or directory)",
            r.to_string()
        );
        assert_eq!(CallStatus::Failed, r.status);
        assert_eq!(0, d.tracker().unwrap().tracked_count(PID));
    }

    #[test]
    fn restart_codes_print_question_mark() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let r = run(&d, &mem, 0, [3, 0x1000, 10, 0, 0, 0], -512).unwrap();
        assert_eq!(
            "read(3, 0x1000, 10) = ? ERESTARTSYS (To be restarted if SA_RESTART is set)",
            r.to_string()
        );
        assert_eq!(CallStatus::Restarted, r.status);
    }

    #[test]
    fn unknown_numbers_decode_generically() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        for number in &[400u64, 600, u64::MAX] {
            let r = run(&d, &mem, *number, [1, 2, 3, 4, 5, 6], 0).unwrap();
            assert_eq!(6, r.args.len());
            assert!(r.name.starts_with("syscall_0x"));
        }
        let r = run(&d, &mem, 400, [1, 2, 3, 4, 5, 6], -38).unwrap();
        assert_eq!(
            "syscall_0x190(0x1, 0x2, 0x3, 0x4, 0x5, 0x6) = -1 ENOSYS (Function not implemented)",
            r.to_string()
        );
    }

    #[test]
    fn exec_success_has_no_exit_decode() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        mem.add_c_str(PID, 0x1000, "/bin/true");
        assert!(run(&d, &mem, 59, [0x1000, 0, 0, 0, 0, 0], 0).is_none());
        let failed = run(&d, &mem, 59, [0x1000, 0, 0, 0, 0, 0], -2).unwrap();
        assert_eq!(CallStatus::Failed, failed.status);
        assert_eq!(
            "execve(\"/bin/true\", NULL, NULL) = -1 ENOENT (No such file or directory)",
            failed.to_string()
        );
    }

    #[test]
    fn exit_group_suppresses_exit_phase() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let e = d.decode_entry(&entry(231, [0; 6]), &mem).unwrap();
        assert!(e.suppress_exit_phase);
        assert!(e.continuation.is_none());
        assert_eq!("exit_group(0) = ?", e.record.to_string());
    }

    #[test]
    fn missing_continuation_decodes_result_only() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let r = d
            .decode_exit(&exit(2, [0x1000, 0, 0, 0, 0, 0], 7), None, &mem)
            .unwrap()
            .unwrap();
        assert_eq!("<... open resumed>) = 7", r.to_string());
        assert!(r.resumed);
    }

    #[test]
    fn mismatched_continuation_is_dropped() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let e = d.decode_entry(&entry(39, [0; 6]), &mem).unwrap();
        let r = d
            .decode_exit(&exit(3, [4, 0, 0, 0, 0, 0], 0), e.continuation, &mem)
            .unwrap()
            .unwrap();
        assert!(r.resumed);
        assert_eq!("close", r.name);
    }

    #[test]
    fn calendar_time_comment_only_on_success() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let r = run(&d, &mem, 201, [0; 6], 1_700_000_000).unwrap();
        assert_eq!(
            "time(NULL) = 1700000000 (2023-11-14T22:13:20+0000)",
            r.to_string()
        );
        let r = run(&d, &mem, 201, [0x10, 0, 0, 0, 0, 0], -14).unwrap();
        assert_eq!("time(0x10) = -1 EFAULT (Bad address)", r.to_string());
    }

    #[test]
    fn faulted_exit_prints_unknown_result() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let e = d.decode_entry(&entry(3, [4, 0, 0, 0, 0, 0]), &mem).unwrap();
        let mut ev = exit(3, [4, 0, 0, 0, 0, 0], 0);
        ev.faulted = true;
        let r = d.decode_exit(&ev, e.continuation, &mem).unwrap().unwrap();
        assert_eq!("close(4) = ?", r.to_string());
        assert_eq!(CallStatus::Unknown, r.status);
    }

    #[test]
    fn unreadable_path_keeps_record() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let r = run(&d, &mem, 2, [0xbad000, 0x241, 0o600, 0, 0, 0], -14).unwrap();
        assert_eq!(
            "open(0xbad000 /* fault */, O_WRONLY|O_CREAT|O_TRUNC, 0600) = -1 EFAULT (Bad address)",
            r.to_string()
        );
        assert_eq!(vec![0], r.faults);
    }

    #[test]
    fn offsets_print_unsigned() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let r = run(&d, &mem, 8, [3, 0, 2, 0, 0, 0], 4096).unwrap();
        assert_eq!("lseek(3, 0, SEEK_END) = 4096", r.to_string());
    }

    #[test]
    fn wrong_phase_is_rejected() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        match d.decode_entry(&exit(3, [0; 6], 0), &mem) {
            Err(DecodeError::PhaseMismatch { pid: PID, expected: SyscallPhase::Entry }) => (),
            _ => panic!("exit event accepted as entry"),
        }
    }

    #[test]
    fn x86_results_are_word_sized() {
        let d = dispatch();
        let mem = SnapshotMemory::new();
        let ev = TraceEvent::entry(PID, Personality::X86, 6, [3, 0, 0, 0, 0, 0]);
        let e = d.decode_entry(&ev, &mem).unwrap();
        let ex = TraceEvent::exit(PID, Personality::X86, 6, [3, 0, 0, 0, 0, 0], 0xffff_fff7);
        let r = d.decode_exit(&ex, e.continuation, &mem).unwrap().unwrap();
        assert_eq!("close(3) = -1 EBADF (Bad file descriptor)", r.to_string());
    }

    /// Memory that blows up on any access, standing in for a decoder bug.
    struct ExplodingMemory;

    impl MemoryAccess for ExplodingMemory {
        fn read_bytes_fallible(
            &self,
            _pid: pid_t,
            _addr: RemotePtr<Void>,
            _buf: &mut [u8],
        ) -> Result<usize, MemoryFault> {
            panic!("read from exploding memory");
        }

        fn write_bytes(&self, _pid: pid_t, _addr: RemotePtr<Void>, _buf: &[u8]) -> Result<(), MemoryFault> {
            panic!("write to exploding memory");
        }
    }

    #[test]
    fn panicking_entry_decoder_falls_back_to_raw_record() {
        let d = dispatch();
        let args = [0x1000, 0, 0, 0, 0, 0];
        let e = d.decode_entry(&entry(2, args), &ExplodingMemory).unwrap();
        assert_eq!(vec!["0x1000", "0", "0"], e.record.args);
        let r = d.decode_exit(&exit(2, args, 5), e.continuation, &ExplodingMemory).unwrap().unwrap();
        assert!(r.to_string().starts_with("open(0x1000, 0, 0) = 5"));
        assert_eq!(CallStatus::Success, r.status);
    }

    #[test]
    fn panicking_exit_decoder_keeps_entry_rendering() {
        let d = dispatch();
        let args = [3, 0x2000, 16, 0, 0, 0];
        let e = d.decode_entry(&entry(0, args), &ExplodingMemory).unwrap();
        let r = d.decode_exit(&exit(0, args, 2), e.continuation, &ExplodingMemory).unwrap().unwrap();
        assert_eq!("read(3, 0x2000, 16) = 2", r.to_string());
        assert_eq!(CallStatus::Success, r.status);

        // The dispatcher is still usable afterwards.
        let mem = SnapshotMemory::new();
        mem.add_region(PID, 0x2000, b"ok".to_vec());
        let r = run(&d, &mem, 0, args, 2).unwrap();
        assert_eq!("read(3, \"ok\", 16) = 2", r.to_string());
    }
}
