use crate::{
    dispatch::{DecodeContinuation, DecodeError, SyscallDispatch},
    event::{SyscallPhase, TraceEvent},
    kernel_abi::Personality,
    log::LogLevel::{LogDebug, LogInfo, LogWarn},
    memory::MemoryAccess,
    record::{CallStatus, DecodedRecord},
};
use libc::pid_t;

/// What one stop produced.
#[derive(Debug, Default)]
pub struct TraceeStep {
    /// Finished records in the order they happened. A record left unfinished
    /// by a lost exit stop comes first.
    pub records: Vec<DecodedRecord>,
    pub mismatch: Option<DecodeError>,
    /// A call in `records` replaced or remapped part of the address space, so
    /// anything cached about the tracee's mappings is stale.
    pub memory_map_changed: bool,
}

impl TraceeStep {
    fn push(&mut self, record: DecodedRecord) {
        self.memory_map_changed |= record.invalidates_memory_map();
        self.records.push(record);
    }
}

/// Decoding state of one traced thread: its current personality and the
/// call it is inside of, if any.
pub struct TraceeDecoder {
    pid: pid_t,
    personality: Personality,
    pending: Option<DecodeContinuation>,
}

impl TraceeDecoder {
    pub fn new(pid: pid_t, personality: Personality) -> TraceeDecoder {
        TraceeDecoder {
            pid,
            personality,
            pending: None,
        }
    }

    pub fn pid(&self) -> pid_t {
        self.pid
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn in_syscall(&self) -> bool {
        self.pending.is_some()
    }

    pub fn on_event(
        &mut self,
        dispatch: &SyscallDispatch,
        event: &TraceEvent,
        memory: &dyn MemoryAccess,
    ) -> Result<TraceeStep, DecodeError> {
        debug_assert_eq!(self.pid, event.pid);
        match event.phase {
            SyscallPhase::Entry => self.on_entry(dispatch, event, memory),
            SyscallPhase::Exit => self.on_exit_stop(dispatch, event, memory),
        }
    }

    fn on_entry(
        &mut self,
        dispatch: &SyscallDispatch,
        event: &TraceEvent,
        memory: &dyn MemoryAccess,
    ) -> Result<TraceeStep, DecodeError> {
        let mut step = TraceeStep::default();
        if let Some(stale) = self.pending.take() {
            log!(
                LogWarn,
                "{}: entry stop while {} is still pending",
                self.pid,
                stale.partial_record().name
            );
            step.records.push(stale.partial_record().clone());
            step.mismatch = Some(DecodeError::PhaseMismatch {
                pid: self.pid,
                expected: SyscallPhase::Exit,
            });
        }
        if event.personality != self.personality {
            log!(
                LogInfo,
                "{}: personality changed from {} to {}",
                self.pid,
                self.personality,
                event.personality
            );
            self.personality = event.personality;
        }
        let entry = dispatch.decode_entry(event, memory)?;
        if entry.suppress_exit_phase {
            step.push(entry.record);
        } else {
            self.pending = entry.continuation;
        }
        Ok(step)
    }

    fn on_exit_stop(
        &mut self,
        dispatch: &SyscallDispatch,
        event: &TraceEvent,
        memory: &dyn MemoryAccess,
    ) -> Result<TraceeStep, DecodeError> {
        let mut step = TraceeStep::default();
        let pending = self.pending.take();
        if pending.is_none() {
            step.mismatch = Some(DecodeError::PhaseMismatch {
                pid: self.pid,
                expected: SyscallPhase::Entry,
            });
        }
        let exec_record = pending.as_ref().map(|c| c.partial_record().clone());
        match dispatch.decode_exit(event, pending, memory)? {
            Some(record) => step.push(record),
            None => {
                // The old image is gone; what entry rendered is all there is.
                if let Some(mut record) = exec_record {
                    record.status = CallStatus::Success;
                    record.result = Some("0".into());
                    step.push(record);
                }
                step.memory_map_changed = true;
                if event.personality != self.personality {
                    log!(
                        LogInfo,
                        "{}: exec switched personality from {} to {}",
                        self.pid,
                        self.personality,
                        event.personality
                    );
                }
                self.personality = event.personality;
            }
        }
        Ok(step)
    }

    /// The tracee is gone. Returns the call it died in, if any, and drops
    /// everything tracked for it.
    pub fn on_tracee_exit(&mut self, dispatch: &SyscallDispatch) -> Option<DecodedRecord> {
        log!(LogDebug, "{}: tracee exited", self.pid);
        if let Some(tracker) = dispatch.tracker() {
            tracker.on_exit(self.pid);
        }
        self.pending.take().map(|c| c.partial_record().clone())
    }
}
