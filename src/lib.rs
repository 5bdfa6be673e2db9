//! Decoding of traced syscalls: per-personality syscall tables, two-phase
//! entry/exit decoders, classification flags and a per-process descriptor
//! tracker. Stopping and resuming tracees is left to the caller, which feeds
//! one `TraceEvent` per syscall stop.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate static_assertions;

#[macro_use]
pub mod log;
pub mod commands;
pub mod decoders;
pub mod dispatch;
pub mod event;
pub mod fd_tracker;
pub mod filter;
pub mod flags;
pub mod kernel_abi;
pub mod kernel_metadata;
pub mod kernel_supplement;
pub mod memory;
pub mod record;
pub mod registers;
pub mod remote_ptr;
pub mod scoped_fd;
pub mod syscall_tables;
pub mod sysent;
pub mod tracee;
pub mod xlat;

pub use crate::{
    dispatch::{DecodeContinuation, DecodeError, EntryDecode, SyscallDispatch},
    event::{SyscallPhase, TraceEvent},
    fd_tracker::{DescriptorTracker, FdHint},
    flags::Flags,
    kernel_abi::Personality,
    memory::{MemoryAccess, MemoryFault, ProcMemAccess, SnapshotMemory},
    record::{CallStatus, DecodedRecord},
    tracee::TraceeDecoder,
};
