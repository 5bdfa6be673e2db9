//! Per-syscall decoders. Each decoder is an entry hook, which renders what is
//! known when the tracee stops on the way in, and an exit hook, which fills in
//! output arguments and picks how the return value is printed.
//!
//! Decoders never fail: an unreadable pointer is rendered as its address plus
//! a fault marker and decoding continues with the next argument.

use crate::{
    fd_tracker::{DescriptorTracker, FdEffect, FdHint},
    flags::Flags,
    kernel_abi::Personality,
    kernel_supplement::AT_FDCWD,
    log::LogLevel::LogDebug,
    memory::MemoryAccess,
    record::DecodedRecord,
    remote_ptr::{RemotePtr, Void},
    sysent::DecoderKind,
    xlat::{self, Xlat},
};
use libc::pid_t;

mod desc;
mod file;
mod memory;
mod net;
mod process;
mod time;

/// How a successful return value is printed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResultFormat {
    Decimal,
    Unsigned,
    Hex,
    Octal,
    /// Decimal, annotated with the tracked path when fds are decoded.
    Fd,
    /// Decimal followed by this text as a comment, e.g. a calendar date.
    AuxString(String),
}

/// Decoder private state carried from entry to exit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EntryState {
    Nothing,
    Hint(FdHint),
    Word(u64),
}

pub struct EntryOutput {
    pub args: Vec<String>,
    pub state: EntryState,
    /// The call does not return to this image on any path.
    pub no_return: bool,
}

impl EntryOutput {
    pub fn new(args: Vec<String>) -> EntryOutput {
        EntryOutput {
            args,
            state: EntryState::Nothing,
            no_return: false,
        }
    }

    pub fn with_state(mut self, state: EntryState) -> EntryOutput {
        self.state = state;
        self
    }

    pub fn no_return(mut self) -> EntryOutput {
        self.no_return = true;
        self
    }
}

pub struct ExitOutput {
    pub format: ResultFormat,
    pub effects: Vec<FdEffect>,
}

impl ExitOutput {
    pub fn new(format: ResultFormat) -> ExitOutput {
        ExitOutput {
            format,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: FdEffect) -> ExitOutput {
        self.effects.push(effect);
        self
    }
}

/// The kernel's answer as seen by an exit hook.
#[derive(Copy, Clone, Debug)]
pub struct Outcome {
    /// Return register, truncated to the personality's word.
    pub raw: u64,
    pub success: bool,
}

impl Outcome {
    pub fn fd(&self) -> i32 {
        self.raw as u32 as i32
    }
}

/// Everything a hook may look at. Arguments past the descriptor's count
/// read as zero.
pub struct DecodeContext<'a> {
    pub pid: pid_t,
    pub personality: Personality,
    pub flags: &'a Flags,
    memory: &'a dyn MemoryAccess,
    tracker: Option<&'a DescriptorTracker>,
    args: [u64; 6],
    nargs: usize,
    faults: Vec<usize>,
}

impl<'a> DecodeContext<'a> {
    pub fn new(
        pid: pid_t,
        personality: Personality,
        flags: &'a Flags,
        memory: &'a dyn MemoryAccess,
        tracker: Option<&'a DescriptorTracker>,
        raw_args: &[u64; 6],
        nargs: usize,
    ) -> DecodeContext<'a> {
        let mut args = [0u64; 6];
        for (slot, raw) in args.iter_mut().zip(raw_args.iter()).take(nargs) {
            *slot = personality.truncate_word(*raw);
        }
        DecodeContext {
            pid,
            personality,
            flags,
            memory,
            tracker,
            args,
            nargs: nargs.min(6),
            faults: Vec::new(),
        }
    }

    pub fn nargs(&self) -> usize {
        self.nargs
    }

    pub fn memory(&self) -> &dyn MemoryAccess {
        self.memory
    }

    pub fn into_faults(self) -> Vec<usize> {
        self.faults
    }

    pub fn arg(&self, index: usize) -> u64 {
        if index < self.nargs {
            self.args[index]
        } else {
            0
        }
    }

    /// C `int` arguments: only the low 32 bits are significant.
    pub fn arg_int(&self, index: usize) -> i32 {
        self.arg(index) as u32 as i32
    }

    pub fn arg_uint(&self, index: usize) -> u32 {
        self.arg(index) as u32
    }

    pub fn arg_signed(&self, index: usize) -> i64 {
        self.personality.signed_word(self.arg(index))
    }

    pub fn arg_ptr(&self, index: usize) -> RemotePtr<Void> {
        RemotePtr::from_word(self.personality, self.arg(index))
    }

    /// Argument words from `from` on, in hex.
    pub fn raw_args_from(&self, from: usize) -> Vec<String> {
        (from..self.nargs).map(|i| xlat::hex(self.arg(i))).collect()
    }

    /// Record that argument `index` referred to unreadable memory and return
    /// the text that stands in for it.
    pub fn fault(&mut self, index: usize, addr: RemotePtr<Void>) -> String {
        log!(LogDebug, "{}: fault reading argument {} at {}", self.pid, index, addr);
        if !self.faults.contains(&index) {
            self.faults.push(index);
        }
        format!("{} /* fault */", addr)
    }

    pub fn print_fd(&self, fd: i32) -> String {
        if self.flags.decode_fds && fd >= 0 {
            if let Some(hint) = self.tracker.and_then(|t| t.lookup(self.pid, fd)) {
                return format!("{}<{}>", fd, hint);
            }
        }
        fd.to_string()
    }

    pub fn fd_arg(&self, index: usize) -> String {
        self.print_fd(self.arg_int(index))
    }

    /// A directory fd of the *at family.
    pub fn dirfd_arg(&self, index: usize) -> String {
        let fd = self.arg_int(index);
        if fd == AT_FDCWD {
            "AT_FDCWD".into()
        } else {
            self.print_fd(fd)
        }
    }

    pub fn ptr_arg(&self, index: usize) -> String {
        let p = self.arg_ptr(index);
        if p.is_null() {
            "NULL".into()
        } else {
            p.to_string()
        }
    }

    pub fn hex_arg(&self, index: usize) -> String {
        xlat::hex(self.arg(index))
    }

    /// File modes, C `%#03o` style.
    pub fn octal(&self, value: u64) -> String {
        format!("0{:02o}", value)
    }

    pub fn print_flags(&self, value: u64, xlat: &Xlat) -> String {
        xlat::print_flags(value, xlat, self.flags.xlat_style)
    }

    pub fn print_xval(&self, value: u64, xlat: &Xlat, unknown: &str) -> String {
        xlat::print_xval(value, xlat, self.flags.xlat_style, Some(unknown))
    }

    /// A NUL terminated string at `addr`, probing at most `max_probe` bytes.
    /// Returns the rendering and the bytes when the whole string was read.
    pub fn c_str_at(
        &mut self,
        index: usize,
        addr: RemotePtr<Void>,
        max_probe: usize,
    ) -> (String, Option<Vec<u8>>) {
        if addr.is_null() {
            return ("NULL".into(), None);
        }
        match self
            .memory
            .read_c_str_bounded(self.pid, RemotePtr::cast(addr), max_probe)
        {
            Ok((bytes, truncated)) => {
                let text = xlat::quote_string(&bytes, truncated);
                (text, if truncated { None } else { Some(bytes) })
            }
            Err(_) => (self.fault(index, addr), None),
        }
    }

    /// Path argument, bounded by the path probe. Also returns the path when
    /// it was read completely.
    pub fn path_with_value(&mut self, index: usize) -> (String, Option<String>) {
        let addr = self.arg_ptr(index);
        let max = self.flags.max_path_probe;
        let (text, bytes) = self.c_str_at(index, addr, max);
        (text, bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    pub fn path_arg(&mut self, index: usize) -> String {
        self.path_with_value(index).0
    }

    /// A non-path string, printed up to the string limit.
    pub fn string_at(&mut self, index: usize, addr: RemotePtr<Void>) -> String {
        if addr.is_null() {
            return "NULL".into();
        }
        let limit = self.flags.string_limit;
        match self
            .memory
            .read_c_str_bounded(self.pid, RemotePtr::cast(addr), limit + 1)
        {
            Ok((bytes, _)) => xlat::print_bounded(&bytes, limit),
            Err(_) => self.fault(index, addr),
        }
    }

    /// `len` bytes of data at argument `index`, printed up to the string limit.
    pub fn buffer_arg(&mut self, index: usize, len: usize) -> String {
        let addr = self.arg_ptr(index);
        if addr.is_null() {
            return "NULL".into();
        }
        let shown = len.min(self.flags.string_limit);
        let mut buf = vec![0u8; shown];
        match self.memory.read_bytes(self.pid, addr, &mut buf) {
            Ok(()) => xlat::quote_string(&buf, len > shown),
            Err(_) => self.fault(index, addr),
        }
    }

    /// An integer of `size` bytes at `addr`.
    pub fn read_uint_at(
        &mut self,
        index: usize,
        addr: RemotePtr<Void>,
        size: usize,
    ) -> Result<u64, String> {
        match self.memory.read_uint(self.pid, addr, size) {
            Ok(v) => Ok(v),
            Err(_) => Err(self.fault(index, addr)),
        }
    }

    /// `[value]` for an in/out integer pointer, `NULL` or a fault marker.
    pub fn int_ptr_arg(&mut self, index: usize, size: usize, signed: bool) -> String {
        let addr = self.arg_ptr(index);
        if addr.is_null() {
            return "NULL".into();
        }
        match self.read_uint_at(index, addr, size) {
            Ok(v) if signed => format!("[{}]", sign_extend(v, size)),
            Ok(v) => format!("[{}]", v),
            Err(marker) => marker,
        }
    }
}

pub(crate) fn sign_extend(value: u64, size: usize) -> i64 {
    match size {
        1 => value as u8 as i8 as i64,
        2 => value as u16 as i16 as i64,
        4 => value as u32 as i32 as i64,
        _ => value as i64,
    }
}

/// printargs: every argument word in hex.
fn generic_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(ctx.raw_args_from(0))
}

pub fn decode_entry(kind: DecoderKind, ctx: &mut DecodeContext) -> EntryOutput {
    match kind {
        DecoderKind::Generic => generic_entry(ctx),
        DecoderKind::Fd => desc::fd_entry(ctx),
        DecoderKind::Read => desc::read_entry(ctx),
        DecoderKind::Write => desc::write_entry(ctx),
        DecoderKind::Close => desc::close_entry(ctx),
        DecoderKind::CloseRange => desc::close_range_entry(ctx),
        DecoderKind::Dup => desc::dup_entry(ctx),
        DecoderKind::Dup2 => desc::dup2_entry(ctx),
        DecoderKind::Dup3 => desc::dup3_entry(ctx),
        DecoderKind::Fcntl => desc::fcntl_entry(ctx),
        DecoderKind::Lseek => desc::lseek_entry(ctx),
        DecoderKind::Flock => desc::flock_entry(ctx),
        DecoderKind::Ftruncate => desc::ftruncate_entry(ctx),
        DecoderKind::Splice => desc::splice_entry(ctx),
        DecoderKind::Pipe => desc::pipe_entry(ctx),
        DecoderKind::Pipe2 => desc::pipe2_entry(ctx),
        DecoderKind::Fstat => desc::fstat_entry(ctx),
        DecoderKind::PathArgs => file::path_args_entry(ctx),
        DecoderKind::PathMode => file::path_mode_entry(ctx),
        DecoderKind::PathPath => file::path_path_entry(ctx),
        DecoderKind::Open => file::open_entry(ctx),
        DecoderKind::Creat => file::creat_entry(ctx),
        DecoderKind::OpenAt => file::openat_entry(ctx),
        DecoderKind::Truncate => file::truncate_entry(ctx),
        DecoderKind::MemfdCreate => file::memfd_create_entry(ctx),
        DecoderKind::Unlinkat => file::unlinkat_entry(ctx),
        DecoderKind::Access => file::access_entry(ctx),
        DecoderKind::Stat => file::stat_entry(ctx),
        DecoderKind::Umask => file::umask_entry(ctx),
        DecoderKind::Socket => net::socket_entry(ctx),
        DecoderKind::Accept => net::accept_entry(ctx),
        DecoderKind::Accept4 => net::accept4_entry(ctx),
        DecoderKind::Mmap(semantics) => memory::mmap_entry(ctx, semantics),
        DecoderKind::Munmap => memory::munmap_entry(ctx),
        DecoderKind::Mprotect => memory::mprotect_entry(ctx),
        DecoderKind::Brk => memory::brk_entry(ctx),
        DecoderKind::Execve => process::execve_entry(ctx),
        DecoderKind::Execveat => process::execveat_entry(ctx),
        DecoderKind::Exit => process::exit_entry(ctx),
        DecoderKind::Kill => process::kill_entry(ctx),
        DecoderKind::Tgkill => process::tgkill_entry(ctx),
        DecoderKind::CloneTask => process::clone_entry(ctx),
        DecoderKind::Fork => process::fork_entry(ctx),
        DecoderKind::Time => time::time_entry(ctx),
        DecoderKind::ClockGettime(layout) => time::clock_gettime_entry(ctx, layout),
    }
}

/// `state` is `Nothing` and `record` has no arguments when the entry half of
/// the call was never seen.
pub fn decode_exit(
    kind: DecoderKind,
    ctx: &mut DecodeContext,
    record: &mut DecodedRecord,
    state: &EntryState,
    outcome: Outcome,
) -> ExitOutput {
    match kind {
        DecoderKind::Read => desc::read_exit(ctx, record, outcome),
        DecoderKind::Close => desc::close_exit(ctx, outcome),
        DecoderKind::CloseRange => desc::close_range_exit(ctx, outcome),
        DecoderKind::Dup | DecoderKind::Dup2 | DecoderKind::Dup3 => desc::dup_exit(ctx, outcome),
        DecoderKind::Fcntl => desc::fcntl_exit(ctx, outcome),
        DecoderKind::Pipe | DecoderKind::Pipe2 => desc::pipe_exit(ctx, record, outcome),
        DecoderKind::Open
        | DecoderKind::Creat
        | DecoderKind::OpenAt
        | DecoderKind::MemfdCreate => file::open_exit(state, outcome),
        DecoderKind::Umask => ExitOutput::new(ResultFormat::Octal),
        DecoderKind::Socket => net::socket_exit(state, outcome),
        DecoderKind::Accept | DecoderKind::Accept4 => net::accept_exit(ctx, record, state, outcome),
        DecoderKind::Mmap(_) | DecoderKind::Brk => ExitOutput::new(ResultFormat::Hex),
        DecoderKind::CloneTask | DecoderKind::Fork => process::fork_exit(ctx, state, outcome),
        DecoderKind::Time => time::time_exit(ctx, record, outcome),
        DecoderKind::ClockGettime(layout) => time::clock_gettime_exit(ctx, record, layout, outcome),
        DecoderKind::Lseek => ExitOutput::new(ResultFormat::Unsigned),
        DecoderKind::Generic
        | DecoderKind::Fd
        | DecoderKind::Write
        | DecoderKind::Flock
        | DecoderKind::Ftruncate
        | DecoderKind::Splice
        | DecoderKind::Fstat
        | DecoderKind::PathArgs
        | DecoderKind::PathMode
        | DecoderKind::PathPath
        | DecoderKind::Truncate
        | DecoderKind::Unlinkat
        | DecoderKind::Access
        | DecoderKind::Stat
        | DecoderKind::Munmap
        | DecoderKind::Mprotect
        | DecoderKind::Execve
        | DecoderKind::Execveat
        | DecoderKind::Exit
        | DecoderKind::Kill
        | DecoderKind::Tgkill => ExitOutput::new(ResultFormat::Decimal),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::memory::SnapshotMemory;

    pub const PID: pid_t = 42;

    pub struct Harness {
        pub flags: Flags,
        pub memory: SnapshotMemory,
        pub tracker: DescriptorTracker,
        pub personality: Personality,
    }

    impl Harness {
        pub fn new() -> Harness {
            Harness {
                flags: Flags::default(),
                memory: SnapshotMemory::new(),
                tracker: DescriptorTracker::new(),
                personality: Personality::X64,
            }
        }

        pub fn ctx(&self, args: [u64; 6], nargs: usize) -> DecodeContext<'_> {
            DecodeContext::new(
                PID,
                self.personality,
                &self.flags,
                &self.memory,
                Some(&self.tracker),
                &args,
                nargs,
            )
        }

        /// Entry arguments of `kind` joined the way a record prints them.
        pub fn entry(&self, kind: DecoderKind, args: [u64; 6], nargs: usize) -> String {
            let mut ctx = self.ctx(args, nargs);
            decode_entry(kind, &mut ctx).args.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{test_support::*, *};

    #[test]
    fn arguments_past_count_read_as_zero() {
        let h = Harness::new();
        let ctx = h.ctx([1, 2, 3, 4, 5, 6], 2);
        assert_eq!(2, ctx.arg(1));
        assert_eq!(0, ctx.arg(2));
        assert_eq!(vec!["0x1", "0x2"], ctx.raw_args_from(0));
    }

    #[test]
    fn x86_words_are_truncated() {
        let mut h = Harness::new();
        h.personality = Personality::X86;
        let ctx = h.ctx([0xdead_beef_ffff_ffff, 0, 0, 0, 0, 0], 1);
        assert_eq!(0xffff_ffff, ctx.arg(0));
        assert_eq!(-1, ctx.arg_signed(0));
    }

    #[test]
    fn path_fault_is_recorded() {
        let h = Harness::new();
        h.memory.add_c_str(PID, 0x1000, "/etc/passwd");
        let mut ctx = h.ctx([0x1000, 0x9000, 0, 0, 0, 0], 2);
        assert_eq!("\"/etc/passwd\"", ctx.path_arg(0));
        assert_eq!("0x9000 /* fault */", ctx.path_arg(1));
        assert_eq!(vec![1], ctx.into_faults());
    }

    #[test]
    fn fd_annotation() {
        let mut h = Harness::new();
        h.flags.decode_fds = true;
        let open = crate::syscall_tables::lookup(Personality::X64, 2).unwrap();
        h.tracker
            .on_success(PID, open, 3, FdHint::Path("/tmp/x".into()));
        let ctx = h.ctx([3, (-100i64) as u64, 0, 0, 0, 0], 2);
        assert_eq!("3</tmp/x>", ctx.fd_arg(0));
        assert_eq!("AT_FDCWD", ctx.dirfd_arg(1));
        assert_eq!("-100", ctx.fd_arg(1));
    }

    #[test]
    fn octal_modes() {
        let h = Harness::new();
        let ctx = h.ctx([0; 6], 0);
        assert_eq!("0644", ctx.octal(0o644));
        assert_eq!("000", ctx.octal(0));
        assert_eq!("022", ctx.octal(0o22));
        assert_eq!("0100755", ctx.octal(0o100755));
    }

    #[test]
    fn bounded_buffers() {
        let mut h = Harness::new();
        h.flags.string_limit = 4;
        h.memory.add_region(PID, 0x2000, b"abcdefgh".to_vec());
        let mut ctx = h.ctx([0x2000, 0, 0, 0, 0, 0], 1);
        assert_eq!("\"abcd\"...", ctx.buffer_arg(0, 8));
        assert_eq!("\"abc\"", ctx.buffer_arg(0, 3));
        assert_eq!("\"abcd\"...", ctx.string_at(0, RemotePtr::new_from_val(0x2000)));
    }
}
