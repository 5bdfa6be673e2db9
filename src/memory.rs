//! Access to a tracee's address space. Every call may fault; a fault is an
//! ordinary `Err`, never a panic.

use crate::{
    kernel_abi::Personality,
    log::LogLevel::LogDebug,
    remote_ptr::{RemotePtr, Void},
    scoped_fd::ScopedFd,
};
use libc::pid_t;
use memchr::memchr;
use nix::{
    fcntl::OFlag,
    sys::uio::{pread, pwrite},
};
use std::{
    collections::{BTreeMap, HashMap},
    error::Error,
    fmt::{self, Display, Formatter},
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

/// A failed read or write of `len` bytes at `addr` in the tracee.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MemoryFault {
    pub addr: usize,
    pub len: usize,
}

impl MemoryFault {
    pub fn new(addr: RemotePtr<Void>, len: usize) -> MemoryFault {
        MemoryFault {
            addr: addr.as_usize(),
            len,
        }
    }
}

impl Display for MemoryFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Could not access {} bytes at {:#x}", self.len, self.addr)
    }
}

impl Error for MemoryFault {}

pub trait MemoryAccess {
    /// Read into `buf`. The number of bytes read can be less than desired:
    /// - Returns `Err` if no bytes could be read at all.
    /// - Returns `Ok(n)` if `n` bytes could be read; `n` may be short.
    fn read_bytes_fallible(
        &self,
        pid: pid_t,
        addr: RemotePtr<Void>,
        buf: &mut [u8],
    ) -> Result<usize, MemoryFault>;

    /// Write all of `buf` or fail.
    fn write_bytes(&self, pid: pid_t, addr: RemotePtr<Void>, buf: &[u8])
        -> Result<(), MemoryFault>;

    /// Fill all of `buf` or fail.
    fn read_bytes(
        &self,
        pid: pid_t,
        addr: RemotePtr<Void>,
        buf: &mut [u8],
    ) -> Result<(), MemoryFault> {
        let mut all_read = 0;
        while all_read < buf.len() {
            let at = addr
                .checked_byte_add(all_read)
                .ok_or_else(|| MemoryFault::new(addr, buf.len()))?;
            match self.read_bytes_fallible(pid, at, &mut buf[all_read..]) {
                Ok(0) | Err(_) => return Err(MemoryFault::new(at, buf.len() - all_read)),
                Ok(nread) => all_read += nread,
            }
        }
        Ok(())
    }

    fn read_vec(&self, pid: pid_t, addr: RemotePtr<Void>, len: usize) -> Result<Vec<u8>, MemoryFault> {
        let mut buf = vec![0u8; len];
        self.read_bytes(pid, addr, &mut buf)?;
        Ok(buf)
    }

    /// Read a little-endian unsigned integer of `size` (1..=8) bytes.
    fn read_uint(&self, pid: pid_t, addr: RemotePtr<Void>, size: usize) -> Result<u64, MemoryFault> {
        debug_assert!(size >= 1 && size <= 8);
        let mut buf = [0u8; 8];
        self.read_bytes(pid, addr, &mut buf[..size])?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read a pointer-sized word for `personality`.
    fn read_pointer(
        &self,
        pid: pid_t,
        personality: Personality,
        addr: RemotePtr<Void>,
    ) -> Result<RemotePtr<Void>, MemoryFault> {
        let word = self.read_uint(pid, addr, personality.pointer_size())?;
        Ok(RemotePtr::from_word(personality, word))
    }

    /// Read a NUL terminated string, looking at no more than `max_probe`
    /// bytes. Returns the bytes without the terminator and whether the probe
    /// limit was hit before a NUL was found.
    ///
    /// Only `[addr, end_of_page)` is guaranteed mapped, so the string is read
    /// one page at a time and we stop at the first NUL.
    fn read_c_str_bounded(
        &self,
        pid: pid_t,
        addr: RemotePtr<u8>,
        max_probe: usize,
    ) -> Result<(Vec<u8>, bool), MemoryFault> {
        let mut s: Vec<u8> = Vec::new();
        let mut p = RemotePtr::<Void>::cast(addr);
        while s.len() < max_probe {
            let nbytes = p.bytes_to_page_end().min(max_probe - s.len());
            let mut buf = vec![0u8; nbytes];
            let nread = self.read_bytes_fallible(pid, p, &mut buf)?;
            if nread == 0 {
                return Err(MemoryFault::new(p, nbytes));
            }
            if let Some(nul) = memchr(0, &buf[..nread]) {
                s.extend_from_slice(&buf[..nul]);
                return Ok((s, false));
            }
            s.extend_from_slice(&buf[..nread]);
            p = p
                .checked_byte_add(nread)
                .ok_or_else(|| MemoryFault::new(p, nbytes))?;
        }
        Ok((s, true))
    }
}

/// Memory captured ahead of time: per-pid regions of bytes. Reads outside a
/// region fault. Used when replaying a recorded trace.
#[derive(Default)]
pub struct SnapshotMemory {
    regions: RwLock<HashMap<pid_t, BTreeMap<usize, Vec<u8>>>>,
}

impl SnapshotMemory {
    pub fn new() -> SnapshotMemory {
        SnapshotMemory::default()
    }

    /// Map `bytes` at `addr` for `pid`. Regions of one pid must not overlap.
    pub fn add_region(&self, pid: pid_t, addr: usize, bytes: Vec<u8>) {
        let mut regions = match self.regions.write() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        regions.entry(pid).or_default().insert(addr, bytes);
    }

    /// Convenience for tests: a NUL terminated string at `addr`.
    pub fn add_c_str(&self, pid: pid_t, addr: usize, s: &str) {
        let mut bytes = s.as_bytes().to_vec();
        bytes.push(0);
        self.add_region(pid, addr, bytes);
    }

    /// Run `f` on the bytes from `addr` to the end of the region containing it.
    fn with_region<R>(
        &self,
        pid: pid_t,
        addr: usize,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Option<R> {
        let regions = match self.regions.read() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        let (start, bytes) = regions.get(&pid)?.range(..=addr).next_back()?;
        let offset = addr - start;
        if offset < bytes.len() {
            Some(f(&bytes[offset..]))
        } else {
            None
        }
    }
}

impl MemoryAccess for SnapshotMemory {
    fn read_bytes_fallible(
        &self,
        pid: pid_t,
        addr: RemotePtr<Void>,
        buf: &mut [u8],
    ) -> Result<usize, MemoryFault> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut all_read = 0;
        while all_read < buf.len() {
            let at = addr.as_usize().wrapping_add(all_read);
            let copied = self.with_region(pid, at, |avail| {
                let n = avail.len().min(buf.len() - all_read);
                buf[all_read..all_read + n].copy_from_slice(&avail[..n]);
                n
            });
            match copied {
                Some(n) => all_read += n,
                None => break,
            }
        }
        if all_read == 0 {
            Err(MemoryFault::new(addr, buf.len()))
        } else {
            Ok(all_read)
        }
    }

    fn write_bytes(
        &self,
        pid: pid_t,
        addr: RemotePtr<Void>,
        buf: &[u8],
    ) -> Result<(), MemoryFault> {
        let mut regions = match self.regions.write() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        let fault = MemoryFault::new(addr, buf.len());
        let (start, bytes) = regions
            .get_mut(&pid)
            .and_then(|r| r.range_mut(..=addr.as_usize()).next_back())
            .ok_or(fault)?;
        let offset = addr.as_usize() - *start;
        if offset + buf.len() > bytes.len() {
            return Err(fault);
        }
        bytes[offset..offset + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}

/// Live access through `/proc/<pid>/mem`. One cached descriptor per pid.
/// The cache lock only covers the lookup; reads and writes run on a shared
/// handle so tracees do not wait on each other.
#[derive(Default)]
pub struct ProcMemAccess {
    mem_fds: Mutex<HashMap<pid_t, Arc<ScopedFd>>>,
}

impl ProcMemAccess {
    pub fn new() -> ProcMemAccess {
        ProcMemAccess::default()
    }

    fn lock_fds(&self) -> MutexGuard<'_, HashMap<pid_t, Arc<ScopedFd>>> {
        match self.mem_fds.lock() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn open_mem_fd(pid: pid_t) -> Option<ScopedFd> {
        let path = format!("/proc/{}/mem", pid);
        match ScopedFd::open_path(path.as_str(), OFlag::O_RDWR) {
            Ok(fd) => Some(fd),
            Err(_) => match ScopedFd::open_path(path.as_str(), OFlag::O_RDONLY) {
                Ok(fd) => Some(fd),
                Err(e) => {
                    log!(LogDebug, "Can't open {}: {}", path, e);
                    None
                }
            },
        }
    }

    /// Drop the cached descriptor. The controller calls this after an exec
    /// or when the tracee is gone. A read already in flight keeps its handle.
    pub fn forget(&self, pid: pid_t) {
        self.lock_fds().remove(&pid);
    }

    fn mem_fd(&self, pid: pid_t, reopen: bool) -> Option<Arc<ScopedFd>> {
        let mut fds = self.lock_fds();
        if reopen {
            fds.remove(&pid);
        }
        if let Some(fd) = fds.get(&pid) {
            return Some(fd.clone());
        }
        let fd = Arc::new(ProcMemAccess::open_mem_fd(pid)?);
        fds.insert(pid, fd.clone());
        Some(fd)
    }
}

impl MemoryAccess for ProcMemAccess {
    fn read_bytes_fallible(
        &self,
        pid: pid_t,
        addr: RemotePtr<Void>,
        buf: &mut [u8],
    ) -> Result<usize, MemoryFault> {
        if buf.is_empty() {
            return Ok(0);
        }
        let fault = MemoryFault::new(addr, buf.len());
        let mut all_read = 0;
        let mut reopened = false;
        let mut fd = self.mem_fd(pid, false).ok_or(fault)?;
        while all_read < buf.len() {
            let offset = (addr.as_usize() + all_read) as libc::off_t;
            match pread(fd.as_raw(), &mut buf[all_read..], offset) {
                // A descriptor opened early in an exec can refer to the old
                // address space and reads 0 bytes. Reopen once and retry.
                Ok(0) if all_read == 0 && !reopened => {
                    reopened = true;
                    fd = self.mem_fd(pid, true).ok_or(fault)?;
                }
                Ok(0) | Err(_) => break,
                Ok(nread) => all_read += nread,
            }
        }
        if all_read == 0 {
            Err(fault)
        } else {
            Ok(all_read)
        }
    }

    fn write_bytes(
        &self,
        pid: pid_t,
        addr: RemotePtr<Void>,
        buf: &[u8],
    ) -> Result<(), MemoryFault> {
        let fd = self
            .mem_fd(pid, false)
            .ok_or_else(|| MemoryFault::new(addr, buf.len()))?;
        let mut written = 0;
        while written < buf.len() {
            let offset = (addr.as_usize() + written) as libc::off_t;
            match pwrite(fd.as_raw(), &buf[written..], offset) {
                Ok(0) | Err(_) => {
                    let at = RemotePtr::new_from_val(addr.as_usize() + written);
                    return Err(MemoryFault::new(at, buf.len() - written));
                }
                Ok(n) => written += n,
            }
        }
        Ok(())
    }
}
