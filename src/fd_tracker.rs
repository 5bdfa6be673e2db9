//! Remembers where each tracee's file descriptors came from so later decodes
//! can annotate them (`3</etc/passwd>`).

use crate::{
    log::LogLevel::LogDebug,
    sysent::{SyscallDescriptor, SyscallFlags},
};
use libc::pid_t;
use serde::Serialize;
use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result},
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

/// What a descriptor refers to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum FdHint {
    Path(String),
    Memfd(String),
    Socket(String),
    Pipe,
    Anon(String),
}

impl Display for FdHint {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            FdHint::Path(p) => write!(f, "{}", p),
            FdHint::Memfd(name) => write!(f, "/memfd:{}", name),
            FdHint::Socket(family) => write!(f, "socket:{}", family),
            FdHint::Pipe => write!(f, "pipe"),
            FdHint::Anon(kind) => write!(f, "anon_inode:[{}]", kind),
        }
    }
}

/// Descriptor bookkeeping a decoder reports for a successful call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FdEffect {
    /// `fd` is now open. With no hint any previous mapping is dropped.
    Opened { fd: i32, hint: Option<FdHint> },
    Closed(i32),
    /// `new` now refers to whatever `old` did.
    Duplicated { old: i32, new: i32 },
    CloseRange { first: u32, last: u32 },
    /// A new process got a copy of the caller's descriptor table.
    InheritFds(pid_t),
    /// A new task shares the caller's descriptor table (CLONE_FILES).
    ShareFds(pid_t),
}

type FdMap = HashMap<i32, FdHint>;

/// Per-process fd -> hint maps. The outer lock is only taken for writing
/// when a process appears or goes away; each process's map has its own lock.
#[derive(Default)]
pub struct DescriptorTracker {
    processes: RwLock<HashMap<pid_t, Arc<Mutex<FdMap>>>>,
}

fn lock_map(map: &Mutex<FdMap>) -> MutexGuard<'_, FdMap> {
    match map.lock() {
        Ok(lock) => lock,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl DescriptorTracker {
    pub fn new() -> DescriptorTracker {
        DescriptorTracker::default()
    }

    fn existing(&self, pid: pid_t) -> Option<Arc<Mutex<FdMap>>> {
        let processes = match self.processes.read() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        processes.get(&pid).cloned()
    }

    fn process(&self, pid: pid_t) -> Arc<Mutex<FdMap>> {
        if let Some(map) = self.existing(pid) {
            return map;
        }
        let mut processes = match self.processes.write() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        processes.entry(pid).or_default().clone()
    }

    /// Record that `fd` was produced by a successful call to `descriptor`.
    /// Calls that are not descriptor or network related are ignored.
    pub fn on_success(&self, pid: pid_t, descriptor: &SyscallDescriptor, fd: i32, hint: FdHint) {
        if fd < 0
            || !descriptor
                .flags
                .intersects(SyscallFlags::TRACE_DESC | SyscallFlags::TRACE_NETWORK)
        {
            return;
        }
        log!(LogDebug, "{}: fd {} -> {} ({})", pid, fd, hint, descriptor.name);
        lock_map(&self.process(pid)).insert(fd, hint);
    }

    pub fn on_close(&self, pid: pid_t, fd: i32) {
        if let Some(map) = self.existing(pid) {
            lock_map(&map).remove(&fd);
        }
    }

    pub fn on_dup(&self, pid: pid_t, old_fd: i32, new_fd: i32) {
        if old_fd == new_fd {
            return;
        }
        let map = self.process(pid);
        let mut fds = lock_map(&map);
        match fds.get(&old_fd).cloned() {
            Some(hint) => {
                fds.insert(new_fd, hint);
            }
            None => {
                fds.remove(&new_fd);
            }
        }
    }

    /// Inclusive range, as close_range(2) takes it.
    pub fn on_close_range(&self, pid: pid_t, first: u32, last: u32) {
        if let Some(map) = self.existing(pid) {
            lock_map(&map).retain(|fd, _| {
                let fd = *fd as u32;
                fd < first || fd > last
            });
        }
    }

    pub fn on_fork(&self, parent: pid_t, child: pid_t) {
        let copy = match self.existing(parent) {
            Some(map) => lock_map(&map).clone(),
            None => FdMap::new(),
        };
        let mut processes = match self.processes.write() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        processes.insert(child, Arc::new(Mutex::new(copy)));
    }

    /// `child` sees every later change `parent` makes, and vice versa.
    pub fn on_share(&self, parent: pid_t, child: pid_t) {
        let shared = self.process(parent);
        let mut processes = match self.processes.write() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        processes.insert(child, shared);
    }

    /// The tracee is gone. Its pid may be reused by an unrelated process.
    pub fn on_exit(&self, pid: pid_t) {
        let mut processes = match self.processes.write() {
            Ok(lock) => lock,
            Err(poisoned) => poisoned.into_inner(),
        };
        processes.remove(&pid);
    }

    pub fn lookup(&self, pid: pid_t, fd: i32) -> Option<FdHint> {
        let map = self.existing(pid)?;
        let fds = lock_map(&map);
        fds.get(&fd).cloned()
    }

    pub fn tracked_count(&self, pid: pid_t) -> usize {
        self.existing(pid).map_or(0, |map| lock_map(&map).len())
    }

    /// Apply what a successful call to `descriptor` did.
    pub fn apply(&self, pid: pid_t, descriptor: &SyscallDescriptor, effects: &[FdEffect]) {
        for effect in effects {
            match effect {
                FdEffect::Opened { fd, hint: Some(hint) } => {
                    self.on_success(pid, descriptor, *fd, hint.clone())
                }
                FdEffect::Opened { fd, hint: None } => self.on_close(pid, *fd),
                FdEffect::Closed(fd) => self.on_close(pid, *fd),
                FdEffect::Duplicated { old, new } => self.on_dup(pid, *old, *new),
                FdEffect::CloseRange { first, last } => self.on_close_range(pid, *first, *last),
                FdEffect::InheritFds(child) => self.on_fork(pid, *child),
                FdEffect::ShareFds(child) => self.on_share(pid, *child),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysent::{shorthand::*, sysent, DecoderKind};

    fn open_like() -> SyscallDescriptor {
        sysent(3, TD | TF, DecoderKind::Open, "open")
    }

    fn path(p: &str) -> FdHint {
        FdHint::Path(p.into())
    }

    #[test]
    fn open_then_close() {
        let t = DescriptorTracker::new();
        t.on_success(1, &open_like(), 5, path("/tmp/x"));
        assert_eq!(Some(path("/tmp/x")), t.lookup(1, 5));
        assert_eq!(None, t.lookup(2, 5));
        t.on_close(1, 5);
        assert_eq!(None, t.lookup(1, 5));
    }

    #[test]
    fn close_untracked_is_noop() {
        let t = DescriptorTracker::new();
        t.on_close(1, 7);
        t.on_success(1, &open_like(), 3, path("/a"));
        t.on_close(1, 7);
        assert_eq!(Some(path("/a")), t.lookup(1, 3));
        assert_eq!(1, t.tracked_count(1));
    }

    #[test]
    fn dup_copies_and_survives_close_of_original() {
        let t = DescriptorTracker::new();
        t.on_success(1, &open_like(), 3, path("/a"));
        t.on_dup(1, 3, 10);
        assert_eq!(Some(path("/a")), t.lookup(1, 10));
        t.on_close(1, 3);
        assert_eq!(Some(path("/a")), t.lookup(1, 10));
    }

    #[test]
    fn dup_of_untracked_clears_stale_target() {
        let t = DescriptorTracker::new();
        t.on_success(1, &open_like(), 4, path("/old"));
        t.on_dup(1, 9, 4);
        assert_eq!(None, t.lookup(1, 4));
    }

    #[test]
    fn reuse_overwrites() {
        let t = DescriptorTracker::new();
        t.on_success(1, &open_like(), 3, path("/a"));
        t.on_success(1, &open_like(), 3, path("/b"));
        assert_eq!(Some(path("/b")), t.lookup(1, 3));
    }

    #[test]
    fn non_descriptor_calls_are_ignored() {
        let t = DescriptorTracker::new();
        let getpid = sysent(0, PU | NF, DecoderKind::Generic, "getpid");
        t.on_success(1, &getpid, 3, path("/a"));
        assert_eq!(None, t.lookup(1, 3));
        t.on_success(1, &open_like(), -2, path("/a"));
        assert_eq!(0, t.tracked_count(1));
    }

    #[test]
    fn close_range_fork_and_exit() {
        let t = DescriptorTracker::new();
        for fd in 3..8 {
            t.on_success(1, &open_like(), fd, path(&format!("/f{}", fd)));
        }
        t.on_fork(1, 2);
        t.on_close_range(1, 4, 6);
        assert_eq!(2, t.tracked_count(1));
        assert_eq!(5, t.tracked_count(2));
        t.on_exit(1);
        assert_eq!(None, t.lookup(1, 3));
        assert_eq!(Some(path("/f3")), t.lookup(2, 3));
    }

    #[test]
    fn shared_tables_see_each_other() {
        let t = DescriptorTracker::new();
        t.on_success(1, &open_like(), 3, path("/a"));
        t.on_share(1, 2);
        t.on_close(2, 3);
        t.on_success(1, &open_like(), 4, path("/b"));
        assert_eq!(None, t.lookup(1, 3));
        assert_eq!(Some(path("/b")), t.lookup(2, 4));
        t.on_exit(2);
        assert_eq!(Some(path("/b")), t.lookup(1, 4));
    }

    #[test]
    fn apply_effects() {
        let t = DescriptorTracker::new();
        let d = open_like();
        t.apply(
            1,
            &d,
            &[
                FdEffect::Opened {
                    fd: 3,
                    hint: Some(FdHint::Pipe),
                },
                FdEffect::Duplicated { old: 3, new: 0 },
                FdEffect::Closed(3),
            ],
        );
        assert_eq!(Some(FdHint::Pipe), t.lookup(1, 0));
        assert_eq!(None, t.lookup(1, 3));
        assert_eq!("anon_inode:[eventfd]", FdHint::Anon("eventfd".into()).to_string());
    }

    #[test]
    fn concurrent_processes() {
        let t = Arc::new(DescriptorTracker::new());
        let handles: Vec<_> = (0..4)
            .map(|pid| {
                let t = t.clone();
                std::thread::spawn(move || {
                    for fd in 0..100 {
                        t.on_success(pid, &open_like(), fd, path("/x"));
                        t.on_close(pid, fd - 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        for pid in 0..4 {
            assert_eq!(1, t.tracked_count(pid));
        }
    }
}
