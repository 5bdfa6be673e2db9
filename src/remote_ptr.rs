use crate::kernel_abi::Personality;
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter, LowerHex, Result},
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::{Add, Sub},
};

/// Useful alias.
pub type Void = u8;

pub const PAGE_SIZE: usize = 4096;

/// An address in a tracee's address space. Never dereferenced locally; all
/// access goes through a `MemoryAccess` implementation.
#[derive(Debug)]
pub struct RemotePtr<T> {
    ptr: usize,
    /// This struct does not "own" a `T`, hence `PhantomData<*const T>`.
    phantom: PhantomData<*const T>,
}

// Manually derived because of PhantomData.
impl<T> Clone for RemotePtr<T> {
    fn clone(&self) -> Self {
        RemotePtr::new_from_val(self.ptr)
    }
}

impl<T> Copy for RemotePtr<T> {}

// Tracee addresses are plain integers: sharing them between threads is fine.
unsafe impl<T> Send for RemotePtr<T> {}
unsafe impl<T> Sync for RemotePtr<T> {}

impl<T> Default for RemotePtr<T> {
    fn default() -> Self {
        RemotePtr::null()
    }
}

impl<T> RemotePtr<T> {
    pub fn null() -> RemotePtr<T> {
        RemotePtr::new_from_val(0)
    }

    pub fn new_from_val(val: usize) -> RemotePtr<T> {
        RemotePtr {
            ptr: val,
            phantom: PhantomData,
        }
    }

    /// Interpret a raw syscall argument word as a pointer for `personality`.
    /// The upper half of the register is ignored for 32-bit pointer ABIs.
    pub fn from_word(personality: Personality, word: u64) -> RemotePtr<T> {
        RemotePtr::new_from_val(personality.truncate_pointer(word) as usize)
    }

    pub fn as_usize(&self) -> usize {
        self.ptr
    }

    pub fn is_null(&self) -> bool {
        self.ptr == 0
    }

    pub fn referent_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    pub fn cast<U>(r: RemotePtr<U>) -> RemotePtr<T> {
        RemotePtr::<T>::new_from_val(r.ptr)
    }

    pub fn as_rptr_u8(self) -> RemotePtr<u8> {
        RemotePtr::<u8>::new_from_val(self.ptr)
    }

    /// Add a raw byte offset regardless of the referent size. `None` on
    /// address-space wraparound, which an adversarial tracee can provoke.
    pub fn checked_byte_add(self, bytes: usize) -> Option<RemotePtr<T>> {
        self.ptr.checked_add(bytes).map(RemotePtr::new_from_val)
    }

    /// Number of bytes from this address to the end of its page.
    pub fn bytes_to_page_end(&self) -> usize {
        PAGE_SIZE - (self.ptr % PAGE_SIZE)
    }
}

impl<T> Display for RemotePtr<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{:#x}", self.ptr)
    }
}

impl<T> LowerHex for RemotePtr<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        LowerHex::fmt(&self.ptr, f)
    }
}

impl<T> Add<usize> for RemotePtr<T> {
    type Output = Self;

    fn add(self, delta: usize) -> Self::Output {
        // Will automatically deal with overflow in debug mode.
        let result: usize = self.as_usize() + delta * std::mem::size_of::<T>();
        Self::new_from_val(result)
    }
}

impl<T> Sub<usize> for RemotePtr<T> {
    type Output = Self;

    fn sub(self, delta: usize) -> Self::Output {
        let result: usize = self.as_usize() - delta * std::mem::size_of::<T>();
        Self::new_from_val(result)
    }
}

/// Note that the other RemotePtr must have SAME referent type.
impl<T> Sub<RemotePtr<T>> for RemotePtr<T> {
    type Output = usize;

    fn sub(self, rhs: RemotePtr<T>) -> Self::Output {
        let delta: usize = self.as_usize() - rhs.as_usize();
        delta / std::mem::size_of::<T>()
    }
}

impl<T> PartialOrd for RemotePtr<T> {
    fn partial_cmp(&self, other: &RemotePtr<T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for RemotePtr<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ptr.cmp(&other.ptr)
    }
}

impl<T> PartialEq for RemotePtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Eq for RemotePtr<T> {}

impl<T> Hash for RemotePtr<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr.hash(state)
    }
}

impl<T> From<usize> for RemotePtr<T> {
    fn from(addr: usize) -> Self {
        RemotePtr::<T>::new_from_val(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_test() {
        let a = RemotePtr::<u64>::null();
        let b = a + 1usize;
        assert_eq!(8, b.as_usize());
    }

    #[test]
    fn add_sub_test_with_custom_struct() {
        struct S(u64, u64);
        let a = RemotePtr::<S>::null();
        let b = a + 1usize;
        assert_eq!(16, b.as_usize());
        assert_eq!(0, (b - 1usize).as_usize());
        assert_eq!(1, b - a);
    }

    #[test]
    fn from_word_truncates_narrow_pointers() {
        let p = RemotePtr::<Void>::from_word(Personality::X32, 0xffff_ffff_0000_1000);
        assert_eq!(0x1000, p.as_usize());
        let q = RemotePtr::<Void>::from_word(Personality::X64, 0x7fff_0000_1000);
        assert_eq!(0x7fff_0000_1000, q.as_usize());
    }

    #[test]
    fn page_arithmetic() {
        let p = RemotePtr::<Void>::new_from_val(0x1ff0);
        assert_eq!(0x10, p.bytes_to_page_end());
        assert_eq!(PAGE_SIZE, RemotePtr::<Void>::new_from_val(0x2000).bytes_to_page_end());
        assert!(RemotePtr::<Void>::new_from_val(usize::MAX).checked_byte_add(1).is_none());
    }

    #[test]
    fn comparison_test() {
        let c = RemotePtr::<u64>::new_from_val(0);
        let d = RemotePtr::<u64>::new_from_val(16);
        assert!(c < d);
        assert!(c != d);
        assert_eq!("0x10", format!("{}", d));
    }
}
