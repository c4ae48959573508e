use core::fmt;
use core::mem::MaybeUninit;
use core::ops::{Deref, DerefMut};
use core::slice;

/// A fixed-capacity vector that lives on the stack or in static memory.
///
/// Sample streams never touch a heap: the firmware has none, and the
/// reference timing must not include allocator work.
pub struct StaticVec<T, const N: usize> {
    data: [MaybeUninit<T>; N],
    len: usize,
}

impl<T, const N: usize> Default for StaticVec<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> StaticVec<T, N> {
    pub const fn new() -> Self {
        Self {
            data: [const { MaybeUninit::uninit() }; N],
            len: 0,
        }
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[inline(always)]
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.len < N {
            // Safety: len < N was checked above.
            unsafe {
                self.data.get_unchecked_mut(self.len).write(item);
            }
            self.len += 1;
            Ok(())
        } else {
            Err(item)
        }
    }

    #[inline(always)]
    pub fn pop(&mut self) -> Option<T> {
        if self.len > 0 {
            self.len -= 1;
            // Safety: the slot at the old len - 1 is initialized.
            unsafe { Some(self.data.get_unchecked(self.len).assume_init_read()) }
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        // Safety: data[0..len] is initialized.
        unsafe { slice::from_raw_parts(self.data.as_ptr() as *const T, self.len) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // Safety: data[0..len] is initialized.
        unsafe { slice::from_raw_parts_mut(self.data.as_mut_ptr() as *mut T, self.len) }
    }
}

impl<T: Copy, const N: usize> StaticVec<T, N> {
    /// Builds a vector from a slice, or returns `None` if it does not fit.
    pub fn from_slice(items: &[T]) -> Option<Self> {
        let mut out = Self::new();
        out.extend_from_slice(items).ok()?;
        Some(out)
    }

    /// Appends every element of `items`. On overflow nothing is appended and
    /// the number of elements that would not fit is returned.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<(), usize> {
        let free = N - self.len;
        if items.len() > free {
            return Err(items.len() - free);
        }
        for &item in items {
            // Safety: capacity was checked for the whole slice.
            unsafe {
                self.data.get_unchecked_mut(self.len).write(item);
            }
            self.len += 1;
        }
        Ok(())
    }
}

impl<T: Copy, const N: usize> Clone for StaticVec<T, N> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        let _ = out.extend_from_slice(self.as_slice());
        out
    }
}

impl<T: PartialEq, const N: usize> PartialEq for StaticVec<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, const N: usize> Eq for StaticVec<T, N> {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for StaticVec<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// Allow indexing like a normal slice
impl<T, const N: usize> Deref for StaticVec<T, N> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for StaticVec<T, N> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a StaticVec<T, N> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_stops_at_capacity() {
        let mut v: StaticVec<u32, 2> = StaticVec::new();
        assert_eq!(v.push(1), Ok(()));
        assert_eq!(v.push(2), Ok(()));
        assert_eq!(v.push(3), Err(3));
        assert!(v.is_full());
        assert_eq!(v.as_slice(), &[1, 2]);
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let mut v: StaticVec<u32, 4> = StaticVec::new();
        v.extend_from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(v.extend_from_slice(&[4, 5]), Err(1));
        assert_eq!(v.len(), 3);
        assert_eq!(v.pop(), Some(3));
    }

    #[test]
    fn from_slice_rejects_oversized_input() {
        assert!(StaticVec::<u32, 2>::from_slice(&[1, 2, 3]).is_none());
        let v = StaticVec::<u32, 3>::from_slice(&[7, 8]).unwrap();
        assert_eq!(v.clone(), v);
    }
}
