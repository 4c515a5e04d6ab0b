//! Bump arena that owns every token string and AST node of one parse.
//!
//! Allocations never move and are never freed one by one. Dropping the
//! arena releases the whole chain of chunks. `reset` frees every chunk but
//! the newest, which is also the largest, and the next parse starts in it.

use bumpalo::collections::CollectIn;
use bumpalo::Bump;

/// Arena for AST nodes and interned source text.
pub struct Arena {
    bump: Bump,
}

impl Arena {
    /// Create an empty arena. The first chunk is allocated lazily.
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create an arena whose first chunk holds at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    /// Move a value into the arena and return a stable reference to it.
    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    /// Copy a string into the arena.
    #[inline]
    pub fn alloc_str(&self, s: &str) -> &str {
        self.bump.alloc_str(s)
    }

    /// Collect an iterator into an arena slice.
    #[inline]
    pub fn alloc_slice<T, I>(&self, iter: I) -> &[T]
    where
        I: IntoIterator<Item = T>,
    {
        iter.into_iter()
            .collect_in::<bumpalo::collections::Vec<'_, T>>(&self.bump)
            .into_bump_slice()
    }

    /// Create a growable vector backed by this arena.
    #[inline]
    pub fn vec<T>(&self) -> Vec<'_, T> {
        bumpalo::collections::Vec::new_in(&self.bump)
    }

    /// Rewind the arena, keeping only the most recent chunk.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    /// Capacity of the chunks the arena currently holds.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

/// A vector allocated in an arena.
pub type Vec<'a, T> = bumpalo::collections::Vec<'a, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_are_stable() {
        let arena = Arena::with_capacity(16);
        let first = arena.alloc(41_u64);
        // Force the arena to grow past its first chunk.
        let big = arena.alloc_slice(0..4096_u32);
        assert_eq!(*first, 41);
        assert_eq!(big.len(), 4096);
        assert_eq!(big[4095], 4095);
    }

    #[test]
    fn test_alignment() {
        let arena = Arena::new();
        let _byte = arena.alloc(1_u8);
        let wide = arena.alloc(7_u64);
        assert_eq!((wide as *const u64 as usize) % std::mem::align_of::<u64>(), 0);
    }

    #[test]
    fn test_reset_reuses_memory() {
        let mut arena = Arena::new();
        arena.alloc_str("hello world");
        assert!(arena.allocated_bytes() > 0);
        arena.reset();
        let s = arena.alloc_str("again");
        assert_eq!(s, "again");
    }

    #[test]
    fn test_reset_keeps_only_the_last_chunk() {
        let mut arena = Arena::new();
        let line = "x".repeat(1024);
        for _ in 0..64 {
            arena.alloc_str(&line);
        }
        let before = arena.allocated_bytes();
        arena.reset();
        let after = arena.allocated_bytes();
        assert!(after > 0);
        assert!(after < before, "reset kept {after} of {before} bytes");
    }
}
