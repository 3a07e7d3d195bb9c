//! Identifiers for timeline registrations.

use serde::{Deserialize, Serialize};

/// Opaque handle returned by [`crate::Timeline::register`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TimelineHandle(pub u64);

/// Monotonic allocator for timeline handles. Handles are never reused within
/// one timeline, so a stale handle can't unregister a newer callback.
#[derive(Default, Debug)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> TimelineHandle {
        let id = TimelineHandle(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = HandleAllocator::new();
        assert_eq!(alloc.alloc(), TimelineHandle(0));
        assert_eq!(alloc.alloc(), TimelineHandle(1));
        assert_eq!(alloc.alloc(), TimelineHandle(2));
    }
}
