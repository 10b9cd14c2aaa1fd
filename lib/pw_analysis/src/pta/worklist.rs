use crate::pta::cs::PointerId;
use crate::pta::pts::PointsToSet;
use std::collections::VecDeque;

/// FIFO queue of pending propagations. Entries of a same pointer are not
/// merged: each one is compared with the points-to set of the pointer at
/// the time it is processed.
#[derive(Debug, Default)]
pub struct WorkList {
    entries: VecDeque<(PointerId, PointsToSet)>,
}

impl WorkList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pointer: PointerId, pts: PointsToSet) {
        self.entries.push_back((pointer, pts));
    }

    pub fn pop(&mut self) -> Option<(PointerId, PointsToSet)> {
        self.entries.pop_front()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
