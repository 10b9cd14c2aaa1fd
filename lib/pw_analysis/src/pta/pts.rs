//! Points-to sets, as bit sets over canonical object ids.

use crate::pta::cs::CSObjId;
use fixedbitset::FixedBitSet;
use std::iter::FromIterator;

#[derive(Debug, Clone, Default)]
pub struct PointsToSet {
    bits: FixedBitSet,
}

impl PartialEq for PointsToSet {
    // underlying bit sets may have different lengths
    fn eq(&self, other: &Self) -> bool {
        self.bits.is_subset(&other.bits) && other.bits.is_subset(&self.bits)
    }
}

impl Eq for PointsToSet {}

impl PointsToSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn singleton(obj: CSObjId) -> Self {
        let mut pts = Self::new();
        pts.insert(obj);
        pts
    }

    /// Returns `true` if the object was not already in the set.
    pub fn insert(&mut self, obj: CSObjId) -> bool {
        let idx = obj.idx();
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        !self.bits.put(idx)
    }

    #[inline]
    pub fn contains(&self, obj: CSObjId) -> bool {
        self.bits.contains(obj.idx())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.ones().next().is_none()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = CSObjId> + '_ {
        self.bits.ones().map(CSObjId::new)
    }

    /// The objects of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut bits = FixedBitSet::with_capacity(self.bits.len());
        for idx in self.bits.difference(&other.bits) {
            bits.insert(idx);
        }
        Self { bits }
    }

    pub fn union_with(&mut self, other: &Self) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits.is_subset(&other.bits)
    }
}

impl FromIterator<CSObjId> for PointsToSet {
    fn from_iter<I: IntoIterator<Item = CSObjId>>(iter: I) -> Self {
        let mut pts = Self::new();
        for obj in iter {
            pts.insert(obj);
        }
        pts
    }
}
