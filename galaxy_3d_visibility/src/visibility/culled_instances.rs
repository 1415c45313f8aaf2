/// Culling outputs: per camera/layer buckets and the GPU update set.

use rustc_hash::FxHashSet;
use crate::scene::RenderInstanceKey;

/// Instances visible to one camera in one layer, in layer order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CulledInstances {
    pub opaque: Vec<RenderInstanceKey>,
    pub transparent: Vec<RenderInstanceKey>,
}

impl CulledInstances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset both buckets, keeping their capacity
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }
}

/// Instances needing the per-frame GPU update stage (skinning, morphing,
/// splat sorting). Each instance is scheduled once per frame, in the order
/// it was first seen.
#[derive(Debug, Default)]
pub struct GpuUpdateSet {
    seen: FxHashSet<RenderInstanceKey>,
    order: Vec<RenderInstanceKey>,
}

impl GpuUpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an instance. Returns `false` if it was already scheduled.
    pub fn insert(&mut self, key: RenderInstanceKey) -> bool {
        if self.seen.insert(key) {
            self.order.push(key);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, key: RenderInstanceKey) -> bool {
        self.seen.contains(&key)
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RenderInstanceKey> + '_ {
        self.order.iter().copied()
    }
}
