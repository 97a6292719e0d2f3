use crate::sync::{AtomicU64, Ordering};

/// Two `u32` halves packed into one `AtomicU64`.
///
/// A single 64-bit word is the smallest unit the hardware can exchange
/// atomically on every target this workspace builds for, so packing a pair
/// into one word guarantees an overwrite can never be observed torn: a
/// reader sees both halves from the same write, always.
///
/// Layout is `(hi << 32) | lo`.
pub struct AtomicPair(AtomicU64);

const fn pack(hi: u32, lo: u32) -> u64 {
    ((hi as u64) << 32) | lo as u64
}

const fn unpack(word: u64) -> (u32, u32) {
    ((word >> 32) as u32, word as u32)
}

impl AtomicPair {
    pub const fn new(hi: u32, lo: u32) -> Self {
        Self(AtomicU64::new(pack(hi, lo)))
    }

    /// Atomically replace both halves, returning the previous pair.
    pub fn swap(&self, hi: u32, lo: u32, ordering: Ordering) -> (u32, u32) {
        unpack(self.0.swap(pack(hi, lo), ordering))
    }

    pub fn load(&self, ordering: Ordering) -> (u32, u32) {
        unpack(self.0.load(ordering))
    }

    pub fn store(&self, hi: u32, lo: u32, ordering: Ordering) {
        self.0.store(pack(hi, lo), ordering);
    }
}

impl Default for AtomicPair {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl std::fmt::Debug for AtomicPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hi, lo) = self.load(Ordering::Relaxed);
        f.debug_tuple("AtomicPair").field(&hi).field(&lo).finish()
    }
}
