//! Hash functions for ring placement.
//!
//! Every placement decision the ring makes — node identity, virtual slot
//! position, key lookup — goes through one [`RingHasher`]. The function is
//! injected at construction so collaborators and tests can swap it, and it
//! is exposed back to collaborators via `HashRing::hash` so both sides of a
//! migration compute identical boundaries.

use parking_lot::Mutex;
use std::hash::Hasher;
use twox_hash::XxHash32;

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// Upper bound on pooled accumulators kept alive by [`Fnv1a`].
const MAX_POOLED_ACCUMULATORS: usize = 64;

/// A pluggable hash function mapping a byte sequence to a 32-bit value.
///
/// Implementations must be pure and deterministic: the result depends only
/// on the input bytes, never on call order or external state.
pub trait RingHasher: Send + Sync {
    /// Hash `data` to a 32-bit ring position.
    fn hash(&self, data: &[u8]) -> u32;
}

impl<F> RingHasher for F
where
    F: Fn(&[u8]) -> u32 + Send + Sync,
{
    fn hash(&self, data: &[u8]) -> u32 {
        self(data)
    }
}

/// Incremental FNV-1a 32-bit accumulator.
#[derive(Debug)]
struct Accumulator {
    state: u32,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    fn write(&mut self, data: &[u8]) {
        let mut h = self.state;
        for &byte in data {
            h ^= u32::from(byte);
            h = h.wrapping_mul(FNV_PRIME);
        }
        self.state = h;
    }

    fn finish(&self) -> u32 {
        self.state
    }

    fn reset(&mut self) {
        self.state = FNV_OFFSET_BASIS;
    }
}

/// Default hash function: FNV-1a 32-bit with a pooled accumulator.
///
/// Accumulators are recycled through an explicit free list to avoid
/// per-call setup under high call volume. Pooling is invisible to callers:
/// every accumulator is reset before it returns to the pool, and the guard
/// returns it on every exit path.
#[derive(Debug, Default)]
pub struct Fnv1a {
    pool: Mutex<Vec<Accumulator>>,
}

impl Fnv1a {
    /// Create a new pooled FNV-1a hasher.
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> PooledAccumulator<'_> {
        let acc = self.pool.lock().pop().unwrap_or_else(Accumulator::new);
        PooledAccumulator {
            acc: Some(acc),
            pool: &self.pool,
        }
    }
}

impl RingHasher for Fnv1a {
    fn hash(&self, data: &[u8]) -> u32 {
        self.acquire().hash(data)
    }
}

/// Scoped loan of an accumulator from the pool.
struct PooledAccumulator<'a> {
    acc: Option<Accumulator>,
    pool: &'a Mutex<Vec<Accumulator>>,
}

impl PooledAccumulator<'_> {
    fn hash(&mut self, data: &[u8]) -> u32 {
        let acc = self.acc.get_or_insert_with(Accumulator::new);
        acc.write(data);
        acc.finish()
    }
}

impl Drop for PooledAccumulator<'_> {
    fn drop(&mut self) {
        if let Some(mut acc) = self.acc.take() {
            acc.reset();
            let mut pool = self.pool.lock();
            if pool.len() < MAX_POOLED_ACCUMULATORS {
                pool.push(acc);
            }
        }
    }
}

/// Alternate hash function: seeded xxHash32.
///
/// Same contract as [`Fnv1a`]; useful when the caller wants a different
/// distribution or needs placement to differ between independent rings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xx32 {
    seed: u32,
}

impl Xx32 {
    /// Create an xxHash32 ring hasher with the given seed.
    pub fn with_seed(seed: u32) -> Self {
        Self { seed }
    }
}

impl RingHasher for Xx32 {
    fn hash(&self, data: &[u8]) -> u32 {
        let mut hasher = XxHash32::with_seed(self.seed);
        hasher.write(data);
        hasher.finish() as u32
    }
}
