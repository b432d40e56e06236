// Everything a chain needs from the outside world goes through these three traits:
// the digest it hashes with, the clock it stamps transactions and commits with,
// and the random source it draws nonces from. Each chain owns its own instances,
// so tests can pin all three and get byte-for-byte reproducible hashes.

use crate::utils::{current_timestamp, sha256_hex};
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

/// Exclusive upper bound of the nonce folded into every block hash
pub const BLOCK_NONCE_BOUND: u32 = 100;

/// Deterministic one-way digest over text, rendered as lowercase hex
pub trait HashFunction: Debug + Send + Sync {
    fn digest(&self, input: &str) -> String;
}

/// SHA-256 backed by `ring`
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hash;

impl HashFunction for Sha256Hash {
    fn digest(&self, input: &str) -> String {
        sha256_hex(input)
    }
}

/// Source of capture times, in milliseconds since the Unix epoch
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock that never steps backwards, even if the system time does
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> SystemClock {
        SystemClock::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        let wall = current_timestamp().unwrap_or_else(|e| {
            warn!("Falling back to last seen timestamp: {e}");
            0
        });
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        previous.max(wall)
    }
}

/// Clock pinned to a single instant, for reproducible hashes
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Random inputs of a chain: the identity nonce used once at creation and the
/// bounded nonce drawn at every commit
pub trait NonceSource: Debug + Send + Sync {
    fn identity_nonce(&mut self) -> String;
    fn block_nonce(&mut self, bound: u32) -> u32;
}

/// `StdRng`-driven nonces; identity nonces are v4 UUIDs built from the same generator
#[derive(Debug)]
pub struct RandomNonce {
    rng: StdRng,
}

impl Default for RandomNonce {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomNonce {
    pub fn new() -> RandomNonce {
        RandomNonce {
            rng: StdRng::from_entropy(),
        }
    }

    /// Same seed, same sequence of nonces
    pub fn seeded(seed: u64) -> RandomNonce {
        RandomNonce {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NonceSource for RandomNonce {
    fn identity_nonce(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.gen();
        uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string()
    }

    fn block_nonce(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }
}

/// Nonce source returning the same values every time
#[derive(Debug, Clone)]
pub struct FixedNonce {
    identity: Uuid,
    nonce: u32,
}

impl FixedNonce {
    pub fn new(identity: Uuid, nonce: u32) -> FixedNonce {
        FixedNonce { identity, nonce }
    }
}

impl NonceSource for FixedNonce {
    fn identity_nonce(&mut self) -> String {
        self.identity.to_string()
    }

    fn block_nonce(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            0
        } else {
            self.nonce % bound
        }
    }
}
