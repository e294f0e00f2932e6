use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};
use rand::RngCore;
use serde::{Deserialize, Serialize};

const LEVEL_PREFIX: &str = "level_";
const CHALLENGE_PREFIX: &str = "challenge_";

const LCG_MULTIPLIER: u32 = 1_103_515_245;
const LCG_INCREMENT: u32 = 12_345;
/// The LCG works modulo 2^31.
const LCG_MASK: u32 = 0x7FFF_FFFF;

const FNV_OFFSET: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

static CHALLENGE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Opaque seed string; equal seeds always generate equal boards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(String);

impl Seed {
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    /// Canonical `level_<n>` seed.
    pub fn for_level(level: u32) -> Self {
        Self(format!("{LEVEL_PREFIX}{level}"))
    }

    /// `challenge_<timestamp>_<nonce>`, nonce as 8 hex digits.
    pub fn challenge(timestamp_ms: u64, nonce: u32) -> Self {
        Self(format!("{CHALLENGE_PREFIX}{timestamp_ms}_{nonce:08x}"))
    }

    /// Challenge seed for the current time. Seeds made within the same millisecond still differ.
    pub fn challenge_now() -> Self {
        use web_time::{SystemTime, UNIX_EPOCH};

        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let counter = CHALLENGE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let nonce = splitmix32(elapsed.subsec_nanos() ^ counter.wrapping_mul(0x9E37_79B9));
        let timestamp_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        Self::challenge(timestamp_ms, nonce)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Level index of a canonical `level_<n>` seed.
    pub fn level_index(&self) -> Option<u32> {
        let digits = self.0.strip_prefix(LEVEL_PREFIX)?;
        let level: u32 = digits.parse().ok()?;
        // reject "+3", "03" and friends, only the canonical spelling counts
        (level > 0 && level.to_string() == digits).then_some(level)
    }

    pub fn is_challenge(&self) -> bool {
        self.0.starts_with(CHALLENGE_PREFIX)
    }

    /// Random stream for this seed.
    pub fn rng(&self) -> SeedRng {
        SeedRng::from_seed_str(&self.0)
    }

    /// Independent stream for this seed, one per `salt`.
    pub fn derive_rng(&self, salt: u32) -> SeedRng {
        SeedRng::derive(&self.0, salt)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Seed {
    fn from(seed: &str) -> Self {
        Self::new(seed)
    }
}

/// 32-bit FNV-1a.
pub(crate) fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

pub(crate) fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

/// Deterministic generator seeded from a string.
///
/// Steps the LCG `state = (1103515245 * state + 12345) mod 2^31` and passes each state through splitmix32, so the
/// weak low bits of the LCG never reach callers. Implements [`RngCore`], so `rand`'s sampling helpers work on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedRng {
    state: u32,
}

impl SeedRng {
    pub fn from_seed_str(seed: &str) -> Self {
        Self {
            state: fnv1a(seed.as_bytes()) & LCG_MASK,
        }
    }

    pub fn derive(seed: &str, salt: u32) -> Self {
        Self {
            state: (fnv1a(seed.as_bytes()) ^ splitmix32(salt)) & LCG_MASK,
        }
    }

    fn step(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT)
            & LCG_MASK;
        splitmix32(self.state)
    }
}

impl RngCore for SeedRng {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.step());
        let low = u64::from(self.step());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn level_seed_round_trips() {
        let seed = Seed::for_level(42);

        assert_eq!(seed.as_str(), "level_42");
        assert_eq!(seed.level_index(), Some(42));
        assert!(!seed.is_challenge());
    }

    #[test]
    fn non_canonical_level_seeds_are_not_levels() {
        for raw in ["level_0", "level_07", "level_+7", "level_", "lvl_3", "level_3x"] {
            assert_eq!(Seed::new(raw).level_index(), None, "{raw}");
        }
    }

    #[test]
    fn challenge_seeds_encode_time_and_nonce() {
        let seed = Seed::challenge(1_700_000_000_000, 0xbeef);

        assert_eq!(seed.as_str(), "challenge_1700000000000_0000beef");
        assert!(seed.is_challenge());
        assert_eq!(seed.level_index(), None);
    }

    #[test]
    fn challenge_now_seeds_differ() {
        assert_ne!(Seed::challenge_now(), Seed::challenge_now());
    }

    #[test]
    fn equal_seeds_give_equal_streams() {
        let mut a = Seed::for_level(7).rng();
        let mut b = Seed::for_level(7).rng();

        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn different_seeds_and_salts_diverge() {
        let first = Seed::for_level(1).rng().next_u32();

        assert_ne!(first, Seed::for_level(2).rng().next_u32());
        assert_ne!(first, Seed::for_level(1).derive_rng(1).next_u32());
        assert_ne!(
            Seed::for_level(1).derive_rng(1).next_u32(),
            Seed::for_level(1).derive_rng(2).next_u32()
        );
    }

    #[test]
    fn ranges_stay_in_bounds_and_cover_them() {
        let mut rng = Seed::new("coverage").rng();
        let mut seen = [false; 9];

        for _ in 0..1000 {
            let digit: u8 = rng.random_range(1..=9);
            assert!((1..=9).contains(&digit));
            seen[usize::from(digit - 1)] = true;
        }
        assert!(seen.iter().all(|&hit| hit));
    }

    #[test]
    fn fill_bytes_handles_partial_words() {
        let mut rng = Seed::new("bytes").rng();
        let mut buffer = [0u8; 7];

        rng.fill_bytes(&mut buffer);
        assert!(buffer.iter().any(|&byte| byte != 0));
    }

    #[test]
    fn fnv_matches_reference_values() {
        assert_eq!(fnv1a(b""), 0x811C_9DC5);
        assert_eq!(fnv1a(b"a"), 0xE40C_292C);
    }
}
