//! Fixed-capacity stack representation used as the aggregation key.
//!
//! A `SampleKey` holds up to `MAX_STACK_DEPTH` return addresses, deepest
//! call first, zero-padded after the last real address. Address 0 is never
//! a legitimate return address, so it doubles as the "empty slot" and
//! "stack truncated here" marker. Keys built through this module never
//! contain a zero followed by a non-zero address.

use std::fmt;
use std::hash::{BuildHasherDefault, Hash, Hasher};

/// Maximum number of return addresses kept per sample
pub const MAX_STACK_DEPTH: usize = 32;

/// Odd constant folded into every step of the stack hash
pub const HASH_MIX_CONSTANT: u64 = 0x9e37_79b9;

/// A captured call stack, deepest call first.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SampleKey {
    addresses: [u32; MAX_STACK_DEPTH],
}

impl SampleKey {
    /// Create an empty key (all slots zero)
    pub const fn new() -> Self {
        Self {
            addresses: [0; MAX_STACK_DEPTH],
        }
    }

    /// Build a key from return addresses ordered deepest call first.
    ///
    /// Copying stops at the first zero address or once the key is full, so
    /// the zero-padding invariant holds for any input.
    pub fn from_frames(frames: &[u32]) -> Self {
        let mut key = Self::new();
        for &address in frames {
            if !key.push(address) {
                break;
            }
        }
        key
    }

    /// Append the caller's return address.
    ///
    /// Returns false (and leaves the key untouched) when the key is full or
    /// `address` is the zero sentinel.
    pub fn push(&mut self, address: u32) -> bool {
        if address == 0 {
            return false;
        }

        let depth = self.depth();
        if depth == MAX_STACK_DEPTH {
            return false;
        }

        self.addresses[depth] = address;
        true
    }

    /// Number of real (non-zero) addresses
    pub fn depth(&self) -> usize {
        self.addresses
            .iter()
            .position(|&address| address == 0)
            .unwrap_or(MAX_STACK_DEPTH)
    }

    /// The non-zero prefix, deepest call first
    pub fn frames(&self) -> &[u32] {
        &self.addresses[..self.depth()]
    }

    /// All slots including the zero padding
    pub fn as_array(&self) -> &[u32; MAX_STACK_DEPTH] {
        &self.addresses
    }

    pub fn is_empty(&self) -> bool {
        self.addresses[0] == 0
    }

    pub fn is_full(&self) -> bool {
        self.addresses[MAX_STACK_DEPTH - 1] != 0
    }
}

impl Default for SampleKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SampleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.frames().iter().map(|address| format!("0x{address:08x}")))
            .finish()
    }
}

impl Hash for SampleKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(stack_hash(self));
    }
}

/// Order-sensitive hash over the non-zero prefix of `key`.
///
/// Everything after the first zero is zero, so stopping there gives the
/// same result as hashing the whole array.
pub fn stack_hash(key: &SampleKey) -> u64 {
    key.frames().iter().fold(0u64, |hash, &address| {
        hash ^ mix(address)
            .wrapping_add(HASH_MIX_CONSTANT)
            .wrapping_add(hash << 6)
            .wrapping_add(hash >> 2)
    })
}

#[inline]
fn mix(address: u32) -> u64 {
    u64::from(address)
}

/// Hasher that passes the precomputed `stack_hash` straight through.
///
/// `SampleKey` feeds a single `write_u64` and its hash passes straight
/// through. `write` only exists to satisfy `Hasher` for other key types
/// and folds their bytes with FNV-1a.
#[derive(Debug, Clone, Copy)]
pub struct StackKeyHasher(u64);

impl StackKeyHasher {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
}

impl Default for StackKeyHasher {
    fn default() -> Self {
        Self(Self::OFFSET)
    }
}

impl Hasher for StackKeyHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.0 = value;
    }
}

/// `BuildHasher` for tables keyed by `SampleKey`
pub type StackKeyBuildHasher = BuildHasherDefault<StackKeyHasher>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::BuildHasher;

    #[test]
    fn test_from_frames_stops_at_zero() {
        let key = SampleKey::from_frames(&[0x100, 0x200, 0, 0x300]);
        assert_eq!(key.frames(), &[0x100, 0x200]);
        assert_eq!(key.depth(), 2);
        assert!(key.as_array()[2..].iter().all(|&a| a == 0));
    }

    #[test]
    fn test_from_frames_truncates_at_capacity() {
        let frames: Vec<u32> = (1..=40).collect();
        let key = SampleKey::from_frames(&frames);
        assert!(key.is_full());
        assert_eq!(key.depth(), MAX_STACK_DEPTH);
        assert_eq!(key.frames()[MAX_STACK_DEPTH - 1], MAX_STACK_DEPTH as u32);
    }

    #[test]
    fn test_push_rejects_zero_and_overflow() {
        let mut key = SampleKey::new();
        assert!(key.is_empty());
        assert!(!key.push(0));
        assert!(key.push(0x42));
        assert_eq!(key.depth(), 1);

        let mut full = SampleKey::from_frames(&[7; MAX_STACK_DEPTH]);
        assert!(!full.push(8));
        assert_eq!(full.depth(), MAX_STACK_DEPTH);
    }

    #[test]
    fn test_hasher_folds_byte_input() {
        let build = StackKeyBuildHasher::default();
        assert_eq!(build.hash_one("main"), build.hash_one("main"));
        assert_ne!(build.hash_one("main"), build.hash_one("mian"));
        assert_ne!(StackKeyHasher::default().finish(), build.hash_one(""));
    }

    #[test]
    fn test_hash_is_order_sensitive() {
        let ab = SampleKey::from_frames(&[0xA, 0xB]);
        let ba = SampleKey::from_frames(&[0xB, 0xA]);
        assert_ne!(stack_hash(&ab), stack_hash(&ba));
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_hash_matches_reference_steps() {
        let key = SampleKey::from_frames(&[1, 2]);
        let first = 1u64.wrapping_add(HASH_MIX_CONSTANT);
        let second = first ^ 2u64
            .wrapping_add(HASH_MIX_CONSTANT)
            .wrapping_add(first << 6)
            .wrapping_add(first >> 2);
        assert_eq!(stack_hash(&key), second);
        assert_eq!(stack_hash(&SampleKey::new()), 0);
    }

    #[test]
    fn test_same_prefix_same_hash() {
        let a = SampleKey::from_frames(&[0x10, 0x20, 0x30]);
        let b = SampleKey::from_frames(&[0x10, 0x20, 0x30, 0]);
        assert_eq!(a, b);
        assert_eq!(stack_hash(&a), stack_hash(&b));

        let build = StackKeyBuildHasher::default();
        assert_eq!(build.hash_one(a), build.hash_one(b));
        assert_eq!(build.hash_one(a), stack_hash(&a));
    }

    #[test]
    fn test_debug_lists_hex_frames() {
        let key = SampleKey::from_frames(&[0x0200_1000]);
        assert_eq!(format!("{key:?}"), r#"["0x02001000"]"#);
    }
}
