//! Fixed-width SimHash fingerprint values.
//!
//! A [`Fingerprint`] is an immutable bit-vector of `hashbits` bits stored in a
//! `u128`. Equality, ordering and hashing look only at the integer value, so
//! collections of fingerprints can be sorted and deduplicated regardless of
//! width. That ordering says nothing about similarity; use
//! [`Fingerprint::hamming_distance`] or [`Fingerprint::similarity`] for that.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::errors::{NeardupError, Result};

/// Widest fingerprint supported.
pub const MAX_HASHBITS: u32 = 128;

/// Default fingerprint width.
pub const DEFAULT_HASHBITS: u32 = 64;

/// Mask selecting the low `width` bits of a `u128`.
#[inline]
pub(crate) fn low_mask(width: u32) -> u128 {
    if width >= MAX_HASHBITS {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// Check that `hashbits` is a width this crate can represent.
pub(crate) fn validate_hashbits(hashbits: u32) -> Result<()> {
    if hashbits == 0 || hashbits > MAX_HASHBITS {
        return Err(NeardupError::config_field(
            format!("hashbits must be in 1..={MAX_HASHBITS}, got {hashbits}"),
            "hashbits",
        ));
    }
    Ok(())
}

/// SimHash fingerprint of a weighted token set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "FingerprintRepr", into = "FingerprintRepr")]
pub struct Fingerprint {
    value: u128,
    hashbits: u32,
}

impl Fingerprint {
    /// Build a fingerprint from a raw integer value (deserialization path).
    ///
    /// Fails if `hashbits` is out of range or `value` has bits set above
    /// `hashbits`; the value is never truncated.
    pub fn from_raw(value: u128, hashbits: u32) -> Result<Self> {
        validate_hashbits(hashbits)?;
        if value & !low_mask(hashbits) != 0 {
            return Err(NeardupError::validation_field(
                format!("value {value:#x} does not fit in {hashbits} bits"),
                "value",
            ));
        }
        Ok(Self { value, hashbits })
    }

    /// Constructor for values already masked to `hashbits`.
    pub(crate) fn from_masked(value: u128, hashbits: u32) -> Self {
        debug_assert!(value & !low_mask(hashbits) == 0);
        Self { value, hashbits }
    }

    /// The all-zero fingerprint of the given width.
    pub fn zero(hashbits: u32) -> Result<Self> {
        Self::from_raw(0, hashbits)
    }

    /// Parse the `0x`-prefixed hex form produced by [`Fingerprint::to_hex`].
    ///
    /// The prefix is optional and digits may be upper or lower case.
    pub fn from_hex(hex: &str, hashbits: u32) -> Result<Self> {
        let digits = hex
            .strip_prefix("0x")
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);
        if digits.is_empty() {
            return Err(NeardupError::validation_field("empty hex string", "hex"));
        }
        let value = u128::from_str_radix(digits, 16).map_err(|err| {
            NeardupError::validation_field(format!("invalid hex '{hex}': {err}"), "hex")
        })?;
        Self::from_raw(value, hashbits)
    }

    /// Decode the big-endian byte form produced by [`Fingerprint::to_bytes`].
    pub fn from_bytes(bytes: &[u8], hashbits: u32) -> Result<Self> {
        validate_hashbits(hashbits)?;
        let expected = byte_len(hashbits);
        if bytes.len() != expected {
            return Err(NeardupError::validation_field(
                format!(
                    "expected {expected} bytes for a {hashbits}-bit fingerprint, got {}",
                    bytes.len()
                ),
                "bytes",
            ));
        }
        let mut buf = [0u8; 16];
        buf[16 - expected..].copy_from_slice(bytes);
        Self::from_raw(u128::from_be_bytes(buf), hashbits)
    }

    /// Integer value of the fingerprint.
    pub fn value(&self) -> u128 {
        self.value
    }

    /// Declared width in bits.
    pub fn hashbits(&self) -> u32 {
        self.hashbits
    }

    /// Whether bit `index` (0 = least significant) is set.
    pub fn bit(&self, index: u32) -> bool {
        index < self.hashbits && (self.value >> index) & 1 == 1
    }

    /// Lowercase hex, `0x`-prefixed, zero-padded to `ceil(hashbits / 4)` digits.
    pub fn to_hex(&self) -> String {
        let digits = self.hashbits.div_ceil(4) as usize;
        format!("0x{:0digits$x}", self.value)
    }

    /// Big-endian bytes, `ceil(hashbits / 8)` long.
    pub fn to_bytes(&self) -> Vec<u8> {
        let len = byte_len(self.hashbits);
        self.value.to_be_bytes()[16 - len..].to_vec()
    }

    /// Raw ordering on the integer value. Permitted across widths; carries no
    /// similarity meaning.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }

    /// Fail with [`NeardupError::SizeMismatch`] unless both widths agree.
    pub fn ensure_same_width(&self, other: &Self, operation: &'static str) -> Result<()> {
        if self.hashbits != other.hashbits {
            return Err(NeardupError::size_mismatch(
                self.hashbits,
                other.hashbits,
                operation,
            ));
        }
        Ok(())
    }
}

fn byte_len(hashbits: u32) -> usize {
    hashbits.div_ceil(8) as usize
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Fingerprint {}

impl PartialOrd for Fingerprint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fingerprint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_value(other)
    }
}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl fmt::LowerHex for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}

impl From<Fingerprint> for u128 {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.value
    }
}

/// Wire form: hex string plus declared width.
#[derive(Serialize, Deserialize)]
struct FingerprintRepr {
    hex: String,
    hashbits: u32,
}

impl From<Fingerprint> for FingerprintRepr {
    fn from(fingerprint: Fingerprint) -> Self {
        Self {
            hex: fingerprint.to_hex(),
            hashbits: fingerprint.hashbits,
        }
    }
}

impl TryFrom<FingerprintRepr> for Fingerprint {
    type Error = NeardupError;

    fn try_from(repr: FingerprintRepr) -> Result<Self> {
        Fingerprint::from_hex(&repr.hex, repr.hashbits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_rejects_overflow() {
        assert!(Fingerprint::from_raw(0xff, 8).is_ok());
        assert!(Fingerprint::from_raw(0x100, 8).is_err());
        assert!(Fingerprint::from_raw(u128::MAX, 128).is_ok());
    }

    #[test]
    fn test_from_raw_rejects_bad_width() {
        assert!(Fingerprint::from_raw(0, 0).unwrap_err().is_config());
        assert!(Fingerprint::from_raw(0, 129).unwrap_err().is_config());
    }

    #[test]
    fn test_hex_is_zero_padded() {
        let fp = Fingerprint::from_raw(0x18, 64).unwrap();
        assert_eq!(fp.to_hex(), "0x0000000000000018");

        let fp = Fingerprint::from_raw(0x5, 10).unwrap();
        assert_eq!(fp.to_hex(), "0x005");

        let fp = Fingerprint::from_raw(0xa01d_affa_e45c_fdc8, 64).unwrap();
        assert_eq!(fp.to_hex(), "0xa01daffae45cfdc8");
    }

    #[test]
    fn test_hex_parse() {
        let fp = Fingerprint::from_hex("0xA01DAFFAE45CFDC8", 64).unwrap();
        assert_eq!(fp.value(), 0xa01d_affa_e45c_fdc8);
        assert!(Fingerprint::from_hex("0x", 64).is_err());
        assert!(Fingerprint::from_hex("0xzz", 64).is_err());
        assert!(Fingerprint::from_hex("0x1ff", 8).is_err());
    }

    #[test]
    fn test_bytes_are_big_endian() {
        let fp = Fingerprint::from_raw(0x0102_0304, 32).unwrap();
        assert_eq!(fp.to_bytes(), vec![1, 2, 3, 4]);

        let fp = Fingerprint::from_raw(0x1ff, 12).unwrap();
        assert_eq!(fp.to_bytes(), vec![0x01, 0xff]);

        let decoded = Fingerprint::from_bytes(&[0x01, 0xff], 12).unwrap();
        assert_eq!(decoded.value(), 0x1ff);
        assert!(Fingerprint::from_bytes(&[0x01], 12).is_err());
    }

    #[test]
    fn test_equality_and_order_use_value_only() {
        let a = Fingerprint::from_raw(5, 64).unwrap();
        let b = Fingerprint::from_raw(5, 32).unwrap();
        let c = Fingerprint::from_raw(7, 8).unwrap();
        assert_eq!(a, b);
        assert!(a < c);
        assert!(c > b);
    }

    #[test]
    fn test_bit_access() {
        let fp = Fingerprint::from_raw(0b101, 8).unwrap();
        assert!(fp.bit(0));
        assert!(!fp.bit(1));
        assert!(fp.bit(2));
        assert!(!fp.bit(200));
    }

    #[test]
    fn test_serde_roundtrip_through_json() {
        let fp = Fingerprint::from_raw(0xbeef, 20).unwrap();
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, r#"{"hex":"0x0beef","hashbits":20}"#);

        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value(), 0xbeef);
        assert_eq!(back.hashbits(), 20);

        let bad = serde_json::from_str::<Fingerprint>(r#"{"hex":"0xfffff","hashbits":8}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_display_is_decimal() {
        let fp = Fingerprint::from_raw(1318951168287673739, 64).unwrap();
        assert_eq!(fp.to_string(), "1318951168287673739");
    }
}
