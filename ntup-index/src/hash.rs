//! Scalar value hashing and the combined-key fold.

use std::hash::Hasher;

use ntup_types::Value;
use rustc_hash::FxHasher;

/// Hash one scalar value to a `u64`, deterministically.
///
/// Integers hash to their own bits (sign-extended for signed kinds), so
/// equal integer keys of one kind always collide with themselves and
/// nothing about the distribution is hidden from the fold. Strings hash by
/// content. Floats hash their IEEE bits with `-0.0` normalized to `+0.0`.
pub fn hash_value(value: &Value) -> u64 {
    match value {
        Value::Bool(v) => *v as u64,
        Value::I8(v) => *v as i64 as u64,
        Value::I16(v) => *v as i64 as u64,
        Value::I32(v) => *v as i64 as u64,
        Value::I64(v) => *v as u64,
        Value::U8(v) => *v as u64,
        Value::U16(v) => *v as u64,
        Value::U32(v) => *v as u64,
        Value::U64(v) => *v,
        Value::F32(v) => {
            let v = if *v == 0.0 { 0.0 } else { *v };
            v.to_bits() as u64
        }
        Value::F64(v) => {
            let v = if *v == 0.0 { 0.0 } else { *v };
            v.to_bits()
        }
        Value::Char(v) => *v as u64,
        Value::String(v) => {
            let mut hasher = FxHasher::default();
            hasher.write(v.as_bytes());
            hasher.finish()
        }
    }
}

/// Fold one field hash into the combined key hash.
///
/// This is the fixed wire contract for combined keys:
///
/// ```text
/// acc = acc XOR (h + 0x9E3779B9 + (acc << 6) + (acc >> 2))
/// ```
#[inline]
pub fn combine_hash(acc: u64, h: u64) -> u64 {
    acc ^ (h
        .wrapping_add(0x9E37_79B9)
        .wrapping_add(acc << 6)
        .wrapping_add(acc >> 2))
}

/// Left-fold the combined hash of an ordered key tuple, starting from zero.
pub fn combined_key_hash(values: &[Value]) -> u64 {
    values
        .iter()
        .fold(0, |acc, value| combine_hash(acc, hash_value(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // The fold formula is a fixed contract; these literals pin it.
    #[test]
    fn combined_fold_is_pinned() {
        assert_eq!(combine_hash(0, 0), 0x9E37_79B9);
        assert_eq!(combine_hash(0, 7), 0x9E37_79C0);

        // acc = 5: 5 ^ (11 + 0x9E3779B9 + (5 << 6) + (5 >> 2))
        let expected = 5u64 ^ (11 + 0x9E37_79B9 + (5u64 << 6) + (5u64 >> 2));
        assert_eq!(combine_hash(5, 11), expected);

        let keys = [Value::U64(2), Value::U64(1)];
        let manual = combine_hash(combine_hash(0, 2), 1);
        assert_eq!(combined_key_hash(&keys), manual);
    }

    #[test]
    fn key_order_matters() {
        let a = combined_key_hash(&[Value::U64(2), Value::U64(1)]);
        let b = combined_key_hash(&[Value::U64(1), Value::U64(2)]);
        assert_ne!(a, b);
    }

    #[test]
    fn integer_hashes_are_bit_exact() {
        assert_eq!(hash_value(&Value::U64(42)), 42);
        assert_eq!(hash_value(&Value::I32(-1)), u64::MAX);
        assert_eq!(hash_value(&Value::I8(-1)), u64::MAX);
        assert_eq!(hash_value(&Value::Bool(true)), 1);
        assert_eq!(hash_value(&Value::Char('A')), 65);
    }

    #[test]
    fn string_hashes_by_content() {
        let a = hash_value(&Value::String("run".to_string()));
        let b = hash_value(&Value::String("run".to_string()));
        let c = hash_value(&Value::String("event".to_string()));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_encodings_collapse() {
        assert_eq!(
            hash_value(&Value::F64(-0.0)),
            hash_value(&Value::F64(0.0))
        );
        assert_eq!(hash_value(&Value::F64(2.0)), 2.0f64.to_bits());
    }
}
