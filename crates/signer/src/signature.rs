//! Decoding and canonicalization of the KMS signature envelope.
//!
//! The KMS returns a DER `ECDSA-Sig-Value` with no recovery information
//! and no low-s guarantee. This module turns it into a range-checked
//! `(r, s)` pair and folds `s` into its canonical form.

use num_bigint::BigUint;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::der;
use crate::error::ParseError;

/// Order of the secp256k1 group, `n`.
pub static CURVE_ORDER: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(
        b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
        16,
    )
    .expect("curve order constant")
});

/// `n / 2`, the upper bound for a canonical `s`.
static CURVE_ORDER_HALF: Lazy<BigUint> = Lazy::new(|| &*CURVE_ORDER >> 1usize);

/// The finished signature tuple handed to the transaction-assembly
/// collaborator. `r` and `s` are 32-byte big-endian; `v` carries the
/// EIP-155 recovery information (`chain_id * 2 + 35` or `+ 36`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureComponents {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u64,
}

/// Decodes `ECDSA-Sig-Value ::= SEQUENCE { INTEGER r, INTEGER s }`.
///
/// DER prepends a zero byte to an INTEGER whose high bit would otherwise
/// read as a sign bit; `BigUint::from_bytes_be` drops that padding
/// without changing the numeric value. Components must lie in `[1, n)`.
pub fn decode_signature(envelope: &[u8]) -> Result<(BigUint, BigUint), ParseError> {
    let (body, rest) = der::read_element(envelope, der::TAG_SEQUENCE)?;
    if !rest.is_empty() {
        return Err(ParseError::TrailingBytes);
    }
    let (r, body) = der::read_element(body, der::TAG_INTEGER)?;
    let (s, body) = der::read_element(body, der::TAG_INTEGER)?;
    if !body.is_empty() {
        return Err(ParseError::TrailingBytes);
    }
    if r.is_empty() || s.is_empty() {
        return Err(ParseError::Truncated);
    }
    let r = BigUint::from_bytes_be(r);
    let s = BigUint::from_bytes_be(s);
    if r.bits() == 0 || r >= *CURVE_ORDER || s.bits() == 0 || s >= *CURVE_ORDER {
        return Err(ParseError::ComponentOutOfRange);
    }
    Ok((r, s))
}

/// Folds `s` into low-s form: when `s > n / 2` it is replaced by `n - s`.
///
/// Both values verify, but chain validators accept only the low one, so
/// a given (digest, key) pair keeps a single canonical representation.
pub fn canonicalize_s(s: BigUint) -> BigUint {
    if s > *CURVE_ORDER_HALF {
        &*CURVE_ORDER - s
    } else {
        s
    }
}

/// Fixed 32-byte big-endian form of a signature component.
pub fn to_fixed_bytes(value: &BigUint) -> [u8; 32] {
    let bytes = value.to_bytes_be();
    debug_assert!(bytes.len() <= 32, "component exceeds 256 bits");
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// DER-encodes a `SEQUENCE { INTEGER, INTEGER }` the way the KMS
    /// does, including sign-bit padding.
    fn encode_sig(r: &BigUint, s: &BigUint) -> Vec<u8> {
        fn encode_int(out: &mut Vec<u8>, value: &BigUint) {
            let mut bytes = value.to_bytes_be();
            if bytes[0] & 0x80 != 0 {
                bytes.insert(0, 0x00);
            }
            out.push(0x02);
            out.push(bytes.len() as u8);
            out.extend_from_slice(&bytes);
        }
        let mut body = Vec::new();
        encode_int(&mut body, r);
        encode_int(&mut body, s);
        let mut out = vec![0x30, body.len() as u8];
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn decodes_small_components() {
        let envelope = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        let (r, s) = decode_signature(&envelope).unwrap();
        assert_eq!(r, BigUint::from(1u8));
        assert_eq!(s, BigUint::from(2u8));
    }

    #[test]
    fn strips_sign_bit_padding() {
        // 129 needs a 0x00 pad byte; both encodings carry the same value.
        let padded = [0x30, 0x07, 0x02, 0x02, 0x00, 0x81, 0x02, 0x01, 0x01];
        let (r, _) = decode_signature(&padded).unwrap();
        assert_eq!(r, BigUint::from(129u8));
    }

    #[test]
    fn decodes_reference_envelope() {
        let envelope = hex::decode(
            "304402204247b8b2eb6625f56e2445b00a4c7d7e7a343d1370e635342a4cc67cecee2b17\
             022041b8d55209eb31e33bd5e7e04fe650ca4bdfbea9aeda92912ec538b8bf7e3488",
        )
        .unwrap();
        let (r, s) = decode_signature(&envelope).unwrap();
        assert_eq!(
            hex::encode(to_fixed_bytes(&r)),
            "4247b8b2eb6625f56e2445b00a4c7d7e7a343d1370e635342a4cc67cecee2b17"
        );
        assert_eq!(
            hex::encode(to_fixed_bytes(&s)),
            "41b8d55209eb31e33bd5e7e04fe650ca4bdfbea9aeda92912ec538b8bf7e3488"
        );
    }

    #[test]
    fn round_trips_through_encoder() {
        let r = BigUint::parse_bytes(b"a1b2c3d4e5f6a7b8", 16).unwrap();
        let s = BigUint::from(0x81u8);
        let (r2, s2) = decode_signature(&encode_sig(&r, &s)).unwrap();
        assert_eq!((r, s), (r2, s2));
    }

    #[test]
    fn rejects_garbage_and_truncation() {
        assert!(decode_signature(&[]).is_err());
        assert!(decode_signature(&[0x30, 0x03, 0x02, 0x01]).is_err());
        assert!(decode_signature(&[0x02, 0x01, 0x01]).is_err());
        // Sequence with a single integer.
        assert!(decode_signature(&[0x30, 0x03, 0x02, 0x01, 0x01]).is_err());
    }

    #[test]
    fn rejects_out_of_range_components() {
        let zero_r = [0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x02];
        assert_eq!(
            decode_signature(&zero_r),
            Err(ParseError::ComponentOutOfRange)
        );
        let envelope = encode_sig(&CURVE_ORDER, &BigUint::from(2u8));
        assert_eq!(
            decode_signature(&envelope),
            Err(ParseError::ComponentOutOfRange)
        );
    }

    #[test]
    fn canonicalization_folds_high_s() {
        let high = &*CURVE_ORDER - BigUint::from(5u8);
        let low = canonicalize_s(high);
        assert_eq!(low, BigUint::from(5u8));
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let half = &*CURVE_ORDER >> 1usize;
        for s in [BigUint::from(1u8), half.clone(), &half + BigUint::from(1u8)] {
            let once = canonicalize_s(s);
            let twice = canonicalize_s(once.clone());
            assert_eq!(once, twice);
            assert!(once <= half);
        }
    }

    #[test]
    fn fixed_bytes_left_pads() {
        let bytes = to_fixed_bytes(&BigUint::from(0xabcdu32));
        assert_eq!(&bytes[..30], &[0u8; 30]);
        assert_eq!(&bytes[30..], &[0xab, 0xcd]);
    }
}
