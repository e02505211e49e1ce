//! Decoding of the KMS public-key envelope and Ethereum address
//! derivation.
//!
//! The KMS hands back a DER `SubjectPublicKeyInfo`; everything downstream
//! works on the raw 64-byte uncompressed point it wraps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::der;
use crate::error::ParseError;

/// Uncompressed secp256k1 point (x ‖ y) with the SEC1 `0x04` prefix
/// stripped.
pub type RawPublicKey = [u8; 64];

/// DER `SubjectPublicKeyInfo` header for an uncompressed secp256k1 point:
/// outer SEQUENCE, algorithm SEQUENCE with the id-ecPublicKey and
/// secp256k1 OIDs, then the BIT STRING tag with a zero unused-bit count.
const SPKI_SECP256K1_HEADER: [u8; 23] = [
    0x30, 0x56, 0x30, 0x10, 0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01, 0x06, 0x05,
    0x2b, 0x81, 0x04, 0x00, 0x0a, 0x03, 0x42, 0x00,
];

/// A 20-byte Ethereum address.
///
/// Compares by bytes, so two textual renderings that differ only in case
/// are equal once parsed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case rendering: a hex character is uppercased when
    /// the nibble at its index in `keccak256(lowercase_hex)` is >= 8.
    pub fn to_checksum_string(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|_| ParseError::AddressFormat)?;
        let bytes: [u8; 20] = bytes.try_into().map_err(|_| ParseError::AddressFormat)?;
        Ok(Self(bytes))
    }
}

/// Decodes the DER `SubjectPublicKeyInfo` envelope returned by the KMS
/// into the raw 64-byte public key.
///
/// Structure: `SEQUENCE { SEQUENCE { OID ... }, BIT STRING }`, where the
/// bit string holds the 65-byte uncompressed point.
pub fn decode_public_key(envelope: &[u8]) -> Result<RawPublicKey, ParseError> {
    let (spki, rest) = der::read_element(envelope, der::TAG_SEQUENCE)?;
    if !rest.is_empty() {
        return Err(ParseError::TrailingBytes);
    }
    let (algorithm, spki) = der::read_element(spki, der::TAG_SEQUENCE)?;
    // The algorithm identifier must open with an OID; which curve it
    // names is the KMS's contract, not re-checked here.
    der::read_element(algorithm, der::TAG_OBJECT_ID)?;
    let (bits, rest) = der::read_element(spki, der::TAG_BIT_STRING)?;
    if !rest.is_empty() {
        return Err(ParseError::TrailingBytes);
    }
    // BIT STRING contents open with the unused-bit count, zero for keys.
    let (&unused, point) = bits.split_first().ok_or(ParseError::Truncated)?;
    if unused != 0 {
        return Err(ParseError::BadLength);
    }
    if point.len() != 65 {
        return Err(ParseError::PointLength(point.len()));
    }
    let (&prefix, key) = point.split_first().ok_or(ParseError::Truncated)?;
    if prefix != 0x04 {
        return Err(ParseError::PointPrefix);
    }
    let mut raw = [0u8; 64];
    raw.copy_from_slice(key);
    Ok(raw)
}

/// Wraps a public key in the `SubjectPublicKeyInfo` envelope the KMS
/// emits. The inverse of [`decode_public_key`]; used by the mock server.
pub fn encode_public_key(key: &secp256k1::PublicKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(SPKI_SECP256K1_HEADER.len() + 65);
    out.extend_from_slice(&SPKI_SECP256K1_HEADER);
    out.extend_from_slice(&key.serialize_uncompressed());
    out
}

/// Keccak-256 over the 64-byte key; the address is the last 20 bytes.
pub fn derive_address(key: &RawPublicKey) -> Address {
    let hash = Keccak256::digest(key);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    Address(addr)
}

/// Address of an in-memory secp256k1 public key. Used on the trial keys
/// recovered during `v` resolution.
pub fn address_of(key: &secp256k1::PublicKey) -> Address {
    let uncompressed = key.serialize_uncompressed();
    let mut raw = [0u8; 64];
    raw.copy_from_slice(&uncompressed[1..]);
    derive_address(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const SAMPLE_SPKI_HEX: &str = "3056301006072a8648ce3d020106052b8104000a03420004\
        8e76821eb4d77fd30223ca971c49738eb5b5b71eabe93f96b348fdce788ae5a0\
        f2f39ac91dbfe47a4b21d00a1e8228654a73bcbfd0e154e13d6e7717ba0a4146";
    const SAMPLE_ADDRESS: &str = "0x1934aa962cd62afc5541e4a62b6dd3337abaeabd";

    #[test]
    fn decodes_spki_envelope() {
        let envelope = hex::decode(SAMPLE_SPKI_HEX).unwrap();
        let raw = decode_public_key(&envelope).unwrap();
        assert_eq!(
            hex::encode(&raw[..32]),
            "8e76821eb4d77fd30223ca971c49738eb5b5b71eabe93f96b348fdce788ae5a0"
        );
        assert_eq!(derive_address(&raw), Address::from_str(SAMPLE_ADDRESS).unwrap());
    }

    #[test]
    fn encode_decode_round_trip() {
        let key = secp256k1::PublicKey::from_str(
            "028e76821eb4d77fd30223ca971c49738eb5b5b71eabe93f96b348fdce788ae5a0",
        )
        .unwrap();
        let envelope = encode_public_key(&key);
        assert_eq!(hex::encode(&envelope), SAMPLE_SPKI_HEX);
        let raw = decode_public_key(&envelope).unwrap();
        assert_eq!(&key.serialize_uncompressed()[1..], &raw[..]);
    }

    #[test]
    fn rejects_truncated_and_garbage_envelopes() {
        let envelope = hex::decode(SAMPLE_SPKI_HEX).unwrap();
        assert!(decode_public_key(&envelope[..40]).is_err());
        assert!(decode_public_key(&[]).is_err());
        assert!(decode_public_key(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }

    #[test]
    fn rejects_wrong_point_length() {
        // A well-formed envelope holding a 33-byte compressed point.
        let mut envelope = vec![0x30, 0x36, 0x30, 0x10];
        envelope.extend_from_slice(&hex::decode("06072a8648ce3d020106052b8104000a").unwrap());
        envelope.extend_from_slice(&[0x03, 0x22, 0x00, 0x02]);
        envelope.extend_from_slice(&[0x11; 32]);
        assert_eq!(
            decode_public_key(&envelope),
            Err(ParseError::PointLength(33))
        );
    }

    #[test]
    fn zero_key_address_is_stable() {
        // keccak256(64 zero bytes) = ad3228b6...97ba5fb5; last 20 bytes.
        let addr = derive_address(&[0u8; 64]);
        assert_eq!(addr.to_string(), "0x3f17f1962b36e491b30a40b2405849e597ba5fb5");
        assert_eq!(
            addr.to_checksum_string(),
            "0x3f17f1962B36e491b30A40b2405849e597Ba5FB5"
        );
    }

    #[test]
    fn checksum_matches_eip55_vectors() {
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0x1934aA962cD62AFc5541E4A62b6Dd3337AbAEabd",
        ] {
            let parsed = Address::from_str(expected).unwrap();
            assert_eq!(parsed.to_checksum_string(), expected);
        }
    }

    #[test]
    fn parses_addresses_case_insensitively() {
        let lower = Address::from_str(SAMPLE_ADDRESS).unwrap();
        let upper = Address::from_str(&SAMPLE_ADDRESS.to_uppercase().replace("0X", "0x")).unwrap();
        assert_eq!(lower, upper);
        assert!(Address::from_str("0x1234").is_err());
        assert!(Address::from_str("not hex").is_err());
    }
}
