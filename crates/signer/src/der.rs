//! Minimal DER reader for the two fixed envelopes the KMS returns:
//! `SubjectPublicKeyInfo` (RFC 5480) and `ECDSA-Sig-Value` (RFC 3279).

use crate::error::ParseError;

pub(crate) const TAG_SEQUENCE: u8 = 0x30;
pub(crate) const TAG_INTEGER: u8 = 0x02;
pub(crate) const TAG_BIT_STRING: u8 = 0x03;
pub(crate) const TAG_OBJECT_ID: u8 = 0x06;

/// Reads one TLV element off the front of `input`, checking the tag.
/// Returns the element contents and the remainder of the input.
pub(crate) fn read_element(input: &[u8], tag: u8) -> Result<(&[u8], &[u8]), ParseError> {
    let (&found, rest) = input.split_first().ok_or(ParseError::Truncated)?;
    if found != tag {
        return Err(ParseError::UnexpectedTag {
            expected: tag,
            found,
        });
    }
    let (&first, rest) = rest.split_first().ok_or(ParseError::Truncated)?;
    let (len, rest) = match first {
        n @ 0x00..=0x7f => (n as usize, rest),
        // Long form. Both envelopes fit comfortably in two length bytes.
        0x81 => {
            let (&n, rest) = rest.split_first().ok_or(ParseError::Truncated)?;
            (n as usize, rest)
        }
        0x82 => {
            if rest.len() < 2 {
                return Err(ParseError::Truncated);
            }
            (u16::from_be_bytes([rest[0], rest[1]]) as usize, &rest[2..])
        }
        _ => return Err(ParseError::BadLength),
    };
    if rest.len() < len {
        return Err(ParseError::Truncated);
    }
    Ok(rest.split_at(len))
}
