//! Trial public-key recovery, reconstructing the recovery id the KMS
//! never reports.
//!
//! A raw `(r, s)` pair corresponds to two possible public keys. The KMS
//! does not say which one signed, so both candidates are recovered
//! locally and matched against the known signer address. No network I/O
//! happens here; only public inputs are used.

use num_bigint::BigUint;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};

use crate::error::{ParseError, SignerError};
use crate::pubkey::{address_of, Address};
use crate::signature::to_fixed_bytes;

/// Resolves the EIP-155 `v` value for a canonicalized `(r, s)` over
/// `digest`, signed by the key behind `expected`.
///
/// Each candidate id in {0, 1} is folded as `v = chain_id * 2 + 35 + id`.
/// Exactly one candidate must recover to `expected`; zero or two matches
/// mean the signature was not produced over this digest by that key, and
/// the attempt fails rather than emitting a signature attributable to
/// the wrong signer.
pub fn resolve_v(
    expected: &Address,
    digest: &[u8; 32],
    r: &BigUint,
    s: &BigUint,
    chain_id: u64,
) -> Result<u64, SignerError> {
    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&to_fixed_bytes(r));
    compact[32..].copy_from_slice(&to_fixed_bytes(s));

    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(*digest);

    let mut resolved = None;
    let mut matched = 0usize;
    for (candidate, recovery_id) in [RecoveryId::Zero, RecoveryId::One].into_iter().enumerate() {
        let signature = RecoverableSignature::from_compact(&compact, recovery_id)
            .map_err(|_| SignerError::Parse(ParseError::ComponentOutOfRange))?;
        // Recovery failing means no curve point exists for this
        // candidate, which merely rules it out.
        let Ok(key) = secp.recover_ecdsa(&message, &signature) else {
            continue;
        };
        if address_of(&key) == *expected {
            matched += 1;
            resolved = Some(candidate as u64);
        }
    }

    match (matched, resolved) {
        (1, Some(id)) => Ok(chain_id * 2 + 35 + id),
        _ => Err(SignerError::SignatureMismatch {
            expected: expected.to_string(),
            matched,
        }),
    }
}
