//! Error taxonomy for the signing pipeline, plus JSON-RPC error-object
//! helpers for server-side implementations of the KMS surface.

use anyhow::Error;
use jsonrpsee::core::ClientError;
use thiserror::Error as ThisError;

/// Failures surfaced by the signing pipeline. Every failure propagates to
/// the immediate caller; nothing is retried, logged-and-suppressed, or
/// recovered internally.
#[derive(Debug, ThisError)]
pub enum SignerError {
    /// A required identifier was missing. Detected before any remote call.
    #[error("missing required argument: {0}")]
    InvalidArgument(&'static str),

    /// A DER envelope returned by the KMS could not be decoded.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The remote KMS call failed, was denied, or timed out.
    #[error("remote KMS call failed: {0}")]
    Remote(#[from] ClientError),

    /// The trial recovery ids did not single out the expected signer.
    /// Indicates a wrong key handle, wrong digest, or a tampered
    /// signature; fatal for the attempt.
    #[error("{matched} recovery candidate(s) matched signer {expected}, expected exactly one")]
    SignatureMismatch { expected: String, matched: usize },
}

/// Errors produced while decoding a DER envelope. No partial value is
/// ever returned alongside one of these.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ParseError {
    #[error("unexpected end of DER input")]
    Truncated,

    #[error("expected DER tag {expected:#04x}, found {found:#04x}")]
    UnexpectedTag { expected: u8, found: u8 },

    #[error("unsupported DER length encoding")]
    BadLength,

    #[error("trailing bytes after DER element")]
    TrailingBytes,

    #[error("uncompressed point is {0} bytes, expected 65")]
    PointLength(usize),

    #[error("public key bit string is missing the 0x04 uncompressed prefix")]
    PointPrefix,

    #[error("signature component out of range for secp256k1")]
    ComponentOutOfRange,

    #[error("address must be 20 hex-encoded bytes")]
    AddressFormat,
}

/// Convert a bad argument error into a JSON-RPC error response
pub fn rpc_bad_argument_error(e: Error) -> jsonrpsee::types::ErrorObjectOwned {
    jsonrpsee::types::ErrorObject::owned(
        jsonrpsee::types::error::INVALID_PARAMS_CODE,
        format!("Invalid Argument: {:?}", e),
        None::<()>,
    )
}

/// Convert an unknown key handle into a JSON-RPC error response
pub fn rpc_unknown_key_error(key_id: &str) -> jsonrpsee::types::ErrorObjectOwned {
    jsonrpsee::types::ErrorObject::owned(
        jsonrpsee::types::error::INVALID_PARAMS_CODE,
        format!("Key '{}' not found", key_id),
        None::<()>,
    )
}
