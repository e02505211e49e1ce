//! Wire types for the remote KMS JSON-RPC surface.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GetPublicKeyRequest {
    pub key_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GetPublicKeyResponse {
    /// DER `SubjectPublicKeyInfo` wrapping the secp256k1 public key.
    pub public_key: Vec<u8>,
}

/// How the KMS should treat the message bytes.
///
/// Digest mode is mandatory on the signing path: in raw mode the service
/// hashes the message itself and the signature no longer covers the
/// transaction digest.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    #[serde(rename = "DIGEST")]
    Digest,
    #[serde(rename = "RAW")]
    Raw,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum SigningAlgorithm {
    #[serde(rename = "ECDSA_SHA_256")]
    EcdsaSha256,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SignRequest {
    pub key_id: String,
    /// Keccak-256 digest of the RLP-serialized unsigned transaction.
    pub digest: Vec<u8>,
    pub message_type: MessageType,
    pub signing_algorithm: SigningAlgorithm,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SignResponse {
    /// DER `ECDSA-Sig-Value`, no recovery information attached.
    pub signature: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum KeySpec {
    #[serde(rename = "ECC_SECG_P256K1")]
    EccSecgP256k1,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum KeyUsage {
    #[serde(rename = "SIGN_VERIFY")]
    SignVerify,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateKeyRequest {
    pub key_spec: KeySpec,
    pub key_usage: KeyUsage,
}

impl Default for CreateKeyRequest {
    fn default() -> Self {
        Self {
            key_spec: KeySpec::EccSecgP256k1,
            key_usage: KeyUsage::SignVerify,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateKeyResponse {
    pub key_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_request_uses_wire_spellings() {
        let req = SignRequest {
            key_id: "test-key-1".to_string(),
            digest: vec![0u8; 32],
            message_type: MessageType::Digest,
            signing_algorithm: SigningAlgorithm::EcdsaSha256,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["message_type"], "DIGEST");
        assert_eq!(json["signing_algorithm"], "ECDSA_SHA_256");
    }

    #[test]
    fn create_key_defaults_to_secp256k1_signing() {
        let json = serde_json::to_value(CreateKeyRequest::default()).unwrap();
        assert_eq!(json["key_spec"], "ECC_SECG_P256K1");
        assert_eq!(json["key_usage"], "SIGN_VERIFY");
    }
}
