//! The orchestrator tying remote KMS round-trips to the local codec and
//! recovery steps.

use tracing::debug;

use crate::client::rpc::KmsApiClient;
use crate::error::SignerError;
use crate::pubkey::{decode_public_key, derive_address, Address};
use crate::recovery::resolve_v;
use crate::request_types::{GetPublicKeyRequest, MessageType, SignRequest, SigningAlgorithm};
use crate::signature::{canonicalize_s, decode_signature, to_fixed_bytes, SignatureComponents};

/// Signs transaction digests with a key that never leaves the remote KMS.
///
/// Holds only the client handle. Signing operations share no mutable
/// state, so a single instance can serve concurrent callers; retries,
/// timeouts, and cancellation are the transport's responsibility.
#[derive(Debug, Clone)]
pub struct KmsSigner<C> {
    client: C,
}

impl<C> KmsSigner<C>
where
    C: KmsApiClient + Send + Sync,
{
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetches the public key behind `key_id` and derives its address.
    pub async fn get_address(&self, key_id: &str) -> Result<Address, SignerError> {
        if key_id.is_empty() {
            return Err(SignerError::InvalidArgument("key id"));
        }
        let response = self
            .client
            .get_public_key(GetPublicKeyRequest {
                key_id: key_id.to_owned(),
            })
            .await?;
        let raw = decode_public_key(&response.public_key)?;
        Ok(derive_address(&raw))
    }

    /// Signs a 32-byte transaction digest and returns the `{r, s, v}`
    /// tuple for the caller to merge into the signed transaction.
    ///
    /// `signer` must be the address of the key behind `key_id`; it
    /// anchors the recovery-id search. The digest is sent in digest mode
    /// so the KMS does not hash it a second time.
    pub async fn sign_digest(
        &self,
        digest: [u8; 32],
        signer: &Address,
        key_id: &str,
        chain_id: u64,
    ) -> Result<SignatureComponents, SignerError> {
        if key_id.is_empty() {
            return Err(SignerError::InvalidArgument("key id"));
        }
        let response = self
            .client
            .sign(SignRequest {
                key_id: key_id.to_owned(),
                digest: digest.to_vec(),
                message_type: MessageType::Digest,
                signing_algorithm: SigningAlgorithm::EcdsaSha256,
            })
            .await?;
        let (r, s) = decode_signature(&response.signature)?;
        let s = canonicalize_s(s);
        let v = resolve_v(signer, &digest, &r, &s, chain_id)?;
        debug!(target: "kms::signer", %signer, chain_id, v, "resolved recovery id");
        Ok(SignatureComponents {
            r: to_fixed_bytes(&r),
            s: to_fixed_bytes(&s),
            v,
        })
    }

    /// Provisions a fresh secp256k1 sign/verify key inside the KMS and
    /// returns its handle. Not part of the signing hot path.
    pub async fn create_key(&self) -> Result<String, SignerError> {
        let response = self
            .client
            .create_key(crate::request_types::CreateKeyRequest::default())
            .await?;
        Ok(response.key_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::KmsClientBuilder;

    #[tokio::test]
    async fn missing_key_id_fails_before_any_remote_call() {
        // Nothing listens on this endpoint; the checks must fire first.
        let client = KmsClientBuilder::new().url("http://127.0.0.1:1").build().unwrap();
        let signer = KmsSigner::new(client);
        assert!(matches!(
            signer.get_address("").await,
            Err(SignerError::InvalidArgument("key id"))
        ));
        let address = derive_address(&[0u8; 64]);
        assert!(matches!(
            signer.sign_digest([0u8; 32], &address, "", 1).await,
            Err(SignerError::InvalidArgument("key id"))
        ));
    }
}
