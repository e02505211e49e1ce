//! In-process KMS double for tests and local development.
//!
//! Holds plain secp256k1 secret keys in memory, which is exactly what a
//! real KMS never does. Only the wire contract is faithful: DER
//! envelopes in both directions, digest-mode signing, and opaque key
//! handles.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::anyhow;
use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::Methods;
use rand::RngCore;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use super::rpc::{BuildableServer, KmsApiServer};
use crate::error::{rpc_bad_argument_error, rpc_unknown_key_error};
use crate::pubkey::encode_public_key;
use crate::request_types::{
    CreateKeyRequest, CreateKeyResponse, GetPublicKeyRequest, GetPublicKeyResponse, MessageType,
    SignRequest, SignResponse,
};

/// Key handle the mock seeds at startup.
pub const SAMPLE_KEY_ID: &str = "test-key-1";

/// Returns a sample secp256k1 secret key for testing purposes.
pub fn get_unsecure_sample_secp256k1_sk() -> SecretKey {
    SecretKey::from_str("311d54d3bf8359c70827122a44a7b4458733adce3c51c6b59d9acfce85e07505")
        .unwrap()
}

pub struct MockKmsServer {
    addr: SocketAddr,
    keys: Mutex<HashMap<String, SecretKey>>,
}

impl MockKmsServer {
    pub fn new(addr: SocketAddr) -> Self {
        let mut keys = HashMap::new();
        keys.insert(SAMPLE_KEY_ID.to_string(), get_unsecure_sample_secp256k1_sk());
        Self {
            addr,
            keys: Mutex::new(keys),
        }
    }

    fn lookup(&self, key_id: &str) -> Result<SecretKey, jsonrpsee::types::ErrorObjectOwned> {
        self.keys
            .lock()
            .unwrap()
            .get(key_id)
            .copied()
            .ok_or_else(|| rpc_unknown_key_error(key_id))
    }
}

#[async_trait]
impl KmsApiServer for MockKmsServer {
    async fn health_check(&self) -> RpcResult<String> {
        Ok("OK".to_string())
    }

    async fn get_public_key(&self, req: GetPublicKeyRequest) -> RpcResult<GetPublicKeyResponse> {
        let sk = self.lookup(&req.key_id)?;
        let secp = Secp256k1::signing_only();
        let public_key = PublicKey::from_secret_key(&secp, &sk);
        Ok(GetPublicKeyResponse {
            public_key: encode_public_key(&public_key),
        })
    }

    async fn sign(&self, req: SignRequest) -> RpcResult<SignResponse> {
        if req.message_type != MessageType::Digest {
            return Err(rpc_bad_argument_error(anyhow!(
                "mock only supports digest-mode signing"
            )));
        }
        let digest: [u8; 32] = req
            .digest
            .as_slice()
            .try_into()
            .map_err(|_| rpc_bad_argument_error(anyhow!("digest must be 32 bytes")))?;
        let sk = self.lookup(&req.key_id)?;
        let secp = Secp256k1::signing_only();
        let signature = secp.sign_ecdsa(&Message::from_digest(digest), &sk);
        Ok(SignResponse {
            signature: signature.serialize_der().to_vec(),
        })
    }

    async fn create_key(&self, _req: CreateKeyRequest) -> RpcResult<CreateKeyResponse> {
        let mut seed = [0u8; 32];
        let sk = loop {
            rand::rng().fill_bytes(&mut seed);
            if let Ok(sk) = SecretKey::from_slice(&seed) {
                break sk;
            }
        };
        let mut id = [0u8; 8];
        rand::rng().fill_bytes(&mut id);
        let key_id = format!("mock-{}", hex::encode(id));
        self.keys.lock().unwrap().insert(key_id.clone(), sk);
        Ok(CreateKeyResponse { key_id })
    }
}

impl BuildableServer for MockKmsServer {
    fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn methods(self) -> Methods {
        KmsApiServer::into_rpc(self).into()
    }
}
