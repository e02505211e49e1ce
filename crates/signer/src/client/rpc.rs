//! JSON-RPC trait shared by the KMS client and server implementations.

use anyhow::Result;
use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::{ServerBuilder, ServerHandle};
use jsonrpsee::Methods;
use std::net::SocketAddr;
use tracing::info;

use crate::request_types::{
    CreateKeyRequest, CreateKeyResponse, GetPublicKeyRequest, GetPublicKeyResponse, SignRequest,
    SignResponse,
};

/// Glue for standing up a JSON-RPC server from its method set.
pub trait BuildableServer {
    fn addr(&self) -> SocketAddr;
    fn methods(self) -> Methods;
    async fn start(self) -> Result<ServerHandle>
    where
        Self: Sized,
    {
        let addr = self.addr();
        let rpc_server = ServerBuilder::new().build(addr).await?;
        let module = self.methods();
        let server_handle = rpc_server.start(module);
        info!(target: "rpc::kms", "Server started at {}", addr);
        Ok(server_handle)
    }
}

/// The remote KMS surface this crate consumes. Private key material stays
/// behind this boundary; only public-key retrieval and digest signing are
/// used on the signing hot path.
#[rpc(client, server)]
pub trait KmsApi {
    /// Health check endpoint that returns "OK" if the service is running
    #[method(name = "healthCheck")]
    async fn health_check(&self) -> RpcResult<String>;

    /// Returns the DER `SubjectPublicKeyInfo` for a key handle
    #[method(name = "getPublicKey")]
    async fn get_public_key(&self, req: GetPublicKeyRequest) -> RpcResult<GetPublicKeyResponse>;

    /// Signs a 32-byte digest, returning a DER `ECDSA-Sig-Value` with no
    /// recovery information
    #[method(name = "sign")]
    async fn sign(&self, req: SignRequest) -> RpcResult<SignResponse>;

    /// Provisions a new secp256k1 sign/verify key
    #[method(name = "createKey")]
    async fn create_key(&self, req: CreateKeyRequest) -> RpcResult<CreateKeyResponse>;
}
