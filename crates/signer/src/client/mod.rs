//! Client plumbing for the remote KMS endpoint: the JSON-RPC trait, an
//! HTTP client builder, and an in-process mock server for tests.

mod client;
pub mod mock_server;
pub mod rpc;

pub use client::{
    KmsClient, KmsClientBuilder, KMS_DEFAULT_ENDPOINT_ADDR, KMS_DEFAULT_ENDPOINT_PORT,
    KMS_DEFAULT_TIMEOUT_SECONDS,
};
pub use mock_server::MockKmsServer;
