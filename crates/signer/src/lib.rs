#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod client;
mod der;
pub mod error;
pub mod pubkey;
pub mod recovery;
pub mod request_types;
pub mod signature;
pub mod signer;

pub use client::*;
pub use error::*;
pub use pubkey::*;
pub use recovery::*;
pub use request_types::*;
pub use signature::*;
pub use signer::*;
