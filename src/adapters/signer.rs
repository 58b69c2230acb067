//! Wallet adapter for authentication signing.
//!
//! # Security
//! - Private keys are never logged or serialized
//! - The SDK only ever requests message signatures; transaction signing
//!   lives behind the caller's `TxExecutor`

use alloy::primitives::{Address, Bytes};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;

use crate::error::{SdkError, SdkResult};

/// Signing surface the flows require from a wallet.
#[async_trait]
pub trait SignerAdapter: Send + Sync {
    /// The wallet's address.
    fn address(&self) -> Address;

    /// Sign a raw string (Ethereum personal-sign semantics).
    async fn sign_message(&self, message: &str) -> SdkResult<Bytes>;
}

/// In-process signer over a hex private key, for tools and tests.
///
/// Applications integrating a real wallet should implement [`SignerAdapter`]
/// over their own signing stack instead.
pub struct LocalSigner {
    signer: PrivateKeySigner,
}

impl LocalSigner {
    /// Create a signer from a hex-encoded private key (with or without the
    /// `0x` prefix).
    pub fn from_private_key(private_key_hex: &str) -> SdkResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| SdkError::Signature(format!("invalid private key format: {}", e)))?;

        tracing::debug!(address = %signer.address(), "local signer initialized");
        Ok(Self { signer })
    }
}

#[async_trait]
impl SignerAdapter for LocalSigner {
    fn address(&self) -> Address {
        self.signer.address()
    }

    async fn sign_message(&self, message: &str) -> SdkResult<Bytes> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| SdkError::Signature(format!("message signing failed: {}", e)))?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.signer.address())
            .finish()
    }
}
