//! Remote signing abstraction: the engine never holds a private key.
//! Grounded on `ord-rs`'s `ExternalSigner`/`Wallet` split (`wallet/mod.rs`),
//! which keeps signing behind an async trait so key custody lives outside
//! the transaction-building code.

use async_trait::async_trait;
use secp256k1::{ecdsa, schnorr, Message, PublicKey, XOnlyPublicKey, SECP256K1};

use crate::{EngineError, EngineResult};

/// Appended after a signature to select the sighash algorithm applied
/// when the spender verifies it. Only `SIGHASH_ALL` is used in this engine.
pub const SIGHASH_ALL: u8 = 0x01;

/// A key, addressed by an opaque identifier the remote signer understands
/// (e.g. a key name or derivation path). The engine never sees key material.
#[async_trait]
pub trait RemoteSigner: Send + Sync {
    /// Sign `digest` (a 32-byte sighash) with ECDSA, returning a DER-encoded
    /// signature.
    async fn sign_ecdsa(&self, key_id: &str, digest: &[u8; 32]) -> EngineResult<Vec<u8>>;

    /// Sign `digest` with Schnorr (BIP-340), returning a 64-byte signature.
    async fn sign_schnorr(&self, key_id: &str, digest: &[u8; 32]) -> EngineResult<Vec<u8>>;

    /// Return the public key material for `key_id`: a 33-byte compressed
    /// ECDSA key or a 32-byte x-only Schnorr key, as appropriate for the
    /// curve the caller is about to request a signature for.
    async fn public_key(&self, key_id: &str) -> EngineResult<Vec<u8>>;
}

/// A `RemoteSigner` backed by an HTTP signing service: POST digest + key
/// identifier, receive a signature. Grounded on `ord-rs`'s
/// `examples/utils/rpc_client.rs`, promoted from example code to a library
/// component for this engine's signer role.
pub struct HttpRemoteSigner {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemoteSigner {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn request_signature(&self, path: &str, key_id: &str, digest: &[u8; 32]) -> EngineResult<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            key_id: &'a str,
            digest: String,
        }
        #[derive(serde::Deserialize)]
        struct Resp {
            signature: String,
        }

        let resp: Resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&Req {
                key_id,
                digest: hex::encode(digest),
            })
            .send()
            .await?
            .json()
            .await?;

        crate::hex_codec::decode(&resp.signature)
    }
}

#[async_trait]
impl RemoteSigner for HttpRemoteSigner {
    async fn sign_ecdsa(&self, key_id: &str, digest: &[u8; 32]) -> EngineResult<Vec<u8>> {
        let sig_bytes = self.request_signature("/sign/ecdsa", key_id, digest).await?;
        let public_key = self.public_key(key_id).await?;
        verify_ecdsa(&public_key, digest, &sig_bytes)?;
        Ok(sig_bytes)
    }

    async fn sign_schnorr(&self, key_id: &str, digest: &[u8; 32]) -> EngineResult<Vec<u8>> {
        let sig_bytes = self.request_signature("/sign/schnorr", key_id, digest).await?;
        let public_key = self.public_key(key_id).await?;
        verify_schnorr(&public_key, digest, &sig_bytes)?;
        Ok(sig_bytes)
    }

    async fn public_key(&self, key_id: &str) -> EngineResult<Vec<u8>> {
        #[derive(serde::Deserialize)]
        struct Resp {
            public_key: String,
        }
        let resp: Resp = self
            .client
            .get(format!("{}/keys/{}", self.base_url, key_id))
            .send()
            .await?
            .json()
            .await?;
        crate::hex_codec::decode(&resp.public_key)
    }
}

/// Verify an ECDSA signature the remote signer returned, before trusting it
/// into a transaction — mirrors `ord-rs`'s post-signing `verify_ecdsa`
/// safety check.
pub fn verify_ecdsa(public_key: &[u8], digest: &[u8; 32], der_sig: &[u8]) -> EngineResult<()> {
    let pubkey = PublicKey::from_slice(public_key).map_err(|_| EngineError::InvalidPubkey)?;
    let message = Message::from_digest_slice(digest).map_err(|e| EngineError::CryptographicError {
        message: e.to_string(),
    })?;
    let sig = ecdsa::Signature::from_der(der_sig).map_err(|e| EngineError::CryptographicError {
        message: e.to_string(),
    })?;
    SECP256K1
        .verify_ecdsa(&message, &sig, &pubkey)
        .map_err(|e| EngineError::CryptographicError {
            message: format!("ecdsa signature verification failed: {e}"),
        })
}

/// Verify a Schnorr signature the remote signer returned.
pub fn verify_schnorr(x_only_public_key: &[u8], digest: &[u8; 32], sig_bytes: &[u8]) -> EngineResult<()> {
    let pubkey = XOnlyPublicKey::from_slice(x_only_public_key).map_err(|_| EngineError::InvalidPubkey)?;
    let message = Message::from_digest_slice(digest).map_err(|e| EngineError::CryptographicError {
        message: e.to_string(),
    })?;
    let sig = schnorr::Signature::from_slice(sig_bytes).map_err(|e| EngineError::CryptographicError {
        message: e.to_string(),
    })?;
    SECP256K1
        .verify_schnorr(&sig, &message, &pubkey)
        .map_err(|e| EngineError::CryptographicError {
            message: format!("schnorr signature verification failed: {e}"),
        })
}

/// Append the single-byte sighash type to a raw signature, producing the
/// bytes pushed into a signature script.
pub fn with_hash_type(mut signature: Vec<u8>, hash_type: u8) -> Vec<u8> {
    signature.push(hash_type);
    signature
}
