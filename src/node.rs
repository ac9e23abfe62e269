//! Node RPC client: UTXO/balance lookups and transaction submission.
//! Grounded on `ord-rs`'s `examples/utils/rpc_client.rs`, promoted from
//! example code into a library component since this engine has no CLI
//! examples of its own to keep it confined to.

use async_trait::async_trait;
use serde::Deserialize;

use crate::transaction::{Outpoint, ScriptPublicKey, Transaction, Utxo};
use crate::{EngineError, EngineResult};

/// An address's balance, split into spendable and not-yet-confirmed sompi.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub confirmed: u64,
    pub pending: u64,
}

#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn get_utxos(&self, address: &str) -> EngineResult<Vec<Utxo>>;
    async fn get_balance(&self, address: &str) -> EngineResult<Balance>;
    async fn submit_transaction(&self, tx: &Transaction) -> EngineResult<String>;
}

pub struct HttpNodeClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpNodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct UtxoEntryResponse {
    #[serde(rename = "transactionId")]
    transaction_id: String,
    index: u32,
    amount: u64,
    #[serde(rename = "scriptPublicKey")]
    script_public_key: ScriptPublicKeyResponse,
}

#[derive(Deserialize)]
struct ScriptPublicKeyResponse {
    version: u16,
    #[serde(rename = "scriptPublicKey")]
    script: String,
}

#[derive(Deserialize)]
struct BalanceResponse {
    confirmed: u64,
    pending: u64,
}

#[derive(serde::Serialize)]
struct SubmitRequest {
    transaction: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(rename = "transactionId")]
    transaction_id: String,
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn get_utxos(&self, address: &str) -> EngineResult<Vec<Utxo>> {
        let entries: Vec<UtxoEntryResponse> = self
            .client
            .get(format!("{}/addresses/{}/utxos", self.base_url, address))
            .send()
            .await?
            .json()
            .await?;

        entries
            .into_iter()
            .map(|entry| {
                let mut txid = [0u8; 32];
                let decoded = crate::hex_codec::decode(&entry.transaction_id)?;
                if decoded.len() != 32 {
                    return Err(EngineError::InvalidTransaction {
                        message: "node returned malformed transaction id".to_string(),
                    });
                }
                txid.copy_from_slice(&decoded);

                Ok(Utxo {
                    outpoint: Outpoint {
                        transaction_id: txid,
                        index: entry.index,
                    },
                    amount: entry.amount,
                    script_public_key: ScriptPublicKey::new(
                        entry.script_public_key.version,
                        crate::hex_codec::decode(&entry.script_public_key.script)?,
                    ),
                    address: address.to_string(),
                })
            })
            .collect()
    }

    async fn get_balance(&self, address: &str) -> EngineResult<Balance> {
        let resp: BalanceResponse = self
            .client
            .get(format!("{}/addresses/{}/balance", self.base_url, address))
            .send()
            .await?
            .json()
            .await?;
        Ok(Balance {
            confirmed: resp.confirmed,
            pending: resp.pending,
        })
    }

    async fn submit_transaction(&self, tx: &Transaction) -> EngineResult<String> {
        let resp: SubmitResponse = self
            .client
            .post(format!("{}/transactions", self.base_url))
            .json(&SubmitRequest {
                transaction: tx.serialize_hex(),
            })
            .send()
            .await?
            .json()
            .await?;
        Ok(resp.transaction_id)
    }
}
