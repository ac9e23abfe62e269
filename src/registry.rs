//! Append-only registry of commit transactions awaiting their reveal,
//! guarded for concurrent access. Grounded on `ord-rs`'s in-memory
//! inscription tracking in `wallet/mod.rs`, generalized to a persistent,
//! snapshot/restore-capable collection.

use tokio::sync::Mutex;

use crate::script;
use crate::{EngineError, EngineResult};

/// One outstanding commit transaction: its id and the redeem script needed
/// to build the matching reveal. Invariant: `commit_tx_id` appears at most
/// once in a registry, and `redeem_script`'s hash must match the commit
/// transaction's P2SH output script hash (checked by callers that have the
/// commit transaction in hand; the registry itself trusts its inputs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReveal {
    pub commit_tx_id: String,
    pub redeem_script: Vec<u8>,
}

/// A snapshot of the registry's contents, suitable for persisting to disk
/// and restoring on process restart.
pub type RegistrySnapshot = Vec<PendingReveal>;

#[derive(Default)]
pub struct PendingRevealRegistry {
    entries: Mutex<Vec<PendingReveal>>,
}

impl PendingRevealRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from a previously taken snapshot.
    pub fn restore(snapshot: RegistrySnapshot) -> Self {
        Self {
            entries: Mutex::new(snapshot),
        }
    }

    /// Record a new pending reveal. Rejects a duplicate `commit_tx_id`.
    pub async fn insert(&self, entry: PendingReveal) -> EngineResult<()> {
        let mut guard = self.entries.lock().await;
        if guard.iter().any(|e| e.commit_tx_id == entry.commit_tx_id) {
            return Err(EngineError::InvalidTransaction {
                message: format!("commit transaction already pending reveal: {}", entry.commit_tx_id),
            });
        }
        guard.push(entry);
        Ok(())
    }

    /// Look up the redeem script for a commit transaction awaiting reveal.
    pub async fn get(&self, commit_tx_id: &str) -> Option<PendingReveal> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|e| e.commit_tx_id == commit_tx_id)
            .cloned()
    }

    /// Remove a commit transaction once its reveal has been broadcast.
    /// A no-op, returning `None`, if `commit_tx_id` isn't present.
    pub async fn remove(&self, commit_tx_id: &str) -> Option<PendingReveal> {
        let mut guard = self.entries.lock().await;
        let index = guard.iter().position(|e| e.commit_tx_id == commit_tx_id)?;
        Some(guard.remove(index))
    }

    pub async fn list(&self) -> RegistrySnapshot {
        self.entries.lock().await.clone()
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.list().await
    }

    /// Verify that a stored redeem script still hashes to the scriptHash
    /// carried by the commit transaction's P2SH output, as required by the
    /// registry's invariant.
    pub fn verify_matches_script_hash(entry: &PendingReveal, expected_script_hash: [u8; 32]) -> bool {
        script::hash_redeem_script(&entry.redeem_script) == expected_script_hash
    }
}
