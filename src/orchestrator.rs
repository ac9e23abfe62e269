//! Operator-facing façade: owns the node client, remote signer, and
//! pending-reveal registry, and drives the commit -> reveal state machine.
//! Grounded on `ord-rs`'s `Wallet` struct (`wallet/mod.rs`), which plays
//! the analogous owning-façade role for BRC-20 inscription flows.

use log::{debug, info};

use crate::address::{Address, AddressType};
use crate::builder;
use crate::config::EngineConfig;
use crate::fees;
use crate::node::{Balance, NodeClient};
use crate::payload::Hrc20Op;
use crate::registry::{PendingReveal, PendingRevealRegistry, RegistrySnapshot};
use crate::script;
use crate::signer::{self, RemoteSigner, SIGHASH_ALL};
use crate::transaction::{ScriptPublicKey, Transaction, Utxo};
use crate::transaction::sighash::{sighash_ecdsa, sighash_schnorr, ReusedValues};
use crate::{EngineError, EngineResult};

/// Outcome of requesting a deploy/mint/etc: either the commit transaction
/// broadcast normally, or the wallet was too fragmented and a
/// consolidation transaction was broadcast instead (the caller must retry
/// the original request once it confirms). Replaces a magic-string-prefix
/// convention with a real sum type, per DESIGN.md's Open Question notes.
#[derive(Debug, Clone)]
pub enum DeployOutcome {
    Committed {
        commit_tx_id: String,
        redeem_script_hex: String,
        p2sh_address: String,
    },
    Consolidating {
        tx_id: String,
    },
}

pub struct Orchestrator {
    config: EngineConfig,
    node: Box<dyn NodeClient>,
    signer: Box<dyn RemoteSigner>,
    registry: PendingRevealRegistry,
}

impl Orchestrator {
    pub fn new(config: EngineConfig, node: Box<dyn NodeClient>, signer: Box<dyn RemoteSigner>) -> Self {
        Self {
            config,
            node,
            signer,
            registry: PendingRevealRegistry::new(),
        }
    }

    pub fn restore(
        config: EngineConfig,
        node: Box<dyn NodeClient>,
        signer: Box<dyn RemoteSigner>,
        snapshot: RegistrySnapshot,
    ) -> Self {
        Self {
            config,
            node,
            signer,
            registry: PendingRevealRegistry::restore(snapshot),
        }
    }

    pub async fn get_address(&self) -> EngineResult<String> {
        let public_key = self.signer.public_key(&self.config.signer_key_name).await?;
        let address = Address::new(&self.config.hrp, AddressType::Ecdsa, public_key)?;
        Ok(address.encode())
    }

    pub async fn get_balance(&self) -> EngineResult<Balance> {
        let address = self.get_address().await?;
        self.node.get_balance(&address).await
    }

    pub async fn get_pending_reveals(&self) -> RegistrySnapshot {
        self.registry.list().await
    }

    pub async fn get_redeem_script(&self, commit_tx_id: &str) -> EngineResult<Vec<u8>> {
        self.registry
            .get(commit_tx_id)
            .await
            .map(|entry| entry.redeem_script)
            .ok_or_else(|| EngineError::InvalidTransaction {
                message: format!("no pending reveal for commit transaction: {commit_tx_id}"),
            })
    }

    pub fn estimate_fees(&self, payload_json: &str, fee_rate: u64) -> (u64, u64) {
        fees::estimate_fees(payload_json, fee_rate)
    }

    /// Consolidate the operator's UTXOs into a single output, self-paid,
    /// when fragmentation prevents a normal commit. Idempotent: running it
    /// again against the resulting single-UTXO wallet is a no-op in
    /// substance (the up-to-10 selection degenerates to one input).
    pub async fn consolidate_utxos(&self, fee_rate: u64) -> EngineResult<String> {
        let address = self.get_address().await?;
        let utxos = self.node.get_utxos(&address).await?;
        let selected = crate::utxo::consolidation_set(&utxos);
        let sum: u64 = selected.iter().map(|u| u.amount).sum();
        let fee = fees::network_fee(selected.len() as u64, 1, fee_rate);
        let amount = sum.checked_sub(fee).ok_or(EngineError::InsufficientFunds {
            required: fee,
            available: sum,
        })?;

        let public_key = self.signer.public_key(&self.config.signer_key_name).await?;
        let self_script = ScriptPublicKey::new(
            0,
            crate::address::generate_script_public_key(&public_key, AddressType::Ecdsa),
        );
        let inputs = selected
            .iter()
            .map(|u| crate::transaction::TransactionInput::unsigned(u.outpoint))
            .collect();
        let mut tx = Transaction::new(
            inputs,
            vec![crate::transaction::TransactionOutput {
                amount,
                script_public_key: self_script,
            }],
        );

        self.sign_ecdsa_inputs(&mut tx, &selected).await?;
        self.node.submit_transaction(&tx).await
    }

    /// Sign every input of `tx` with ECDSA against its corresponding spent
    /// UTXO's script, in place.
    async fn sign_ecdsa_inputs(&self, tx: &mut Transaction, spent: &[Utxo]) -> EngineResult<()> {
        let reused = ReusedValues::new();
        let public_key = self.signer.public_key(&self.config.signer_key_name).await?;
        let sigs_and_scripts: Vec<(Vec<u8>, usize)> = {
            let mut out = Vec::with_capacity(tx.inputs.len());
            for (index, utxo) in spent.iter().enumerate() {
                let digest = sighash_ecdsa(tx, index, utxo, &reused, SIGHASH_ALL)?;
                let sig = self.signer.sign_ecdsa(&self.config.signer_key_name, &digest).await?;
                out.push((signer::with_hash_type(sig, SIGHASH_ALL), index));
            }
            out
        };
        for (sig, index) in sigs_and_scripts {
            let mut script_bytes = vec![sig.len() as u8];
            script_bytes.extend_from_slice(&sig);
            script_bytes.extend_from_slice(&[public_key.len() as u8]);
            script_bytes.extend_from_slice(&public_key);
            tx.inputs[index].signature_script = script_bytes;
        }
        Ok(())
    }

    /// Build, sign, and broadcast a commit transaction for an arbitrary
    /// encoded HRC-20 operation. Consolidates first (without broadcasting
    /// the commit) if the wallet is too fragmented to fund it directly.
    pub async fn submit_operation(&self, op: &Hrc20Op, fee_rate: u64) -> EngineResult<DeployOutcome> {
        let payload_json = op.encode()?;
        let (commit_fee, _reveal_fee) = fees::estimate_fees(&payload_json, fee_rate);

        let address = self.get_address().await?;
        let utxos = self.node.get_utxos(&address).await?;

        if crate::utxo::needs_consolidation(&utxos, commit_fee) {
            info!("wallet fragmented below target {commit_fee}, consolidating before commit");
            let tx_id = self.consolidate_utxos(fee_rate).await?;
            return Ok(DeployOutcome::Consolidating { tx_id });
        }

        let public_key = self.signer.public_key(&self.config.signer_key_name).await?;
        let payer_script = ScriptPublicKey::new(
            0,
            crate::address::generate_script_public_key(&public_key, AddressType::Ecdsa),
        );

        let plan = builder::build_commit(
            &self.config.hrp,
            &public_key,
            &payload_json,
            true,
            payer_script,
            &utxos,
            commit_fee,
            fee_rate,
        )?;

        let mut tx = plan.transaction;
        self.sign_ecdsa_inputs(&mut tx, &plan.spent_utxos).await?;
        let commit_tx_id = self.node.submit_transaction(&tx).await?;
        info!("broadcast commit transaction {commit_tx_id}");

        let redeem_script_hex = hex::encode(&plan.redeem_script);
        let p2sh_address = plan.p2sh_address.encode();

        self.registry
            .insert(PendingReveal {
                commit_tx_id: commit_tx_id.clone(),
                redeem_script: plan.redeem_script,
            })
            .await?;

        Ok(DeployOutcome::Committed {
            commit_tx_id,
            redeem_script_hex,
            p2sh_address,
        })
    }

    /// Reveal a previously committed operation: spend its P2SH output to
    /// `recipient_address`, signing with whichever curve the redeem script
    /// names. On failure the registry entry is kept so the caller can
    /// retry; on success it's removed.
    pub async fn reveal_operation(
        &self,
        commit_tx_id: &str,
        commit_output_index: u32,
        recipient_address: &str,
        fee_rate: u64,
    ) -> EngineResult<String> {
        let entry = self
            .registry
            .get(commit_tx_id)
            .await
            .ok_or_else(|| EngineError::InvalidTransaction {
                message: format!("no pending reveal for commit transaction: {commit_tx_id}"),
            })?;

        let address = self.get_address().await?;
        let utxos = self.node.get_utxos(&address).await?;
        let commit_utxo = utxos
            .into_iter()
            .find(|u| {
                u.outpoint.index == commit_output_index
                    && hex::encode(u.outpoint.transaction_id) == commit_tx_id
            })
            .ok_or_else(|| EngineError::InvalidTransaction {
                message: "commit output not yet visible to node".to_string(),
            })?;

        let spk_script = &commit_utxo.script_public_key.script;
        if spk_script.len() < 34 {
            return Err(EngineError::InvalidTransaction {
                message: "commit output scriptPublicKey too short to carry a P2SH hash".to_string(),
            });
        }
        let mut expected_script_hash = [0u8; 32];
        expected_script_hash.copy_from_slice(&spk_script[2..34]);
        if !PendingRevealRegistry::verify_matches_script_hash(&entry, expected_script_hash) {
            return Err(EngineError::InvalidTransaction {
                message: "redeem script does not match commit output scriptHash".to_string(),
            });
        }

        let recipient = Address::decode(recipient_address, Some(&self.config.hrp))?;
        let recipient_script = ScriptPublicKey::new(0, recipient.script_public_key());
        let fee = fees::network_fee(1, 1, fee_rate);

        let mut tx = builder::build_reveal(commit_utxo.clone(), recipient_script, fee)?;

        let reused = ReusedValues::new();
        let is_ecdsa_redeem = redeem_script_uses_ecdsa(&entry.redeem_script);

        let digest = if is_ecdsa_redeem {
            sighash_ecdsa(&tx, 0, &commit_utxo, &reused, SIGHASH_ALL)?
        } else {
            sighash_schnorr(&tx, 0, &commit_utxo, &reused, SIGHASH_ALL)?
        };

        let signature = if is_ecdsa_redeem {
            self.signer
                .sign_ecdsa(&self.config.signer_key_name, &digest)
                .await?
        } else {
            self.signer
                .sign_schnorr(&self.config.signer_key_name, &digest)
                .await?
        };

        let sig_with_hash_type = signer::with_hash_type(signature, SIGHASH_ALL);
        tx.inputs[0].signature_script =
            script::build_p2sh_signature_script(&sig_with_hash_type, &entry.redeem_script);

        let tx_id = self.node.submit_transaction(&tx).await?;
        self.registry.remove(commit_tx_id).await;
        debug!("reveal {commit_tx_id} resolved to {tx_id}");
        Ok(tx_id)
    }
}

/// Inspect a redeem script's CHECKSIG opcode to tell which curve it names.
fn redeem_script_uses_ecdsa(redeem_script: &[u8]) -> bool {
    redeem_script.iter().any(|&b| b == script::OP_CHECKSIG_ECDSA)
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;

    use super::*;
    use crate::transaction::Outpoint;

    #[test]
    fn test_redeem_script_uses_ecdsa_detects_opcode() {
        let pubkey = vec![0x02u8; 33];
        let ecdsa_script = script::build_redeem_script(&pubkey, b"x", true);
        let schnorr_script = script::build_redeem_script(&pubkey, b"x", false);
        assert!(redeem_script_uses_ecdsa(&ecdsa_script));
        assert!(!redeem_script_uses_ecdsa(&schnorr_script));
    }

    struct StubNode {
        utxos: Vec<Utxo>,
    }

    #[async_trait]
    impl NodeClient for StubNode {
        async fn get_utxos(&self, _address: &str) -> EngineResult<Vec<Utxo>> {
            Ok(self.utxos.clone())
        }

        async fn get_balance(&self, _address: &str) -> EngineResult<Balance> {
            Ok(Balance { confirmed: 0, pending: 0 })
        }

        async fn submit_transaction(&self, _tx: &Transaction) -> EngineResult<String> {
            panic!("submit_transaction must not run once the scriptHash check fails");
        }
    }

    struct StubSigner {
        public_key: Vec<u8>,
    }

    #[async_trait]
    impl RemoteSigner for StubSigner {
        async fn sign_ecdsa(&self, _key_id: &str, _digest: &[u8; 32]) -> EngineResult<Vec<u8>> {
            panic!("sign_ecdsa must not run once the scriptHash check fails");
        }

        async fn sign_schnorr(&self, _key_id: &str, _digest: &[u8; 32]) -> EngineResult<Vec<u8>> {
            panic!("sign_schnorr must not run once the scriptHash check fails");
        }

        async fn public_key(&self, _key_id: &str) -> EngineResult<Vec<u8>> {
            Ok(self.public_key.clone())
        }
    }

    #[tokio::test]
    async fn test_reveal_refuses_when_redeem_script_mismatches_commit_output() {
        let pubkey = vec![0x02u8; 33];
        let commit_txid = [7u8; 32];
        let commit_tx_id_hex = hex::encode(commit_txid);

        // The stored redeem script's hash doesn't match the scriptHash
        // actually carried by the commit output below.
        let stored_redeem_script = script::build_redeem_script(&pubkey, b"x", true);
        let mut commit_script = vec![0xbe, 0x20];
        commit_script.extend_from_slice(&[0xAAu8; 32]);
        commit_script.push(0x87);

        let node = StubNode {
            utxos: vec![Utxo {
                outpoint: Outpoint {
                    transaction_id: commit_txid,
                    index: 0,
                },
                amount: 100_000_000,
                script_public_key: ScriptPublicKey::new(0, commit_script),
                address: "hoosat:test".to_string(),
            }],
        };
        let signer = StubSigner { public_key: pubkey };

        let orchestrator = Orchestrator::restore(
            EngineConfig::new("hoosat", "http://node", "http://signer", "key"),
            Box::new(node),
            Box::new(signer),
            vec![PendingReveal {
                commit_tx_id: commit_tx_id_hex.clone(),
                redeem_script: stored_redeem_script,
            }],
        );

        let result = orchestrator
            .reveal_operation(&commit_tx_id_hex, 0, "hoosat:qz00", 10)
            .await;
        assert!(result.is_err());
        // The pending reveal must still be there for a retry.
        assert!(orchestrator.get_redeem_script(&commit_tx_id_hex).await.is_ok());
    }
}
