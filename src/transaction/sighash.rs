//! Precomputed-hash sighash engine: a `ReusedValues` cache holding the five
//! hashes shared across every input's digest, plus the two entry points
//! (`sighash_ecdsa`, `sighash_schnorr`).
//!
//! Grounded on `ord-rs`'s `SighashCache` wrapping pattern
//! (`src/wallet/builder/signer.rs`), generalized from Bitcoin's BIP-143
//! field set to Hoosat's own transaction field order.

use std::cell::RefCell;

use crate::hashes::{double_sha256, tagged_hash};
use crate::transaction::{ScriptPublicKey, Transaction, Utxo};
use crate::{EngineError, EngineResult};

pub const SIGHASH_ALL: u8 = 0x01;

/// Lazily-populated cache of the five hashes reused across every input's
/// sighash within a single transaction. Each field is computed once, on
/// first access, and then reused — independent of input iteration order.
#[derive(Default)]
pub struct ReusedValues {
    previous_outputs: RefCell<Option<[u8; 32]>>,
    sequences: RefCell<Option<[u8; 32]>>,
    sig_op_counts: RefCell<Option<[u8; 32]>>,
    outputs: RefCell<Option<[u8; 32]>>,
    payload: RefCell<Option<[u8; 32]>>,
}

impl ReusedValues {
    pub fn new() -> Self {
        Self::default()
    }

    fn previous_outputs(&self, tx: &Transaction) -> [u8; 32] {
        cached(&self.previous_outputs, || {
            let mut buf = Vec::with_capacity(tx.inputs.len() * 36);
            for input in &tx.inputs {
                buf.extend_from_slice(&input.previous_outpoint.transaction_id);
                buf.extend_from_slice(&input.previous_outpoint.index.to_le_bytes());
            }
            double_sha256(&buf)
        })
    }

    fn sequences(&self, tx: &Transaction) -> [u8; 32] {
        cached(&self.sequences, || {
            let mut buf = Vec::with_capacity(tx.inputs.len() * 8);
            for input in &tx.inputs {
                buf.extend_from_slice(&input.sequence.to_le_bytes());
            }
            double_sha256(&buf)
        })
    }

    fn sig_op_counts(&self, tx: &Transaction) -> [u8; 32] {
        cached(&self.sig_op_counts, || {
            let buf: Vec<u8> = tx.inputs.iter().map(|i| i.sig_op_count).collect();
            double_sha256(&buf)
        })
    }

    fn outputs(&self, tx: &Transaction) -> [u8; 32] {
        cached(&self.outputs, || {
            let mut buf = Vec::new();
            for output in &tx.outputs {
                buf.extend_from_slice(&output.amount.to_le_bytes());
                buf.extend_from_slice(&output.script_public_key.version.to_le_bytes());
                buf.extend_from_slice(&(output.script_public_key.script.len() as u64).to_le_bytes());
                buf.extend_from_slice(&output.script_public_key.script);
            }
            double_sha256(&buf)
        })
    }

    fn payload(&self, tx: &Transaction) -> [u8; 32] {
        cached(&self.payload, || double_sha256(&tx.payload))
    }
}

fn cached(slot: &RefCell<Option<[u8; 32]>>, compute: impl FnOnce() -> [u8; 32]) -> [u8; 32] {
    if let Some(value) = *slot.borrow() {
        return value;
    }
    let value = compute();
    *slot.borrow_mut() = Some(value);
    value
}

/// Assemble the per-input preimage shared by both sighash variants (they
/// differ only in the final hash function).
fn preimage(
    tx: &Transaction,
    input_index: usize,
    spent: &Utxo,
    reused: &ReusedValues,
    hash_type: u8,
) -> EngineResult<Vec<u8>> {
    let input = tx
        .inputs
        .get(input_index)
        .ok_or(EngineError::InvalidTransaction {
            message: format!("no such input: {input_index}"),
        })?;

    let mut buf = Vec::new();
    buf.extend_from_slice(&tx.version.to_le_bytes());
    buf.extend_from_slice(&reused.previous_outputs(tx));
    buf.extend_from_slice(&reused.sequences(tx));
    buf.extend_from_slice(&reused.sig_op_counts(tx));
    buf.extend_from_slice(&input.previous_outpoint.transaction_id);
    buf.extend_from_slice(&input.previous_outpoint.index.to_le_bytes());
    write_script_public_key(&mut buf, &spent.script_public_key);
    buf.extend_from_slice(&spent.amount.to_le_bytes());
    buf.extend_from_slice(&input.sequence.to_le_bytes());
    buf.push(input.sig_op_count);
    buf.extend_from_slice(&reused.outputs(tx));
    buf.extend_from_slice(&tx.lock_time.to_le_bytes());
    buf.extend_from_slice(&tx.subnetwork_id);
    buf.extend_from_slice(&tx.gas.to_le_bytes());
    buf.extend_from_slice(&reused.payload(tx));
    buf.push(hash_type);
    Ok(buf)
}

fn write_script_public_key(buf: &mut Vec<u8>, spk: &ScriptPublicKey) {
    buf.extend_from_slice(&spk.version.to_le_bytes());
    buf.extend_from_slice(&(spk.script.len() as u64).to_le_bytes());
    buf.extend_from_slice(&spk.script);
}

/// ECDSA sighash: double-SHA-256 of the preimage.
pub fn sighash_ecdsa(
    tx: &Transaction,
    input_index: usize,
    spent: &Utxo,
    reused: &ReusedValues,
    hash_type: u8,
) -> EngineResult<[u8; 32]> {
    let buf = preimage(tx, input_index, spent, reused, hash_type)?;
    Ok(double_sha256(&buf))
}

/// Schnorr sighash: single domain-separated (BIP-340-tagged) SHA-256 of
/// the same preimage.
pub fn sighash_schnorr(
    tx: &Transaction,
    input_index: usize,
    spent: &Utxo,
    reused: &ReusedValues,
    hash_type: u8,
) -> EngineResult<[u8; 32]> {
    let buf = preimage(tx, input_index, spent, reused, hash_type)?;
    Ok(tagged_hash("TransactionSigningHash", &buf))
}
