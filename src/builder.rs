//! Commit/reveal transaction assembly. Grounded on
//! `OrdTransactionBuilder::build_commit_transaction` /
//! `build_reveal_transaction`, generalized from Bitcoin/BRC-20 envelopes to
//! Hoosat's P2SH + `OP_BLAKE3` scripting.

use crate::address::{self, Address, AddressType};
use crate::fees::{self, MIN_COMMIT_AMOUNT};
use crate::script;
use crate::transaction::{ScriptPublicKey, Transaction, TransactionInput, TransactionOutput, Utxo};
use crate::utxo;
use crate::{EngineError, EngineResult};

/// Everything a caller needs to later build the matching reveal: the
/// commit transaction itself, the redeem script it commits to, and the
/// P2SH address its designated output pays.
pub struct CommitPlan {
    pub transaction: Transaction,
    pub redeem_script: Vec<u8>,
    pub p2sh_address: Address,
    pub spent_utxos: Vec<Utxo>,
}

/// Build a commit transaction: one P2SH output funding the forthcoming
/// reveal, one change output back to the payer (omitted if it would fall
/// below the dust threshold), spending UTXOs selected largest-first.
pub fn build_commit(
    hrp: &str,
    pubkey: &[u8],
    payload_json: &str,
    use_ecdsa: bool,
    payer_script_public_key: ScriptPublicKey,
    available_utxos: &[Utxo],
    commit_amount: u64,
    fee_rate: u64,
) -> EngineResult<CommitPlan> {
    let redeem_script = script::build_redeem_script(pubkey, payload_json.as_bytes(), use_ecdsa);
    let script_hash = script::hash_redeem_script(&redeem_script);
    let p2sh_address = address::p2sh_address(hrp, script_hash);

    let fee = fees::network_fee(1, 2, fee_rate);
    let target = commit_amount
        .checked_add(fee)
        .ok_or_else(|| EngineError::InvalidTransaction {
            message: "commit amount plus fee overflows".to_string(),
        })?;

    let spent = utxo::select_largest_first(available_utxos, target)?;
    let spent_sum: u64 = spent.iter().map(|u| u.amount).sum();
    let change = spent_sum - target;

    let p2sh_script = p2sh_address.script_public_key();
    let mut outputs = vec![TransactionOutput {
        amount: commit_amount,
        script_public_key: ScriptPublicKey::new(0, p2sh_script),
    }];
    if change >= MIN_COMMIT_AMOUNT {
        outputs.push(TransactionOutput {
            amount: change,
            script_public_key: payer_script_public_key,
        });
    }

    let inputs = spent
        .iter()
        .map(|u| TransactionInput::unsigned(u.outpoint))
        .collect();
    let transaction = Transaction::new(inputs, outputs);

    Ok(CommitPlan {
        transaction,
        redeem_script,
        p2sh_address,
        spent_utxos: spent,
    })
}

/// Build a reveal transaction spending a commit's P2SH output to a single
/// recipient output, net of the reveal fee.
pub fn build_reveal(
    commit_utxo: Utxo,
    recipient_script_public_key: ScriptPublicKey,
    fee: u64,
) -> EngineResult<Transaction> {
    let amount = commit_utxo
        .amount
        .checked_sub(fee)
        .ok_or(EngineError::InsufficientFunds {
            required: fee,
            available: commit_utxo.amount,
        })?;

    let input = TransactionInput::unsigned(commit_utxo.outpoint);
    let output = TransactionOutput {
        amount,
        script_public_key: recipient_script_public_key,
    };
    Ok(Transaction::new(vec![input], vec![output]))
}
