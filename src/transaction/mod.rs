pub mod sighash;

use crate::{EngineError, EngineResult};

/// (32-byte transaction id, 32-bit output index). Immutable, compared by
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outpoint {
    pub transaction_id: [u8; 32],
    pub index: u32,
}

/// Version + raw bytes of a scriptPublicKey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPublicKey {
    pub version: u16,
    pub script: Vec<u8>,
}

impl ScriptPublicKey {
    pub fn new(version: u16, script: Vec<u8>) -> Self {
        Self { version, script }
    }
}

/// An unspent transaction output as reported by the node: outpoint, amount
/// in sompi, script pubkey, and originating address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub outpoint: Outpoint,
    pub amount: u64,
    pub script_public_key: ScriptPublicKey,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInput {
    pub previous_outpoint: Outpoint,
    pub signature_script: Vec<u8>,
    pub sequence: u64,
    /// Always 1 in this system.
    pub sig_op_count: u8,
}

impl TransactionInput {
    pub fn unsigned(previous_outpoint: Outpoint) -> Self {
        Self {
            previous_outpoint,
            signature_script: Vec::new(),
            sequence: 0,
            sig_op_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutput {
    pub amount: u64,
    pub script_public_key: ScriptPublicKey,
}

/// A Hoosat transaction. `subnetwork_id` and `gas` are always zero and
/// `payload` always empty in this engine: no HRC-20 operation sets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u64,
    pub subnetwork_id: [u8; 20],
    pub gas: u64,
    pub payload: Vec<u8>,
}

impl Transaction {
    pub fn new(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        Self {
            version: 0,
            inputs,
            outputs,
            lock_time: 0,
            subnetwork_id: [0u8; 20],
            gas: 0,
            payload: Vec::new(),
        }
    }

    /// Serialize to the wire form: little-endian integers, txid as
    /// 32 big-endian hex bytes, length-prefixed hex for variable fields.
    pub fn serialize_hex(&self) -> String {
        let mut out = String::new();
        out.push_str(&hex::encode(self.version.to_le_bytes()));
        out.push_str(&encode_varint(self.inputs.len() as u64));
        for input in &self.inputs {
            out.push_str(&hex::encode(input.previous_outpoint.transaction_id));
            out.push_str(&hex::encode(input.previous_outpoint.index.to_le_bytes()));
            out.push_str(&encode_varint(input.signature_script.len() as u64));
            out.push_str(&hex::encode(&input.signature_script));
            out.push_str(&hex::encode(input.sequence.to_le_bytes()));
            out.push_str(&hex::encode([input.sig_op_count]));
        }
        out.push_str(&encode_varint(self.outputs.len() as u64));
        for output in &self.outputs {
            out.push_str(&hex::encode(output.amount.to_le_bytes()));
            out.push_str(&hex::encode(output.script_public_key.version.to_le_bytes()));
            out.push_str(&encode_varint(output.script_public_key.script.len() as u64));
            out.push_str(&hex::encode(&output.script_public_key.script));
        }
        out.push_str(&hex::encode(self.lock_time.to_le_bytes()));
        out.push_str(&hex::encode(self.subnetwork_id));
        out.push_str(&hex::encode(self.gas.to_le_bytes()));
        out.push_str(&encode_varint(self.payload.len() as u64));
        out.push_str(&hex::encode(&self.payload));
        out
    }

    pub fn input_amount_sum(&self, spent: &[Utxo]) -> u64 {
        spent.iter().map(|u| u.amount).sum()
    }

    pub fn output_amount_sum(&self) -> u64 {
        self.outputs.iter().map(|o| o.amount).sum()
    }

    /// Declared fee for a built transaction, given the UTXOs it spends:
    /// `sum(input.amount) - sum(output.amount)`.
    pub fn declared_fee(&self, spent: &[Utxo]) -> EngineResult<u64> {
        self.input_amount_sum(spent)
            .checked_sub(self.output_amount_sum())
            .ok_or_else(|| EngineError::InvalidTransaction {
                message: "outputs exceed inputs".to_string(),
            })
    }
}

fn encode_varint(value: u64) -> String {
    hex::encode(value.to_le_bytes())
}
