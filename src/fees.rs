//! Fee table and UTXO-selection fee estimation, per the per-operation fee
//! schedule and the mint-fee resolution recorded in DESIGN.md.
//!
//! Grounded on `ord-rs`'s `src/utils/fees.rs` (per-input/per-output byte
//! weighting) generalized from Bitcoin's fee-rate model to Hoosat sompi.

use crate::payload::Hrc20Op;

/// Dust threshold: the minimum amount a change output may carry.
pub const MIN_COMMIT_AMOUNT: u64 = 1_000;

/// Default commit-output funding when the caller doesn't request an exact
/// amount: covers the reveal fee with headroom.
pub const RECOMMENDED_COMMIT_AMOUNT: u64 = 100_000_000;

const BYTES_PER_INPUT: u64 = 150;
const BYTES_PER_OUTPUT: u64 = 35;
const BASE_TX_BYTES: u64 = 10;

/// Estimated transaction byte size for a given input/output count, used to
/// turn a sompi-per-byte fee rate into an absolute fee.
pub fn estimate_tx_bytes(input_count: u64, output_count: u64) -> u64 {
    BYTES_PER_INPUT * input_count + BYTES_PER_OUTPUT * output_count + BASE_TX_BYTES
}

/// Network fee for a transaction of the given shape at `fee_rate` sompi per
/// byte, padded by a 20% safety margin. Callers use this as an upper bound
/// when sizing commit outputs; the actual declared fee on the built
/// transaction is the exact, unpadded difference between its inputs and
/// outputs (see `Transaction::declared_fee`).
pub fn network_fee(input_count: u64, output_count: u64, fee_rate: u64) -> u64 {
    let bytes = estimate_tx_bytes(input_count, output_count);
    let base = bytes * fee_rate;
    base + base / 5
}

/// `(commit_fee, reveal_fee)` for a deploy operation: a flat 1000 HTN
/// commit fee covering the larger redeem-script payload, plus a flat
/// 1000 HTN reveal fee.
const HTN_SOMPI: u64 = 100_000_000;
pub const DEPLOY_COMMIT_FEE: u64 = 1000 * HTN_SOMPI;
pub const DEPLOY_REVEAL_FEE: u64 = 1000 * HTN_SOMPI;

/// Mint's commit fee is a fixed, authoritative value (Open Question #2):
/// 1 HTN. Its reveal leg uses the ambient network fee rate like every
/// other op.
pub const MINT_COMMIT_FEE: u64 = HTN_SOMPI;

/// Table-driven fee estimate for an encoded HRC-20 operation, keyed off its
/// `"op"` tag. Returns `(commit_fee, reveal_fee)` in sompi; a `reveal_fee`
/// of `0` means "use `network_fee` at the caller's observed fee rate"
/// rather than a fixed value. Unknown or unparseable payloads yield
/// `(0, 0)` rather than silently charging a network-rate fee.
pub fn estimate_fees(payload_json: &str, fee_rate: u64) -> (u64, u64) {
    match Hrc20Op::op_tag(payload_json).as_deref() {
        Some("deploy") => (DEPLOY_COMMIT_FEE, DEPLOY_REVEAL_FEE),
        Some("mint") => (MINT_COMMIT_FEE, network_fee(1, 1, fee_rate)),
        Some("transfer") | Some("burn") | Some("list") | Some("send") => {
            (network_fee(1, 1, fee_rate), network_fee(1, 1, fee_rate))
        }
        _ => (0, 0),
    }
}
