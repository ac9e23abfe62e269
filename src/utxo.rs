//! UTXO selection: largest-first with a hard input cap, plus a
//! consolidation helper for wallets too fragmented to satisfy it.
//!
//! `ord-rs` itself has no largest-first selector; this is modeled on its
//! UTXO-fetching shape in `examples/utils/transaction.rs`, adapted to
//! Hoosat's larger per-input weight and its 10-input cap.

use crate::transaction::Utxo;
use crate::{EngineError, EngineResult};

/// Hard cap on the number of inputs a single transaction may spend.
pub const MAX_SELECTED_INPUTS: usize = 10;

/// Select UTXOs, largest first, until `target` is covered or the 10-input
/// cap is reached. Fails with `InsufficientFunds` if the top 10 UTXOs by
/// value don't sum to at least `target`, even if the full set would.
pub fn select_largest_first(utxos: &[Utxo], target: u64) -> EngineResult<Vec<Utxo>> {
    let mut sorted: Vec<&Utxo> = utxos.iter().collect();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
    sorted.truncate(MAX_SELECTED_INPUTS);

    let mut selected = Vec::new();
    let mut sum = 0u64;
    for utxo in sorted {
        if sum >= target {
            break;
        }
        sum += utxo.amount;
        selected.push(utxo.clone());
    }

    if sum < target {
        return Err(EngineError::InsufficientFunds {
            required: target,
            available: sum,
        });
    }

    Ok(selected)
}

/// Whether a wallet is fragmented enough that no single selection of up to
/// `MAX_SELECTED_INPUTS` UTXOs can cover `target`, even though the wallet's
/// total balance does.
pub fn needs_consolidation(utxos: &[Utxo], target: u64) -> bool {
    let total: u64 = utxos.iter().map(|u| u.amount).sum();
    if total < target {
        return false;
    }
    select_largest_first(utxos, target).is_err()
}

/// The up-to-10 largest UTXOs to consolidate into a single self-paid
/// output. Idempotent: re-running against the post-consolidation UTXO set
/// (now a single large UTXO) simply selects that one UTXO.
pub fn consolidation_set(utxos: &[Utxo]) -> Vec<Utxo> {
    let mut sorted: Vec<Utxo> = utxos.to_vec();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
    sorted.truncate(MAX_SELECTED_INPUTS);
    sorted
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::transaction::{Outpoint, ScriptPublicKey};

    fn utxo(amount: u64, index: u32) -> Utxo {
        Utxo {
            outpoint: Outpoint {
                transaction_id: [index as u8; 32],
                index,
            },
            amount,
            script_public_key: ScriptPublicKey::new(0, vec![0xac]),
            address: "hoosat:test".to_string(),
        }
    }

    #[test]
    fn test_select_largest_first_picks_fewest_inputs() {
        let utxos = vec![utxo(100, 0), utxo(5000, 1), utxo(200, 2)];
        let selected = select_largest_first(&utxos, 4000).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].amount, 5000);
    }

    #[test]
    fn test_select_largest_first_combines_when_needed() {
        let utxos = vec![utxo(1000, 0), utxo(1000, 1), utxo(1000, 2)];
        let selected = select_largest_first(&utxos, 2500).unwrap();
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_select_largest_first_caps_at_ten_inputs() {
        let utxos: Vec<Utxo> = (0..20).map(|i| utxo(100, i)).collect();
        // Total available (2000) exceeds target, but only the top 10
        // (1000) are ever considered.
        let result = select_largest_first(&utxos, 1500);
        assert!(result.is_err());
    }

    #[test]
    fn test_needs_consolidation_true_when_fragmented() {
        let utxos: Vec<Utxo> = (0..20).map(|i| utxo(100, i)).collect();
        assert!(needs_consolidation(&utxos, 1500));
    }

    #[test]
    fn test_needs_consolidation_false_when_insufficient_total() {
        let utxos = vec![utxo(100, 0), utxo(100, 1)];
        assert!(!needs_consolidation(&utxos, 10_000));
    }

    #[test]
    fn test_needs_consolidation_false_when_top_ten_suffice() {
        let utxos = vec![utxo(5000, 0), utxo(100, 1)];
        assert!(!needs_consolidation(&utxos, 4000));
    }

    #[test]
    fn test_consolidation_set_is_idempotent() {
        let utxos: Vec<Utxo> = (0..20).map(|i| utxo(100, i)).collect();
        let first_pass = consolidation_set(&utxos);
        assert_eq!(first_pass.len(), 10);
        let second_pass = consolidation_set(&first_pass);
        assert_eq!(second_pass, first_pass);
    }
}
