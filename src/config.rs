//! Boot-time engine configuration. Grounded on `ord-rs`'s plain
//! constructor-argument config (`OrdTransactionBuilder::new`), promoted to
//! a named struct since this engine has more fixed, per-deployment knobs
//! (node endpoint, signer endpoint, address prefix) to carry.

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Human-readable address prefix, e.g. `"hoosat"` on mainnet.
    pub hrp: String,
    /// Base URL of the node RPC used for UTXO lookups and broadcast.
    pub node_base_url: String,
    /// Base URL of the remote signer service.
    pub signer_base_url: String,
    /// Identifier the remote signer uses to locate the operator's key.
    pub signer_key_name: String,
}

impl EngineConfig {
    pub fn new(
        hrp: impl Into<String>,
        node_base_url: impl Into<String>,
        signer_base_url: impl Into<String>,
        signer_key_name: impl Into<String>,
    ) -> Self {
        Self {
            hrp: hrp.into(),
            node_base_url: node_base_url.into(),
            signer_base_url: signer_base_url.into(),
            signer_key_name: signer_key_name.into(),
        }
    }
}
