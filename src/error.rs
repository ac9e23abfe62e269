use thiserror::Error;

/// Engine-wide error taxonomy.
///
/// Every variant here corresponds to a row of the error-handling table: each
/// is surfaced to the caller rather than silently recovered, except for the
/// auto-consolidation fallback on deploy which converts `InsufficientFunds`
/// into a consolidation side effect (see `orchestrator::consolidate`).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("invalid hex")]
    InvalidHex,

    #[error("invalid public key")]
    InvalidPubkey,

    #[error("invalid transaction: {message}")]
    InvalidTransaction { message: String },

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("cryptographic error: {message}")]
    CryptographicError { message: String },

    #[error("network error: {message}")]
    NetworkError { message: String },

    #[error("unknown error: {message}")]
    Unknown { message: String },
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Unknown {
            message: format!("json codec error: {err}"),
        }
    }
}

impl From<secp256k1::Error> for EngineError {
    fn from(err: secp256k1::Error) -> Self {
        EngineError::CryptographicError {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::NetworkError {
            message: err.to_string(),
        }
    }
}
