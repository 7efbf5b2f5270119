//! Error types for sigledger

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("arguments length expected: {expected} received: {received}")]
    ArgumentCountError { expected: usize, received: usize },
    #[error("incorrect function name: {0}")]
    UnknownOperation(String),
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("account already registered: {0}")]
    AlreadyRegistered(String),
    #[error("account not registered: {0}")]
    NotRegistered(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: u64, requested: u64 },
    #[error("signature recovery failed: {0}")]
    SignatureRecoveryError(String),
    #[error("invalid sender for signature")]
    SenderMismatch,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("Cryptographic error: {0}")]
    CryptoError(String),
    #[error("Store error: {0}")]
    StoreError(String),
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        LedgerError::StoreError(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
