use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, LotteryError>;

#[derive(Error, Debug)]
pub enum LotteryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration load failed: {0}")]
    ConfigLoad(String),

    #[error("Invalid game state: {0}")]
    InvalidState(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(Uuid),

    #[error("Insufficient balance: need {need}, have {available}")]
    InsufficientBalance { need: Decimal, available: Decimal },

    #[error("Player {player} would exceed the limit of {limit} tickets")]
    TicketLimitExceeded { player: Uuid, limit: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LotteryError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
