use crate::types::UserId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("Journey '{user_id}' has no conversion touchpoint")]
    MissingConversion { user_id: UserId },

    #[error("Journey '{user_id}' has {count} conversion touchpoints, expected exactly one")]
    MultipleConversions { user_id: UserId, count: usize },

    #[error("Journey '{user_id}' has touchpoints after its conversion")]
    ConversionNotLast { user_id: UserId },

    #[error("Journey '{user_id}' has a negative conversion value: {value}")]
    NegativeConversionValue { user_id: UserId, value: f64 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AttributionError {
    /// The journey this error is about, when it is a data-contract violation.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::MissingConversion { user_id }
            | Self::MultipleConversions { user_id, .. }
            | Self::ConversionNotLast { user_id }
            | Self::NegativeConversionValue { user_id, .. } => Some(user_id),
            _ => None,
        }
    }
}

pub type EngineResult<T> = Result<T, AttributionError>;
