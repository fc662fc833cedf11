//! Error taxonomy for the engine and its settlement collaborator.

use thiserror::Error;

/// Errors raised by the settlement collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// The party cannot cover the requested reservation
    #[error("insufficient {asset}")]
    InsufficientFunds { asset: String },

    /// A transfer could not be carried out
    #[error("settlement failed: {0}")]
    Failure(String),

    /// Arithmetic overflow in balance calculation
    #[error("arithmetic overflow in balance calculation")]
    Overflow,

    /// commit/rollback called without a matching begin
    #[error("no settlement transaction in progress")]
    NoTransaction,
}

/// Errors surfaced by the matching engine.
///
/// Every error fails the triggering call synchronously; the engine never
/// retries internally and never leaves a placement half-applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Reservation of the taker's commitment failed
    #[error("insufficient {asset}")]
    InsufficientFunds { asset: String },

    /// A settlement leg failed; the placement was rolled back
    #[error("settlement failure: {0}")]
    SettlementFailure(String),

    /// Zero price or zero amount
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// No live order with this id
    #[error("order not found: {0}")]
    NotFound(u64),

    /// Caller does not own the order
    #[error("order {id} is not owned by the caller")]
    NotOwner { id: u64 },

    /// Book state could not be encoded for hashing
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<SettlementError> for EngineError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::InsufficientFunds { asset } => EngineError::InsufficientFunds { asset },
            other => EngineError::SettlementFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message() {
        let err = EngineError::InsufficientFunds {
            asset: "TKB".to_string(),
        };
        assert_eq!(err.to_string(), "insufficient TKB");
    }

    #[test]
    fn test_settlement_error_conversion() {
        let err: EngineError = SettlementError::InsufficientFunds {
            asset: "TKA".to_string(),
        }
        .into();
        assert_eq!(
            err,
            EngineError::InsufficientFunds {
                asset: "TKA".to_string()
            }
        );

        let err: EngineError = SettlementError::Failure("ledger offline".to_string()).into();
        assert!(matches!(err, EngineError::SettlementFailure(ref m) if m.contains("ledger offline")));

        let err: EngineError = SettlementError::Overflow.into();
        assert!(matches!(err, EngineError::SettlementFailure(_)));
    }
}
