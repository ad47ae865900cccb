//! Registration rules: the payment state machine and the tournament
//! lifecycle. Everything in here is synchronous and side-effect free; the
//! services apply the outcomes to the database.

pub mod lifecycle;
pub mod payment;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("This tournament is no longer accepting entries")]
    Closed,
    #[error("Tournament is full")]
    Full,
    #[error("You have already joined this tournament")]
    AlreadyJoined,
    #[error("Payment is already verified")]
    AlreadyVerified,
    #[error("Payment is already rejected")]
    AlreadyRejected,
    #[error("Verified payments cannot be rejected")]
    RejectVerified,
    #[error("Only upcoming tournaments can be started")]
    NotUpcoming,
    #[error("Only active tournaments can be completed")]
    NotActive,
    #[error("Cannot start tournament. Minimum {0} players required.")]
    BelowMinimum(i64),
    #[error("Room ID and password are required")]
    MissingRoomDetails,
    #[error("{0}")]
    InvalidTournament(String),
    #[error("{0}")]
    InvalidWinners(String),
}

impl From<RuleViolation> for AppError {
    fn from(violation: RuleViolation) -> Self {
        match violation {
            RuleViolation::Full
            | RuleViolation::AlreadyJoined
            | RuleViolation::AlreadyVerified
            | RuleViolation::AlreadyRejected
            | RuleViolation::RejectVerified => AppError::Conflict(violation.to_string()),
            _ => AppError::BadRequest(violation.to_string()),
        }
    }
}
