use regex::Regex;

use crate::db::models::PaymentStatus;
use crate::registration::RuleViolation;

/// Length of a reference that is well-formed but doesn't match the pattern.
pub const UTR_REVIEW_LEN: usize = 10;

/// A UTR is accepted outright when it is the tournament id followed by
/// exactly nine ASCII digits.
pub fn utr_pattern(tournament_id: i64) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        "^{}[0-9]{{9}}$",
        regex::escape(&tournament_id.to_string())
    ))
}

/// Classifies a submitted UTR number on its own, ignoring any earlier state.
pub fn classify_utr(tournament_id: i64, utr: &str) -> PaymentStatus {
    let matches = utr_pattern(tournament_id)
        .map(|re| re.is_match(utr))
        .unwrap_or(false);

    if matches {
        PaymentStatus::Verified
    } else if utr.encode_utf16().count() == UTR_REVIEW_LEN {
        PaymentStatus::UnderReview
    } else {
        PaymentStatus::Rejected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub status: PaymentStatus,
    /// The payment just became verified and needs a participant seat.
    pub takes_seat: bool,
}

/// Applies a UTR submission to a payment in state `current`.
pub fn submit_utr(current: PaymentStatus, tournament_id: i64, utr: &str) -> Submission {
    if current == PaymentStatus::Verified {
        return Submission {
            status: PaymentStatus::Verified,
            takes_seat: false,
        };
    }

    let status = classify_utr(tournament_id, utr);
    Submission {
        status,
        takes_seat: status == PaymentStatus::Verified,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

/// Manual decision taken by an admin on the verification queue.
pub fn review(current: PaymentStatus, action: ReviewAction) -> Result<PaymentStatus, RuleViolation> {
    match (action, current) {
        (ReviewAction::Approve, PaymentStatus::Verified) => Err(RuleViolation::AlreadyVerified),
        (ReviewAction::Approve, _) => Ok(PaymentStatus::Verified),
        (ReviewAction::Reject, PaymentStatus::Verified) => Err(RuleViolation::RejectVerified),
        (ReviewAction::Reject, PaymentStatus::Rejected) => Err(RuleViolation::AlreadyRejected),
        (ReviewAction::Reject, _) => Ok(PaymentStatus::Rejected),
    }
}
