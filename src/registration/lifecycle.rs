use std::collections::HashSet;

use rand::rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::db::models::{PaymentStatus, Tournament, TournamentStatus};
use crate::registration::RuleViolation;

/// Checks that `tournament` takes new entries for a user whose existing
/// payment (if any) is in `existing`.
pub fn check_joinable(
    tournament: &Tournament,
    existing: Option<PaymentStatus>,
) -> Result<(), RuleViolation> {
    if !matches!(
        tournament.status,
        TournamentStatus::Upcoming | TournamentStatus::Active
    ) {
        return Err(RuleViolation::Closed);
    }
    if tournament.is_full() {
        return Err(RuleViolation::Full);
    }
    if existing == Some(PaymentStatus::Verified) {
        return Err(RuleViolation::AlreadyJoined);
    }
    Ok(())
}

pub fn check_startable(
    tournament: &Tournament,
    room_id: &str,
    password: &str,
) -> Result<(), RuleViolation> {
    if tournament.status != TournamentStatus::Upcoming {
        return Err(RuleViolation::NotUpcoming);
    }
    let minimum = tournament.min_participants.unwrap_or(0);
    if tournament.participants < minimum {
        return Err(RuleViolation::BelowMinimum(minimum));
    }
    if room_id.trim().is_empty() || password.trim().is_empty() {
        return Err(RuleViolation::MissingRoomDetails);
    }
    Ok(())
}

pub struct TournamentDraft<'a> {
    pub name: &'a str,
    pub entry_fee: i64,
    pub prize_pool: i64,
    pub max_participants: i64,
    pub min_participants: Option<i64>,
}

pub fn validate_draft(draft: &TournamentDraft<'_>) -> Result<(), RuleViolation> {
    let invalid = |msg: &str| Err(RuleViolation::InvalidTournament(msg.to_string()));

    if draft.name.trim().is_empty() {
        return invalid("Tournament name is required");
    }
    if draft.entry_fee < 0 || draft.prize_pool < 0 {
        return invalid("Entry fee and prize pool cannot be negative");
    }
    if draft.max_participants <= 0 {
        return invalid("Maximum participants must be positive");
    }
    if let Some(min) = draft.min_participants {
        if min < 0 || min > draft.max_participants {
            return invalid("Minimum participants must be between 0 and the maximum");
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Placement {
    pub user_id: i64,
    pub rank: i64,
    pub prize_amount: i64,
}

/// Validates final standings against the verified participants and the
/// prize pool.
pub fn validate_placements(
    placements: &[Placement],
    verified_users: &[i64],
    prize_pool: i64,
) -> Result<(), RuleViolation> {
    let invalid = |msg: String| Err(RuleViolation::InvalidWinners(msg));

    if placements.is_empty() {
        return invalid("At least one winner is required".to_string());
    }

    let mut ranks = HashSet::new();
    let mut users = HashSet::new();
    let mut total = 0i64;

    for p in placements {
        if p.rank <= 0 {
            return invalid(format!("Rank {} is not valid", p.rank));
        }
        if !ranks.insert(p.rank) {
            return invalid(format!("Rank {} is assigned twice", p.rank));
        }
        if !users.insert(p.user_id) {
            return invalid(format!("User {} is placed twice", p.user_id));
        }
        if p.prize_amount < 0 {
            return invalid("Prize amounts cannot be negative".to_string());
        }
        if !verified_users.contains(&p.user_id) {
            return invalid(format!(
                "User {} is not a verified participant",
                p.user_id
            ));
        }
        if p.prize_amount > prize_pool {
            return invalid(format!(
                "Prize for rank {} exceeds the prize pool of {prize_pool}",
                p.rank
            ));
        }
        total = match total.checked_add(p.prize_amount) {
            Some(sum) if sum <= prize_pool => sum,
            _ => {
                return invalid(format!(
                    "Prizes exceed the prize pool of {prize_pool}"
                ));
            }
        };
    }
    Ok(())
}

/// Shuffles the verified participants into lobby slots numbered from 1.
pub fn assign_slots(mut user_ids: Vec<i64>) -> Vec<(i64, i64)> {
    let mut rng = rng();
    user_ids.shuffle(&mut rng);

    user_ids
        .into_iter()
        .zip(1..)
        .collect()
}
