use sqlx::SqlitePool;

use crate::db::models::{Payment, PaymentReview, PaymentStatus};
use crate::db::repo;
use crate::error::{AppError, AppResult};
use crate::registration::RuleViolation;
use crate::registration::payment::{ReviewAction, review};

pub async fn queue(pool: &SqlitePool) -> AppResult<Vec<PaymentReview>> {
    Ok(repo::review_queue(pool).await?)
}

/// Applies an admin decision to a payment. Approval takes a participant
/// seat in the same transaction.
pub async fn decide(pool: &SqlitePool, payment_id: i64, action: ReviewAction) -> AppResult<Payment> {
    let mut tx = pool.begin().await?;

    let payment = repo::get_payment(&mut *tx, payment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Payment not found"))?;
    let next = review(payment.status, action)?;

    if next == PaymentStatus::Verified && !repo::take_seat(&mut *tx, payment.tournament_id).await? {
        return Err(RuleViolation::Full.into());
    }
    repo::set_payment_status(&mut *tx, payment_id, next, None).await?;

    let updated = repo::get_payment(&mut *tx, payment_id)
        .await?
        .ok_or_else(|| AppError::not_found("Payment not found"))?;
    tx.commit().await?;

    tracing::info!(
        payment_id,
        tournament_id = updated.tournament_id,
        user_id = updated.user_id,
        status = ?updated.status,
        "payment reviewed"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{test_pool, tournaments};

    #[tokio::test]
    async fn test_approve_from_review_queue() {
        let pool = test_pool().await;
        let user = repo::get_user(&pool, 1).await.unwrap().unwrap();
        tournaments::verify_payment(&pool, &user, 1, "UTRA987654")
            .await
            .unwrap();

        let pending = queue(&pool).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, PaymentStatus::UnderReview);
        assert_eq!(pending[0].user_name, "Demo User");

        let approved = decide(&pool, pending[0].id, ReviewAction::Approve).await.unwrap();
        assert_eq!(approved.status, PaymentStatus::Verified);
        assert_eq!(tournaments::get(&pool, 1).await.unwrap().participants, 46);
        assert!(queue(&pool).await.unwrap().is_empty());

        let err = decide(&pool, approved.id, ReviewAction::Reject).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = decide(&pool, approved.id, ReviewAction::Approve).await.unwrap_err();
        assert_eq!(err.to_string(), "Payment is already verified");
    }

    #[tokio::test]
    async fn test_approve_when_full_is_refused() {
        let pool = test_pool().await;
        let user = repo::get_user(&pool, 1).await.unwrap().unwrap();
        let status = tournaments::verify_payment(&pool, &user, 2, "UTRF000001")
            .await
            .unwrap();
        assert_eq!(status, PaymentStatus::UnderReview);
        let payment = repo::find_payment(&pool, user.id, 2).await.unwrap().unwrap();

        let err = decide(&pool, payment.id, ReviewAction::Approve).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "Tournament is full");

        assert_eq!(tournaments::get(&pool, 2).await.unwrap().participants, 20);
        let unchanged = repo::get_payment(&pool, payment.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, PaymentStatus::UnderReview);
    }

    #[tokio::test]
    async fn test_reject_leaves_participants() {
        let pool = test_pool().await;
        let user = repo::get_user(&pool, 1).await.unwrap().unwrap();
        let ticket = tournaments::join(&pool, &user, 1).await.unwrap();

        let rejected = decide(&pool, ticket.payment.id, ReviewAction::Reject).await.unwrap();
        assert_eq!(rejected.status, PaymentStatus::Rejected);
        assert_eq!(tournaments::get(&pool, 1).await.unwrap().participants, 45);
    }

    #[tokio::test]
    async fn test_unknown_payment() {
        let pool = test_pool().await;
        let err = decide(&pool, 404, ReviewAction::Approve).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
