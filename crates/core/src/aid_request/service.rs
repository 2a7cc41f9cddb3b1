//! Aid request submission and stage review logic.
//!
//! All functions here are pure: they take the current entity, validate
//! the requested transition, and return the updated entity or a typed
//! error. Persistence is the repository's job.

use chrono::Utc;
use uuid::Uuid;

use almoner_shared::types::Money;

use crate::aid_request::allowance::AttendanceSummary;
use crate::aid_request::error::AidRequestError;
use crate::aid_request::types::{
    AidRequest, FundCategory, Period, ReviewDecision, ReviewStage, StageDecision, StageReview,
};
use crate::role::ActorRole;

/// Input for submitting a new aid request.
#[derive(Debug, Clone)]
pub struct SubmitAidRequestInput {
    /// The submitting beneficiary.
    pub beneficiary_id: Uuid,
    /// Facility/unit of the beneficiary, for scoped queues.
    pub unit_id: Option<Uuid>,
    /// Fund category.
    pub category: FundCategory,
    /// Requested amount.
    pub amount: Money,
    /// Period covered; required for cost-of-living, forbidden otherwise.
    pub period: Option<Period>,
    /// Free-text purpose.
    pub purpose: String,
}

/// Stateless service for aid request lifecycle transitions.
pub struct AidRequestService;

impl AidRequestService {
    /// Builds a new aid request from a submission.
    ///
    /// `has_open_period_request` reports whether a non-rejected request
    /// already exists for the same beneficiary and period; the
    /// repository evaluates it inside the submission transaction.
    ///
    /// # Errors
    ///
    /// * `AmountNotPositive` if the requested amount is zero
    /// * `PeriodRequired` / `PeriodNotAllowed` on category/period mismatch
    /// * `DuplicatePeriodRequest` if an open request covers the period
    pub fn submit(
        input: SubmitAidRequestInput,
        has_open_period_request: bool,
    ) -> Result<AidRequest, AidRequestError> {
        if input.amount.is_zero() {
            return Err(AidRequestError::AmountNotPositive);
        }

        match (input.category.requires_period(), input.period) {
            (true, None) => return Err(AidRequestError::PeriodRequired),
            (false, Some(_)) => return Err(AidRequestError::PeriodNotAllowed),
            _ => {}
        }

        if let Some(period) = input.period
            && has_open_period_request
        {
            return Err(AidRequestError::DuplicatePeriodRequest { period });
        }

        let now = Utc::now();
        Ok(AidRequest {
            id: Uuid::now_v7(),
            beneficiary_id: input.beneficiary_id,
            unit_id: input.unit_id,
            category: input.category,
            amount: input.amount,
            period: input.period,
            purpose: input.purpose,
            stage: ReviewStage::Caseworker,
            caseworker_review: StageReview::pending(),
            finance_review: StageReview::pending(),
            director_review: StageReview::pending(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Records a stage decision and advances or freezes the cursor.
    ///
    /// Valid only when `actor_role` owns the request's current stage and
    /// that stage is still pending. Approval advances the cursor
    /// (director approval moves it to `Done`); rejection freezes it.
    ///
    /// # Errors
    ///
    /// * `InvalidStageTransition` if the role does not own the cursor
    /// * `AlreadyDecided` if the current stage was already decided
    /// * `RejectionReasonRequired` if rejecting without notes
    pub fn review(
        mut request: AidRequest,
        actor_role: ActorRole,
        reviewer: Uuid,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<AidRequest, AidRequestError> {
        // Resolve the stage this role owns; beneficiaries and admins
        // own none.
        let Some(stage) = ReviewStage::owned_by(actor_role) else {
            return Err(AidRequestError::InvalidStageTransition {
                stage: request.stage,
                role: actor_role,
            });
        };

        // A repeated or racing decision on the same stage is a conflict,
        // reported with who decided and when.
        let Some(current) = request.review_for(stage) else {
            return Err(AidRequestError::InvalidStageTransition {
                stage: request.stage,
                role: actor_role,
            });
        };
        if !current.is_pending() {
            return Err(AidRequestError::AlreadyDecided {
                stage,
                decided_by: current.reviewer,
                decided_at: current.decided_at,
            });
        }

        // Out-of-turn: the cursor is not on this role's stage. This also
        // covers frozen requests, whose cursor stays on the rejecting
        // stage.
        if request.stage != stage {
            return Err(AidRequestError::InvalidStageTransition {
                stage: request.stage,
                role: actor_role,
            });
        }

        if decision == ReviewDecision::Reject
            && notes.as_deref().is_none_or(|n| n.trim().is_empty())
        {
            return Err(AidRequestError::RejectionReasonRequired);
        }

        let now = Utc::now();
        let recorded = StageReview {
            decision: match decision {
                ReviewDecision::Approve => StageDecision::Approved,
                ReviewDecision::Reject => StageDecision::Rejected,
            },
            reviewer: Some(reviewer),
            decided_at: Some(now),
            notes,
        };

        match stage {
            ReviewStage::Caseworker => request.caseworker_review = recorded,
            ReviewStage::Finance => request.finance_review = recorded,
            ReviewStage::Director => request.director_review = recorded,
            ReviewStage::Done => unreachable!("Done has no owning role"),
        }

        if decision == ReviewDecision::Approve {
            request.stage = stage.next();
        }
        request.updated_at = now;

        Ok(request)
    }

    /// Re-derives the amount of a pending cost-of-living request from
    /// attendance data.
    ///
    /// Idempotent: the amount is always computed from the provider's
    /// source data. Requests that are not cost-of-living, or whose
    /// caseworker stage is already decided, are returned unchanged.
    /// Returns the (possibly updated) request and whether it changed.
    #[must_use]
    pub fn recalculate_amount(
        mut request: AidRequest,
        attendance: &AttendanceSummary,
    ) -> (AidRequest, bool) {
        if request.category != FundCategory::CostOfLiving || !request.is_undecided() {
            return (request, false);
        }

        let Some(derived) = attendance.allowance_amount() else {
            return (request, false);
        };

        if request.amount == derived {
            return (request, false);
        }

        request.amount = derived;
        request.updated_at = Utc::now();
        (request, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn money(d: rust_decimal::Decimal) -> Money {
        Money::new(d).unwrap()
    }

    fn submit_input(category: FundCategory, period: Option<Period>) -> SubmitAidRequestInput {
        SubmitAidRequestInput {
            beneficiary_id: Uuid::new_v4(),
            unit_id: None,
            category,
            amount: money(dec!(1000)),
            period,
            purpose: "Semester fees".to_string(),
        }
    }

    fn pending_request() -> AidRequest {
        AidRequestService::submit(submit_input(FundCategory::Tuition, None), false).unwrap()
    }

    #[test]
    fn test_submit_tuition() {
        let request = pending_request();
        assert_eq!(request.stage, ReviewStage::Caseworker);
        assert!(request.caseworker_review.is_pending());
        assert!(request.finance_review.is_pending());
        assert!(request.director_review.is_pending());
    }

    #[test]
    fn test_submit_cost_of_living_requires_period() {
        let result = AidRequestService::submit(
            submit_input(FundCategory::CostOfLiving, None),
            false,
        );
        assert!(matches!(result, Err(AidRequestError::PeriodRequired)));
    }

    #[test]
    fn test_submit_tuition_rejects_period() {
        let result = AidRequestService::submit(
            submit_input(FundCategory::Tuition, Period::new(3, 2026)),
            false,
        );
        assert!(matches!(result, Err(AidRequestError::PeriodNotAllowed)));
    }

    #[test]
    fn test_submit_duplicate_period_fails() {
        let result = AidRequestService::submit(
            submit_input(FundCategory::CostOfLiving, Period::new(3, 2026)),
            true,
        );
        assert!(matches!(
            result,
            Err(AidRequestError::DuplicatePeriodRequest { .. })
        ));
    }

    #[test]
    fn test_submit_zero_amount_fails() {
        let mut input = submit_input(FundCategory::Tuition, None);
        input.amount = Money::ZERO;
        let result = AidRequestService::submit(input, false);
        assert!(matches!(result, Err(AidRequestError::AmountNotPositive)));
    }

    #[test]
    fn test_review_in_stage_order() {
        let reviewer = Uuid::new_v4();
        let request = pending_request();

        let request = AidRequestService::review(
            request,
            ActorRole::Caseworker,
            reviewer,
            ReviewDecision::Approve,
            None,
        )
        .unwrap();
        assert_eq!(request.stage, ReviewStage::Finance);

        let request = AidRequestService::review(
            request,
            ActorRole::Finance,
            reviewer,
            ReviewDecision::Approve,
            None,
        )
        .unwrap();
        assert_eq!(request.stage, ReviewStage::Director);

        let request = AidRequestService::review(
            request,
            ActorRole::Director,
            reviewer,
            ReviewDecision::Approve,
            Some("Cleared".to_string()),
        )
        .unwrap();
        assert_eq!(request.stage, ReviewStage::Done);
        assert!(request.is_fully_approved());
    }

    #[test]
    fn test_review_out_of_turn_role_fails() {
        let request = pending_request();
        let result = AidRequestService::review(
            request,
            ActorRole::Director,
            Uuid::new_v4(),
            ReviewDecision::Approve,
            None,
        );
        assert!(matches!(
            result,
            Err(AidRequestError::InvalidStageTransition {
                stage: ReviewStage::Caseworker,
                role: ActorRole::Director,
            })
        ));
    }

    #[test]
    fn test_review_beneficiary_never_owns_a_stage() {
        let request = pending_request();
        let result = AidRequestService::review(
            request,
            ActorRole::Beneficiary,
            Uuid::new_v4(),
            ReviewDecision::Approve,
            None,
        );
        assert!(matches!(
            result,
            Err(AidRequestError::InvalidStageTransition { .. })
        ));
    }

    #[test]
    fn test_rejection_freezes_request() {
        let reviewer = Uuid::new_v4();
        let request = pending_request();

        let request = AidRequestService::review(
            request,
            ActorRole::Caseworker,
            reviewer,
            ReviewDecision::Reject,
            Some("Missing documents".to_string()),
        )
        .unwrap();
        assert_eq!(request.stage, ReviewStage::Caseworker);
        assert_eq!(request.rejected_at(), Some(ReviewStage::Caseworker));

        // The cursor stays put, so any further attempt is a conflict.
        let result = AidRequestService::review(
            request,
            ActorRole::Caseworker,
            reviewer,
            ReviewDecision::Approve,
            None,
        );
        assert!(matches!(result, Err(AidRequestError::AlreadyDecided { .. })));
    }

    #[test]
    fn test_rejection_requires_reason() {
        let request = pending_request();
        let result = AidRequestService::review(
            request,
            ActorRole::Caseworker,
            Uuid::new_v4(),
            ReviewDecision::Reject,
            Some("   ".to_string()),
        );
        assert!(matches!(
            result,
            Err(AidRequestError::RejectionReasonRequired)
        ));
    }

    #[test]
    fn test_already_decided_reports_reviewer() {
        let reviewer = Uuid::new_v4();
        let request = pending_request();
        let request = AidRequestService::review(
            request,
            ActorRole::Caseworker,
            reviewer,
            ReviewDecision::Approve,
            None,
        )
        .unwrap();

        // Losing side of a race: the stage is already decided, and the
        // error names the reviewer who got there first.
        let result = AidRequestService::review(
            request,
            ActorRole::Caseworker,
            Uuid::new_v4(),
            ReviewDecision::Approve,
            None,
        );
        match result {
            Err(AidRequestError::AlreadyDecided {
                stage, decided_by, ..
            }) => {
                assert_eq!(stage, ReviewStage::Caseworker);
                assert_eq!(decided_by, Some(reviewer));
            }
            other => panic!("Expected AlreadyDecided, got {other:?}"),
        }
    }

    #[test]
    fn test_recalculate_pending_cost_of_living() {
        let input = SubmitAidRequestInput {
            amount: money(dec!(100)),
            ..submit_input(FundCategory::CostOfLiving, Period::new(3, 2026))
        };
        let request = AidRequestService::submit(input, false).unwrap();

        let attendance = AttendanceSummary {
            attended_days: 18,
            daily_rate: money(dec!(10)),
        };
        let (request, changed) = AidRequestService::recalculate_amount(request, &attendance);
        assert!(changed);
        assert_eq!(request.amount.amount(), dec!(180));

        // Idempotent: a second pass derives the same amount.
        let (request, changed) = AidRequestService::recalculate_amount(request, &attendance);
        assert!(!changed);
        assert_eq!(request.amount.amount(), dec!(180));
    }

    #[test]
    fn test_recalculate_skips_decided_requests() {
        let input = SubmitAidRequestInput {
            amount: money(dec!(100)),
            ..submit_input(FundCategory::CostOfLiving, Period::new(3, 2026))
        };
        let request = AidRequestService::submit(input, false).unwrap();
        let request = AidRequestService::review(
            request,
            ActorRole::Caseworker,
            Uuid::new_v4(),
            ReviewDecision::Approve,
            None,
        )
        .unwrap();

        let attendance = AttendanceSummary {
            attended_days: 18,
            daily_rate: money(dec!(10)),
        };
        let (request, changed) = AidRequestService::recalculate_amount(request, &attendance);
        assert!(!changed);
        assert_eq!(request.amount.amount(), dec!(100));
    }

    #[test]
    fn test_recalculate_skips_other_categories() {
        let request = pending_request();
        let attendance = AttendanceSummary {
            attended_days: 18,
            daily_rate: money(dec!(10)),
        };
        let (_, changed) = AidRequestService::recalculate_amount(request, &attendance);
        assert!(!changed);
    }
}
