//! Aid request domain types.
//!
//! An aid request carries a stage cursor pointing at the reviewer role
//! that owns the next decision, plus one decision record per stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use almoner_shared::types::Money;

use crate::role::ActorRole;

/// Category of funds being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundCategory {
    /// Tuition assistance.
    Tuition,
    /// Monthly cost-of-living allowance derived from attendance.
    CostOfLiving,
    /// Any other aid purpose.
    Other,
}

impl FundCategory {
    /// Returns the string representation of the category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tuition => "tuition",
            Self::CostOfLiving => "cost_of_living",
            Self::Other => "other",
        }
    }

    /// Parses a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tuition" => Some(Self::Tuition),
            "cost_of_living" => Some(Self::CostOfLiving),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Returns true if requests in this category are scoped to a month.
    #[must_use]
    pub fn requires_period(&self) -> bool {
        matches!(self, Self::CostOfLiving)
    }
}

impl fmt::Display for FundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (month, year) period for cost-of-living requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Month, 1-12.
    pub month: u8,
    /// Calendar year.
    pub year: i32,
}

impl Period {
    /// Creates a period, rejecting out-of-range months.
    #[must_use]
    pub fn new(month: u8, year: i32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { month, year })
        } else {
            None
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Stage cursor: which reviewer role owns the next decision.
///
/// Decisions are made strictly in this order; `Done` means all three
/// stages have approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStage {
    /// Awaiting the caseworker decision.
    Caseworker,
    /// Awaiting the finance decision.
    Finance,
    /// Awaiting the director decision.
    Director,
    /// All three stages approved.
    Done,
}

impl ReviewStage {
    /// Returns the string representation of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Caseworker => "caseworker",
            Self::Finance => "finance",
            Self::Director => "director",
            Self::Done => "done",
        }
    }

    /// Parses a stage from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "caseworker" => Some(Self::Caseworker),
            "finance" => Some(Self::Finance),
            "director" => Some(Self::Director),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// The stage the cursor advances to after an approval.
    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            Self::Caseworker => Self::Finance,
            Self::Finance => Self::Director,
            Self::Director | Self::Done => Self::Done,
        }
    }

    /// The role that owns the decision at this stage, if any.
    #[must_use]
    pub fn reviewer_role(&self) -> Option<ActorRole> {
        match self {
            Self::Caseworker => Some(ActorRole::Caseworker),
            Self::Finance => Some(ActorRole::Finance),
            Self::Director => Some(ActorRole::Director),
            Self::Done => None,
        }
    }

    /// The stage a given role owns, if any.
    #[must_use]
    pub fn owned_by(role: ActorRole) -> Option<Self> {
        match role {
            ActorRole::Caseworker => Some(Self::Caseworker),
            ActorRole::Finance => Some(Self::Finance),
            ActorRole::Director => Some(Self::Director),
            ActorRole::Beneficiary | ActorRole::Admin => None,
        }
    }
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision recorded at a review stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageDecision {
    /// No decision yet.
    Pending,
    /// Stage approved.
    Approved,
    /// Stage rejected; the request is frozen.
    Rejected,
}

impl StageDecision {
    /// Returns the string representation of the decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a decision from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for StageDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision a reviewer passes into `review`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    /// Approve the current stage.
    Approve,
    /// Reject the request; terminal.
    Reject,
}

/// Decision record for one review stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReview {
    /// Decision at this stage.
    pub decision: StageDecision,
    /// Reviewer who decided, once decided.
    pub reviewer: Option<Uuid>,
    /// When the decision was made.
    pub decided_at: Option<DateTime<Utc>>,
    /// Reviewer notes; required for rejections.
    pub notes: Option<String>,
}

impl StageReview {
    /// An undecided review record.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            decision: StageDecision::Pending,
            reviewer: None,
            decided_at: None,
            notes: None,
        }
    }

    /// Returns true if no decision has been made.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.decision == StageDecision::Pending
    }
}

/// A beneficiary's request for funds, subject to three-stage review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidRequest {
    /// Unique identifier.
    pub id: Uuid,
    /// The beneficiary who submitted the request.
    pub beneficiary_id: Uuid,
    /// Facility/unit the beneficiary belongs to, for scoped queues.
    pub unit_id: Option<Uuid>,
    /// What kind of funds are requested.
    pub category: FundCategory,
    /// Requested (and, once approved, granted) amount.
    pub amount: Money,
    /// Period covered; present only for cost-of-living requests.
    pub period: Option<Period>,
    /// Free-text purpose.
    pub purpose: String,
    /// Stage cursor.
    pub stage: ReviewStage,
    /// Caseworker stage decision record.
    pub caseworker_review: StageReview,
    /// Finance stage decision record.
    pub finance_review: StageReview,
    /// Director stage decision record.
    pub director_review: StageReview,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AidRequest {
    /// Returns the review record for a stage.
    ///
    /// `Done` has no record of its own; callers should not ask for it.
    #[must_use]
    pub fn review_for(&self, stage: ReviewStage) -> Option<&StageReview> {
        match stage {
            ReviewStage::Caseworker => Some(&self.caseworker_review),
            ReviewStage::Finance => Some(&self.finance_review),
            ReviewStage::Director => Some(&self.director_review),
            ReviewStage::Done => None,
        }
    }

    /// Returns true if all three stages are approved.
    #[must_use]
    pub fn is_fully_approved(&self) -> bool {
        self.stage == ReviewStage::Done
            && self.caseworker_review.decision == StageDecision::Approved
            && self.finance_review.decision == StageDecision::Approved
            && self.director_review.decision == StageDecision::Approved
    }

    /// Returns the stage at which the request was rejected, if any.
    #[must_use]
    pub fn rejected_at(&self) -> Option<ReviewStage> {
        if self.caseworker_review.decision == StageDecision::Rejected {
            Some(ReviewStage::Caseworker)
        } else if self.finance_review.decision == StageDecision::Rejected {
            Some(ReviewStage::Finance)
        } else if self.director_review.decision == StageDecision::Rejected {
            Some(ReviewStage::Director)
        } else {
            None
        }
    }

    /// Returns true if the caseworker stage is still undecided.
    ///
    /// Only such requests are eligible for allowance recalculation.
    #[must_use]
    pub fn is_undecided(&self) -> bool {
        self.stage == ReviewStage::Caseworker && self.caseworker_review.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_rejects_bad_month() {
        assert!(Period::new(0, 2026).is_none());
        assert!(Period::new(13, 2026).is_none());
        assert!(Period::new(6, 2026).is_some());
    }

    #[test]
    fn test_period_display() {
        let p = Period::new(3, 2026).unwrap();
        assert_eq!(p.to_string(), "2026-03");
    }

    #[test]
    fn test_stage_next_order() {
        assert_eq!(ReviewStage::Caseworker.next(), ReviewStage::Finance);
        assert_eq!(ReviewStage::Finance.next(), ReviewStage::Director);
        assert_eq!(ReviewStage::Director.next(), ReviewStage::Done);
        assert_eq!(ReviewStage::Done.next(), ReviewStage::Done);
    }

    #[test]
    fn test_stage_reviewer_role() {
        assert_eq!(
            ReviewStage::Caseworker.reviewer_role(),
            Some(ActorRole::Caseworker)
        );
        assert_eq!(ReviewStage::Finance.reviewer_role(), Some(ActorRole::Finance));
        assert_eq!(
            ReviewStage::Director.reviewer_role(),
            Some(ActorRole::Director)
        );
        assert_eq!(ReviewStage::Done.reviewer_role(), None);
    }

    #[test]
    fn test_category_requires_period() {
        assert!(FundCategory::CostOfLiving.requires_period());
        assert!(!FundCategory::Tuition.requires_period());
        assert!(!FundCategory::Other.requires_period());
    }

    #[test]
    fn test_category_round_trip() {
        for c in [
            FundCategory::Tuition,
            FundCategory::CostOfLiving,
            FundCategory::Other,
        ] {
            assert_eq!(FundCategory::parse(c.as_str()), Some(c));
        }
        assert_eq!(FundCategory::parse("unknown"), None);
    }

    #[test]
    fn test_stage_parse() {
        assert_eq!(ReviewStage::parse("DONE"), Some(ReviewStage::Done));
        assert_eq!(ReviewStage::parse("bogus"), None);
    }
}
