//! Redemption code validation.

use std::sync::Arc;

use chrono::Utc;

use seatflow_core::result::AppResult;
use seatflow_core::traits::CodeRepository;

/// Outcome of a stand-alone code validation.
///
/// Mutually exclusive. A consumed warranty code whose warranty is still
/// open validates as `Valid` here; whether this requester may actually
/// reuse it is decided by the warranty policy under the allocation lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeValidation {
    /// The code can enter the redemption flow.
    Valid,
    /// No such code exists.
    NotFound,
    /// The code is consumed and not warranty-reusable at this check.
    AlreadyConsumed,
}

impl CodeValidation {
    /// Whether the code may proceed to redemption.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Human-readable denial reason, if any.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::NotFound => Some("Redemption code does not exist"),
            Self::AlreadyConsumed => Some("Redemption code has already been used"),
        }
    }
}

/// Checks a code's existence, status, and warranty expiry in isolation.
///
/// Pure read; never mutates state. The final consumption decision is
/// always re-made by the orchestrator under lock, because validity can
/// change between this check and the reservation.
#[derive(Clone)]
pub struct RedemptionValidator {
    codes: Arc<dyn CodeRepository>,
}

impl RedemptionValidator {
    /// Creates a new validator.
    pub fn new(codes: Arc<dyn CodeRepository>) -> Self {
        Self { codes }
    }

    /// Validate a code.
    pub async fn validate(&self, code: &str) -> AppResult<CodeValidation> {
        let Some(row) = self.codes.find_by_code(code).await? else {
            return Ok(CodeValidation::NotFound);
        };

        if row.is_unused() {
            return Ok(CodeValidation::Valid);
        }
        if row.has_warranty && !row.warranty_expired_at(Utc::now()) {
            return Ok(CodeValidation::Valid);
        }
        Ok(CodeValidation::AlreadyConsumed)
    }
}
