//! Trip lifecycle arithmetic: the initial deposit floor for universal trips
//! and the settlement applied when an organizer cancels.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{Octas, TripError};

/// Share of the escrow an organizer forfeits when canceling a trip that had
/// already reached its funding target.
pub const CANCELLATION_PENALTY_PERCENT: u32 = 20;

/// A universal trip's organizer must lock up at least this many
/// per-person shares when creating it.
pub const INITIAL_DEPOSIT_MULTIPLIER: u32 = 2;

/// `deposit >= 2 * trunc(amount * 10^8)`, or a validation error.
pub fn validate_initial_deposit(amount: Decimal, deposit: &Octas) -> Result<(), TripError> {
    let per_person = Octas::from_major_units(amount)?;
    let required = per_person.times(INITIAL_DEPOSIT_MULTIPLIER);
    if *deposit < required {
        return Err(TripError::validation(format!(
            "Initial deposit must be at least 2x per-member cost ({required} octas)"
        )));
    }
    Ok(())
}

/// Result of canceling a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationSettlement {
    /// `participants * amount`, in currency units.
    #[serde(with = "rust_decimal::serde::float")]
    pub collected_usd: Decimal,
    pub penalty: Octas,
    pub remaining: Octas,
}

/// Work out what happens to `escrow` when the organizer cancels.
///
/// The penalty applies only when a positive funding target was met:
/// `min_fund > 0 && participants * amount >= min_fund`. It is
/// `floor(escrow * 20 / 100)` and comes out of the escrow.
pub fn settle_cancellation(
    escrow: &Octas,
    participants: u64,
    amount: Decimal,
    min_fund: Decimal,
) -> CancellationSettlement {
    let collected_usd = Decimal::from(participants).saturating_mul(amount);

    let target_met = min_fund > Decimal::ZERO && collected_usd >= min_fund;
    if !target_met {
        return CancellationSettlement {
            collected_usd,
            penalty: Octas::zero(),
            remaining: escrow.clone(),
        };
    }

    let penalty = escrow.percent_floor(CANCELLATION_PENALTY_PERCENT);
    // penalty <= escrow, always
    let remaining = escrow.checked_sub(&penalty).unwrap_or_default();
    CancellationSettlement {
        collected_usd,
        penalty,
        remaining,
    }
}
