#![allow(dead_code)]

use crate::{CancellationSettlement, Octas, Trip, TripKind, TripStatus};

/// Escrow must only grow by exactly the credited amount.
pub fn assert_credit_invariant(before: &Octas, after: &Octas, credited: &Octas) {
    assert_eq!(
        after,
        &(before + credited),
        "escrow credit broken: {before} + {credited} != {after}"
    );
}

/// Penalty and remaining escrow always add back up to the escrow that was
/// settled, and the penalty never exceeds a fifth of it.
pub fn assert_settlement_conserves(escrow: &Octas, settlement: &CancellationSettlement) {
    assert_eq!(
        &(&settlement.penalty + &settlement.remaining),
        escrow,
        "settlement leaks octas: {} + {} != {}",
        settlement.penalty,
        settlement.remaining,
        escrow
    );
    assert!(
        settlement.penalty.times(5) <= *escrow,
        "penalty {} exceeds 20% of {}",
        settlement.penalty,
        escrow
    );
}

/// Private trips carry a code, universal trips never do.
pub fn assert_code_matches_kind(trip: &Trip) {
    match trip.kind {
        TripKind::Private => assert!(
            trip.code.as_deref().is_some_and(|c| !c.is_empty()),
            "private trip {} has no code",
            trip.id
        ),
        TripKind::Universal => assert!(
            trip.code.is_none(),
            "universal trip {} has a code",
            trip.id
        ),
    }
}

/// Only a canceled trip may carry a penalty.
pub fn assert_penalty_only_when_canceled(trip: &Trip) {
    if trip.status != TripStatus::Canceled {
        assert!(
            trip.penalty_octas.is_zero(),
            "trip {} is {} but carries a penalty",
            trip.id,
            trip.status
        );
    }
}
