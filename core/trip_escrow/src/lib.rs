//! # TrustTrip escrow rules
//!
//! Domain crate of the **TrustTrip** trip-crowdfunding service. It holds the
//! rules that every store-backed operation of the API applies before (or
//! instead of) touching the database:
//!
//! | Phase         | Rule(s)                                                      |
//! |---------------|--------------------------------------------------------------|
//! | Creation      | [`TripDraft::validate`], [`lifecycle::validate_initial_deposit`] |
//! | Private codes | [`code::generate_code`], [`code::normalize_code`]            |
//! | Check-in      | [`Trip::ensure_open`], [`Octas`] escrow addition             |
//! | Confirm       | [`Trip::authorize_organizer`], [`Trip::ensure_open`]         |
//! | Cancel        | [`lifecycle::settle_cancellation`]                           |
//! | Login         | [`profile::derive_wallet_profile`]                           |
//!
//! ## Architecture
//!
//! Nothing in this crate performs I/O. Uniqueness (one participant per
//! wallet and trip, one private trip per code) is left to the store's
//! unique indexes; this crate only names the resulting conflicts through
//! [`TripError`].
//!
//! Escrow amounts are [`Octas`]: arbitrary-precision unsigned integers that
//! travel as decimal strings. Currency amounts (per-person price, funding
//! target) are [`rust_decimal::Decimal`].

pub mod code;
pub mod lifecycle;
pub mod octas;
pub mod profile;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_lifecycle;

use thiserror::Error;

pub use lifecycle::{settle_cancellation, CancellationSettlement, CANCELLATION_PENALTY_PERCENT};
pub use octas::{Octas, OCTAS_PER_COIN};
pub use profile::WalletProfile;
pub use types::{
    CodeAssignment, CodeOption, MessageKind, NewTrip, PaymentStatus, Trip, TripDraft, TripKind,
    TripStatus,
};

/// Every failure a TrustTrip operation can report to its caller.
///
/// Each variant maps one-to-one onto an HTTP status at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripError {
    /// Missing or malformed input, rejected before any store access.
    #[error("{0}")]
    Validation(String),

    /// Caller is not the trip's organizer.
    #[error("{0}")]
    Forbidden(String),

    /// Trip, participant, user or message absent.
    #[error("{0}")]
    NotFound(String),

    #[error("Trip is not open")]
    TripNotOpen,

    #[error("Already checked in")]
    AlreadyCheckedIn,

    #[error("Trip code already exists")]
    DuplicateCode,

    #[error("Trip id already exists")]
    DuplicateTripId,

    #[error("Profile already locked")]
    ProfileLocked,
}

impl TripError {
    /// Stable machine-readable code, surfaced next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::TripNotOpen => "TRIP_NOT_OPEN",
            Self::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            Self::DuplicateCode => "DUPLICATE_CODE",
            Self::DuplicateTripId => "DUPLICATE_TRIP_ID",
            Self::ProfileLocked => "PROFILE_LOCKED",
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }
}

pub type Result<T> = std::result::Result<T, TripError>;
