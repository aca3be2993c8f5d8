//! # Types
//!
//! Shared data structures for trips, check-in payments and messages.
//!
//! ## Status as a finite-state machine
//!
//! [`TripStatus`] only ever moves forward out of `Open`:
//!
//! ```text
//! Open ──► Closed      (organizer confirms)
//!   └───► Canceled    (organizer cancels, penalty may apply)
//! ```
//!
//! `Confirmed` is a recognised terminal value that no operation produces
//! yet. Every status other than `Open` rejects check-ins and further
//! confirm / cancel calls.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::code::normalize_code;
use crate::lifecycle::validate_initial_deposit;
use crate::{Octas, TripError};

/// Visibility of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripKind {
    /// Publicly listed, joinable without a code.
    Universal,
    /// Only reachable through its code.
    Private,
}

/// Lifecycle status of a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Open,
    Closed,
    Confirmed,
    Canceled,
}

/// How a private trip's code is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeOption {
    #[default]
    Auto,
    Custom,
}

/// Outcome the client reports for the on-chain payment behind a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Bug,
    Organizer,
    System,
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Identifier stored in the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = TripError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(TripError::validation(format!(
                        concat!("unknown ", stringify!($ty), ": {}"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(TripKind { Universal => "universal", Private => "private" });
text_enum!(TripStatus {
    Open => "open",
    Closed => "closed",
    Confirmed => "confirmed",
    Canceled => "canceled",
});
text_enum!(PaymentStatus {
    Success => "success",
    Failed => "failed",
    Pending => "pending",
});
text_enum!(MessageKind {
    Bug => "bug",
    Organizer => "organizer",
    System => "system",
});

/// A trip as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub date: String,
    pub end_date: String,
    /// Per-person price in currency units.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub deadline: String,
    #[serde(rename = "type")]
    pub kind: TripKind,
    /// Present only on private trips.
    pub code: Option<String>,
    /// Wallet address of the organizer.
    pub organizer: String,
    pub organizer_name: Option<String>,
    /// Funding target in currency units; `0` disables the cancellation penalty.
    #[serde(with = "rust_decimal::serde::float")]
    pub min_fund: Decimal,
    pub whatsapp_link: Option<String>,
    pub discord_link: Option<String>,
    pub initial_deposit_octas: Octas,
    pub escrow_octas: Octas,
    /// Penalty deducted at cancellation (zero otherwise).
    pub penalty_octas: Octas,
    pub status: TripStatus,
    /// Number of checked-in participants.
    pub participants: u64,
    pub created_at: i64,
}

impl Trip {
    /// Reject anything but an open trip with [`TripError::TripNotOpen`].
    pub fn ensure_open(&self) -> Result<(), TripError> {
        match self.status {
            TripStatus::Open => Ok(()),
            TripStatus::Closed | TripStatus::Confirmed | TripStatus::Canceled => {
                Err(TripError::TripNotOpen)
            }
        }
    }

    /// Only the organizer may `action` this trip.
    pub fn authorize_organizer(&self, caller: &str, action: &str) -> Result<(), TripError> {
        if self.organizer == caller {
            Ok(())
        } else {
            Err(TripError::Forbidden(format!(
                "Only organizer can {action} this trip"
            )))
        }
    }
}

/// Organizer-submitted trip, exactly as it arrives on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TripDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub end_date: Option<String>,
    pub amount: Option<Decimal>,
    pub deadline: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TripKind>,
    pub code_option: Option<CodeOption>,
    pub custom_code: Option<String>,
    pub organizer: Option<String>,
    pub organizer_name: Option<String>,
    pub min_fund: Option<Decimal>,
    pub whatsapp_link: Option<String>,
    pub discord_link: Option<String>,
    pub initial_deposit_octas: Option<Octas>,
}

/// Where a new private trip's code comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeAssignment {
    /// Universal trip: no code.
    None,
    /// Caller-chosen, already normalised.
    Custom(String),
    /// Generated by the store layer, regenerated on collision.
    Generated,
}

/// A [`TripDraft`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrip {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub date: String,
    pub end_date: String,
    pub amount: Decimal,
    pub deadline: String,
    pub kind: TripKind,
    pub code: CodeAssignment,
    pub organizer: String,
    pub organizer_name: Option<String>,
    pub min_fund: Decimal,
    pub whatsapp_link: Option<String>,
    pub discord_link: Option<String>,
    pub initial_deposit: Octas,
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

impl TripDraft {
    /// Check presence of every required field, the private-code rules and,
    /// for universal trips, the initial deposit floor.
    pub fn validate(self) -> Result<NewTrip, TripError> {
        let missing = || TripError::validation("Missing required fields");

        let title = present(self.title).ok_or_else(missing)?;
        let description = present(self.description).ok_or_else(missing)?;
        let destination = present(self.destination).ok_or_else(missing)?;
        let date = present(self.date).ok_or_else(missing)?;
        let end_date = present(self.end_date).ok_or_else(missing)?;
        let amount = self.amount.ok_or_else(missing)?;
        let deadline = present(self.deadline).ok_or_else(missing)?;
        let kind = self.kind.ok_or_else(missing)?;
        let organizer = present(self.organizer).ok_or_else(missing)?;

        if amount <= Decimal::ZERO {
            return Err(TripError::validation("amount must be greater than zero"));
        }
        let min_fund = self.min_fund.unwrap_or(Decimal::ZERO);
        if min_fund < Decimal::ZERO {
            return Err(TripError::validation("minFund must not be negative"));
        }

        let initial_deposit = self.initial_deposit_octas.unwrap_or_default();

        let code = match kind {
            TripKind::Private => match self.code_option.unwrap_or_default() {
                CodeOption::Custom => {
                    let code = self
                        .custom_code
                        .as_deref()
                        .map(normalize_code)
                        .filter(|c| !c.is_empty())
                        .ok_or_else(|| {
                            TripError::validation("customCode required for custom option")
                        })?;
                    CodeAssignment::Custom(code)
                }
                CodeOption::Auto => CodeAssignment::Generated,
            },
            TripKind::Universal => {
                validate_initial_deposit(amount, &initial_deposit)?;
                CodeAssignment::None
            }
        };

        Ok(NewTrip {
            id: present(self.id),
            title,
            description,
            destination,
            date,
            end_date,
            amount,
            deadline,
            kind,
            code,
            organizer,
            organizer_name: present(self.organizer_name),
            min_fund,
            whatsapp_link: present(self.whatsapp_link),
            discord_link: present(self.discord_link),
            initial_deposit,
        })
    }
}
