use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::invariants::{
    assert_code_matches_kind, assert_credit_invariant, assert_penalty_only_when_canceled,
    assert_settlement_conserves,
};
use crate::{
    settle_cancellation, CodeOption, Octas, Trip, TripDraft, TripError, TripKind, TripStatus,
};

fn universal_draft(amount: u32, min_fund: u32, deposit: Octas) -> TripDraft {
    TripDraft {
        title: Some("Patagonia trek".into()),
        description: Some("Ten days on foot".into()),
        destination: Some("El Chaltén".into()),
        date: Some("2026-11-02".into()),
        end_date: Some("2026-11-12".into()),
        amount: Some(Decimal::from(amount)),
        deadline: Some("2026-10-01".into()),
        kind: Some(TripKind::Universal),
        organizer: Some("0xorganizer".into()),
        min_fund: Some(Decimal::from(min_fund)),
        initial_deposit_octas: Some(deposit),
        ..Default::default()
    }
}

/// Build the in-memory trip the store would hold right after creation.
fn open_trip(draft: TripDraft) -> Trip {
    let new = draft.validate().unwrap();
    Trip {
        id: "trip-1".into(),
        title: new.title,
        description: new.description,
        destination: new.destination,
        date: new.date,
        end_date: new.end_date,
        amount: new.amount,
        deadline: new.deadline,
        kind: new.kind,
        code: None,
        organizer: new.organizer,
        organizer_name: new.organizer_name,
        min_fund: new.min_fund,
        whatsapp_link: new.whatsapp_link,
        discord_link: new.discord_link,
        escrow_octas: new.initial_deposit.clone(),
        initial_deposit_octas: new.initial_deposit,
        penalty_octas: Octas::zero(),
        status: TripStatus::Open,
        participants: 0,
        created_at: 0,
    }
}

fn check_in(trip: &mut Trip, paid: &Octas) -> Result<(), TripError> {
    trip.ensure_open()?;
    let before = trip.escrow_octas.clone();
    trip.escrow_octas += paid;
    trip.participants += 1;
    assert_credit_invariant(&before, &trip.escrow_octas, paid);
    Ok(())
}

fn cancel(trip: &mut Trip, caller: &str) -> Result<Octas, TripError> {
    trip.authorize_organizer(caller, "cancel")?;
    trip.ensure_open()?;
    let s = settle_cancellation(&trip.escrow_octas, trip.participants, trip.amount, trip.min_fund);
    assert_settlement_conserves(&trip.escrow_octas, &s);
    trip.escrow_octas = s.remaining;
    trip.penalty_octas = s.penalty.clone();
    trip.status = TripStatus::Canceled;
    Ok(s.penalty)
}

#[test]
fn five_paid_checkins_then_cancel_at_target() {
    let mut trip = open_trip(universal_draft(100, 500, Octas::from(20_000_000_000)));
    assert_code_matches_kind(&trip);

    let share = Octas::from(10_000_000_000);
    for _ in 0..5 {
        check_in(&mut trip, &share).unwrap();
    }
    assert_eq!(trip.escrow_octas, Octas::from(70_000_000_000));

    let penalty = cancel(&mut trip, "0xorganizer").unwrap();
    assert_eq!(penalty, Octas::from(14_000_000_000));
    assert_eq!(trip.escrow_octas, Octas::from(56_000_000_000));
    assert_penalty_only_when_canceled(&trip);
}

#[test]
fn cancel_below_target_keeps_escrow() {
    let mut trip = open_trip(universal_draft(100, 500, Octas::from(20_000_000_000)));
    let share = Octas::from(10_000_000_000);
    for _ in 0..4 {
        check_in(&mut trip, &share).unwrap();
    }
    let penalty = cancel(&mut trip, "0xorganizer").unwrap();
    assert!(penalty.is_zero());
    assert_eq!(trip.escrow_octas, Octas::from(60_000_000_000));
}

#[test]
fn terminal_trips_reject_checkin_and_second_cancel() {
    let mut trip = open_trip(universal_draft(100, 0, Octas::from(20_000_000_000)));
    cancel(&mut trip, "0xorganizer").unwrap();

    assert_eq!(check_in(&mut trip, &Octas::from(1)), Err(TripError::TripNotOpen));
    assert_eq!(cancel(&mut trip, "0xorganizer"), Err(TripError::TripNotOpen));

    trip.status = TripStatus::Closed;
    assert_eq!(check_in(&mut trip, &Octas::zero()), Err(TripError::TripNotOpen));
}

#[test]
fn stranger_cannot_cancel() {
    let mut trip = open_trip(universal_draft(100, 0, Octas::from(20_000_000_000)));
    assert!(matches!(
        cancel(&mut trip, "0xstranger"),
        Err(TripError::Forbidden(_))
    ));
    assert_eq!(trip.status, TripStatus::Open);
}

#[test]
fn settlement_conserves_escrow_for_random_amounts() {
    let mut rng = StdRng::seed_from_u64(0x7215);
    for _ in 0..1_000 {
        let escrow = Octas::from(rng.gen::<u64>());
        let participants = rng.gen_range(0..50u64);
        let amount = Decimal::from(rng.gen_range(1..1_000u32));
        let min_fund = Decimal::from(rng.gen_range(0..10_000u32));
        let s = settle_cancellation(&escrow, participants, amount, min_fund);
        assert_settlement_conserves(&escrow, &s);
        if min_fund.is_zero() || s.collected_usd < min_fund {
            assert!(s.penalty.is_zero());
        }
    }
}

#[test]
fn private_trip_skips_deposit_floor() {
    let mut draft = universal_draft(100, 0, Octas::zero());
    draft.kind = Some(TripKind::Private);
    draft.code_option = Some(CodeOption::Auto);
    let mut trip = open_trip(draft);
    trip.code = Some("ABCDEFGH".into());
    assert_code_matches_kind(&trip);
    assert!(trip.escrow_octas.is_zero());
}
