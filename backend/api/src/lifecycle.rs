//! Trip lifecycle over the store: creation, check-in, confirm, cancel,
//! participant removal and deletion.
//!
//! Each operation is a short sequence of independent writes. The store's
//! unique indexes and conditional updates supply mutual exclusion; the one
//! read-modify-write, the escrow credit, runs in its own write transaction.
//! Side effects that may fail on their own (escrow credit at check-in, the
//! transaction log, the removal notice) are logged and dropped. A credit for
//! a trip that stopped being open in the meantime is dropped the same way.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use trip_escrow::code::{generate_code, MAX_CODE_REGENERATIONS};
use trip_escrow::{
    settle_cancellation, CodeAssignment, MessageKind, Octas, PaymentStatus, Trip, TripDraft,
    TripError, TripStatus,
};
use uuid::Uuid;

use crate::db;
use crate::db::transactions::PaymentAttempt;
use crate::db::users::TripRelation;
use crate::errors::{ApiError, Result};

/// Attempts at a cancellation settlement before giving up.
const MAX_SETTLEMENT_ATTEMPTS: usize = 5;

const NO_REASON: &str = "No reason provided";

async fn load(pool: &SqlitePool, trip_id: &str) -> Result<Trip> {
    db::trips::get_by_id(pool, trip_id)
        .await?
        .ok_or_else(|| TripError::not_found("Trip").into())
}

fn required<'a>(value: Option<&'a str>, msg: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TripError::validation(msg).into())
}

// ─────────────────────────────────────────────────────────
// Creation
// ─────────────────────────────────────────────────────────

/// Outcome of [`create_trip`].
#[derive(Debug)]
pub enum Created {
    New(Trip),
    /// The organizer already submitted this trip (same title and date).
    Existing(Trip),
}

pub async fn create_trip(pool: &SqlitePool, draft: TripDraft) -> Result<Created> {
    create_trip_with(pool, draft, || generate_code(&mut rand::thread_rng())).await
}

/// [`create_trip`] with the private-code source made explicit.
pub async fn create_trip_with<F>(pool: &SqlitePool, draft: TripDraft, mut next_code: F) -> Result<Created>
where
    F: FnMut() -> String,
{
    let new = draft.validate()?;

    if let Some(existing) =
        db::trips::find_duplicate(pool, &new.organizer, &new.title, &new.date).await?
    {
        info!("Trip {} resubmitted by {}; returning it", existing.id, new.organizer);
        return Ok(Created::Existing(existing));
    }

    let id = new.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());

    match &new.code {
        CodeAssignment::None => db::trips::insert(pool, &id, &new, None).await?,
        CodeAssignment::Custom(code) => db::trips::insert(pool, &id, &new, Some(code)).await?,
        CodeAssignment::Generated => {
            let mut regenerations = 0;
            loop {
                let code = next_code();
                match db::trips::insert(pool, &id, &new, Some(&code)).await {
                    Err(ApiError::Domain(TripError::DuplicateCode))
                        if regenerations < MAX_CODE_REGENERATIONS =>
                    {
                        regenerations += 1;
                        debug!("Generated code {code} collided; regenerating ({regenerations})");
                    }
                    other => break other?,
                }
            }
        }
    }

    db::users::add_trip(pool, &new.organizer, &id, TripRelation::Created).await?;
    info!("Trip {id} created by {} ({})", new.organizer, new.kind);

    let trip = db::trips::get_by_id(pool, &id)
        .await?
        .ok_or_else(|| ApiError::Corrupt(format!("trip {id} missing after insert")))?;
    Ok(Created::New(trip))
}

// ─────────────────────────────────────────────────────────
// Check-in
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CheckIn {
    pub wallet_address: Option<String>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub tx_hash: Option<String>,
    pub amount_octas: Option<Octas>,
    pub status: Option<PaymentStatus>,
    pub network: Option<String>,
}

/// Register `wallet_address` on an open trip and return the new participant
/// count. A successful payment is credited to escrow on a best-effort basis.
pub async fn checkin(pool: &SqlitePool, trip_id: &str, req: CheckIn) -> Result<u64> {
    let wallet = required(req.wallet_address.as_deref(), "walletAddress required")?;

    let trip = load(pool, trip_id).await?;
    trip.ensure_open()?;

    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    if !db::participants::insert_if_open(pool, trip_id, wallet, name, req.age).await? {
        // Closed or canceled between the read above and the insert.
        return Err(TripError::TripNotOpen.into());
    }
    db::users::add_trip(pool, wallet, trip_id, TripRelation::Joined).await?;

    if let (Some(PaymentStatus::Success), Some(paid)) = (req.status, req.amount_octas.as_ref()) {
        match db::trips::credit_escrow(pool, trip_id, paid).await {
            Ok(Some(total)) => debug!("Trip {trip_id} escrow credited {paid} -> {total}"),
            Ok(None) => warn!("Trip {trip_id} closed before escrow credit of {paid}; dropped"),
            Err(e) => warn!("Escrow credit of {paid} for trip {trip_id} failed: {e}"),
        }
    }

    if req.tx_hash.is_some() || req.status.is_some() {
        let amount = req.amount_octas.clone().unwrap_or_default();
        let attempt = PaymentAttempt {
            trip_id,
            from: wallet,
            to: None,
            amount: &amount,
            status: req.status.unwrap_or(PaymentStatus::Success),
            hash: req.tx_hash.as_deref(),
            network: req.network.as_deref().unwrap_or("unknown"),
        };
        if let Err(e) = db::transactions::log(pool, &attempt).await {
            warn!("Transaction log for trip {trip_id} failed: {e}");
        }
    }

    let participants = db::participants::count(pool, trip_id).await?;
    info!("{wallet} checked in to trip {trip_id} ({participants} participants)");
    Ok(participants)
}

// ─────────────────────────────────────────────────────────
// Organizer actions
// ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub id: String,
    pub status: TripStatus,
}

/// `open → closed`.
pub async fn confirm(pool: &SqlitePool, trip_id: &str, caller: Option<&str>) -> Result<Confirmation> {
    let caller = required(caller, "walletAddress required")?;
    let trip = load(pool, trip_id).await?;
    trip.authorize_organizer(caller, "confirm")?;
    trip.ensure_open()?;

    if !db::trips::set_status_if_open(pool, trip_id, TripStatus::Closed).await? {
        return Err(TripError::TripNotOpen.into());
    }
    info!("Trip {trip_id} confirmed by organizer");
    Ok(Confirmation {
        id: trip.id,
        status: TripStatus::Closed,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cancellation {
    pub id: String,
    pub status: TripStatus,
    pub penalty_octas: Octas,
    pub remaining_escrow_octas: Octas,
    #[serde(with = "rust_decimal::serde::float")]
    pub collected_usd: rust_decimal::Decimal,
}

/// `open → canceled`, forfeiting 20% of escrow when the funding target was met.
///
/// The settlement is written only if escrow and participant count are still
/// what it was computed from; otherwise it is recomputed.
pub async fn cancel(pool: &SqlitePool, trip_id: &str, caller: Option<&str>) -> Result<Cancellation> {
    let caller = required(caller, "walletAddress required")?;

    for _ in 0..MAX_SETTLEMENT_ATTEMPTS {
        let trip = load(pool, trip_id).await?;
        trip.authorize_organizer(caller, "cancel")?;
        trip.ensure_open()?;

        let settlement =
            settle_cancellation(&trip.escrow_octas, trip.participants, trip.amount, trip.min_fund);
        let applied = db::trips::settle_cancel(
            pool,
            trip_id,
            &trip.escrow_octas,
            trip.participants,
            &settlement.remaining,
            &settlement.penalty,
        )
        .await?;

        if applied {
            info!(
                "Trip {trip_id} canceled: collected ${} of ${}, penalty {} octas",
                settlement.collected_usd, trip.min_fund, settlement.penalty
            );
            return Ok(Cancellation {
                id: trip.id,
                status: TripStatus::Canceled,
                penalty_octas: settlement.penalty,
                remaining_escrow_octas: settlement.remaining,
                collected_usd: settlement.collected_usd,
            });
        }
        debug!("Trip {trip_id} changed during cancellation; recomputing");
    }
    Err(ApiError::Contention(format!("cancellation of trip {trip_id}")))
}

/// Organizer removes a participant and leaves them a message saying why.
pub async fn remove_participant(
    pool: &SqlitePool,
    trip_id: &str,
    organizer: Option<&str>,
    participant: Option<&str>,
    reason: Option<&str>,
) -> Result<()> {
    let missing = "organizer and participantWallet are required";
    let organizer = required(organizer, missing)?;
    let participant = required(participant, missing)?;

    let trip = load(pool, trip_id).await?;
    trip.authorize_organizer(organizer, "remove participants from")?;

    if !db::participants::delete(pool, trip_id, participant).await? {
        return Err(TripError::not_found("Participant").into());
    }
    db::users::remove_trip(pool, participant, trip_id, TripRelation::Joined).await?;
    info!("{participant} removed from trip {trip_id}");

    let reason = reason.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(NO_REASON);
    let subject = format!("Removed from trip: {}", trip.title);
    if let Err(e) = db::messages::send(
        pool,
        organizer,
        participant,
        MessageKind::Organizer,
        Some(&subject),
        reason,
    )
    .await
    {
        warn!("Removal notice to {participant} failed: {e}");
    }
    Ok(())
}

pub async fn delete_trip(pool: &SqlitePool, trip_id: &str, caller: Option<&str>) -> Result<()> {
    let caller = required(caller, "walletAddress required")?;
    let trip = load(pool, trip_id).await?;
    trip.authorize_organizer(caller, "delete")?;
    db::trips::delete(pool, trip_id).await?;
    info!("Trip {trip_id} deleted by organizer");
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Funds
// ─────────────────────────────────────────────────────────

pub async fn trip_funds(pool: &SqlitePool, trip_id: &str) -> Result<Octas> {
    db::trips::escrow_of(pool, trip_id)
        .await?
        .ok_or_else(|| TripError::not_found("Trip").into())
}

/// Escrow held across every trip that has not been canceled.
pub async fn total_funds(pool: &SqlitePool) -> Result<Octas> {
    let held = db::trips::held_escrows(pool).await?;
    Ok(held.iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use rust_decimal::Decimal;
    use trip_escrow::{CodeOption, TripKind};

    const ORG: &str = "0xorganizer";

    fn universal(amount: u32, min_fund: u32) -> TripDraft {
        TripDraft {
            title: Some("Iceland ring road".into()),
            description: Some("Waterfalls".into()),
            destination: Some("Reykjavik".into()),
            date: Some("2026-08-01".into()),
            end_date: Some("2026-08-10".into()),
            amount: Some(Decimal::from(amount)),
            deadline: Some("2026-07-01".into()),
            kind: Some(TripKind::Universal),
            organizer: Some(ORG.into()),
            min_fund: Some(Decimal::from(min_fund)),
            initial_deposit_octas: Some(Octas::from(u64::from(amount) * 200_000_000)),
            ..Default::default()
        }
    }

    fn private(title: &str) -> TripDraft {
        TripDraft {
            title: Some(title.into()),
            kind: Some(TripKind::Private),
            initial_deposit_octas: None,
            ..universal(50, 0)
        }
    }

    async fn created(pool: &SqlitePool, draft: TripDraft) -> Trip {
        match create_trip(pool, draft).await.unwrap() {
            Created::New(t) => t,
            Created::Existing(t) => panic!("unexpected duplicate {}", t.id),
        }
    }

    fn paid(wallet: &str, octas: u64) -> CheckIn {
        CheckIn {
            wallet_address: Some(wallet.into()),
            amount_octas: Some(Octas::from(octas)),
            status: Some(PaymentStatus::Success),
            tx_hash: Some(format!("0xtx-{wallet}")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn worked_example_penalty() {
        let pool = test_pool().await;
        let trip = created(&pool, universal(100, 500)).await;
        assert_eq!(trip.escrow_octas, Octas::from(20_000_000_000));

        for i in 0..5 {
            let n = checkin(&pool, &trip.id, paid(&format!("0xp{i}"), 10_000_000_000))
                .await
                .unwrap();
            assert_eq!(n, i + 1);
        }
        assert_eq!(
            trip_funds(&pool, &trip.id).await.unwrap(),
            Octas::from(70_000_000_000)
        );

        let c = cancel(&pool, &trip.id, Some(ORG)).await.unwrap();
        assert_eq!(c.collected_usd, Decimal::from(500));
        assert_eq!(c.penalty_octas, Octas::from(14_000_000_000));
        assert_eq!(c.remaining_escrow_octas, Octas::from(56_000_000_000));

        let stored = db::trips::get_by_id(&pool, &trip.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TripStatus::Canceled);
        assert_eq!(stored.escrow_octas, Octas::from(56_000_000_000));
        assert_eq!(stored.penalty_octas, Octas::from(14_000_000_000));

        let (logged,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(logged, 5);
    }

    #[tokio::test]
    async fn cancel_below_target_is_free() {
        let pool = test_pool().await;
        let trip = created(&pool, universal(100, 500)).await;
        checkin(&pool, &trip.id, paid("0xa", 10_000_000_000)).await.unwrap();

        let c = cancel(&pool, &trip.id, Some(ORG)).await.unwrap();
        assert!(c.penalty_octas.is_zero());
        assert_eq!(c.remaining_escrow_octas, Octas::from(30_000_000_000));
    }

    #[tokio::test]
    async fn unpaid_or_failed_payments_do_not_touch_escrow() {
        let pool = test_pool().await;
        let trip = created(&pool, universal(100, 0)).await;

        let free = CheckIn {
            wallet_address: Some("0xfree".into()),
            amount_octas: Some(Octas::from(5)),
            ..Default::default()
        };
        checkin(&pool, &trip.id, free).await.unwrap();

        let mut failed = paid("0xfailed", 10_000_000_000);
        failed.status = Some(PaymentStatus::Failed);
        checkin(&pool, &trip.id, failed).await.unwrap();

        assert_eq!(
            trip_funds(&pool, &trip.id).await.unwrap(),
            Octas::from(20_000_000_000)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_duplicate_checkins_land_once() {
        let (_dir, pool) = db::file_pool().await;
        let trip = created(&pool, universal(100, 0)).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                let id = trip.id.clone();
                tokio::spawn(async move { checkin(&pool, &id, paid("0xsame", 5)).await })
            })
            .collect();
        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes.iter().filter(|r| r.is_err()).all(|r| matches!(
            r,
            Err(ApiError::Domain(TripError::AlreadyCheckedIn))
        )));
        assert_eq!(db::participants::count(&pool, &trip.id).await.unwrap(), 1);
        assert_eq!(
            trip_funds(&pool, &trip.id).await.unwrap(),
            Octas::from(20_000_000_005)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_paid_checkins_all_reach_escrow() {
        let (_dir, pool) = db::file_pool().await;
        let trip = created(&pool, universal(1, 0)).await;
        assert_eq!(trip.escrow_octas, Octas::from(200_000_000));

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let pool = pool.clone();
                let id = trip.id.clone();
                tokio::spawn(async move { checkin(&pool, &id, paid(&format!("0xw{i}"), 1)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(db::participants::count(&pool, &trip.id).await.unwrap(), 40);
        assert_eq!(
            trip_funds(&pool, &trip.id).await.unwrap(),
            Octas::from(200_000_040)
        );
    }

    #[tokio::test]
    async fn credit_arriving_after_cancel_is_dropped() {
        let pool = test_pool().await;
        let trip = created(&pool, universal(100, 100)).await;

        // Participant row lands, then the organizer cancels before the credit.
        assert!(db::participants::insert_if_open(&pool, &trip.id, "0xlate", None, None)
            .await
            .unwrap());
        let c = cancel(&pool, &trip.id, Some(ORG)).await.unwrap();
        assert_eq!(c.penalty_octas, Octas::from(4_000_000_000));
        assert_eq!(c.remaining_escrow_octas, Octas::from(16_000_000_000));

        let credited = db::trips::credit_escrow(&pool, &trip.id, &Octas::from(10_000_000_000))
            .await
            .unwrap();
        assert_eq!(credited, None);

        let stored = db::trips::get_by_id(&pool, &trip.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TripStatus::Canceled);
        assert_eq!(stored.escrow_octas, c.remaining_escrow_octas);
    }

    #[tokio::test]
    async fn checkin_guards() {
        let pool = test_pool().await;
        let err = checkin(&pool, "ghost", paid("0xa", 1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::NotFound(_))));

        let trip = created(&pool, universal(100, 0)).await;
        let err = checkin(&pool, &trip.id, CheckIn::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::Validation(_))));

        confirm(&pool, &trip.id, Some(ORG)).await.unwrap();
        let err = checkin(&pool, &trip.id, paid("0xa", 1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::TripNotOpen)));
    }

    #[tokio::test]
    async fn organizer_actions_on_missing_trips() {
        let pool = test_pool().await;
        let outcomes = [
            confirm(&pool, "ghost", Some(ORG)).await.map(|_| ()),
            cancel(&pool, "ghost", Some(ORG)).await.map(|_| ()),
            remove_participant(&pool, "ghost", Some(ORG), Some("0xp"), None).await,
            delete_trip(&pool, "ghost", Some(ORG)).await,
        ];
        for outcome in outcomes {
            assert!(matches!(outcome, Err(ApiError::Domain(TripError::NotFound(_)))));
        }
    }

    #[tokio::test]
    async fn terminal_trips_reject_confirm_and_cancel() {
        let pool = test_pool().await;
        let trip = created(&pool, universal(100, 0)).await;

        let err = confirm(&pool, &trip.id, Some("0xstranger")).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::Forbidden(_))));

        let c = confirm(&pool, &trip.id, Some(ORG)).await.unwrap();
        assert_eq!(c.status, TripStatus::Closed);

        for result in [
            confirm(&pool, &trip.id, Some(ORG)).await.map(|_| ()),
            cancel(&pool, &trip.id, Some(ORG)).await.map(|_| ()),
        ] {
            assert!(matches!(result, Err(ApiError::Domain(TripError::TripNotOpen))));
        }
    }

    #[tokio::test]
    async fn universal_deposit_floor_blocks_persistence() {
        let pool = test_pool().await;
        let mut draft = universal(100, 0);
        draft.initial_deposit_octas = Some(Octas::from(19_999_999_999));
        let err = create_trip(&pool, draft).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::Validation(_))));
        assert!(db::trips::list_public(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resubmission_returns_existing_trip() {
        let pool = test_pool().await;
        let first = created(&pool, universal(100, 0)).await;
        match create_trip(&pool, universal(100, 0)).await.unwrap() {
            Created::Existing(t) => assert_eq!(t.id, first.id),
            Created::New(_) => panic!("duplicate trip created"),
        }
        let user_trips: Vec<(String,)> =
            sqlx::query_as("SELECT trip_id FROM user_trips WHERE relation = 'created'")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(user_trips, vec![(first.id,)]);
    }

    #[tokio::test]
    async fn generated_code_collisions_regenerate() {
        let pool = test_pool().await;
        let mut custom = private("Taken");
        custom.code_option = Some(CodeOption::Custom);
        custom.custom_code = Some("aaaaaaaa".into());
        let taken = created(&pool, custom).await;
        assert_eq!(taken.code.as_deref(), Some("AAAAAAAA"));

        let mut codes = vec!["BBBBBBBB", "AAAAAAAA", "AAAAAAAA"];
        let out = create_trip_with(&pool, private("Fresh"), || codes.pop().unwrap().to_string())
            .await
            .unwrap();
        match out {
            Created::New(t) => assert_eq!(t.code.as_deref(), Some("BBBBBBBB")),
            Created::Existing(_) => panic!("unexpected duplicate"),
        }
    }

    #[tokio::test]
    async fn generated_code_gives_up_after_three_regenerations() {
        let pool = test_pool().await;
        let mut custom = private("Taken");
        custom.code_option = Some(CodeOption::Custom);
        custom.custom_code = Some("AAAAAAAA".into());
        created(&pool, custom).await;

        let mut calls = 0;
        let err = create_trip_with(&pool, private("Unlucky"), || {
            calls += 1;
            "AAAAAAAA".to_string()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::DuplicateCode)));
        assert_eq!(calls, 1 + MAX_CODE_REGENERATIONS);
    }

    #[tokio::test]
    async fn auto_codes_are_distinct() {
        let pool = test_pool().await;
        let a = created(&pool, private("One")).await;
        let b = created(&pool, private("Two")).await;
        assert_ne!(a.code, b.code);
        assert!(a.code.is_some() && b.code.is_some());
    }

    #[tokio::test]
    async fn custom_code_duplicate_is_a_conflict() {
        let pool = test_pool().await;
        for (title, expect_ok) in [("First", true), ("Second", false)] {
            let mut d = private(title);
            d.code_option = Some(CodeOption::Custom);
            d.custom_code = Some("SUMMIT".into());
            let result = create_trip(&pool, d).await;
            if expect_ok {
                assert!(result.is_ok());
            } else {
                assert!(matches!(result, Err(ApiError::Domain(TripError::DuplicateCode))));
            }
        }
    }

    #[tokio::test]
    async fn removal_pulls_participant_and_leaves_a_message() {
        let pool = test_pool().await;
        let trip = created(&pool, universal(100, 0)).await;
        checkin(&pool, &trip.id, paid("0xp", 1)).await.unwrap();

        let err = remove_participant(&pool, &trip.id, Some("0xp"), Some("0xp"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::Forbidden(_))));

        remove_participant(&pool, &trip.id, Some(ORG), Some("0xp"), Some("Spam"))
            .await
            .unwrap();
        assert_eq!(db::participants::count(&pool, &trip.id).await.unwrap(), 0);

        let inbox = db::messages::inbox(&pool, "0xp").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].body, "Spam");
        assert_eq!(inbox[0].kind, "organizer");
        assert_eq!(inbox[0].from_addr, ORG);

        let err = remove_participant(&pool, &trip.id, Some(ORG), Some("0xp"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_clears_participants_and_references() {
        let pool = test_pool().await;
        db::users::register(&pool, "0xp", "Pat", 22).await.unwrap();
        let trip = created(&pool, universal(100, 0)).await;
        checkin(&pool, &trip.id, paid("0xp", 1)).await.unwrap();

        let err = delete_trip(&pool, &trip.id, Some("0xp")).await.unwrap_err();
        assert!(matches!(err, ApiError::Domain(TripError::Forbidden(_))));

        delete_trip(&pool, &trip.id, Some(ORG)).await.unwrap();
        assert!(db::trips::get_by_id(&pool, &trip.id).await.unwrap().is_none());
        assert_eq!(db::participants::count(&pool, &trip.id).await.unwrap(), 0);
        let user = db::users::get(&pool, "0xp").await.unwrap().unwrap();
        assert!(user.joined_trips.is_empty());
    }

    #[tokio::test]
    async fn total_funds_ignore_canceled_trips() {
        let pool = test_pool().await;
        let kept = created(&pool, universal(100, 0)).await;
        let mut other = universal(1, 0);
        other.title = Some("Weekend".into());
        let dropped = created(&pool, other).await;
        cancel(&pool, &dropped.id, Some(ORG)).await.unwrap();

        assert_eq!(total_funds(&pool).await.unwrap(), kept.escrow_octas);
    }
}
