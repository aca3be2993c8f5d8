//! Demo data for local runs (`SEED_DEMO=true`).

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::{info, warn};
use trip_escrow::{Octas, TripDraft, TripError, TripKind};

use crate::db;
use crate::errors::{ApiError, Result};
use crate::lifecycle::{self, CheckIn, Created};

const DEMO_WALLET: &str = "0xDEMO000000000000000000000000000000000001";
const DEMO_NAME: &str = "Demo User";
const DEMO_AGE: i64 = 20;
const DEMO_TRIP_ID: &str = "demo-trip-2-usd";
const DEMO_PARTICIPANTS: usize = 7;

/// Seed the demo organizer and trip. Errors are logged, never returned.
pub async fn seed_demo(pool: &SqlitePool) {
    match try_seed(pool).await {
        Ok(true) => info!("Demo trip {DEMO_TRIP_ID} seeded"),
        Ok(false) => info!("Demo trip {DEMO_TRIP_ID} already present"),
        Err(e) => warn!("Seed demo failed: {e}"),
    }
}

async fn try_seed(pool: &SqlitePool) -> Result<bool> {
    match db::users::register(pool, DEMO_WALLET, DEMO_NAME, DEMO_AGE).await {
        Ok(_) | Err(ApiError::Domain(TripError::ProfileLocked)) => {}
        Err(e) => return Err(e),
    }

    if db::trips::get_by_id(pool, DEMO_TRIP_ID).await?.is_some() {
        return Ok(false);
    }

    let draft = TripDraft {
        id: Some(DEMO_TRIP_ID.into()),
        title: Some("Demo Universal Trip".into()),
        description: Some("A sample demo trip priced at $2.".into()),
        destination: Some("Demo City".into()),
        date: Some("2026-01-01".into()),
        end_date: Some("2026-01-02".into()),
        amount: Some(Decimal::from(2)),
        deadline: Some("2025-12-31".into()),
        kind: Some(TripKind::Universal),
        organizer: Some(DEMO_WALLET.into()),
        organizer_name: Some(DEMO_NAME.into()),
        initial_deposit_octas: Some(Octas::from(400_000_000)),
        ..Default::default()
    };
    if let Created::Existing(_) = lifecycle::create_trip(pool, draft).await? {
        return Ok(false);
    }

    for n in 1..=DEMO_PARTICIPANTS {
        let checkin = CheckIn {
            wallet_address: Some(format!("0xDEMO{:036}", 100 + n)),
            ..Default::default()
        };
        lifecycle::checkin(pool, DEMO_TRIP_ID, checkin).await?;
    }
    Ok(true)
}
