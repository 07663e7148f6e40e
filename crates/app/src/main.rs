//! `venue-init`: prepares the seat inventory and reports its state.

use app::Config;
use seat_store::SeatStore;

#[tokio::main]
async fn main() -> Result<(), app::AppError> {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    app::init_tracing(&config)?;

    // 2. Connect the backend and seed the venue
    let engine = app::bootstrap(&config).await.inspect_err(|e| {
        tracing::error!(error = %e, "bootstrap failed");
    })?;

    // 3. Report inventory
    let summary = engine.store.summary().await?;
    tracing::info!(
        total = summary.total,
        available = summary.available,
        booked = summary.booked,
        consistent = summary.is_consistent(),
        "inventory ready"
    );

    Ok(())
}
