use serde::Serialize;

use crate::models::{PlayerProfile, RawRecord};
use crate::services::{reconcile, resolver};
use crate::store::ScoreStore;

/// Per-request ingestion summary. Skips are explicit: a response with zero
/// skips means every record landed, anything else names how many were dropped
/// and at which resolution stage.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub records_written: usize,
    pub skipped_titles: usize,
    pub skipped_charts: usize,
}

/// Runs one ingestion request: optional profile upsert (best effort), then
/// song resolution, chart resolution, and record reconciliation. Phase-local
/// failures degrade to fewer records persisted; nothing here retries or rolls
/// back.
pub async fn ingest_batch<S: ScoreStore>(
    store: &S,
    user_id: &str,
    profile: Option<&PlayerProfile>,
    records: &[RawRecord],
) -> IngestSummary {
    if let Some(profile) = profile {
        if let Err(err) = store.upsert_profile(user_id, profile).await {
            tracing::warn!(error = %err, user_id, "profile upsert failed");
        }
    }

    if records.is_empty() {
        return IngestSummary::default();
    }

    tracing::info!(user_id, records = records.len(), "ingestion started");

    let resolved = resolver::resolve_entities(store, records).await;
    let outcome = reconcile::reconcile_records(store, user_id, records, &resolved).await;

    tracing::info!(
        user_id,
        written = outcome.written,
        skipped_titles = outcome.skipped_titles,
        skipped_charts = outcome.skipped_charts,
        "ingestion finished"
    );

    IngestSummary {
        records_written: outcome.written,
        skipped_titles: outcome.skipped_titles,
        skipped_charts: outcome.skipped_charts,
    }
}
