use std::collections::HashMap;

use futures::future::join_all;

use crate::models::{ChartKey, RawRecord, UserRecordUpsert};
use crate::services::resolver::{ResolvedEntities, CHUNK_SIZE};
use crate::store::ScoreStore;

/// Outcome of joining one raw batch against the resolved identity maps.
/// `written` counts rows in chunks that upserted successfully; the two skip
/// counters split dropped records by which lookup missed.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub written: usize,
    pub skipped_titles: usize,
    pub skipped_charts: usize,
}

pub async fn reconcile_records<S: ScoreStore>(
    store: &S,
    user_id: &str,
    records: &[RawRecord],
    resolved: &ResolvedEntities,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();

    let mut rows: Vec<UserRecordUpsert> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    for record in records {
        let Some(&song_id) = resolved.song_ids.get(&record.title) else {
            outcome.skipped_titles += 1;
            continue;
        };
        let key = ChartKey {
            song_id,
            difficulty_type: record.difficulty_type,
            is_dx: record.is_dx,
        };
        let Some(&chart_id) = resolved.chart_ids.get(&key) else {
            outcome.skipped_charts += 1;
            continue;
        };
        let row = UserRecordUpsert {
            user_id: user_id.to_string(),
            chart_id,
            achievement: record.achievement,
            fc_type: record.fc_type,
            fs_type: record.fs_type,
        };
        // duplicate chart entries within one batch collapse to the last one,
        // matching the store's last-write-wins upsert
        match index.get(&chart_id) {
            Some(&at) => rows[at] = row,
            None => {
                index.insert(chart_id, rows.len());
                rows.push(row);
            }
        }
    }

    if outcome.skipped_titles > 0 || outcome.skipped_charts > 0 {
        tracing::warn!(
            skipped_titles = outcome.skipped_titles,
            skipped_charts = outcome.skipped_charts,
            "dropped records with unresolved references"
        );
    }

    let chunks: Vec<&[UserRecordUpsert]> = rows.chunks(CHUNK_SIZE).collect();
    let results = join_all(chunks.iter().map(|chunk| store.upsert_user_records(chunk))).await;
    for (chunk, result) in chunks.iter().zip(results) {
        match result {
            Ok(()) => outcome.written += chunk.len(),
            Err(err) => {
                tracing::warn!(error = %err, rows = chunk.len(), "record chunk failed");
            }
        }
    }

    outcome
}
