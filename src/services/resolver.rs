use std::collections::{HashMap, HashSet};

use futures::future::join_all;

use crate::models::{ChartKey, ChartRow, ChartUpsert, RawRecord, SongRow};
use crate::store::{ScoreStore, StoreError};

/// Upper bound on rows per upsert/select round trip.
pub const CHUNK_SIZE: usize = 200;

/// Identity maps built from one raw batch, plus per-phase failure tallies.
/// A failed chunk contributes zero map entries and adds its length to the
/// matching tally; it never aborts the remaining chunks.
#[derive(Debug, Default)]
pub struct ResolvedEntities {
    pub song_ids: HashMap<String, i64>,
    pub chart_ids: HashMap<ChartKey, i64>,
    pub failed_titles: usize,
    pub failed_charts: usize,
}

pub async fn resolve_entities<S: ScoreStore>(store: &S, records: &[RawRecord]) -> ResolvedEntities {
    let mut resolved = ResolvedEntities::default();

    let titles = unique_titles(records);
    let title_chunks: Vec<&[String]> = titles.chunks(CHUNK_SIZE).collect();
    let outcomes = join_all(
        title_chunks
            .iter()
            .map(|chunk| resolve_song_chunk(store, chunk)),
    )
    .await;
    for (chunk, outcome) in title_chunks.iter().zip(outcomes) {
        match outcome {
            Ok(rows) => {
                for row in rows {
                    resolved.song_ids.insert(row.title, row.id);
                }
            }
            Err(err) => {
                resolved.failed_titles += chunk.len();
                tracing::warn!(error = %err, titles = chunk.len(), "song chunk failed");
            }
        }
    }

    let chart_rows = chart_rows_for(records, &resolved.song_ids);
    let chart_chunks: Vec<&[ChartUpsert]> = chart_rows.chunks(CHUNK_SIZE).collect();
    let outcomes = join_all(
        chart_chunks
            .iter()
            .map(|chunk| resolve_chart_chunk(store, chunk)),
    )
    .await;
    for (chunk, outcome) in chart_chunks.iter().zip(outcomes) {
        match outcome {
            Ok(rows) => {
                for row in rows {
                    resolved.chart_ids.insert(
                        ChartKey {
                            song_id: row.song_id,
                            difficulty_type: row.difficulty_type,
                            is_dx: row.is_dx,
                        },
                        row.id,
                    );
                }
            }
            Err(err) => {
                resolved.failed_charts += chunk.len();
                tracing::warn!(error = %err, charts = chunk.len(), "chart chunk failed");
            }
        }
    }

    tracing::debug!(
        songs = resolved.song_ids.len(),
        charts = resolved.chart_ids.len(),
        failed_titles = resolved.failed_titles,
        failed_charts = resolved.failed_charts,
        "entity resolution finished"
    );

    resolved
}

async fn resolve_song_chunk<S: ScoreStore>(
    store: &S,
    chunk: &[String],
) -> Result<Vec<SongRow>, StoreError> {
    store.upsert_song_titles(chunk).await?;
    store.select_songs_by_titles(chunk).await
}

async fn resolve_chart_chunk<S: ScoreStore>(
    store: &S,
    chunk: &[ChartUpsert],
) -> Result<Vec<ChartRow>, StoreError> {
    store.upsert_charts(chunk).await?;

    let mut song_ids: Vec<i64> = Vec::new();
    let mut seen: HashSet<i64> = HashSet::new();
    for chart in chunk {
        if seen.insert(chart.song_id) {
            song_ids.push(chart.song_id);
        }
    }
    store.select_charts_by_song_ids(&song_ids).await
}

/// Deduplicated titles in first-seen order, with blank titles filtered out.
pub(crate) fn unique_titles(records: &[RawRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut titles: Vec<String> = Vec::new();
    for record in records {
        if record.title.trim().is_empty() {
            continue;
        }
        if seen.insert(record.title.as_str()) {
            titles.push(record.title.clone());
        }
    }
    titles
}

/// Chart rows for every record whose title resolved, deduplicated on the
/// natural key (Postgres rejects duplicate conflict keys within one INSERT).
/// The last record for a key wins its internal_level.
pub(crate) fn chart_rows_for(
    records: &[RawRecord],
    song_ids: &HashMap<String, i64>,
) -> Vec<ChartUpsert> {
    let mut rows: Vec<ChartUpsert> = Vec::new();
    let mut index: HashMap<ChartKey, usize> = HashMap::new();
    for record in records {
        let Some(&song_id) = song_ids.get(&record.title) else {
            continue;
        };
        let key = ChartKey {
            song_id,
            difficulty_type: record.difficulty_type,
            is_dx: record.is_dx,
        };
        match index.get(&key) {
            Some(&at) => rows[at].internal_level = record.internal_level,
            None => {
                index.insert(key, rows.len());
                rows.push(ChartUpsert {
                    song_id,
                    difficulty_type: record.difficulty_type,
                    is_dx: record.is_dx,
                    internal_level: record.internal_level,
                });
            }
        }
    }
    rows
}
