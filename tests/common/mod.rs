#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use mairate_backend::models::{
    ChartRow, ChartUpsert, DifficultyType, FcType, FsType, PlayerProfile, RatedSource, SongRow,
    UserRecordUpsert, VersionEra,
};
use mairate_backend::store::{ScoreStore, StoreError};

#[derive(Debug, Clone)]
pub struct ChartEntry {
    pub id: i64,
    pub internal_level: f64,
    pub version_era: Option<VersionEra>,
}

#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub achievement: f64,
    pub fc_type: FcType,
    pub fs_type: FsType,
}

#[derive(Default)]
struct MemInner {
    songs: HashMap<String, i64>,
    next_song_id: i64,
    charts: HashMap<(i64, DifficultyType, bool), ChartEntry>,
    next_chart_id: i64,
    records: HashMap<(String, i64), StoredRecord>,
    profiles: HashMap<String, PlayerProfile>,
}

/// In-memory `ScoreStore` with the same conflict semantics as the Postgres
/// implementation, plus per-call failure injection. Failure sets hold 0-based
/// call indexes of the operation that should report a fault.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<MemInner>,
    pub fail_song_upserts: HashSet<usize>,
    pub fail_song_selects: HashSet<usize>,
    pub fail_chart_upserts: HashSet<usize>,
    pub fail_record_upserts: HashSet<usize>,
    pub fail_profile_upserts: bool,
    song_upsert_calls: AtomicUsize,
    song_select_calls: AtomicUsize,
    chart_upsert_calls: AtomicUsize,
    record_upsert_calls: AtomicUsize,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn song_count(&self) -> usize {
        self.inner.lock().unwrap().songs.len()
    }

    pub fn chart_count(&self) -> usize {
        self.inner.lock().unwrap().charts.len()
    }

    pub fn record_count(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    pub fn profile(&self, user_id: &str) -> Option<PlayerProfile> {
        self.inner.lock().unwrap().profiles.get(user_id).cloned()
    }

    pub fn stored_record(
        &self,
        user_id: &str,
        title: &str,
        difficulty: DifficultyType,
        is_dx: bool,
    ) -> Option<StoredRecord> {
        let inner = self.inner.lock().unwrap();
        let song_id = *inner.songs.get(title)?;
        let chart = inner.charts.get(&(song_id, difficulty, is_dx))?;
        inner.records.get(&(user_id.to_string(), chart.id)).cloned()
    }

    pub fn set_version_era(
        &self,
        title: &str,
        difficulty: DifficultyType,
        is_dx: bool,
        era: VersionEra,
    ) {
        let mut inner = self.inner.lock().unwrap();
        let Some(&song_id) = inner.songs.get(title) else {
            panic!("no such song: {title}");
        };
        let chart = inner
            .charts
            .get_mut(&(song_id, difficulty, is_dx))
            .expect("no such chart");
        chart.version_era = Some(era);
    }

    fn fault(op: &str) -> StoreError {
        StoreError::Fault(format!("injected {op} failure"))
    }
}

impl ScoreStore for MemStore {
    async fn upsert_song_titles(&self, titles: &[String]) -> Result<(), StoreError> {
        let call = self.song_upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_song_upserts.contains(&call) {
            return Err(Self::fault("song upsert"));
        }
        let mut inner = self.inner.lock().unwrap();
        for title in titles {
            if !inner.songs.contains_key(title) {
                inner.next_song_id += 1;
                let id = inner.next_song_id;
                inner.songs.insert(title.clone(), id);
            }
        }
        Ok(())
    }

    async fn select_songs_by_titles(&self, titles: &[String]) -> Result<Vec<SongRow>, StoreError> {
        let call = self.song_select_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_song_selects.contains(&call) {
            return Err(Self::fault("song select"));
        }
        let inner = self.inner.lock().unwrap();
        Ok(titles
            .iter()
            .filter_map(|title| {
                inner.songs.get(title).map(|&id| SongRow {
                    id,
                    title: title.clone(),
                })
            })
            .collect())
    }

    async fn upsert_charts(&self, rows: &[ChartUpsert]) -> Result<(), StoreError> {
        let call = self.chart_upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_chart_upserts.contains(&call) {
            return Err(Self::fault("chart upsert"));
        }
        let mut inner = self.inner.lock().unwrap();
        for row in rows {
            let key = (row.song_id, row.difficulty_type, row.is_dx);
            match inner.charts.get_mut(&key) {
                Some(entry) => entry.internal_level = row.internal_level,
                None => {
                    inner.next_chart_id += 1;
                    let id = inner.next_chart_id;
                    inner.charts.insert(
                        key,
                        ChartEntry {
                            id,
                            internal_level: row.internal_level,
                            version_era: None,
                        },
                    );
                }
            }
        }
        Ok(())
    }

    async fn select_charts_by_song_ids(
        &self,
        song_ids: &[i64],
    ) -> Result<Vec<ChartRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let wanted: HashSet<i64> = song_ids.iter().copied().collect();
        Ok(inner
            .charts
            .iter()
            .filter(|((song_id, _, _), _)| wanted.contains(song_id))
            .map(|(&(song_id, difficulty_type, is_dx), entry)| ChartRow {
                id: entry.id,
                song_id,
                difficulty_type,
                is_dx,
            })
            .collect())
    }

    async fn upsert_user_records(&self, rows: &[UserRecordUpsert]) -> Result<(), StoreError> {
        let call = self.record_upsert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_record_upserts.contains(&call) {
            return Err(Self::fault("record upsert"));
        }
        let mut inner = self.inner.lock().unwrap();
        for row in rows {
            inner.records.insert(
                (row.user_id.clone(), row.chart_id),
                StoredRecord {
                    achievement: row.achievement,
                    fc_type: row.fc_type,
                    fs_type: row.fs_type,
                },
            );
        }
        Ok(())
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: &PlayerProfile,
    ) -> Result<(), StoreError> {
        if self.fail_profile_upserts {
            return Err(Self::fault("profile upsert"));
        }
        let mut inner = self.inner.lock().unwrap();
        inner.profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }

    async fn select_rated_records(&self, user_id: &str) -> Result<Vec<RatedSource>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let titles_by_id: HashMap<i64, &str> = inner
            .songs
            .iter()
            .map(|(title, &id)| (id, title.as_str()))
            .collect();

        let mut sources: Vec<RatedSource> = Vec::new();
        for ((owner, chart_id), record) in &inner.records {
            if owner != user_id {
                continue;
            }
            let Some((&(song_id, difficulty_type, is_dx), entry)) = inner
                .charts
                .iter()
                .find(|(_, entry)| entry.id == *chart_id)
            else {
                continue;
            };
            let Some(title) = titles_by_id.get(&song_id) else {
                continue;
            };
            sources.push(RatedSource {
                title: title.to_string(),
                version_era: entry.version_era,
                difficulty_type,
                is_dx,
                achievement: record.achievement,
                internal_level: entry.internal_level,
                fc_type: record.fc_type,
            });
        }
        Ok(sources)
    }
}
