use serde::Serialize;

use crate::models::{DifficultyType, FcType, RatedSource, VersionEra};

pub const NEW_POOL_LIMIT: usize = 15;
pub const OLD_POOL_LIMIT: usize = 35;

/// Rank multiplier by achievement percentage. Breakpoints follow the in-game
/// rank thresholds (SSS+ down to A).
pub fn rank_multiplier(achievement: f64) -> f64 {
    if achievement >= 100.5 {
        22.4
    } else if achievement >= 100.0 {
        21.6
    } else if achievement >= 99.5 {
        21.1
    } else if achievement >= 99.0 {
        20.8
    } else if achievement >= 98.0 {
        20.3
    } else if achievement >= 97.0 {
        20.0
    } else if achievement >= 94.0 {
        16.8
    } else if achievement >= 90.0 {
        15.2
    } else if achievement >= 80.0 {
        13.6
    } else {
        0.0
    }
}

pub fn fc_multiplier(fc_type: FcType) -> f64 {
    match fc_type {
        FcType::None => 1.0,
        FcType::Fc => 1.0125,
        FcType::FcPlus => 1.025,
        FcType::Ap => 1.0375,
        FcType::ApPlus => 1.05,
    }
}

/// Per-chart rating: chart constant * rank multiplier * capped achievement
/// factor * FC bonus, truncated. Achievement is capped at 100.5 so scores
/// above SSS+ do not keep scaling.
pub fn single_rating(internal_level: f64, achievement: f64, fc_type: FcType) -> i64 {
    let value = internal_level
        * rank_multiplier(achievement)
        * (achievement.min(100.5) / 100.0)
        * fc_multiplier(fc_type);
    value.floor() as i64
}

#[derive(Debug, Clone, Serialize)]
pub struct RatedSong {
    pub title: String,
    pub version: Option<VersionEra>,
    pub difficulty: DifficultyType,
    pub is_dx: bool,
    pub achievement: f64,
    pub internal_level: f64,
    pub rating: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestRating {
    pub total_rating: i64,
    pub new_rating: i64,
    pub old_rating: i64,
    pub new_songs: Vec<RatedSong>,
    pub old_songs: Vec<RatedSong>,
    pub all_count: usize,
}

/// Rates every stored record, splits the pool by version era (unclassified
/// counts as old), and keeps the top 15 new / top 35 old by rating. The sort
/// is stable, so ties keep input order.
pub fn compute_best_rating(sources: &[RatedSource]) -> BestRating {
    let rated: Vec<RatedSong> = sources
        .iter()
        .map(|source| RatedSong {
            title: source.title.clone(),
            version: source.version_era,
            difficulty: source.difficulty_type,
            is_dx: source.is_dx,
            achievement: source.achievement,
            internal_level: source.internal_level,
            rating: single_rating(source.internal_level, source.achievement, source.fc_type),
        })
        .collect();

    let mut new_songs: Vec<RatedSong> = rated
        .iter()
        .filter(|song| song.version == Some(VersionEra::New))
        .cloned()
        .collect();
    new_songs.sort_by(|a, b| b.rating.cmp(&a.rating));
    new_songs.truncate(NEW_POOL_LIMIT);

    let mut old_songs: Vec<RatedSong> = rated
        .iter()
        .filter(|song| song.version != Some(VersionEra::New))
        .cloned()
        .collect();
    old_songs.sort_by(|a, b| b.rating.cmp(&a.rating));
    old_songs.truncate(OLD_POOL_LIMIT);

    let new_rating: i64 = new_songs.iter().map(|song| song.rating).sum();
    let old_rating: i64 = old_songs.iter().map(|song| song.rating).sum();

    BestRating {
        total_rating: new_rating + old_rating,
        new_rating,
        old_rating,
        new_songs,
        old_songs,
        all_count: rated.len(),
    }
}
