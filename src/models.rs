use serde::{Deserialize, Serialize};

/// Difficulty tier of a chart. Wire strings match what the bookmarklet scrapes
/// from maimaidx-eng.com, lowercased and trimmed on the client side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyType {
    Basic,
    Advanced,
    Expert,
    Master,
    Remaster,
}

impl DifficultyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyType::Basic => "basic",
            DifficultyType::Advanced => "advanced",
            DifficultyType::Expert => "expert",
            DifficultyType::Master => "master",
            DifficultyType::Remaster => "remaster",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(DifficultyType::Basic),
            "advanced" => Some(DifficultyType::Advanced),
            "expert" => Some(DifficultyType::Expert),
            "master" => Some(DifficultyType::Master),
            "remaster" => Some(DifficultyType::Remaster),
            _ => None,
        }
    }
}

/// Full-combo tier. Modifies the per-chart rating via a multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FcType {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "fc")]
    Fc,
    #[serde(rename = "fc+")]
    FcPlus,
    #[serde(rename = "ap")]
    Ap,
    #[serde(rename = "ap+")]
    ApPlus,
}

impl FcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FcType::None => "none",
            FcType::Fc => "fc",
            FcType::FcPlus => "fc+",
            FcType::Ap => "ap",
            FcType::ApPlus => "ap+",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(FcType::None),
            "fc" => Some(FcType::Fc),
            "fc+" => Some(FcType::FcPlus),
            "ap" => Some(FcType::Ap),
            "ap+" => Some(FcType::ApPlus),
            _ => None,
        }
    }
}

/// Sync-play tier. Stored for display only; does not affect rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FsType {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "sync")]
    Sync,
    #[serde(rename = "fs")]
    Fs,
    #[serde(rename = "fs+")]
    FsPlus,
    #[serde(rename = "fsd")]
    Fsd,
    #[serde(rename = "fsd+")]
    FsdPlus,
}

impl FsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FsType::None => "none",
            FsType::Sync => "sync",
            FsType::Fs => "fs",
            FsType::FsPlus => "fs+",
            FsType::Fsd => "fsd",
            FsType::FsdPlus => "fsd+",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(FsType::None),
            "sync" => Some(FsType::Sync),
            "fs" => Some(FsType::Fs),
            "fs+" => Some(FsType::FsPlus),
            "fsd" => Some(FsType::Fsd),
            "fsd+" => Some(FsType::FsdPlus),
            _ => None,
        }
    }
}

/// Content generation a chart belongs to. Absent (`None` in the column and in
/// `Option<VersionEra>`) means unclassified, which the rating aggregator
/// treats as old-generation. The column is curated out of band; ingestion
/// never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionEra {
    New,
    Old,
}

impl VersionEra {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionEra::New => "New",
            VersionEra::Old => "Old",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "New" => Some(VersionEra::New),
            "Old" => Some(VersionEra::Old),
            _ => None,
        }
    }
}

/// One scraped performance row, exactly as the bookmarklet posts it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub title: String,
    pub achievement: f64,
    pub difficulty_type: DifficultyType,
    pub is_dx: bool,
    pub internal_level: f64,
    #[serde(default)]
    pub fc_type: FcType,
    #[serde(default)]
    pub fs_type: FsType,
}

/// Denormalized profile block the bookmarklet scrapes from the player page.
/// Every field is optional; whatever arrives overwrites the stored row.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub nickname: Option<String>,
    pub icon_url: Option<String>,
    pub title: Option<String>,
    pub title_image_url: Option<String>,
    pub dan_grade_url: Option<String>,
    pub friend_rank_url: Option<String>,
    pub total_stars: Option<i64>,
    pub play_count_total: Option<i64>,
    pub play_count_version: Option<i64>,
}

/// Natural key of a chart within the resolved song space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartKey {
    pub song_id: i64,
    pub difficulty_type: DifficultyType,
    pub is_dx: bool,
}

#[derive(Debug, Clone)]
pub struct SongRow {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct ChartRow {
    pub id: i64,
    pub song_id: i64,
    pub difficulty_type: DifficultyType,
    pub is_dx: bool,
}

/// Chart row ready for upsert; conflict on the natural key refreshes
/// `internal_level` only.
#[derive(Debug, Clone)]
pub struct ChartUpsert {
    pub song_id: i64,
    pub difficulty_type: DifficultyType,
    pub is_dx: bool,
    pub internal_level: f64,
}

/// Final reconciled record row keyed on `(user_id, chart_id)`.
#[derive(Debug, Clone)]
pub struct UserRecordUpsert {
    pub user_id: String,
    pub chart_id: i64,
    pub achievement: f64,
    pub fc_type: FcType,
    pub fs_type: FsType,
}

/// Stored record joined with its chart and song, as consumed by the rating
/// aggregator.
#[derive(Debug, Clone)]
pub struct RatedSource {
    pub title: String,
    pub version_era: Option<VersionEra>,
    pub difficulty_type: DifficultyType,
    pub is_dx: bool,
    pub achievement: f64,
    pub internal_level: f64,
    pub fc_type: FcType,
}
