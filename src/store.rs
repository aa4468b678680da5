use chrono::Utc;
use sqlx::{PgPool, QueryBuilder, Row};
use thiserror::Error;

use crate::models::{
    ChartRow, ChartUpsert, DifficultyType, FcType, PlayerProfile, RatedSource, SongRow,
    UserRecordUpsert, VersionEra,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("store fault: {0}")]
    Fault(String),
}

/// Keyed store behind the ingestion pipeline. Every method covers exactly one
/// chunk; callers own chunking and failure accounting. Upserts resolve
/// conflicts on the natural key of each table, so repeated or concurrent
/// calls are safe.
#[allow(async_fn_in_trait)]
pub trait ScoreStore {
    async fn upsert_song_titles(&self, titles: &[String]) -> Result<(), StoreError>;
    async fn select_songs_by_titles(&self, titles: &[String]) -> Result<Vec<SongRow>, StoreError>;
    async fn upsert_charts(&self, rows: &[ChartUpsert]) -> Result<(), StoreError>;
    async fn select_charts_by_song_ids(&self, song_ids: &[i64])
        -> Result<Vec<ChartRow>, StoreError>;
    async fn upsert_user_records(&self, rows: &[UserRecordUpsert]) -> Result<(), StoreError>;
    async fn upsert_profile(&self, user_id: &str, profile: &PlayerProfile)
        -> Result<(), StoreError>;
    async fn select_rated_records(&self, user_id: &str) -> Result<Vec<RatedSource>, StoreError>;
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ScoreStore for PgStore {
    async fn upsert_song_titles(&self, titles: &[String]) -> Result<(), StoreError> {
        if titles.is_empty() {
            return Ok(());
        }
        let mut qb = QueryBuilder::<sqlx::Postgres>::new(r#"INSERT INTO "songs" ("title") "#);
        qb.push_values(titles.iter(), |mut b, title| {
            b.push_bind(title);
        });
        qb.push(r#" ON CONFLICT ("title") DO NOTHING"#);
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn select_songs_by_titles(&self, titles: &[String]) -> Result<Vec<SongRow>, StoreError> {
        if titles.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<sqlx::Postgres>::new(
            r#"SELECT "id", "title" FROM "songs" WHERE "title" IN ("#,
        );
        {
            let mut sep = qb.separated(", ");
            for title in titles {
                sep.push_bind(title);
            }
            sep.push_unseparated(")");
        }
        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Some(SongRow {
                    id: row.try_get("id").ok()?,
                    title: row.try_get("title").ok()?,
                })
            })
            .collect())
    }

    async fn upsert_charts(&self, rows: &[ChartUpsert]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut qb = QueryBuilder::<sqlx::Postgres>::new(
            r#"INSERT INTO "charts" ("song_id", "difficulty_type", "is_dx", "internal_level") "#,
        );
        qb.push_values(rows.iter(), |mut b, chart| {
            b.push_bind(chart.song_id);
            b.push_bind(chart.difficulty_type.as_str());
            b.push_bind(chart.is_dx);
            b.push_bind(chart.internal_level);
        });
        // internal_level may be refined by later ingestions; version_era is
        // curated out of band and left untouched
        qb.push(
            r#" ON CONFLICT ("song_id", "difficulty_type", "is_dx")
                DO UPDATE SET "internal_level" = EXCLUDED."internal_level""#,
        );
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn select_charts_by_song_ids(
        &self,
        song_ids: &[i64],
    ) -> Result<Vec<ChartRow>, StoreError> {
        if song_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<sqlx::Postgres>::new(
            r#"SELECT "id", "song_id", "difficulty_type", "is_dx" FROM "charts" WHERE "song_id" IN ("#,
        );
        {
            let mut sep = qb.separated(", ");
            for song_id in song_ids {
                sep.push_bind(song_id);
            }
            sep.push_unseparated(")");
        }
        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let difficulty: String = row.try_get("difficulty_type").ok()?;
                Some(ChartRow {
                    id: row.try_get("id").ok()?,
                    song_id: row.try_get("song_id").ok()?,
                    difficulty_type: DifficultyType::parse(&difficulty)?,
                    is_dx: row.try_get("is_dx").ok()?,
                })
            })
            .collect())
    }

    async fn upsert_user_records(&self, rows: &[UserRecordUpsert]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut qb = QueryBuilder::<sqlx::Postgres>::new(
            r#"INSERT INTO "user_records" ("user_id", "chart_id", "achievement", "fc_type", "fs_type") "#,
        );
        qb.push_values(rows.iter(), |mut b, record| {
            b.push_bind(&record.user_id);
            b.push_bind(record.chart_id);
            b.push_bind(record.achievement);
            b.push_bind(record.fc_type.as_str());
            b.push_bind(record.fs_type.as_str());
        });
        // unconditional overwrite: the latest scrape wins even if lower
        qb.push(
            r#" ON CONFLICT ("user_id", "chart_id")
                DO UPDATE SET "achievement" = EXCLUDED."achievement",
                              "fc_type" = EXCLUDED."fc_type",
                              "fs_type" = EXCLUDED."fs_type""#,
        );
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: &PlayerProfile,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO "users"
              ("id", "nickname", "icon_url", "title", "title_image_url", "dan_grade_url",
               "friend_rank_url", "total_stars", "play_count_total", "play_count_version", "updated_at")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT ("id") DO UPDATE SET
              "nickname" = EXCLUDED."nickname",
              "icon_url" = EXCLUDED."icon_url",
              "title" = EXCLUDED."title",
              "title_image_url" = EXCLUDED."title_image_url",
              "dan_grade_url" = EXCLUDED."dan_grade_url",
              "friend_rank_url" = EXCLUDED."friend_rank_url",
              "total_stars" = EXCLUDED."total_stars",
              "play_count_total" = EXCLUDED."play_count_total",
              "play_count_version" = EXCLUDED."play_count_version",
              "updated_at" = EXCLUDED."updated_at"
            "#,
        )
        .bind(user_id)
        .bind(profile.nickname.as_deref())
        .bind(profile.icon_url.as_deref())
        .bind(profile.title.as_deref())
        .bind(profile.title_image_url.as_deref())
        .bind(profile.dan_grade_url.as_deref())
        .bind(profile.friend_rank_url.as_deref())
        .bind(profile.total_stars)
        .bind(profile.play_count_total)
        .bind(profile.play_count_version)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn select_rated_records(&self, user_id: &str) -> Result<Vec<RatedSource>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
              s."title",
              c."version_era",
              c."difficulty_type",
              c."is_dx",
              c."internal_level",
              r."achievement",
              r."fc_type"
            FROM "user_records" r
            JOIN "charts" c ON c."id" = r."chart_id"
            JOIN "songs" s ON s."id" = c."song_id"
            WHERE r."user_id" = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let difficulty: String = row.try_get("difficulty_type").unwrap_or_default();
                let fc: String = row.try_get("fc_type").unwrap_or_default();
                let era: Option<String> = row.try_get("version_era").ok().flatten();
                RatedSource {
                    title: row.try_get("title").unwrap_or_default(),
                    version_era: era.as_deref().and_then(VersionEra::parse),
                    difficulty_type: DifficultyType::parse(&difficulty)
                        .unwrap_or(DifficultyType::Basic),
                    is_dx: row.try_get("is_dx").unwrap_or(false),
                    internal_level: row.try_get("internal_level").unwrap_or(0.0),
                    achievement: row.try_get("achievement").unwrap_or(0.0),
                    fc_type: FcType::parse(&fc).unwrap_or_default(),
                }
            })
            .collect())
    }
}
