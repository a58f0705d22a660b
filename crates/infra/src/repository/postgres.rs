//! Postgres-backed repository implementation.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError | Scenario |
//! |------------|----------------------|-----------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Moniker already taken |
//! | Database (foreign key violation) | `23503` | `Constraint` | Talk points at a missing camp or speaker |
//! | Database (check constraint violation) | `23514` | `Constraint` | Length outside 1..=100 |
//! | Database (other) | Any other | `Database` | Other database errors |
//! | PoolClosed / Other | N/A | `Database` | Network errors, connection failures, etc. |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::{instrument, Span};

use codecamp_core::{Camp, CampId, Location, Speaker, SpeakerId, Talk, TalkId};

use super::change_set::{Change, ChangeKind, ChangeSet, Commit, Record};
use super::r#trait::{CampRepository, RepositoryError, RepositoryResult};
use crate::seed::SampleData;

const CAMP_COLUMNS: &str = r#"
    c.camp_id, c.name, c.moniker, c.event_date, c.length,
    c.venue_name, c.address1, c.address2, c.address3,
    c.city_town, c.state_province, c.postal_code, c.country
"#;

const SPEAKER_COLUMNS: &str = r#"
    s.speaker_id, s.first_name, s.last_name, s.middle_name, s.company,
    s.company_url, s.blog_url, s.twitter, s.github
"#;

/// Talks joined with their speaker. The speaker columns are NULL only when the
/// row is orphaned, which the foreign keys rule out.
const TALK_SELECT: &str = r#"
    SELECT
        t.talk_id, t.camp_id, t.speaker_id, t.title, t.abstract, t.level,
        s.first_name, s.last_name, s.middle_name, s.company,
        s.company_url, s.blog_url, s.twitter, s.github
    FROM talks t
    LEFT JOIN speakers s ON s.speaker_id = t.speaker_id
"#;

/// Postgres-backed repository.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`.
///
/// ## Commits
///
/// `save_changes` runs every staged change inside one transaction and rolls
/// back on the first failure.
#[derive(Debug, Clone)]
pub struct PostgresCampRepository {
    pool: Arc<PgPool>,
}

impl PostgresCampRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Load `data` if the store holds no camps yet. Returns whether it seeded.
    #[instrument(skip(self, data))]
    pub async fn seed_if_empty(&self, data: SampleData) -> RepositoryResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM camps")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("count_camps", e))?;
        if count > 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(false);
        }

        let mut speaker_ids = Vec::with_capacity(data.speakers.len());
        for speaker in &data.speakers {
            let id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO speakers (
                    first_name, last_name, middle_name, company,
                    company_url, blog_url, twitter, github
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING speaker_id
                "#,
            )
            .bind(&speaker.first_name)
            .bind(&speaker.last_name)
            .bind(&speaker.middle_name)
            .bind(&speaker.company)
            .bind(&speaker.company_url)
            .bind(&speaker.blog_url)
            .bind(&speaker.twitter)
            .bind(&speaker.github)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("seed_speaker", e))?;
            speaker_ids.push(SpeakerId::new(id));
        }

        for sample in data.camps {
            let camp_id = insert_camp(&mut tx, &sample.camp).await?;
            for (speaker, mut talk) in sample.talks {
                talk.camp_id = Some(camp_id);
                talk.speaker_id = speaker_ids.get(speaker).copied();
                insert_talk(&mut tx, &talk).await?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(true)
    }

    async fn load_talks(&self, camp_ids: &[i32], include_speakers: bool) -> RepositoryResult<Vec<Talk>> {
        let rows = sqlx::query(&format!(
            "{TALK_SELECT} WHERE t.camp_id = ANY($1) ORDER BY t.title ASC"
        ))
        .bind(camp_ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_talks", e))?;

        rows.iter()
            .map(|row| talk_from_row(row, include_speakers))
            .collect()
    }

    async fn fetch_camps(
        &self,
        operation: &'static str,
        filter: CampFilter<'_>,
        include_talks: bool,
    ) -> RepositoryResult<Vec<Camp>> {
        let base = format!("SELECT {CAMP_COLUMNS} FROM camps c");
        let order = "ORDER BY c.event_date DESC, c.camp_id ASC";
        let rows = match filter {
            CampFilter::All => sqlx::query(&format!("{base} {order}"))
                .fetch_all(&*self.pool)
                .await,
            CampFilter::Moniker(moniker) => {
                sqlx::query(&format!("{base} WHERE c.moniker = $1 {order}"))
                    .bind(moniker)
                    .fetch_all(&*self.pool)
                    .await
            }
            CampFilter::EventDate(date) => {
                sqlx::query(&format!("{base} WHERE c.event_date = $1 {order}"))
                    .bind(date)
                    .fetch_all(&*self.pool)
                    .await
            }
        }
        .map_err(|e| map_sqlx_error(operation, e))?;

        let mut camps = rows
            .iter()
            .map(|row| {
                CampRow::from_row(row)
                    .map(Camp::from)
                    .map_err(|e| map_sqlx_error(operation, e))
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        if include_talks && !camps.is_empty() {
            let ids: Vec<i32> = camps.iter().map(|c| c.camp_id.get()).collect();
            let talks = self.load_talks(&ids, true).await?;
            for camp in &mut camps {
                camp.talks = talks
                    .iter()
                    .filter(|t| t.camp_id == Some(camp.camp_id))
                    .cloned()
                    .collect();
            }
        }

        Span::current().record("camp_count", camps.len());
        Ok(camps)
    }
}

#[derive(Debug, Clone, Copy)]
enum CampFilter<'a> {
    All,
    Moniker(&'a str),
    EventDate(NaiveDate),
}

#[async_trait]
impl CampRepository for PostgresCampRepository {
    #[instrument(skip(self), fields(camp_count), err)]
    async fn get_all_camps(&self, include_talks: bool) -> RepositoryResult<Vec<Camp>> {
        self.fetch_camps("get_all_camps", CampFilter::All, include_talks)
            .await
    }

    #[instrument(skip(self), fields(camp_count), err)]
    async fn get_camp(&self, moniker: &str, include_talks: bool) -> RepositoryResult<Option<Camp>> {
        let camps = self
            .fetch_camps("get_camp", CampFilter::Moniker(moniker), include_talks)
            .await?;
        Ok(camps.into_iter().next())
    }

    #[instrument(skip(self), fields(camp_count), err)]
    async fn get_camps_by_event_date(
        &self,
        date: NaiveDate,
        include_talks: bool,
    ) -> RepositoryResult<Vec<Camp>> {
        self.fetch_camps("get_camps_by_event_date", CampFilter::EventDate(date), include_talks)
            .await
    }

    #[instrument(skip(self), err)]
    async fn get_talks_by_moniker(
        &self,
        moniker: &str,
        include_speakers: bool,
    ) -> RepositoryResult<Vec<Talk>> {
        let rows = sqlx::query(&format!(
            r#"
            {TALK_SELECT}
            JOIN camps c ON c.camp_id = t.camp_id
            WHERE c.moniker = $1
            ORDER BY t.title ASC
            "#
        ))
        .bind(moniker)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_talks_by_moniker", e))?;

        rows.iter()
            .map(|row| talk_from_row(row, include_speakers))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn get_talk_by_moniker(
        &self,
        moniker: &str,
        talk_id: TalkId,
        include_speaker: bool,
    ) -> RepositoryResult<Option<Talk>> {
        let row = sqlx::query(&format!(
            r#"
            {TALK_SELECT}
            JOIN camps c ON c.camp_id = t.camp_id
            WHERE c.moniker = $1 AND t.talk_id = $2
            "#
        ))
        .bind(moniker)
        .bind(talk_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_talk_by_moniker", e))?;

        row.map(|r| talk_from_row(&r, include_speaker)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_speakers_by_moniker(&self, moniker: &str) -> RepositoryResult<Vec<Speaker>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT DISTINCT {SPEAKER_COLUMNS}
            FROM speakers s
            JOIN talks t ON t.speaker_id = s.speaker_id
            JOIN camps c ON c.camp_id = t.camp_id
            WHERE c.moniker = $1
            ORDER BY s.last_name ASC, s.first_name ASC
            "#
        ))
        .bind(moniker)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_speakers_by_moniker", e))?;

        speakers_from_rows("get_speakers_by_moniker", &rows)
    }

    #[instrument(skip(self), err)]
    async fn get_speaker(&self, speaker_id: SpeakerId) -> RepositoryResult<Option<Speaker>> {
        let row = sqlx::query(&format!(
            "SELECT {SPEAKER_COLUMNS} FROM speakers s WHERE s.speaker_id = $1"
        ))
        .bind(speaker_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_speaker", e))?;

        row.map(|r| {
            SpeakerRow::from_row(&r)
                .map(Speaker::from)
                .map_err(|e| map_sqlx_error("get_speaker", e))
        })
        .transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_all_speakers(&self) -> RepositoryResult<Vec<Speaker>> {
        let rows = sqlx::query(&format!(
            "SELECT {SPEAKER_COLUMNS} FROM speakers s ORDER BY s.last_name ASC, s.first_name ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_all_speakers", e))?;

        speakers_from_rows("get_all_speakers", &rows)
    }

    #[instrument(skip(self, changes), fields(changes = changes.len(), rows_affected), err)]
    async fn save_changes(&self, changes: ChangeSet) -> RepositoryResult<Commit> {
        if changes.is_empty() {
            return Ok(Commit::default());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut added = Vec::new();
        let mut rows = 0;
        for change in changes {
            match apply_change(&mut tx, change, &mut added).await {
                Ok(n) => rows += n,
                Err(e) => {
                    tx.rollback()
                        .await
                        .map_err(|e| map_sqlx_error("rollback", e))?;
                    return Err(e);
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("rows_affected", rows);
        Ok(Commit::new(rows, added))
    }
}

async fn apply_change(
    tx: &mut Transaction<'_, Postgres>,
    change: Change,
    added: &mut Vec<Record>,
) -> RepositoryResult<u64> {
    match (change.kind, change.record) {
        (ChangeKind::Add, Record::Camp(mut camp)) => {
            camp.camp_id = insert_camp(tx, &camp).await?;
            camp.talks.clear();
            added.push(Record::Camp(camp));
            Ok(1)
        }
        (ChangeKind::Update, Record::Camp(camp)) => {
            let result = sqlx::query(
                r#"
                UPDATE camps SET
                    name = $2,
                    moniker = $3,
                    event_date = $4,
                    length = $5,
                    venue_name = $6,
                    address1 = $7,
                    address2 = $8,
                    address3 = $9,
                    city_town = $10,
                    state_province = $11,
                    postal_code = $12,
                    country = $13
                WHERE camp_id = $1
                "#,
            )
            .bind(camp.camp_id.get())
            .bind(&camp.name)
            .bind(&camp.moniker)
            .bind(camp.event_date)
            .bind(camp.length)
            .bind(&camp.location.venue_name)
            .bind(&camp.location.address1)
            .bind(&camp.location.address2)
            .bind(&camp.location.address3)
            .bind(&camp.location.city_town)
            .bind(&camp.location.state_province)
            .bind(&camp.location.postal_code)
            .bind(&camp.location.country)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("update_camp", e))?;
            Ok(result.rows_affected())
        }
        (ChangeKind::Delete, Record::Camp(camp)) => {
            let talks = sqlx::query("DELETE FROM talks WHERE camp_id = $1")
                .bind(camp.camp_id.get())
                .execute(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("delete_camp_talks", e))?;
            let camps = sqlx::query("DELETE FROM camps WHERE camp_id = $1")
                .bind(camp.camp_id.get())
                .execute(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("delete_camp", e))?;
            Ok(talks.rows_affected() + camps.rows_affected())
        }
        (ChangeKind::Add, Record::Talk(mut talk)) => {
            talk.talk_id = insert_talk(tx, &talk).await?;
            added.push(Record::Talk(talk));
            Ok(1)
        }
        (ChangeKind::Update, Record::Talk(talk)) => {
            let (camp_id, speaker_id) = talk_relations(&talk)?;
            let result = sqlx::query(
                r#"
                UPDATE talks SET
                    camp_id = $2,
                    speaker_id = $3,
                    title = $4,
                    abstract = $5,
                    level = $6
                WHERE talk_id = $1
                "#,
            )
            .bind(talk.talk_id.get())
            .bind(camp_id.get())
            .bind(speaker_id.get())
            .bind(&talk.title)
            .bind(&talk.r#abstract)
            .bind(talk.level)
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("update_talk", e))?;
            Ok(result.rows_affected())
        }
        (ChangeKind::Delete, Record::Talk(talk)) => {
            let result = sqlx::query("DELETE FROM talks WHERE talk_id = $1")
                .bind(talk.talk_id.get())
                .execute(&mut **tx)
                .await
                .map_err(|e| map_sqlx_error("delete_talk", e))?;
            Ok(result.rows_affected())
        }
    }
}

async fn insert_camp(tx: &mut Transaction<'_, Postgres>, camp: &Camp) -> RepositoryResult<CampId> {
    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO camps (
            name, moniker, event_date, length,
            venue_name, address1, address2, address3,
            city_town, state_province, postal_code, country
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING camp_id
        "#,
    )
    .bind(&camp.name)
    .bind(&camp.moniker)
    .bind(camp.event_date)
    .bind(camp.length)
    .bind(&camp.location.venue_name)
    .bind(&camp.location.address1)
    .bind(&camp.location.address2)
    .bind(&camp.location.address3)
    .bind(&camp.location.city_town)
    .bind(&camp.location.state_province)
    .bind(&camp.location.postal_code)
    .bind(&camp.location.country)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_camp", e))?;
    Ok(CampId::new(id))
}

async fn insert_talk(tx: &mut Transaction<'_, Postgres>, talk: &Talk) -> RepositoryResult<TalkId> {
    let (camp_id, speaker_id) = talk_relations(talk)?;
    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO talks (camp_id, speaker_id, title, abstract, level)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING talk_id
        "#,
    )
    .bind(camp_id.get())
    .bind(speaker_id.get())
    .bind(&talk.title)
    .bind(&talk.r#abstract)
    .bind(talk.level)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_talk", e))?;
    Ok(TalkId::new(id))
}

fn talk_relations(talk: &Talk) -> RepositoryResult<(CampId, SpeakerId)> {
    let camp_id = talk
        .camp_id
        .ok_or_else(|| RepositoryError::Constraint("talk must belong to a camp".into()))?;
    let speaker_id = talk
        .speaker_id
        .ok_or_else(|| RepositoryError::Constraint("talk must reference a speaker".into()))?;
    Ok((camp_id, speaker_id))
}

/// Map SQLx errors to `RepositoryError`.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => RepositoryError::Conflict(msg),
                Some("23503") | Some("23514") => RepositoryError::Constraint(msg),
                _ => RepositoryError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::Database(format!("connection pool closed in {}", operation))
        }
        _ => RepositoryError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct CampRow {
    camp_id: i32,
    name: String,
    moniker: String,
    event_date: NaiveDate,
    length: i32,
    location: Location,
}

impl<'r> FromRow<'r, PgRow> for CampRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CampRow {
            camp_id: row.try_get("camp_id")?,
            name: row.try_get("name")?,
            moniker: row.try_get("moniker")?,
            event_date: row.try_get("event_date")?,
            length: row.try_get("length")?,
            location: Location {
                venue_name: row.try_get("venue_name")?,
                address1: row.try_get("address1")?,
                address2: row.try_get("address2")?,
                address3: row.try_get("address3")?,
                city_town: row.try_get("city_town")?,
                state_province: row.try_get("state_province")?,
                postal_code: row.try_get("postal_code")?,
                country: row.try_get("country")?,
            },
        })
    }
}

impl From<CampRow> for Camp {
    fn from(row: CampRow) -> Self {
        Camp {
            camp_id: CampId::new(row.camp_id),
            name: row.name,
            moniker: row.moniker,
            location: row.location,
            event_date: row.event_date,
            length: row.length,
            talks: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct SpeakerRow {
    speaker_id: i32,
    first_name: String,
    last_name: String,
    middle_name: Option<String>,
    company: Option<String>,
    company_url: Option<String>,
    blog_url: Option<String>,
    twitter: Option<String>,
    github: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for SpeakerRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SpeakerRow {
            speaker_id: row.try_get("speaker_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            middle_name: row.try_get("middle_name")?,
            company: row.try_get("company")?,
            company_url: row.try_get("company_url")?,
            blog_url: row.try_get("blog_url")?,
            twitter: row.try_get("twitter")?,
            github: row.try_get("github")?,
        })
    }
}

impl From<SpeakerRow> for Speaker {
    fn from(row: SpeakerRow) -> Self {
        Speaker {
            speaker_id: SpeakerId::new(row.speaker_id),
            first_name: row.first_name,
            last_name: row.last_name,
            middle_name: row.middle_name,
            company: row.company,
            company_url: row.company_url,
            blog_url: row.blog_url,
            twitter: row.twitter,
            github: row.github,
        }
    }
}

fn speakers_from_rows(operation: &str, rows: &[PgRow]) -> RepositoryResult<Vec<Speaker>> {
    rows.iter()
        .map(|row| {
            SpeakerRow::from_row(row)
                .map(Speaker::from)
                .map_err(|e| map_sqlx_error(operation, e))
        })
        .collect()
}

fn talk_from_row(row: &PgRow, include_speaker: bool) -> RepositoryResult<Talk> {
    let read = || -> Result<Talk, sqlx::Error> {
        let speaker_id: i32 = row.try_get("speaker_id")?;
        let speaker = if include_speaker {
            let first_name: Option<String> = row.try_get("first_name")?;
            match first_name {
                Some(first_name) => Some(Speaker {
                    speaker_id: SpeakerId::new(speaker_id),
                    first_name,
                    last_name: row.try_get("last_name")?,
                    middle_name: row.try_get("middle_name")?,
                    company: row.try_get("company")?,
                    company_url: row.try_get("company_url")?,
                    blog_url: row.try_get("blog_url")?,
                    twitter: row.try_get("twitter")?,
                    github: row.try_get("github")?,
                }),
                None => None,
            }
        } else {
            None
        };

        Ok(Talk {
            talk_id: TalkId::new(row.try_get("talk_id")?),
            camp_id: Some(CampId::new(row.try_get("camp_id")?)),
            speaker_id: Some(SpeakerId::new(speaker_id)),
            speaker,
            title: row.try_get("title")?,
            r#abstract: row.try_get("abstract")?,
            level: row.try_get("level")?,
        })
    };
    read().map_err(|e| map_sqlx_error("read_talk", e))
}
