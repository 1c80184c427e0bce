//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::errors::{StoreError, StoreResult};
use super::repository::{
    ChatRepository, ContactRepository, MembershipRepository, ProfileRepository,
    TournamentRepository,
};
use super::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_default_timeout, with_timeout};
use crate::chat::{ChatMessage, MessageId, NewChatMessage};
use crate::contact::{ContactMessage, ContactSubmission};
use crate::profile::{ProfileUpdate, UserProfile};
use crate::tournament::{
    AdmitOutcome, Membership, Tournament, TournamentConfig, TournamentId, TournamentRecord,
    TournamentStatus, UserId,
};

const TOURNAMENT_COLUMNS: &str = "id, registration_code, status, created_by, created_at, \
     title, description, game, location, start_at, end_at, prize_pool, rules, max_participants";

fn tournament_from_row(row: &PgRow) -> Result<Tournament, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<TournamentStatus>()
        .map_err(|e| sqlx::Error::Decode(e.into()))?;
    let max_participants: i32 = row.try_get("max_participants")?;

    Ok(Tournament {
        id: row.try_get("id")?,
        registration_code: row.try_get("registration_code")?,
        status,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        config: TournamentConfig {
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            game: row.try_get("game")?,
            location: row.try_get("location")?,
            start_at: row.try_get("start_at")?,
            end_at: row.try_get("end_at")?,
            prize_pool: row.try_get("prize_pool")?,
            rules: row.try_get("rules")?,
            max_participants: max_participants.max(0) as u32,
        },
    })
}

fn membership_from_row(row: &PgRow) -> Result<Membership, sqlx::Error> {
    Ok(Membership {
        tournament_id: row.try_get("tournament_id")?,
        user_id: row.try_get("user_id")?,
        joined_at: row.try_get("joined_at")?,
    })
}

fn message_from_row(row: &PgRow) -> Result<ChatMessage, sqlx::Error> {
    Ok(ChatMessage {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        user_id: row.try_get("user_id")?,
        author_name: row.try_get("author_name")?,
        body: row.try_get("body")?,
        sent_at: row.try_get("sent_at")?,
    })
}

fn profile_from_row(row: &PgRow) -> Result<UserProfile, sqlx::Error> {
    Ok(UserProfile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        handicap: row.try_get("handicap")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn contact_from_row(row: &PgRow) -> Result<ContactMessage, sqlx::Error> {
    Ok(ContactMessage {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        message: row.try_get("message")?,
        submitted_at: row.try_get("submitted_at")?,
    })
}

/// PostgreSQL implementation of [`TournamentRepository`]
pub struct PgTournamentRepository {
    pool: PgPool,
}

impl PgTournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TournamentRepository for PgTournamentRepository {
    async fn ping(&self) -> StoreResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }

    async fn insert_tournament(&self, record: &TournamentRecord) -> StoreResult<Tournament> {
        let sql = format!(
            r#"
            INSERT INTO tournaments (registration_code, status, created_by, title, description,
                                     game, location, start_at, end_at, prize_pool, rules,
                                     max_participants)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {TOURNAMENT_COLUMNS}
            "#
        );
        let config = &record.config;
        let insert = sqlx::query(&sql)
            .bind(&record.registration_code)
            .bind(record.status.as_str())
            .bind(record.created_by)
            .bind(&config.title)
            .bind(&config.description)
            .bind(&config.game)
            .bind(&config.location)
            .bind(config.start_at)
            .bind(config.end_at)
            .bind(&config.prize_pool)
            .bind(&config.rules)
            .bind(config.max_participants as i32)
            .fetch_one(&self.pool);

        let row = match with_default_timeout(insert).await {
            Ok(row) => row,
            Err(StoreError::Database(e)) => {
                return Err(StoreError::from_insert(e, &record.registration_code));
            }
            Err(e) => return Err(e),
        };
        Ok(tournament_from_row(&row)?)
    }

    async fn find_by_id(&self, id: TournamentId) -> StoreResult<Option<Tournament>> {
        let sql = format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1");
        let row = with_default_timeout(sqlx::query(&sql).bind(id).fetch_optional(&self.pool))
            .await?;
        Ok(row.as_ref().map(tournament_from_row).transpose()?)
    }

    async fn find_by_code(&self, code: &str) -> StoreResult<Option<Tournament>> {
        let sql =
            format!("SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE registration_code = $1");
        let row = with_default_timeout(sqlx::query(&sql).bind(code).fetch_optional(&self.pool))
            .await?;
        Ok(row.as_ref().map(tournament_from_row).transpose()?)
    }

    async fn code_exists(&self, code: &str) -> StoreResult<bool> {
        let exists: bool = with_default_timeout(
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM tournaments WHERE registration_code = $1)",
            )
            .bind(code)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(exists)
    }

    async fn list_by_status(&self, status: TournamentStatus) -> StoreResult<Vec<Tournament>> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE status = $1 ORDER BY start_at, id"
        );
        let rows = with_default_timeout(
            sqlx::query(&sql)
                .bind(status.as_str())
                .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows
            .iter()
            .map(tournament_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn list_created_by(&self, user_id: UserId) -> StoreResult<Vec<Tournament>> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE created_by = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let rows =
            with_default_timeout(sqlx::query(&sql).bind(user_id).fetch_all(&self.pool)).await?;
        Ok(rows
            .iter()
            .map(tournament_from_row)
            .collect::<Result<_, _>>()?)
    }
}

/// Capacity-checked membership insert.
///
/// The row lock on the tournament serializes concurrent joins for it; an early
/// return drops the transaction, which rolls it back.
async fn admit_in_transaction(
    pool: &PgPool,
    tournament_id: TournamentId,
    user_id: UserId,
) -> Result<AdmitOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let capacity: Option<i32> =
        sqlx::query_scalar("SELECT max_participants FROM tournaments WHERE id = $1 FOR UPDATE")
            .bind(tournament_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(capacity) = capacity else {
        return Ok(AdmitOutcome::TournamentMissing);
    };

    let existing = sqlx::query(
        "SELECT 1 FROM tournament_memberships WHERE tournament_id = $1 AND user_id = $2",
    )
    .bind(tournament_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    if existing.is_some() {
        return Ok(AdmitOutcome::AlreadyMember);
    }

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tournament_memberships WHERE tournament_id = $1")
            .bind(tournament_id)
            .fetch_one(&mut *tx)
            .await?;
    if count >= i64::from(capacity) {
        return Ok(AdmitOutcome::Full);
    }

    let row = sqlx::query(
        "INSERT INTO tournament_memberships (tournament_id, user_id) VALUES ($1, $2) \
         RETURNING tournament_id, user_id, joined_at",
    )
    .bind(tournament_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;
    let membership = membership_from_row(&row)?;

    tx.commit().await?;
    Ok(AdmitOutcome::Admitted(membership))
}

/// PostgreSQL implementation of [`MembershipRepository`]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn find_membership(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<Option<Membership>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT tournament_id, user_id, joined_at FROM tournament_memberships \
                 WHERE tournament_id = $1 AND user_id = $2",
            )
            .bind(tournament_id)
            .bind(user_id)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.as_ref().map(membership_from_row).transpose()?)
    }

    async fn count_members(&self, tournament_id: TournamentId) -> StoreResult<u32> {
        let count: i64 = with_default_timeout(
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM tournament_memberships WHERE tournament_id = $1",
            )
            .bind(tournament_id)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(count.max(0) as u32)
    }

    async fn admit_member(
        &self,
        tournament_id: TournamentId,
        user_id: UserId,
    ) -> StoreResult<AdmitOutcome> {
        with_timeout(
            DEFAULT_TRANSACTION_TIMEOUT,
            admit_in_transaction(&self.pool, tournament_id, user_id),
        )
        .await
    }

    async fn list_members(&self, tournament_id: TournamentId) -> StoreResult<Vec<Membership>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT tournament_id, user_id, joined_at FROM tournament_memberships \
                 WHERE tournament_id = $1 ORDER BY joined_at, user_id",
            )
            .bind(tournament_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows
            .iter()
            .map(membership_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Membership>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT tournament_id, user_id, joined_at FROM tournament_memberships \
                 WHERE user_id = $1 ORDER BY joined_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows
            .iter()
            .map(membership_from_row)
            .collect::<Result<_, _>>()?)
    }
}

/// PostgreSQL implementation of [`ChatRepository`]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn insert_message(&self, message: &NewChatMessage) -> StoreResult<ChatMessage> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                INSERT INTO tournament_messages (tournament_id, user_id, author_name, body)
                VALUES ($1, $2, $3, $4)
                RETURNING id, tournament_id, user_id, author_name, body, sent_at
                "#,
            )
            .bind(message.tournament_id)
            .bind(message.user_id)
            .bind(&message.author_name)
            .bind(&message.body)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(message_from_row(&row)?)
    }

    async fn list_messages(
        &self,
        tournament_id: TournamentId,
        after: Option<MessageId>,
        limit: u32,
    ) -> StoreResult<Vec<ChatMessage>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, tournament_id, user_id, author_name, body, sent_at
                FROM tournament_messages
                WHERE tournament_id = $1 AND id > $2
                ORDER BY id
                LIMIT $3
                "#,
            )
            .bind(tournament_id)
            .bind(after.unwrap_or(0))
            .bind(i64::from(limit))
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows
            .iter()
            .map(message_from_row)
            .collect::<Result<_, _>>()?)
    }
}

/// PostgreSQL implementation of [`ProfileRepository`]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn upsert_profile(
        &self,
        user_id: UserId,
        update: &ProfileUpdate,
    ) -> StoreResult<UserProfile> {
        let now: DateTime<Utc> = Utc::now();
        let row = with_default_timeout(
            sqlx::query(
                r#"
                INSERT INTO user_profiles (id, name, email, phone, handicap, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name, email = EXCLUDED.email, phone = EXCLUDED.phone,
                    handicap = EXCLUDED.handicap, updated_at = EXCLUDED.updated_at
                RETURNING id, name, email, phone, handicap, created_at, updated_at
                "#,
            )
            .bind(user_id)
            .bind(&update.name)
            .bind(&update.email)
            .bind(&update.phone)
            .bind(update.handicap)
            .bind(now)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(profile_from_row(&row)?)
    }

    async fn find_profile(&self, user_id: UserId) -> StoreResult<Option<UserProfile>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, name, email, phone, handicap, created_at, updated_at \
                 FROM user_profiles WHERE id = $1",
            )
            .bind(user_id)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(row.as_ref().map(profile_from_row).transpose()?)
    }

    async fn find_profiles(&self, user_ids: &[UserId]) -> StoreResult<Vec<UserProfile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, name, email, phone, handicap, created_at, updated_at \
                 FROM user_profiles WHERE id = ANY($1)",
            )
            .bind(user_ids)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<_, _>>()?)
    }
}

/// PostgreSQL implementation of [`ContactRepository`]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn insert_contact(&self, submission: &ContactSubmission) -> StoreResult<ContactMessage> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                INSERT INTO contact_messages (name, email, message)
                VALUES ($1, $2, $3)
                RETURNING id, name, email, message, submitted_at
                "#,
            )
            .bind(&submission.name)
            .bind(&submission.email)
            .bind(&submission.message)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(contact_from_row(&row)?)
    }

    async fn list_contacts(&self) -> StoreResult<Vec<ContactMessage>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, name, email, message, submitted_at \
                 FROM contact_messages ORDER BY id",
            )
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows
            .iter()
            .map(contact_from_row)
            .collect::<Result<_, _>>()?)
    }
}
