use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use self::models::{InsertResult, PlayerCard, PlayerRecord, SportCategory};

/// Models for the database.
///
/// These models are specific to the current database design and schema.
/// Most if not all are directly mapped to a table in the database.
pub mod models;

/// Read access to the set of valid tournament codes.
#[allow(async_fn_in_trait)]
pub trait TournamentCodeDatabase {
    /// Checks whether the given code is one of the valid tournament codes.
    async fn tournament_code_exists(&self, code: &str) -> Result<bool>;
}

/// Storage for registered players.
#[allow(async_fn_in_trait)]
pub trait PlayerDatabase {
    /// Adds a player. There is no uniqueness constraint on players.
    async fn insert_player(&self, player: &PlayerRecord) -> Result<()>;

    /// Retrieves every registered player, including phone numbers.
    async fn get_all_players(&self) -> Result<Vec<PlayerRecord>>;

    /// Retrieves every registered player without contact details.
    async fn get_player_cards(&self) -> Result<Vec<PlayerCard>>;
}

/// Storage for sports categories, keyed by their name.
#[allow(async_fn_in_trait)]
pub trait SportDatabase {
    /// Point lookup by the sport's natural key.
    async fn get_sport(&self, sports_name: &str) -> Result<Option<SportCategory>>;

    /// Inserts a sport unless one with the same name is already stored.
    async fn insert_sport(&self, sport: &SportCategory) -> Result<InsertResult>;

    /// Retrieves all sports categories.
    async fn get_all_sports(&self) -> Result<Vec<SportCategory>>;

    /// Deletes a sport by name. Returns whether a row was removed.
    async fn delete_sport(&self, sports_name: &str) -> Result<bool>;
}

/// The hosted Postgres database behind the tournament desk.
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Establishes a connection pool to the database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        info!("Successfully connected to the database.");

        Ok(Self { pool })
    }

    /// Creates the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

impl TournamentCodeDatabase for PgDatabase {
    async fn tournament_code_exists(&self, code: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM tournament_code WHERE code = $1)
            "#,
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

impl PlayerDatabase for PgDatabase {
    async fn insert_player(&self, player: &PlayerRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (name, phone_number, image_url)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&player.name)
        .bind(&player.phone_number)
        .bind(&player.image_url)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_all_players(&self) -> Result<Vec<PlayerRecord>> {
        let players = sqlx::query_as::<_, PlayerRecord>(
            r#"
            SELECT name, phone_number, image_url
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }

    async fn get_player_cards(&self) -> Result<Vec<PlayerCard>> {
        let players = sqlx::query_as::<_, PlayerCard>(
            r#"
            SELECT name, image_url
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }
}

impl SportDatabase for PgDatabase {
    async fn get_sport(&self, sports_name: &str) -> Result<Option<SportCategory>> {
        let sport = sqlx::query_as::<_, SportCategory>(
            r#"
            SELECT sports_name, sports_date
            FROM sports
            WHERE sports_name = $1
            "#,
        )
        .bind(sports_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sport)
    }

    async fn insert_sport(&self, sport: &SportCategory) -> Result<InsertResult> {
        let result = sqlx::query(
            r#"
            INSERT INTO sports (sports_name, sports_date)
            VALUES ($1, $2)
            "#,
        )
        .bind(&sport.sports_name)
        .bind(sport.sports_date)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertResult::Inserted),
            // The primary key on sports_name catches a create that raced past the lookup.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(InsertResult::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_all_sports(&self) -> Result<Vec<SportCategory>> {
        let sports = sqlx::query_as::<_, SportCategory>(
            r#"
            SELECT sports_name, sports_date
            FROM sports
            ORDER BY sports_date ASC, sports_name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sports)
    }

    async fn delete_sport(&self, sports_name: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM sports
            WHERE sports_name = $1
            "#,
        )
        .bind(sports_name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
