use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::{
    database::{
        models::{InsertResult, SportCategory},
        SportDatabase,
    },
    error::{SportError, ValidationError},
};

/// Creates a sports category unless one with the same name already exists.
///
/// The name is looked up first and nothing is written if it is taken. Two creates racing past
/// the lookup are still caught by the store's key on `sports_name`, and reported the same way.
#[instrument(skip(database))]
pub async fn create_sport<DB: SportDatabase>(
    database: &DB,
    sports_name: &str,
    sports_date: NaiveDate,
) -> Result<SportCategory, SportError> {
    let sports_name = sports_name.trim();
    if sports_name.is_empty() {
        return Err(ValidationError::EmptySportName.into());
    }

    if database.get_sport(sports_name).await?.is_some() {
        info!("Sport {} already exists", sports_name);
        return Err(ValidationError::DuplicateSport(sports_name.to_string()).into());
    }

    let sport = SportCategory {
        sports_name: sports_name.to_string(),
        sports_date,
    };

    match database.insert_sport(&sport).await? {
        InsertResult::Inserted => {
            info!("Created sport {}", sports_name);
            Ok(sport)
        }
        InsertResult::AlreadyExists => {
            Err(ValidationError::DuplicateSport(sports_name.to_string()).into())
        }
    }
}

/// Parses a date typed as `YYYY-MM-DD`.
pub fn parse_sport_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Links from a sport to the screens that manage it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SportLinks {
    pub create_team: String,
    pub points_table: String,
}

impl SportLinks {
    /// Both screens take the sport's name as their only query parameter.
    pub fn new(dashboard_url: &str, sports_name: &str) -> Self {
        let base = dashboard_url.trim_end_matches('/');
        let sport = urlencoding::encode(sports_name);

        Self {
            create_team: format!("{}/Owner/Create_Team?sport={}", base, sport),
            points_table: format!("{}/Owner/Points_Table?sport={}", base, sport),
        }
    }
}
