//! Fetch-filter-render lists for players and sports.
//!
//! Every list is loaded in full and filtered in memory. There is no pagination.

use anyhow::Result;
use tracing::info;

use crate::database::{
    models::{PlayerCard, PlayerRecord, SportCategory},
    PlayerDatabase, SportDatabase,
};

/// Rows that can be matched against a search query.
pub trait Searchable {
    /// `needle` is the query lowercased; `raw` is the query as typed.
    fn matches(&self, needle: &str, raw: &str) -> bool;
}

/// Owners can search by name (any case) or by phone number.
impl Searchable for PlayerRecord {
    fn matches(&self, needle: &str, raw: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.phone_number.contains(raw)
    }
}

impl Searchable for PlayerCard {
    fn matches(&self, needle: &str, _raw: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

impl Searchable for SportCategory {
    fn matches(&self, needle: &str, _raw: &str) -> bool {
        self.sports_name.to_lowercase().contains(needle)
    }
}

/// A loaded list of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<T> {
    rows: Vec<T>,
}

impl<T> ListView<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T: Searchable> ListView<T> {
    /// Rows matching the query, in their loaded order. An empty query matches everything.
    ///
    /// The query is matched as typed, whitespace included. Recomputed from scratch on every
    /// call.
    pub fn filter(&self, query: &str) -> Vec<&T> {
        let needle = query.to_lowercase();

        self.rows
            .iter()
            .filter(|row| row.matches(&needle, query))
            .collect()
    }
}

impl ListView<PlayerRecord> {
    /// Every registered player, for the owner screens.
    pub async fn load_players<DB: PlayerDatabase>(database: &DB) -> Result<Self> {
        Ok(Self::new(database.get_all_players().await?))
    }
}

impl ListView<PlayerCard> {
    /// Every registered player without contact details, for the public screen.
    pub async fn load_player_cards<DB: PlayerDatabase>(database: &DB) -> Result<Self> {
        Ok(Self::new(database.get_player_cards().await?))
    }
}

impl ListView<SportCategory> {
    pub async fn load_sports<DB: SportDatabase>(database: &DB) -> Result<Self> {
        Ok(Self::new(database.get_all_sports().await?))
    }

    /// Deletes a sport by name and reloads the whole list.
    ///
    /// Returns whether a sport with that name was found.
    pub async fn delete<DB: SportDatabase>(
        &mut self,
        database: &DB,
        sports_name: &str,
    ) -> Result<bool> {
        let deleted = database.delete_sport(sports_name).await?;
        info!("Deleted sport {}: {}", sports_name, deleted);
        *self = Self::load_sports(database).await?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn player(name: &str, phone: &str) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            phone_number: phone.to_string(),
            image_url: None,
        }
    }

    fn players() -> ListView<PlayerRecord> {
        ListView::new(vec![
            player("Asha", "9990001111"),
            player("Ravi Kumar", "8880002222"),
            player("Kashi", "7770003333"),
        ])
    }

    fn names<T, F: Fn(&T) -> &str>(rows: Vec<&T>, name: F) -> Vec<&str> {
        rows.into_iter().map(|row| name(row)).collect()
    }

    #[test]
    fn name_search_ignores_case() {
        let view = players();
        assert_eq!(
            names(view.filter("ASH"), |p| p.name.as_str()),
            vec!["Asha", "Kashi"]
        );
    }

    #[test]
    fn owners_can_search_by_phone_number() {
        let view = players();
        assert_eq!(
            names(view.filter("0002"), |p| p.name.as_str()),
            vec!["Ravi Kumar"]
        );
    }

    #[test]
    fn public_cards_do_not_match_phone_numbers() {
        let view: ListView<PlayerCard> =
            ListView::new(players().rows().iter().cloned().map(PlayerCard::from).collect());

        assert!(view.filter("0002").is_empty());
        assert_eq!(view.filter("ravi").len(), 1);
    }

    #[test]
    fn empty_query_matches_everything() {
        let view = players();
        assert_eq!(view.filter("").len(), 3);
    }

    #[test]
    fn whitespace_is_part_of_the_query() {
        let view = players();
        assert_eq!(
            names(view.filter("ravi "), |p| p.name.as_str()),
            vec!["Ravi Kumar"]
        );
        assert!(view.filter("asha ").is_empty());
        assert!(view.filter("   ").is_empty());
    }

    #[test]
    fn filtering_is_repeatable() {
        let view = players();
        assert_eq!(view.filter("a"), view.filter("a"));
    }

    #[test]
    fn sports_match_on_name() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let view = ListView::new(vec![
            SportCategory {
                sports_name: "Cricket".to_string(),
                sports_date: date,
            },
            SportCategory {
                sports_name: "Kabaddi".to_string(),
                sports_date: date,
            },
        ]);

        assert_eq!(
            names(view.filter("kab"), |s| s.sports_name.as_str()),
            vec!["Kabaddi"]
        );
    }
}
