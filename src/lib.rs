/// Settings read from the environment at startup.
pub mod config;
/// Traits and types used for interacting with the relational store.
pub mod database;
/// Error types shared by the workflows.
pub mod error;
/// Loaded lists of players and sports with client-side search.
pub mod listing;
pub mod registration;
/// Creating sports categories and linking them to their downstream screens.
pub mod sports;
/// Object storage for player pictures.
pub mod storage;
