use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use super::RegistrationDraft;
use crate::{
    database::{models::PlayerRecord, PlayerDatabase, TournamentCodeDatabase},
    error::{SubmissionError, ValidationError},
    storage::ObjectStorage,
};

/// Runs a registration through code validation, picture upload and record insertion, in that
/// order.
///
/// A failed phase stops the pipeline. Phases that already committed are not rolled back, with
/// one exception: a picture uploaded for a record that then fails to insert is removed again on
/// a best-effort basis.
#[derive(Debug)]
pub struct SubmissionCoordinator<'a, DB, S> {
    database: &'a DB,
    storage: &'a S,
    /// Folder inside the bucket that player pictures go to.
    image_folder: &'a str,
}

impl<'a, DB, S> SubmissionCoordinator<'a, DB, S>
where
    DB: TournamentCodeDatabase + PlayerDatabase,
    S: ObjectStorage,
{
    pub fn new(database: &'a DB, storage: &'a S, image_folder: &'a str) -> Self {
        Self {
            database,
            storage,
            image_folder,
        }
    }

    /// Submits a draft and returns the player record that was stored.
    #[instrument(skip_all, fields(player = %draft.player_name))]
    pub async fn submit(
        &self,
        draft: &RegistrationDraft,
    ) -> Result<PlayerRecord, SubmissionError> {
        if !self
            .database
            .tournament_code_exists(&draft.tournament_code)
            .await?
        {
            info!("Rejected registration with unknown tournament code");
            return Err(ValidationError::InvalidTournamentCode.into());
        }
        debug!("Tournament code accepted");

        let uploaded_path = match &draft.image {
            Some(image) => {
                let path = object_path(
                    self.image_folder,
                    Utc::now().timestamp_millis(),
                    &image.file_name,
                );
                let stored = self
                    .storage
                    .upload_object(&path, image.bytes.clone(), &image.content_type)
                    .await?;
                debug!("Uploaded player picture to {}", stored);
                Some(stored)
            }
            None => None,
        };

        let record = PlayerRecord {
            name: draft.player_name.clone(),
            phone_number: draft.mobile_number.clone(),
            image_url: uploaded_path
                .as_deref()
                .map(|path| self.storage.public_url(path)),
        };

        if let Err(e) = self.database.insert_player(&record).await {
            error!("Failed to insert player {}: {:#}", record.name, e);
            if let Some(path) = &uploaded_path {
                self.remove_orphan(path).await;
            }
            return Err(e.into());
        }

        Ok(record)
    }

    async fn remove_orphan(&self, path: &str) {
        match self.storage.remove_object(path).await {
            Ok(()) => info!("Removed orphaned player picture {}", path),
            Err(e) => warn!("Player picture {} is orphaned in storage: {:#}", path, e),
        }
    }
}

/// Storage path for an uploaded picture: `{folder}/{millis}-{file_name}`.
///
/// Two uploads of the same file name within the same millisecond collide.
pub fn object_path(folder: &str, unix_millis: i64, file_name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{}-{}", unix_millis, file_name)
    } else {
        format!("{}/{}-{}", folder, unix_millis, file_name)
    }
}
