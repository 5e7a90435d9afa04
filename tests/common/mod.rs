use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use tourney_desk::{
    database::{
        models::{InsertResult, PlayerCard, PlayerRecord, SportCategory},
        PlayerDatabase, SportDatabase, TournamentCodeDatabase,
    },
    registration::{DraftField, ImageUpload, StepController},
    storage::ObjectStorage,
};

#[allow(dead_code)]
pub const PUBLIC_BASE: &str = "https://demo.supabase.co/storage/v1/object/public/images";

/// Which calls of the in-memory backend should fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct Failures {
    pub code_lookup: bool,
    pub upload: bool,
    pub remove: bool,
    pub insert_player: bool,
    /// `get_sport` misses but the insert hits the key, as if another owner won the race.
    pub sport_conflict_on_insert: bool,
}

/// A stand-in for the hosted store and object storage that remembers every call.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub codes: Mutex<Vec<String>>,
    pub players: Mutex<Vec<PlayerRecord>>,
    pub sports: Mutex<Vec<SportCategory>>,
    /// `(path, content_type, size)` of every uploaded object.
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    pub removed: Mutex<Vec<String>>,
    pub code_lookups: AtomicUsize,
    pub failures: Mutex<Failures>,
}

#[allow(dead_code)]
impl MemoryBackend {
    pub fn with_codes(codes: &[&str]) -> Self {
        let backend = Self::default();
        *backend.codes.lock().unwrap() = codes.iter().map(|c| c.to_string()).collect();
        backend
    }

    pub fn fail(&self, update: impl FnOnce(&mut Failures)) {
        update(&mut self.failures.lock().unwrap());
    }

    fn failures(&self) -> Failures {
        *self.failures.lock().unwrap()
    }

    pub fn players(&self) -> Vec<PlayerRecord> {
        self.players.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn sport_count(&self) -> usize {
        self.sports.lock().unwrap().len()
    }

    pub fn code_lookups(&self) -> usize {
        self.code_lookups.load(Ordering::SeqCst)
    }
}

impl TournamentCodeDatabase for MemoryBackend {
    async fn tournament_code_exists(&self, code: &str) -> Result<bool> {
        self.code_lookups.fetch_add(1, Ordering::SeqCst);
        if self.failures().code_lookup {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.codes.lock().unwrap().iter().any(|c| c == code))
    }
}

impl PlayerDatabase for MemoryBackend {
    async fn insert_player(&self, player: &PlayerRecord) -> Result<()> {
        if self.failures().insert_player {
            return Err(anyhow!("insert into users failed"));
        }
        self.players.lock().unwrap().push(player.clone());
        Ok(())
    }

    async fn get_all_players(&self) -> Result<Vec<PlayerRecord>> {
        Ok(self.players())
    }

    async fn get_player_cards(&self) -> Result<Vec<PlayerCard>> {
        Ok(self.players().into_iter().map(PlayerCard::from).collect())
    }
}

impl SportDatabase for MemoryBackend {
    async fn get_sport(&self, sports_name: &str) -> Result<Option<SportCategory>> {
        if self.failures().sport_conflict_on_insert {
            return Ok(None);
        }
        Ok(self
            .sports
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.sports_name == sports_name)
            .cloned())
    }

    async fn insert_sport(&self, sport: &SportCategory) -> Result<InsertResult> {
        let mut sports = self.sports.lock().unwrap();
        if sports.iter().any(|s| s.sports_name == sport.sports_name) {
            return Ok(InsertResult::AlreadyExists);
        }
        sports.push(sport.clone());
        Ok(InsertResult::Inserted)
    }

    async fn get_all_sports(&self) -> Result<Vec<SportCategory>> {
        Ok(self.sports.lock().unwrap().clone())
    }

    async fn delete_sport(&self, sports_name: &str) -> Result<bool> {
        let mut sports = self.sports.lock().unwrap();
        let before = sports.len();
        sports.retain(|s| s.sports_name != sports_name);
        Ok(sports.len() < before)
    }
}

impl ObjectStorage for MemoryBackend {
    async fn upload_object(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        if self.failures().upload {
            return Err(anyhow!("Failed to upload object {} with status code 413", path));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), content_type.to_string(), bytes.len()));
        Ok(path.to_string())
    }

    async fn remove_object(&self, path: &str) -> Result<()> {
        if self.failures().remove {
            return Err(anyhow!("Failed to remove object {}", path));
        }
        self.removed.lock().unwrap().push(path.to_string());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", PUBLIC_BASE, path)
    }
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[allow(dead_code)]
pub fn picture(name: &str) -> ImageUpload {
    ImageUpload::new(name, Some("image/png"), vec![0x89, 0x50, 0x4e, 0x47], None).unwrap()
}

/// A controller on the final step with the given details filled in.
#[allow(dead_code)]
pub fn filled_in(name: &str, mobile: &str, code: &str, image: Option<ImageUpload>) -> StepController {
    let mut controller = StepController::new();
    controller.set_field(DraftField::PlayerName, name);
    controller.advance();
    controller.set_field(DraftField::MobileNumber, mobile);
    controller.set_field(DraftField::TournamentCode, code);
    controller.advance();
    if let Some(image) = image {
        controller.attach_image(image);
    }
    controller
}
