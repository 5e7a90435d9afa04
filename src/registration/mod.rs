//! The player registration wizard.
//!
//! A registration goes through three input steps (name, contact details, picture) before it is
//! submitted. [`StepController`] tracks which step the player is on and what they have typed so
//! far; [`SubmissionCoordinator`] turns a finished draft into a stored player.

use std::fmt::Display;

use tracing::info;

use crate::{
    database::{models::PlayerRecord, PlayerDatabase, TournamentCodeDatabase},
    error::{SubmissionError, ValidationError},
    storage::ObjectStorage,
};

pub use self::{
    coordinator::{object_path, SubmissionCoordinator},
    fields::{DraftField, FieldInput, InputKind},
};

mod coordinator;
mod fields;

/// A picture picked by the player, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// Where the picture can be previewed before it is uploaded.
    pub preview_url: Option<String>,
}

impl ImageUpload {
    /// Accepts the file only if its MIME type is an image type.
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
        preview_url: Option<String>,
    ) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        let content_type = match content_type {
            Some(content_type) if content_type.starts_with("image/") => content_type.to_string(),
            _ => return Err(ValidationError::NotAnImage(file_name)),
        };

        Ok(Self {
            file_name,
            content_type,
            bytes,
            preview_url,
        })
    }
}

/// The not-yet-persisted registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub player_name: String,
    pub mobile_number: String,
    pub tournament_code: String,
    pub image: Option<ImageUpload>,
}

impl RegistrationDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::PlayerName => &self.player_name,
            DraftField::MobileNumber => &self.mobile_number,
            DraftField::TournamentCode => &self.tournament_code,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let slot = match field {
            DraftField::PlayerName => &mut self.player_name,
            DraftField::MobileNumber => &mut self.mobile_number,
            DraftField::TournamentCode => &mut self.tournament_code,
        };
        *slot = value.into();
    }

    /// Fields of the given step that are still empty.
    pub fn missing_fields(&self, step: Step) -> Vec<DraftField> {
        step.fields()
            .iter()
            .copied()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }

    /// Applies a single edit, leaving every other field as it was.
    pub fn apply(&mut self, edit: DraftEdit) {
        match edit {
            DraftEdit::SetField(field, value) => self.set(field, value),
            DraftEdit::AttachImage(image) => self.image = Some(image),
            DraftEdit::RemoveImage => self.image = None,
        }
    }
}

/// A single change to a [`RegistrationDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    SetField(DraftField, String),
    AttachImage(ImageUpload),
    RemoveImage,
}

/// Where the player currently is in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    PlayerName,
    Contact,
    Picture,
    Submitted,
}

impl Step {
    /// 1-based position of the step; `None` once submitted.
    pub fn number(self) -> Option<u8> {
        match self {
            Step::PlayerName => Some(1),
            Step::Contact => Some(2),
            Step::Picture => Some(3),
            Step::Submitted => None,
        }
    }

    /// The text fields that are filled in on this step.
    pub fn fields(self) -> &'static [DraftField] {
        match self {
            Step::PlayerName => &[DraftField::PlayerName],
            Step::Contact => &[DraftField::MobileNumber, DraftField::TournamentCode],
            Step::Picture | Step::Submitted => &[],
        }
    }

    fn next(self) -> Self {
        match self {
            Step::PlayerName => Step::Contact,
            Step::Contact | Step::Picture => Step::Picture,
            Step::Submitted => Step::Submitted,
        }
    }

    fn previous(self) -> Self {
        match self {
            Step::PlayerName | Step::Contact => Step::PlayerName,
            Step::Picture => Step::Contact,
            Step::Submitted => Step::Submitted,
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::PlayerName => write!(f, "Level 1: Who are you?"),
            Step::Contact => write!(f, "Level 2: Contact and tournament code"),
            Step::Picture => write!(f, "Level 3: Your gamer pic"),
            Step::Submitted => write!(f, "Registration Complete!"),
        }
    }
}

/// Holds the wizard's current step and the draft typed so far.
///
/// No field is validated here; the controller only moves between steps and applies edits.
/// Nothing is persisted until [`StepController::submit`] is called on the final step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepController {
    step: Step,
    draft: RegistrationDraft,
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}

impl StepController {
    pub fn new() -> Self {
        Self {
            step: Step::PlayerName,
            draft: RegistrationDraft::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn is_submitted(&self) -> bool {
        self.step == Step::Submitted
    }

    /// Moves to the next step. Stays put on the last input step.
    pub fn advance(&mut self) -> Step {
        self.step = self.step.next();
        self.step
    }

    /// Moves to the previous step. Stays put on the first step.
    pub fn retreat(&mut self) -> Step {
        self.step = self.step.previous();
        self.step
    }

    /// Applies an edit to the draft. Ignored once the registration is submitted.
    pub fn apply(&mut self, edit: DraftEdit) {
        if self.is_submitted() {
            return;
        }
        self.draft.apply(edit);
    }

    pub fn set_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.apply(DraftEdit::SetField(field, value.into()));
    }

    pub fn attach_image(&mut self, image: ImageUpload) {
        self.apply(DraftEdit::AttachImage(image));
    }

    pub fn remove_image(&mut self) {
        self.apply(DraftEdit::RemoveImage);
    }

    /// The inputs to render for the current step.
    pub fn inputs(&self) -> Vec<FieldInput> {
        self.step
            .fields()
            .iter()
            .map(|field| FieldInput::new(*field, &self.draft))
            .collect()
    }

    /// Submits the draft and moves to [`Step::Submitted`] if every phase succeeds.
    ///
    /// On failure the step and the draft are left untouched so the player can try again.
    pub async fn submit<DB, S>(
        &mut self,
        coordinator: &SubmissionCoordinator<'_, DB, S>,
    ) -> Result<PlayerRecord, SubmissionError>
    where
        DB: TournamentCodeDatabase + PlayerDatabase,
        S: ObjectStorage,
    {
        if self.step != Step::Picture {
            return Err(ValidationError::NotAtFinalStep.into());
        }

        let record = coordinator.submit(&self.draft).await?;
        info!("Player {} completed registration", record.name);
        self.step = Step::Submitted;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> ImageUpload {
        ImageUpload::new(name, Some("image/png"), vec![1, 2, 3], None).unwrap()
    }

    #[test]
    fn advance_stops_at_the_picture_step() {
        let mut controller = StepController::new();

        assert_eq!(controller.advance(), Step::Contact);
        assert_eq!(controller.advance(), Step::Picture);
        assert_eq!(controller.advance(), Step::Picture);
        assert_eq!(controller.step().number(), Some(3));
    }

    #[test]
    fn retreat_stops_at_the_first_step() {
        let mut controller = StepController::new();

        assert_eq!(controller.retreat(), Step::PlayerName);

        controller.advance();
        controller.advance();
        assert_eq!(controller.retreat(), Step::Contact);
        assert_eq!(controller.retreat(), Step::PlayerName);
        assert_eq!(controller.retreat(), Step::PlayerName);
    }

    #[test]
    fn edits_only_touch_the_named_field() {
        let mut controller = StepController::new();
        controller.apply(DraftEdit::SetField(DraftField::PlayerName, "Asha".into()));
        controller.apply(DraftEdit::SetField(DraftField::MobileNumber, "9990001111".into()));
        controller.apply(DraftEdit::SetField(DraftField::PlayerName, "Asha K".into()));

        let draft = controller.draft();
        assert_eq!(draft.player_name, "Asha K");
        assert_eq!(draft.mobile_number, "9990001111");
        assert_eq!(draft.tournament_code, "");
    }

    #[test]
    fn any_string_is_accepted() {
        let mut draft = RegistrationDraft::default();
        draft.apply(DraftEdit::SetField(DraftField::MobileNumber, "not a number".into()));
        assert_eq!(draft.mobile_number, "not a number");
    }

    #[test]
    fn images_can_be_attached_and_removed() {
        let mut controller = StepController::new();
        controller.attach_image(png("me.png"));
        assert_eq!(
            controller.draft().image.as_ref().map(|i| i.file_name.as_str()),
            Some("me.png")
        );

        controller.remove_image();
        assert!(controller.draft().image.is_none());
    }

    #[test]
    fn only_image_mime_types_are_accepted() {
        assert!(ImageUpload::new("me.jpg", Some("image/jpeg"), vec![], None).is_ok());
        assert_eq!(
            ImageUpload::new("notes.pdf", Some("application/pdf"), vec![], None),
            Err(ValidationError::NotAnImage("notes.pdf".to_string()))
        );
        assert!(ImageUpload::new("mystery", None, vec![], None).is_err());
    }

    #[test]
    fn inputs_follow_the_current_step() {
        let mut controller = StepController::new();
        let fields: Vec<_> = controller.inputs().iter().map(|i| i.field).collect();
        assert_eq!(fields, vec![DraftField::PlayerName]);

        controller.advance();
        let fields: Vec<_> = controller.inputs().iter().map(|i| i.field).collect();
        assert_eq!(fields, vec![DraftField::MobileNumber, DraftField::TournamentCode]);

        controller.advance();
        assert!(controller.inputs().is_empty());
    }

    #[test]
    fn missing_fields_ignore_whitespace_only_values() {
        let mut draft = RegistrationDraft::default();
        draft.set(DraftField::MobileNumber, "   ");
        draft.set(DraftField::TournamentCode, "VALID1");

        assert_eq!(draft.missing_fields(Step::Contact), vec![DraftField::MobileNumber]);
        assert!(draft.missing_fields(Step::Picture).is_empty());
    }
}
