use super::{DraftEdit, RegistrationDraft};

/// A named text field of the registration draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    PlayerName,
    MobileNumber,
    TournamentCode,
}

/// How a field should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Phone,
}

impl DraftField {
    pub fn label(self) -> &'static str {
        match self {
            DraftField::PlayerName => "Player Name",
            DraftField::MobileNumber => "Mobile Number",
            DraftField::TournamentCode => "Tournament Code",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            DraftField::PlayerName => "The name you play under",
            DraftField::MobileNumber => "e.g. 9990001111",
            DraftField::TournamentCode => "The code you got from the organiser",
        }
    }

    pub fn kind(self) -> InputKind {
        match self {
            DraftField::MobileNumber => InputKind::Phone,
            _ => InputKind::Text,
        }
    }
}

/// Everything a renderer needs to draw one input: label, field, and current value.
///
/// The renderer holds no state of its own; whatever the user types goes back through
/// [`FieldInput::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInput {
    pub field: DraftField,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: InputKind,
    pub value: String,
}

impl FieldInput {
    pub fn new(field: DraftField, draft: &RegistrationDraft) -> Self {
        Self {
            field,
            label: field.label(),
            placeholder: field.placeholder(),
            kind: field.kind(),
            value: draft.get(field).to_string(),
        }
    }

    /// Turns a value typed into this input into an edit for the draft.
    pub fn edit(&self, value: impl Into<String>) -> DraftEdit {
        DraftEdit::SetField(self.field, value.into())
    }
}
