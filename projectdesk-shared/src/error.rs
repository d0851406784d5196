/// Error taxonomy for the authorization and scoping core
///
/// Every operation in [`crate::service`] returns [`DomainResult`]. The lower
/// layers (membership registry, scoping engine, hierarchy manager, validation)
/// raise these typed failures and nothing inside the core catches them; the
/// outer request boundary maps each variant to a stable client-facing status.
///
/// # Variants
///
/// - `Validation`: client-fixable field errors, grouped by field name
/// - `NotFound`: resource absent *or* not visible to the principal
/// - `Forbidden`: resource visible, privileged action denied
/// - `DuplicateMember`, `UserNotFound`, `InvalidRole`: membership specifics
/// - `Database`: store failure, never caused by the client

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Result alias used throughout the core
pub type DomainResult<T> = Result<T, DomainError>;

/// Resource classes that can be reported as missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Project,
    Task,
    Comment,
    User,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Project => "project",
            Resource::Task => "task",
            Resource::Comment => "comment",
            Resource::User => "user",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a privileged action was refused
///
/// The reason strings are part of the client contract: a non-member and a
/// member with too little privilege must be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ForbiddenReason {
    /// Principal holds no membership in the project
    #[error("not a member of this project")]
    NotMember,

    /// Principal is a member but the role is too low
    #[error("insufficient role: project admin required")]
    InsufficientRole,

    /// Only the project owner may do this
    #[error("only the project owner can perform this action")]
    NotOwner,

    /// Only the comment author may do this
    #[error("only the comment author can perform this action")]
    NotAuthor,
}

impl ForbiddenReason {
    /// Machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            ForbiddenReason::NotMember => "not_a_member",
            ForbiddenReason::InsufficientRole => "insufficient_role",
            ForbiddenReason::NotOwner => "not_owner",
            ForbiddenReason::NotAuthor => "not_author",
        }
    }
}

/// Field name → human-readable messages, in the order they were raised
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single failing field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Appends every message of `other`, keeping per-field order
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when empty, otherwise a `Validation` error
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

/// Keeps the first failing rule of each field
impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

/// Typed failures of the core
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// Absent or not visible; the two cases are never distinguished
    #[error("{0} not found")]
    NotFound(Resource),

    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),

    #[error("user is already a member of this project")]
    DuplicateMember,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid role {0:?}: must be Admin or Member")]
    InvalidRole(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        DomainError::Validation(errors)
    }
}
