//! Blog comment submission.
//!
//! [`CommentDraft::validate`] is the gate in front of
//! [`ContentStore::append_comment`]; [`CommentForm`] adds the form behaviour
//! around it: keep the draft on failure, clear it on success and show a
//! success notice for a few seconds.

use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::content_model::Comment;
use crate::content_store::ContentStore;

pub const MIN_TEXT_CHARS: usize = 10;

/// Shown next to the text box; not enforced.
pub const MAX_TEXT_CHARS_HINT: usize = 500;

pub const DEFAULT_RATING: u8 = 5;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// How long the success notice stays up after a submission.
pub const SUCCESS_NOTICE: Duration = Duration::from_secs(4);

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit comment. Please try again.";

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email shape regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentValidationError {
    NameRequired,
    EmailRequired,
    EmailInvalid,
    TextRequired,
    TextTooShort,
    RatingOutOfRange,
}

impl Display for CommentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommentValidationError::NameRequired => write!(f, "Name is required"),
            CommentValidationError::EmailRequired => write!(f, "Email is required"),
            CommentValidationError::EmailInvalid => write!(f, "Please enter a valid email"),
            CommentValidationError::TextRequired => write!(f, "Comment cannot be empty"),
            CommentValidationError::TextTooShort => {
                write!(f, "Comment must be at least {} characters", MIN_TEXT_CHARS)
            }
            CommentValidationError::RatingOutOfRange => {
                write!(f, "Rating must be between {} and {}", MIN_RATING, MAX_RATING)
            }
        }
    }
}

impl std::error::Error for CommentValidationError {}

impl From<CommentValidationError> for AppResponse {
    fn from(err: CommentValidationError) -> Self {
        AppResponse::ValidationError(err.to_string())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// What the reader has typed so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentDraft {
    pub name: String,
    pub email: String,
    pub rating: u8,
    pub text: String,
}

impl Default for CommentDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            rating: DEFAULT_RATING,
            text: String::new(),
        }
    }
}

impl CommentDraft {
    /// Checks the draft and builds the comment to store, with trimmed fields
    /// and `timestamp` as its creation instant.
    pub fn validate(&self, timestamp: i64) -> Result<Comment, CommentValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CommentValidationError::NameRequired);
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(CommentValidationError::EmailRequired);
        }
        if !is_valid_email(email) {
            return Err(CommentValidationError::EmailInvalid);
        }

        let text = self.text.trim();
        if text.is_empty() {
            return Err(CommentValidationError::TextRequired);
        }
        if text.chars().count() < MIN_TEXT_CHARS {
            return Err(CommentValidationError::TextTooShort);
        }

        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(CommentValidationError::RatingOutOfRange);
        }

        Ok(Comment {
            name: name.to_string(),
            email: email.to_string(),
            rating: self.rating,
            text: text.to_string(),
            timestamp,
        })
    }

    /// Character counter shown under the text box, e.g. `"42/500 characters"`.
    pub fn length_hint(&self) -> String {
        format!("{}/{} characters", self.text.chars().count(), MAX_TEXT_CHARS_HINT)
    }
}

/// Comment form attached to one blog post.
#[derive(Debug, Clone)]
pub struct CommentForm {
    post_id: String,
    pub draft: CommentDraft,
    error: Option<String>,
    success_until: Option<Instant>,
}

impl CommentForm {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            draft: CommentDraft::default(),
            error: None,
            success_until: None,
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success_visible(&self, now: Instant) -> bool {
        self.success_until.is_some_and(|until| now < until)
    }

    /// Validates the draft and appends it to the post, stamped with
    /// `timestamp` (milliseconds since the Unix epoch, UTC).
    ///
    /// On success the draft is reset and the success notice is shown until
    /// `now + SUCCESS_NOTICE`; subscribers of the store receive the updated
    /// document. On failure the draft is kept and [`CommentForm::error`]
    /// holds the message to show.
    pub fn submit(&mut self, store: &ContentStore, now: Instant, timestamp: i64) -> Result<Comment, AppResponse> {
        self.error = None;
        self.success_until = None;

        let comment = match self.draft.validate(timestamp) {
            Ok(comment) => comment,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        if !store.append_comment(&self.post_id, &comment) {
            warn!("Comment for post {} was not stored", self.post_id);
            self.error = Some(SUBMIT_FAILED_MESSAGE.to_string());
            return Err(AppResponse::DatabaseError(SUBMIT_FAILED_MESSAGE.to_string()));
        }

        info!("Comment by {} submitted on post {}", comment.name, self.post_id);
        self.draft = CommentDraft::default();
        self.success_until = Some(now + SUCCESS_NOTICE);
        Ok(comment)
    }
}
