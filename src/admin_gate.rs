//! Shared-password gate in front of the content editor.
//!
//! This is a UI affordance, not a security boundary: anyone who can reach the
//! store can write to it. The password is only ever held as a SHA-256 digest.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use sha2::{Digest, Sha256};

use crate::app_response::AppResponse;
use crate::content_context::ContentContext;

pub const INCORRECT_PASSWORD_MESSAGE: &str = "Incorrect password. Please try again.";

/// Hex SHA-256 digest of a password, the form expected in the configuration.
pub fn password_digest_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    digest: Option<[u8; 32]>,
}

impl AdminGate {
    /// A gate that accepts the password whose hex digest is given.
    pub fn from_digest_hex(digest_hex: &str) -> Result<Self, AppResponse> {
        let bytes = hex::decode(digest_hex.trim())
            .map_err(|e| AppResponse::BadRequest(format!("Invalid admin password digest: {e}")))?;
        let digest: [u8; 32] = bytes.try_into().map_err(|_| {
            AppResponse::BadRequest("Admin password digest must be 32 bytes".to_string())
        })?;
        Ok(Self { digest: Some(digest) })
    }

    /// A gate that rejects every password.
    pub fn closed() -> Self {
        Self { digest: None }
    }

    pub fn is_closed(&self) -> bool {
        self.digest.is_none()
    }

    pub fn verify(&self, password: &str) -> bool {
        let Some(expected) = self.digest else {
            return false;
        };
        let actual = Sha256::digest(password.as_bytes());
        // Compare every byte regardless of where the first mismatch is.
        actual
            .iter()
            .zip(expected.iter())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
    }

    /// Checks the password and, on a match, marks the session as signed in.
    pub fn sign_in(&self, password: &str, session: &AdminSession) -> Result<(), AppResponse> {
        if password.is_empty() {
            return Err(AppResponse::ValidationError("Password is required".to_string()));
        }
        if !self.verify(password) {
            warn!("Rejected admin sign-in attempt");
            return Err(AppResponse::Unauthorized(INCORRECT_PASSWORD_MESSAGE.to_string()));
        }
        session.mark_signed_in();
        info!("Admin session signed in");
        Ok(())
    }
}

/// Session-scoped "signed in as admin" flag. It lives as long as the host's
/// session and is never persisted.
#[derive(Debug, Default)]
pub struct AdminSession {
    signed_in: AtomicBool,
}

impl AdminSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in.load(Ordering::Acquire)
    }

    pub fn sign_out(&self) {
        if self.signed_in.swap(false, Ordering::AcqRel) {
            info!("Admin session signed out");
        }
    }

    fn mark_signed_in(&self) {
        self.signed_in.store(true, Ordering::Release);
    }

    pub fn require_signed_in(&self) -> Result<(), AppResponse> {
        if self.is_signed_in() {
            Ok(())
        } else {
            Err(AppResponse::Unauthorized("Admin sign-in required".to_string()))
        }
    }
}

/// Editor access to a [`ContentContext`], only handed out to a signed-in
/// session.
#[derive(Debug)]
pub struct AdminEditor<'a> {
    context: &'a ContentContext,
}

impl<'a> AdminEditor<'a> {
    pub fn open(session: &AdminSession, context: &'a ContentContext) -> Result<Self, AppResponse> {
        session.require_signed_in()?;
        Ok(Self { context })
    }

    pub fn context(&self) -> &'a ContentContext {
        self.context
    }
}

impl std::ops::Deref for AdminEditor<'_> {
    type Target = ContentContext;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}
