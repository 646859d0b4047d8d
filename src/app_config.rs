//! Configuration for a site content instance.
//!
//! The host passes a JSON object to [`crate::create_site`]; every field except
//! `name` is optional.
//!
//! ```json
//! {
//!   "name": "site_content",
//!   "map_size_mb": 16,
//!   "admin_password_sha256": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
//!   "blob_root": "site_content_blobs",
//!   "public_base_url": "/uploads"
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

const DEFAULT_MAP_SIZE_MB: usize = 16;

fn default_map_size_mb() -> usize {
    DEFAULT_MAP_SIZE_MB
}

fn default_public_base_url() -> String {
    "/uploads".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base path of the store. The LMDB environment lives in `{name}.lmdb`.
    pub name: String,

    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Hex encoded SHA-256 digest of the shared admin password. Without it
    /// the admin gate stays closed.
    #[serde(default)]
    pub admin_password_sha256: Option<String>,

    /// Directory for uploaded blog images. Defaults to `{name}_blobs`.
    #[serde(default)]
    pub blob_root: Option<PathBuf>,

    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl StoreConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            map_size_mb: DEFAULT_MAP_SIZE_MB,
            admin_password_sha256: None,
            blob_root: None,
            public_base_url: default_public_base_url(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        let config: StoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppResponse> {
        if self.name.trim().is_empty() {
            return Err(AppResponse::BadRequest("Store name cannot be empty".to_string()));
        }
        if self.map_size_mb == 0 {
            return Err(AppResponse::BadRequest("map_size_mb must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn lmdb_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}.lmdb", self.name))
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.blob_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}_blobs", self.name)))
    }

    pub fn with_admin_password_sha256(mut self, digest_hex: impl Into<String>) -> Self {
        self.admin_password_sha256 = Some(digest_hex.into());
        self
    }

    pub fn with_blob_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.blob_root = Some(root.into());
        self
    }
}
