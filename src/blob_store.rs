//! Storage for blog post images.
//!
//! Files land under `{root}/blog/{post_id}/{timestamp}_{file_name}` and are
//! served from `{public_base_url}/blog/{post_id}/{timestamp}_{file_name}`.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// Durable reference, relative to the blob root.
    pub storage_path: String,
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores an image for a blog post, reporting whole-percent progress.
    ///
    /// Failures are logged and reported as `None`.
    pub fn upload_blog_image(
        &self,
        post_id: &str,
        file_name: &str,
        bytes: &[u8],
        on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Option<UploadedImage> {
        let timestamp = chrono::Utc::now().timestamp_millis();
        match self.write_blog_image(post_id, file_name, bytes, timestamp, on_progress) {
            Ok(uploaded) => {
                info!("Uploaded blog image {}", uploaded.storage_path);
                Some(uploaded)
            }
            Err(e) => {
                warn!("Error uploading blog image: {}", e);
                None
            }
        }
    }

    fn write_blog_image(
        &self,
        post_id: &str,
        file_name: &str,
        bytes: &[u8],
        timestamp: i64,
        mut on_progress: Option<&mut dyn FnMut(u8)>,
    ) -> Result<UploadedImage, AppResponse> {
        let post_id = path_component(post_id)
            .ok_or_else(|| AppResponse::BadRequest("Blog post id is not a valid path component".to_string()))?;
        let file_name = path_component(file_name)
            .ok_or_else(|| AppResponse::BadRequest("File name is empty".to_string()))?;

        let storage_path = format!("blog/{post_id}/{timestamp}_{file_name}");
        let target = self.root.join(&storage_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(&target)?;
        let total = bytes.len();
        let mut written = 0usize;
        for chunk in bytes.chunks(CHUNK_SIZE) {
            file.write_all(chunk)?;
            written += chunk.len();
            if let Some(report) = on_progress.as_deref_mut() {
                report(percent(written, total));
            }
        }
        file.sync_all()?;

        if total == 0 {
            if let Some(report) = on_progress.as_deref_mut() {
                report(100);
            }
        }

        Ok(UploadedImage {
            public_url: format!("{}/{}", self.public_base_url, storage_path),
            storage_path,
        })
    }
}

/// Last path segment of `name`, `None` if nothing usable is left.
fn path_component(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        None
    } else {
        Some(last.to_string())
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}
