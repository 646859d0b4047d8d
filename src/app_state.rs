//! Everything one site instance needs, wired together from a [`StoreConfig`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use log::info;

use crate::admin_gate::{AdminEditor, AdminGate, AdminSession};
use crate::app_config::StoreConfig;
use crate::app_response::AppResponse;
use crate::blob_store::BlobStore;
use crate::comment_form::{CommentDraft, CommentForm};
use crate::content_context::ContentContext;
use crate::content_model::{Comment, ContentDocument};
use crate::content_store::{ContentStore, Subscription};
use crate::site_view::SiteView;

pub struct AppState {
    config: StoreConfig,
    store: Arc<ContentStore>,
    context: ContentContext,
    gate: AdminGate,
    session: AdminSession,
    blobs: BlobStore,
    host_subscriptions: Mutex<HashMap<u64, Subscription>>,
}

impl AppState {
    pub fn init(config: StoreConfig) -> Result<Self, AppResponse> {
        let store = Arc::new(ContentStore::init(&config)?);
        let gate = match config.admin_password_sha256.as_deref() {
            Some(digest) => AdminGate::from_digest_hex(digest)?,
            None => AdminGate::closed(),
        };
        let blobs = BlobStore::new(config.blob_dir(), config.public_base_url.clone());
        let context = ContentContext::open(Arc::clone(&store));

        info!("Site '{}' ready", config.name);
        Ok(Self {
            config,
            store,
            context,
            gate,
            session: AdminSession::new(),
            blobs,
            host_subscriptions: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    pub fn context(&self) -> &ContentContext {
        &self.context
    }

    pub fn session(&self) -> &AdminSession {
        &self.session
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn content(&self) -> ContentDocument {
        self.context.content()
    }

    pub fn view(&self) -> SiteView {
        SiteView::from_document(&self.context.content())
    }

    pub fn sign_in(&self, password: &str) -> Result<(), AppResponse> {
        self.gate.sign_in(password, &self.session)
    }

    pub fn sign_out(&self) {
        self.session.sign_out();
    }

    /// Editor access; fails unless the admin session is signed in.
    pub fn editor(&self) -> Result<AdminEditor<'_>, AppResponse> {
        AdminEditor::open(&self.session, &self.context)
    }

    pub fn submit_comment(&self, post_id: &str, draft: CommentDraft) -> Result<Comment, AppResponse> {
        let mut form = CommentForm::new(post_id);
        form.draft = draft;
        form.submit(&self.store, Instant::now(), chrono::Utc::now().timestamp_millis())
    }

    /// Keeps a store subscription alive on behalf of the host until
    /// [`AppState::remove_host_subscription`] is called with its id.
    pub fn add_host_subscription(&self, subscription: Subscription) -> u64 {
        let id = subscription.id();
        self.lock_subscriptions().insert(id, subscription);
        id
    }

    pub fn remove_host_subscription(&self, id: u64) -> bool {
        match self.lock_subscriptions().remove(&id) {
            Some(subscription) => subscription.unsubscribe(),
            None => false,
        }
    }

    fn lock_subscriptions(&self) -> std::sync::MutexGuard<'_, HashMap<u64, Subscription>> {
        self.host_subscriptions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("name", &self.config.name)
            .field("signed_in", &self.session.is_signed_in())
            .finish()
    }
}
