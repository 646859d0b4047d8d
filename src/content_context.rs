//! In-process view of the content document.
//!
//! A [`ContentContext`] holds the copy every reader and editor works from.
//! It is built explicitly around a shared [`ContentStore`]: [`ContentContext::open`]
//! fetches the document first and subscribes afterwards, so a push arriving
//! before the first write has landed cannot clobber the freshly fetched copy.
//!
//! Edits are optimistic. The edit is applied to the local copy first, then
//! the same edit is applied to the latest stored document inside one write
//! transaction, so a change committed elsewhere in the meantime (a visitor
//! comment, another editor) is kept. A failed save is reported in
//! [`MutationOutcome::saved`] and the local edit stays in place until the
//! next push from the store.
//!
//! Edits are serialized through a write gate. The gate is reentrant: a push
//! listener running on the editing thread may start another edit.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, warn};
use parking_lot::ReentrantMutex;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;
use crate::content_model::{item_id, ContentDocument, ItemKey, Section, ITEM_ID_FIELD};
use crate::content_store::{ContentStore, Subscription};
use crate::default_content::default_content;

/// Result of an accepted edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    /// Whether the store accepted the write. The local copy is updated either way.
    pub saved: bool,
    /// Id of the item an `add_item` call appended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

#[derive(Debug)]
struct ContextState {
    content: ContentDocument,
    is_loading: bool,
}

pub struct ContentContext {
    store: Arc<ContentStore>,
    state: Arc<RwLock<ContextState>>,
    write_gate: ReentrantMutex<()>,
    subscription: Mutex<Option<Subscription>>,
}

impl ContentContext {
    /// Creates a context showing the built-in default, still loading.
    pub fn new(store: Arc<ContentStore>) -> Self {
        Self {
            store,
            state: Arc::new(RwLock::new(ContextState {
                content: default_content(),
                is_loading: true,
            })),
            write_gate: ReentrantMutex::new(()),
            subscription: Mutex::new(None),
        }
    }

    /// Creates and initialises a context.
    pub fn open(store: Arc<ContentStore>) -> Self {
        let context = Self::new(store);
        context.init();
        context
    }

    /// Fetches the document, marks loading complete, then starts listening
    /// for pushes. Calling it again refetches and replaces the subscription.
    pub fn init(&self) {
        let document = self.store.fetch();
        {
            let mut state = write_state(&self.state);
            state.content = document;
            state.is_loading = false;
        }

        let state = Arc::downgrade(&self.state);
        let subscription = self.store.subscribe(move |pushed| {
            let Some(state) = state.upgrade() else {
                return;
            };
            write_state(&state).content = pushed.clone();
        });
        debug!("Content context listening as subscriber {}", subscription.id());
        *lock(&self.subscription) = Some(subscription);
    }

    /// Stops listening for pushes. The local copy is kept.
    pub fn teardown(&self) {
        if let Some(subscription) = lock(&self.subscription).take() {
            subscription.unsubscribe();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        lock(&self.subscription).is_some()
    }

    pub fn is_loading(&self) -> bool {
        read_state(&self.state).is_loading
    }

    pub fn content(&self) -> ContentDocument {
        read_state(&self.state).content.clone()
    }

    pub fn section(&self, section: Section) -> Option<JsonValue> {
        read_state(&self.state).content.section(section).cloned()
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    /// Shallow-merges `partial` into a section.
    pub fn update_section(&self, section: Section, partial: JsonValue) -> Result<MutationOutcome, AppResponse> {
        self.mutate(move |document| document.merge_section(section, partial.clone()))
            .map(|((), saved)| MutationOutcome { saved, item_id: None })
    }

    /// Shallow-merges `partial` into one item of a list section.
    pub fn update_item(&self, section: Section, key: &ItemKey, partial: JsonValue) -> Result<MutationOutcome, AppResponse> {
        let _gate = self.write_gate.lock();
        let key = self.stable_key(section, key);
        self.mutate(move |document| document.merge_item(section, &key, partial.clone()))
            .map(|((), saved)| MutationOutcome { saved, item_id: None })
    }

    /// Appends an item and reports its id.
    pub fn add_item(&self, section: Section, mut item: JsonValue) -> Result<MutationOutcome, AppResponse> {
        // Fix the id up front so the local and the stored copy agree on it.
        if let Some(fields) = item.as_object_mut() {
            let has_id = fields
                .get(ITEM_ID_FIELD)
                .and_then(JsonValue::as_str)
                .is_some_and(|id| !id.is_empty());
            if !has_id {
                fields.insert(
                    ITEM_ID_FIELD.to_string(),
                    JsonValue::String(uuid::Uuid::new_v4().to_string()),
                );
            }
        }
        self.mutate(move |document| document.push_item(section, item.clone()))
            .map(|(id, saved)| MutationOutcome { saved, item_id: Some(id) })
    }

    pub fn remove_item(&self, section: Section, key: &ItemKey) -> Result<MutationOutcome, AppResponse> {
        let _gate = self.write_gate.lock();
        let key = self.stable_key(section, key);
        self.mutate(move |document| document.remove_item(section, &key).map(|_| ()))
            .map(|((), saved)| MutationOutcome { saved, item_id: None })
    }

    /// Replaces everything with the built-in default and saves it.
    pub fn reset_all(&self) -> MutationOutcome {
        let _gate = self.write_gate.lock();
        let document = default_content();
        write_state(&self.state).content = document.clone();
        let saved = self.store.save(&document);
        if !saved {
            warn!("Reset applied locally but not saved");
        }
        MutationOutcome { saved, item_id: None }
    }

    /// Saves the local copy as it is.
    pub fn save_to_store(&self) -> bool {
        let _gate = self.write_gate.lock();
        let document = read_state(&self.state).content.clone();
        self.store.save(&document)
    }

    /// Positions shift when other items are removed; pin them to the item's id.
    fn stable_key(&self, section: Section, key: &ItemKey) -> ItemKey {
        match key {
            ItemKey::Index(index) => read_state(&self.state)
                .content
                .items(section)
                .get(*index)
                .and_then(item_id)
                .map(ItemKey::id)
                .unwrap_or_else(|| key.clone()),
            ItemKey::Id(_) => key.clone(),
        }
    }

    fn mutate<T, F>(&self, edit: F) -> Result<(T, bool), AppResponse>
    where
        F: Fn(&mut ContentDocument) -> Result<T, AppResponse>,
    {
        let _gate = self.write_gate.lock();

        // The state lock is released before saving: the store notifies this
        // context's own listener, which takes the same lock.
        let value = {
            let mut state = write_state(&self.state);
            let mut document = state.content.clone();
            let value = edit(&mut document)?;
            state.content = document;
            value
        };

        let saved = match self.store.modify(|document| edit(document).map(|_| ())) {
            Ok(()) => true,
            Err(e) => {
                warn!("Edit applied locally but not saved ({}); it stays until the next push", e);
                false
            }
        };
        Ok((value, saved))
    }
}

impl std::fmt::Debug for ContentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentContext")
            .field("is_loading", &self.is_loading())
            .field("is_subscribed", &self.is_subscribed())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read_state(state: &RwLock<ContextState>) -> RwLockReadGuard<'_, ContextState> {
    state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_state(state: &RwLock<ContextState>) -> RwLockWriteGuard<'_, ContextState> {
    state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
