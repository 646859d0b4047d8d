//! LMDB-backed store for the content document.
//!
//! [`ContentStore`] is the only component that touches the database. It keeps
//! one record under a fixed key and hands out [`Subscription`]s that receive
//! the full document after every committed write.
//!
//! Whole-document saves are last-writer-wins. Comment appends and
//! [`ContentStore::modify`] run their read, edit and write inside one LMDB
//! write transaction, and LMDB admits a single writer at a time (across
//! processes too), so concurrent edits are serialized instead of overwriting
//! each other.
//!
//! # Push ordering
//!
//! Every committed write takes the next value of an in-process sequence
//! while its write transaction is still open, so sequence order is commit
//! order. Pushes are delivered under one delivery lock and each listener
//! only ever sees increasing sequences: a push older than one it already
//! received is skipped. The lock is reentrant, so a listener may write to
//! the store from inside its callback; the nested push is delivered before
//! the callback returns.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};
use parking_lot::ReentrantMutex;

use crate::app_config::StoreConfig;
use crate::app_response::AppResponse;
use crate::content_model::{Comment, ContentDocument, StoredContent, CONTENT_DOCUMENT_ID};
use crate::default_content::default_content;

const CONTENT_DB_NAME: &str = "content";

/// One delivery to a listener: the document after a committed write.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPush {
    /// Position of the write in commit order, local to this store handle.
    pub sequence: u64,
    pub document: ContentDocument,
}

pub type PushListener = Arc<dyn Fn(&ContentPush) + Send + Sync>;

struct ListenerEntry {
    id: u64,
    /// Highest sequence delivered plus one; 0 before the first delivery.
    delivered: AtomicU64,
    callback: PushListener,
}

impl ListenerEntry {
    /// Must be called with the store's delivery lock held.
    fn deliver(&self, push: &ContentPush) {
        let next = push.sequence + 1;
        if self.delivered.fetch_max(next, Ordering::AcqRel) >= next {
            debug!("Skipping stale push {} for listener {}", push.sequence, self.id);
            return;
        }
        (self.callback)(push);
    }
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<Arc<ListenerEntry>>>,
}

impl ListenerRegistry {
    fn add(&self, callback: PushListener) -> Arc<ListenerEntry> {
        let entry = Arc::new(ListenerEntry {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            delivered: AtomicU64::new(0),
            callback,
        });
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push(Arc::clone(&entry)),
            Err(poisoned) => poisoned.into_inner().push(Arc::clone(&entry)),
        }
        entry
    }

    fn remove(&self, id: u64) -> bool {
        let mut listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        listeners.len() != before
    }

    fn snapshot(&self) -> Vec<Arc<ListenerEntry>> {
        let listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        listeners.clone()
    }

    fn len(&self) -> usize {
        self.snapshot().len()
    }
}

/// Handle returned by [`ContentStore::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stops delivery. Returns false if the store is already gone.
    pub fn unsubscribe(self) -> bool {
        self.detach()
    }

    fn detach(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.remove(self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

pub struct ContentStore {
    env: Environment,
    db: Database,
    listeners: Arc<ListenerRegistry>,
    sequence: AtomicU64,
    delivery: ReentrantMutex<()>,
}

impl ContentStore {
    pub fn init(config: &StoreConfig) -> Result<Self, AppResponse> {
        config.validate()?;
        let dir = config.lmdb_dir();
        Self::open_at(&dir, config.map_size_bytes())
    }

    pub fn open_at(dir: &Path, map_size: usize) -> Result<Self, AppResponse> {
        std::fs::create_dir_all(dir)?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(dir)?;
        let db = env.create_db(Some(CONTENT_DB_NAME), DatabaseFlags::empty())?;

        info!("Content store opened at {}", dir.display());
        Ok(Self {
            env,
            db,
            listeners: Arc::new(ListenerRegistry::default()),
            sequence: AtomicU64::new(0),
            delivery: ReentrantMutex::new(()),
        })
    }

    /// Reads the stored record, `None` when no document has been written yet.
    pub fn load(&self) -> Result<Option<StoredContent>, AppResponse> {
        let txn = self.env.begin_ro_txn()?;
        let record = self.read_record(&txn)?;
        txn.commit()?;
        Ok(record)
    }

    /// Current revision, 0 when the document is absent.
    pub fn revision(&self) -> Result<u64, AppResponse> {
        Ok(self.load()?.map(|record| record.revision).unwrap_or(0))
    }

    /// Returns the stored document.
    ///
    /// An absent document is initialised with the built-in default, which is
    /// then returned. A document stored with list items lacking an `id` gets
    /// ids assigned and written back, so they stay the same on every later
    /// read. Read or decode failures are logged and answered with the
    /// built-in default; they never reach the caller.
    pub fn fetch(&self) -> ContentDocument {
        match self.load() {
            Ok(Some(record)) => {
                let mut document = record.data.clone();
                let assigned = document.normalize_item_ids();
                if assigned == 0 {
                    return document;
                }
                info!("Writing back {} missing item ids", assigned);
                // Re-saving the unchanged record lets the write assign the ids.
                let written = self.write(|current| {
                    Ok(current
                        .filter(|current| current.revision == record.revision)
                        .map(|current| current.data.clone()))
                });
                match written {
                    Ok(Some(stored)) => stored.data,
                    // Changed underneath us; that write assigned ids too.
                    Ok(None) => match self.load() {
                        Ok(Some(latest)) => latest.data,
                        _ => document,
                    },
                    Err(e) => {
                        warn!("Could not write back item ids: {}", e);
                        document
                    }
                }
            }
            Ok(None) => {
                info!("No content document stored yet; writing built-in default");
                let document = default_content();
                match self.write(|current| Ok(current.is_none().then(|| document.clone()))) {
                    Ok(Some(stored)) => stored.data,
                    // Another writer initialised the store first.
                    Ok(None) => match self.load() {
                        Ok(Some(record)) => record.data,
                        _ => document,
                    },
                    Err(e) => {
                        warn!("Could not write default content: {}", e);
                        document
                    }
                }
            }
            Err(e) => {
                warn!("Error fetching content, using built-in default: {}", e);
                default_content()
            }
        }
    }

    /// Overwrites the whole document. Failures are logged and reported as
    /// `false`; nothing is retried.
    pub fn save(&self, document: &ContentDocument) -> bool {
        match self.write(|_| Ok(Some(document.clone()))) {
            Ok(_) => true,
            Err(e) => {
                warn!("Error saving content: {}", e);
                false
            }
        }
    }

    /// Overwrites the document only if the stored revision still equals
    /// `expected_revision` (0 meaning "absent"). Returns the new revision.
    pub fn save_if_revision(&self, document: &ContentDocument, expected_revision: u64) -> Result<u64, AppResponse> {
        let record = self.write(|current| {
            let current_revision = current.map(|record| record.revision).unwrap_or(0);
            if current_revision != expected_revision {
                return Err(AppResponse::Conflict(format!(
                    "Content changed: expected revision {expected_revision}, found {current_revision}"
                )));
            }
            Ok(Some(document.clone()))
        })?;
        Ok(record.map(|record| record.revision).unwrap_or(expected_revision))
    }

    /// Applies `edit` to the latest stored document inside one write
    /// transaction. An absent document is edited starting from the built-in
    /// default. Nothing is written when `edit` fails.
    pub fn modify<T, F>(&self, edit: F) -> Result<T, AppResponse>
    where
        F: FnOnce(&mut ContentDocument) -> Result<T, AppResponse>,
    {
        let mut output = None;
        self.write(|current| {
            let mut document = current
                .map(|record| record.data.clone())
                .unwrap_or_else(default_content);
            output = Some(edit(&mut document)?);
            Ok(Some(document))
        })?;
        output.ok_or_else(|| AppResponse::DatabaseError("Edit was not applied".to_string()))
    }

    /// Atomically appends a comment to the blog post with id `post_id`.
    ///
    /// Returns `false` when the document or the post does not exist, or when
    /// the write fails. Nothing is written in those cases.
    pub fn append_comment(&self, post_id: &str, comment: &Comment) -> bool {
        let result = self.write(|current| {
            let Some(record) = current else {
                return Ok(None);
            };
            let mut document = record.data.clone();
            if document.append_comment(post_id, comment)? {
                Ok(Some(document))
            } else {
                Ok(None)
            }
        });

        match result {
            Ok(Some(_)) => {
                info!("Comment added to blog post {}", post_id);
                true
            }
            Ok(None) => {
                warn!("Blog post {} not found; comment discarded", post_id);
                false
            }
            Err(e) => {
                warn!("Error adding comment: {}", e);
                false
            }
        }
    }

    /// Deletes the stored document. Subscribers then see the built-in default.
    pub fn delete_document(&self) -> Result<bool, AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        let deleted = match txn.del(self.db, &CONTENT_DOCUMENT_ID, None) {
            Ok(()) => true,
            Err(lmdb::Error::NotFound) => false,
            Err(e) => return Err(AppResponse::from(e)),
        };
        if !deleted {
            txn.abort();
            return Ok(false);
        }
        let sequence = self.next_sequence();
        txn.commit()?;

        info!("Content document deleted");
        self.publish(&ContentPush {
            sequence,
            document: default_content(),
        });
        Ok(true)
    }

    /// Registers a live listener.
    ///
    /// The listener is called right away with the current document and then
    /// after every committed change, own writes included. While no document
    /// is stored it receives the built-in default.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ContentDocument) + Send + Sync + 'static,
    {
        self.subscribe_pushes(move |push| listener(&push.document))
    }

    /// Like [`ContentStore::subscribe`], with the commit sequence of each push.
    pub fn subscribe_pushes<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ContentPush) + Send + Sync + 'static,
    {
        // Holding the delivery lock keeps any concurrent push waiting until
        // the first delivery is done, so it cannot overtake it.
        let _delivery = self.delivery.lock();
        let entry = self.listeners.add(Arc::new(listener));
        debug!("Content listener {} subscribed", entry.id);

        let current = match self.snapshot() {
            Ok(push) => push,
            Err(e) => {
                warn!("Error reading content for new subscriber: {}", e);
                ContentPush {
                    sequence: self.sequence.load(Ordering::Acquire),
                    document: default_content(),
                }
            }
        };
        entry.deliver(&current);

        Subscription {
            id: entry.id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Current document and sequence, read inside a write transaction so no
    /// commit can fall between the two.
    fn snapshot(&self) -> Result<ContentPush, AppResponse> {
        let txn = self.env.begin_rw_txn()?;
        let record = self.read_record(&txn)?;
        let sequence = self.sequence.load(Ordering::Acquire);
        txn.abort();
        Ok(ContentPush {
            sequence,
            document: record.map(|record| record.data).unwrap_or_else(default_content),
        })
    }

    /// Runs `edit` against the current record inside one write transaction.
    ///
    /// `edit` returns the new document, or `None` to leave the store
    /// untouched. Items without an id get one before the document is
    /// written. On commit the revision is bumped and listeners are notified
    /// after the transaction is closed.
    fn write<F>(&self, edit: F) -> Result<Option<StoredContent>, AppResponse>
    where
        F: FnOnce(Option<&StoredContent>) -> Result<Option<ContentDocument>, AppResponse>,
    {
        let mut txn = self.env.begin_rw_txn()?;
        let current = self.read_record(&txn)?;

        let Some(mut document) = edit(current.as_ref())? else {
            txn.abort();
            return Ok(None);
        };
        document.normalize_item_ids();

        let record = StoredContent {
            id: CONTENT_DOCUMENT_ID.to_string(),
            revision: current.map(|record| record.revision).unwrap_or(0) + 1,
            data: document,
        };
        let bytes = serde_json::to_vec(&record)?;
        txn.put(self.db, &CONTENT_DOCUMENT_ID, &bytes, WriteFlags::empty())?;
        let sequence = self.next_sequence();
        txn.commit()?;

        debug!("Content saved at revision {} (push {})", record.revision, sequence);
        self.publish(&ContentPush {
            sequence,
            document: record.data.clone(),
        });
        Ok(Some(record))
    }

    /// Only called while a write transaction is open.
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn publish(&self, push: &ContentPush) {
        // The registry lock is not held while callbacks run, so a listener
        // may subscribe or unsubscribe from inside its callback.
        let _delivery = self.delivery.lock();
        for entry in self.listeners.snapshot() {
            entry.deliver(push);
        }
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, bytes: &[u8]) -> Result<(), AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &CONTENT_DOCUMENT_ID, &bytes, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn read_record<T: Transaction>(&self, txn: &T) -> Result<Option<StoredContent>, AppResponse> {
        match txn.get(self.db, &CONTENT_DOCUMENT_ID) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(AppResponse::from(e)),
        }
    }
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("subscribers", &self.listeners.len())
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish()
    }
}
