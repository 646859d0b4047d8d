//! # Test Suite for Site Content Core
//!
//! ## Test Categories
//!
//! 1. **Content model**: section/item edits on a bare document
//! 2. **Content store**: fetch fallback, saves, revisions, live pushes, comment appends
//! 3. **Content context**: optimistic edits, serialization, reset, teardown
//! 4. **Comment flow**: validation rules and the submit form
//! 5. **Admin gate**: password digest, session flag, editor guard, routes
//! 6. **Blob storage**: upload paths and progress
//! 7. **Site views**: lenient section views and the reviews carousel
//! 8. **FFI**: the C surface end to end
//!
//! Every test opens its own LMDB environment in a temporary directory.
//!
//! ```bash
//! cargo test
//! cargo test test_store_     # store tests
//! cargo test test_ffi_       # FFI tests
//! ```

#[cfg(test)]
pub mod tests {
    use std::ffi::{CStr, CString};
    use std::os::raw::c_char;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    use serde_json::{json, Value as JsonValue};
    use tempfile::TempDir;

    use crate::admin_gate::{password_digest_hex, AdminEditor, AdminGate, AdminSession, INCORRECT_PASSWORD_MESSAGE};
    use crate::app_config::StoreConfig;
    use crate::app_response::AppResponse;
    use crate::app_state::AppState;
    use crate::blob_store::BlobStore;
    use crate::comment_form::{CommentDraft, CommentForm, CommentValidationError, SUBMIT_FAILED_MESSAGE};
    use crate::content_context::ContentContext;
    use crate::content_model::{item_id, Comment, ContentDocument, ItemKey, Section};
    use crate::content_store::ContentStore;
    use crate::default_content::default_content;
    use crate::site_view::{ReviewCarousel, Route, SiteView, CAROUSEL_ANIMATION, CAROUSEL_AUTO_ADVANCE};

    const TEST_PASSWORD: &str = "open sesame";

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn test_config(dir: &TempDir) -> StoreConfig {
        StoreConfig::new(dir.path().join("site").display().to_string())
            .with_admin_password_sha256(password_digest_hex(TEST_PASSWORD))
            .with_blob_root(dir.path().join("blobs"))
    }

    fn open_store() -> (TempDir, Arc<ContentStore>) {
        init_logging();
        let dir = TempDir::new().expect("temp dir");
        let store = ContentStore::init(&test_config(&dir)).expect("store opens");
        (dir, Arc::new(store))
    }

    fn sample_comment(name: &str) -> Comment {
        Comment {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            rating: 4,
            text: "Clear and useful advice.".to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn comments_of(document: &ContentDocument, post_id: &str) -> Vec<JsonValue> {
        document
            .blog_post(post_id)
            .and_then(|post| post.get("comments"))
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default()
    }

    /// Stores the default document with the FAQ ids stripped, the way
    /// documents written before item ids existed look.
    fn store_legacy_document(store: &ContentStore) {
        let mut data = default_content().into_value();
        for item in data["faq"]["items"].as_array_mut().unwrap() {
            item.as_object_mut().unwrap().remove("id");
        }
        let record = json!({ "id": "website/content", "revision": 1, "data": data });
        store.put_raw(record.to_string().as_bytes()).unwrap();
    }

    fn valid_draft() -> CommentDraft {
        CommentDraft {
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            rating: 5,
            text: "Great breakdown of the rates.".to_string(),
        }
    }

    // ===============================
    // CONTENT MODEL
    // ===============================

    #[test]
    fn test_default_content_is_stable() {
        let first = default_content();
        let second = default_content();
        assert_eq!(first, second);
        assert_eq!(first.as_value()["hero"]["tagline"], "With you Every mile of the way");

        let faq_ids: Vec<_> = first.items(Section::Faq).iter().filter_map(item_id).collect();
        assert_eq!(faq_ids.first(), Some(&"faq-1"));
        assert_eq!(faq_ids.len(), 6);

        let blog_ids: Vec<_> = first.items(Section::Blog).iter().filter_map(item_id).collect();
        assert_eq!(blog_ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_section_names_round_trip_through_keys() {
        for section in Section::ALL {
            assert_eq!(section.key().parse::<Section>().unwrap(), section);
        }
        assert!(matches!("pricing".parse::<Section>(), Err(AppResponse::BadRequest(_))));
        assert_eq!(Section::HowItWorks.list_field(), Some("steps"));
        assert_eq!(Section::WhoWeServe.list_field(), Some("clients"));
        assert_eq!(Section::Contact.list_field(), None);
    }

    #[test]
    fn test_merge_section_keeps_other_fields() {
        let mut document = default_content();
        document
            .merge_section(Section::Hero, json!({ "title": "New title", "badge": "Since 2019" }))
            .unwrap();

        let hero = document.section(Section::Hero).unwrap();
        assert_eq!(hero["title"], "New title");
        assert_eq!(hero["badge"], "Since 2019");
        assert_eq!(hero["tagline"], "With you Every mile of the way");
        assert_eq!(hero["ctaText"], "Start Dispatching Now");
    }

    #[test]
    fn test_merge_section_creates_missing_section() {
        let mut document = ContentDocument::from_value(json!({}));
        document.merge_section(Section::Footer, json!({ "description": "Bye" })).unwrap();
        assert_eq!(document.section(Section::Footer).unwrap()["description"], "Bye");
    }

    #[test]
    fn test_merge_rejects_non_object_fields() {
        let mut document = default_content();
        let result = document.merge_section(Section::Hero, json!("title"));
        assert!(matches!(result, Err(AppResponse::ValidationError(_))));
        assert_eq!(document, default_content());
    }

    #[test]
    fn test_push_item_assigns_id_and_rejects_duplicates() {
        let mut document = default_content();
        let id = document
            .push_item(Section::Faq, json!({ "question": "Q?", "answer": "A." }))
            .unwrap();
        assert!(!id.is_empty());
        assert_eq!(item_id(document.items(Section::Faq).last().unwrap()), Some(id.as_str()));

        let kept = document
            .push_item(Section::Blog, json!({ "id": "launch", "title": "Launch" }))
            .unwrap();
        assert_eq!(kept, "launch");

        let duplicate = document.push_item(Section::Blog, json!({ "id": "launch" }));
        assert!(matches!(duplicate, Err(AppResponse::Conflict(_))));
    }

    #[test]
    fn test_item_edits_follow_ids_not_positions() {
        let mut document = default_content();
        document.remove_item(Section::Faq, &ItemKey::id("faq-1")).unwrap();

        document
            .merge_item(Section::Faq, &ItemKey::id("faq-3"), json!({ "answer": "Dry Van only." }))
            .unwrap();

        let items = document.items(Section::Faq);
        assert_eq!(items.len(), 5);
        let edited = items.iter().find(|item| item_id(item) == Some("faq-3")).unwrap();
        assert_eq!(edited["answer"], "Dry Van only.");
        assert_eq!(edited["question"], "What equipment types do you dispatch?");
    }

    #[test]
    fn test_merge_item_cannot_change_id() {
        let mut document = default_content();
        document
            .merge_item(Section::Reviews, &ItemKey::Index(0), json!({ "id": "hijack", "author": "J. M." }))
            .unwrap();
        let first = &document.items(Section::Reviews)[0];
        assert_eq!(item_id(first), Some("reviews-1"));
        assert_eq!(first["author"], "J. M.");
    }

    #[test]
    fn test_list_edits_on_flat_section_are_rejected() {
        let mut document = default_content();
        let result = document.push_item(Section::Contact, json!({ "phone": "1" }));
        assert!(matches!(result, Err(AppResponse::BadRequest(_))));
        let result = document.remove_item(Section::Hero, &ItemKey::Index(0));
        assert!(matches!(result, Err(AppResponse::BadRequest(_))));
    }

    #[test]
    fn test_fill_missing_ids_only_touches_items_without_id() {
        let mut document = ContentDocument::from_value(json!({
            "faq": { "items": [ { "id": "keep", "question": "a" }, { "question": "b" }, "not an object" ] },
            "hero": { "title": "x" }
        }));
        let assigned = document.normalize_item_ids();
        assert_eq!(assigned, 1);
        let items = document.items(Section::Faq);
        assert_eq!(item_id(&items[0]), Some("keep"));
        assert!(item_id(&items[1]).is_some());
        assert_eq!(items[2], json!("not an object"));
    }

    #[test]
    fn test_append_comment_to_document() {
        let mut document = ContentDocument::from_value(json!({
            "blog": { "items": [ { "id": "7", "title": "No comments field yet" } ] }
        }));
        assert!(document.append_comment("7", &sample_comment("Ann")).unwrap());
        assert_eq!(comments_of(&document, "7").len(), 1);

        let before = document.clone();
        assert!(!document.append_comment("8", &sample_comment("Ann")).unwrap());
        assert_eq!(document, before);
    }

    // ===============================
    // CONTENT STORE
    // ===============================

    #[test]
    fn test_store_fetch_absent_writes_default() {
        let (_dir, store) = open_store();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.revision().unwrap(), 0);

        let document = store.fetch();
        assert_eq!(document.as_value()["hero"]["tagline"], "With you Every mile of the way");
        assert_eq!(document, default_content());

        let stored = store.load().unwrap().expect("default written back");
        assert_eq!(stored.revision, 1);
        assert_eq!(stored.data, default_content());

        // A second fetch reads, it does not write again.
        store.fetch();
        assert_eq!(store.revision().unwrap(), 1);
    }

    #[test]
    fn test_store_fetch_falls_back_on_corrupt_record() {
        let (_dir, store) = open_store();
        store.put_raw(b"{ not json").unwrap();

        let document = store.fetch();
        assert_eq!(document, default_content());
        assert!(matches!(store.load(), Err(AppResponse::SerializationError(_))));
    }

    #[test]
    fn test_store_fetch_assigns_missing_item_ids() {
        let (_dir, store) = open_store();
        store_legacy_document(&store);

        let first = store.fetch();
        let ids: Vec<_> = first.items(Section::Faq).iter().map(|item| item_id(item).map(str::to_string)).collect();
        assert!(ids.iter().all(Option::is_some));
        assert_ne!(ids[0], ids[1]);

        // The ids are written back, so every later read agrees.
        let second = store.fetch();
        let again: Vec<_> = second.items(Section::Faq).iter().map(|item| item_id(item).map(str::to_string)).collect();
        assert_eq!(ids, again);
        assert_eq!(store.load().unwrap().unwrap().data, second);
        assert_eq!(store.revision().unwrap(), 2);
    }

    #[test]
    fn test_store_writes_assign_missing_item_ids() {
        let (_dir, store) = open_store();
        let legacy = ContentDocument::from_value(json!({
            "reviews": { "items": [ { "author": "A" }, { "author": "B" } ] }
        }));
        assert!(store.save(&legacy));

        let stored = store.load().unwrap().unwrap().data;
        let items = stored.items(Section::Reviews);
        assert!(items.iter().all(|item| item_id(item).is_some()));
        assert_ne!(item_id(&items[0]), item_id(&items[1]));
        assert_eq!(store.fetch(), stored);
    }

    #[test]
    fn test_store_save_overwrites_and_bumps_revision() {
        let (_dir, store) = open_store();
        let mut document = store.fetch();
        document
            .merge_section(Section::Contact, json!({ "hours": "Mon-Sat" }))
            .unwrap();

        assert!(store.save(&document));
        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.revision, 2);
        assert_eq!(stored.data.section(Section::Contact).unwrap()["hours"], "Mon-Sat");
    }

    #[test]
    fn test_store_save_if_revision_detects_conflicts() {
        let (_dir, store) = open_store();
        let document = store.fetch();
        let revision = store.revision().unwrap();

        let next = store.save_if_revision(&document, revision).unwrap();
        assert_eq!(next, revision + 1);

        let stale = store.save_if_revision(&document, revision);
        assert!(matches!(stale, Err(AppResponse::Conflict(_))));
        assert_eq!(store.revision().unwrap(), next);
    }

    #[test]
    fn test_store_subscribe_delivers_initial_and_every_write() {
        let (_dir, store) = open_store();
        let seen: Arc<Mutex<Vec<JsonValue>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let subscription = store.subscribe(move |document| {
            sink.lock().unwrap().push(document.as_value()["contact"]["phone"].clone());
        });
        assert_eq!(store.subscriber_count(), 1);

        // Absent document: the listener gets the default right away.
        assert_eq!(seen.lock().unwrap().as_slice(), &[json!("+1 (555) 123-4567")]);

        let mut document = store.fetch();
        document.merge_section(Section::Contact, json!({ "phone": "555" })).unwrap();
        assert!(store.save(&document));

        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 3);
            assert_eq!(seen[2], json!("555"));
        }

        assert!(subscription.unsubscribe());
        assert_eq!(store.subscriber_count(), 0);
        assert!(store.save(&default_content()));
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_store_dropping_subscription_unsubscribes() {
        let (_dir, store) = open_store();
        let count = Arc::new(AtomicUsize::new(0));
        {
            let count = Arc::clone(&count);
            let _subscription = store.subscribe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(store.subscriber_count(), 0);
        store.fetch();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_store_delete_document_pushes_default() {
        let (_dir, store) = open_store();
        let mut document = store.fetch();
        document.merge_section(Section::Hero, json!({ "tagline": "Edited" })).unwrap();
        assert!(store.save(&document));

        let last = Arc::new(Mutex::new(JsonValue::Null));
        let sink = Arc::clone(&last);
        let _subscription = store.subscribe(move |document| {
            *sink.lock().unwrap() = document.as_value()["hero"]["tagline"].clone();
        });
        assert_eq!(*last.lock().unwrap(), json!("Edited"));

        assert!(store.delete_document().unwrap());
        assert_eq!(*last.lock().unwrap(), json!("With you Every mile of the way"));
        assert!(store.load().unwrap().is_none());
        assert!(!store.delete_document().unwrap());
    }

    #[test]
    fn test_store_append_comment_initialises_list() {
        let (_dir, store) = open_store();
        let mut document = store.fetch();
        document
            .merge_item(Section::Blog, &ItemKey::id("2"), json!({ "comments": null }))
            .unwrap();
        assert!(store.save(&document));

        assert!(store.append_comment("2", &sample_comment("Ann")));
        assert!(store.append_comment("2", &sample_comment("Ben")));

        let stored = store.load().unwrap().unwrap().data;
        let comments = comments_of(&stored, "2");
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0]["name"], "Ann");
        assert_eq!(comments[1]["name"], "Ben");
        assert_eq!(comments[1]["rating"], 4);
    }

    #[test]
    fn test_store_append_comment_unknown_post_changes_nothing() {
        let (_dir, store) = open_store();
        store.fetch();
        let before = store.load().unwrap().unwrap();

        assert!(!store.append_comment("does-not-exist", &sample_comment("Ann")));

        let after = store.load().unwrap().unwrap();
        assert_eq!(after.revision, before.revision);
        assert_eq!(after.data.items(Section::Blog), before.data.items(Section::Blog));
    }

    #[test]
    fn test_store_append_comment_without_document_fails() {
        let (_dir, store) = open_store();
        assert!(!store.append_comment("1", &sample_comment("Ann")));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_store_concurrent_comment_appends_lose_nothing() {
        let (_dir, store) = open_store();
        store.fetch();

        let handles: Vec<_> = (0..8)
            .map(|writer| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for n in 0..5 {
                        let comment = sample_comment(&format!("Writer{writer}-{n}"));
                        assert!(store.append_comment("1", &comment));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = store.load().unwrap().unwrap();
        assert_eq!(comments_of(&stored.data, "1").len(), 40);
        assert_eq!(stored.revision, 41);
    }

    #[test]
    fn test_store_slow_listener_does_not_reorder_pushes() {
        let (_dir, store) = open_store();
        store.fetch();

        let barrier = Arc::new(Barrier::new(2));
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let _subscription = {
            let barrier = Arc::clone(&barrier);
            let seen = Arc::clone(&seen);
            store.subscribe(move |document| {
                let tagline = document.as_value()["hero"]["tagline"].as_str().unwrap_or_default().to_string();
                if tagline == "A" {
                    barrier.wait();
                    thread::sleep(Duration::from_millis(200));
                }
                seen.lock().unwrap().push(tagline);
            })
        };

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut document = default_content();
                document.merge_section(Section::Hero, json!({ "tagline": "A" })).unwrap();
                assert!(store.save(&document));
            })
        };

        // "A" is committed and its delivery is in progress.
        barrier.wait();
        let mut document = default_content();
        document.merge_section(Section::Hero, json!({ "tagline": "B" })).unwrap();
        assert!(store.save(&document));
        writer.join().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, ["With you Every mile of the way", "A", "B"]);
        assert_eq!(store.load().unwrap().unwrap().data.as_value()["hero"]["tagline"], "B");
    }

    #[test]
    fn test_store_pushes_arrive_in_commit_order() {
        let (_dir, store) = open_store();
        store.fetch();

        let pushes: Arc<Mutex<Vec<(u64, ContentDocument)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&pushes);
        let _subscription = store.subscribe_pushes(move |push| {
            sink.lock().unwrap().push((push.sequence, push.document.clone()));
        });

        let handles: Vec<_> = (0..4)
            .map(|writer| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for n in 0..10 {
                        assert!(store.append_comment("2", &sample_comment(&format!("W{writer}-{n}"))));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let pushes = pushes.lock().unwrap();
        assert!(pushes.windows(2).all(|pair| pair[0].0 < pair[1].0));
        let (_, last) = pushes.last().unwrap();
        assert_eq!(comments_of(last, "2").len(), 40);
        assert_eq!(*last, store.load().unwrap().unwrap().data);
    }

    #[test]
    fn test_store_reopen_keeps_document() {
        init_logging();
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        {
            let store = ContentStore::init(&config).unwrap();
            let mut document = store.fetch();
            document.merge_section(Section::Footer, json!({ "description": "Persisted" })).unwrap();
            assert!(store.save(&document));
        }
        let store = ContentStore::init(&config).unwrap();
        assert_eq!(store.fetch().section(Section::Footer).unwrap()["description"], "Persisted");
    }

    // ===============================
    // CONTENT CONTEXT
    // ===============================

    #[test]
    fn test_context_starts_loading_then_loads() {
        let (_dir, store) = open_store();
        let context = ContentContext::new(Arc::clone(&store));
        assert!(context.is_loading());
        assert!(!context.is_subscribed());

        context.init();
        assert!(!context.is_loading());
        assert!(context.is_subscribed());
        assert_eq!(context.content(), default_content());
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_context_update_section_merges_and_saves() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(Arc::clone(&store));

        let outcome = context
            .update_section(Section::Cta, json!({ "primaryCta": "Book a call" }))
            .unwrap();
        assert!(outcome.saved);
        assert!(outcome.item_id.is_none());

        let cta = context.section(Section::Cta).unwrap();
        assert_eq!(cta["primaryCta"], "Book a call");
        assert_eq!(cta["secondaryCta"], "Call Us Today");
        assert_eq!(cta["title"], "Ready to Keep Your Truck Moving?");

        let stored = store.load().unwrap().unwrap().data;
        assert_eq!(stored, context.content());
    }

    #[test]
    fn test_context_sequential_updates_do_not_lose_fields() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(Arc::clone(&store));

        context.update_section(Section::Contact, json!({ "phone": "A" })).unwrap();
        context.update_section(Section::Contact, json!({ "email": "B" })).unwrap();

        let contact = context.section(Section::Contact).unwrap();
        assert_eq!(contact["phone"], "A");
        assert_eq!(contact["email"], "B");

        let stored = store.load().unwrap().unwrap().data;
        assert_eq!(stored.section(Section::Contact).unwrap()["phone"], "A");
        assert_eq!(stored.section(Section::Contact).unwrap()["email"], "B");
    }

    #[test]
    fn test_context_parallel_updates_are_serialized() {
        let (_dir, store) = open_store();
        let context = Arc::new(ContentContext::open(Arc::clone(&store)));

        let handles: Vec<_> = (0..6)
            .map(|n| {
                let context = Arc::clone(&context);
                thread::spawn(move || {
                    context
                        .update_section(Section::Hero, json!({ format!("field{n}"): n }))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let hero = context.section(Section::Hero).unwrap();
        for n in 0..6 {
            assert_eq!(hero[format!("field{n}")], json!(n));
        }
        assert_eq!(store.load().unwrap().unwrap().data, context.content());
    }

    #[test]
    fn test_context_add_then_remove_restores_list() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(store);
        let original = context.content().items(Section::Services).to_vec();

        let outcome = context
            .add_item(Section::Services, json!({ "title": "Factoring", "features": ["Fast pay"] }))
            .unwrap();
        let id = outcome.item_id.expect("new item id");
        assert_eq!(context.content().items(Section::Services).len(), original.len() + 1);

        context.remove_item(Section::Services, &ItemKey::Id(id)).unwrap();
        assert_eq!(context.content().items(Section::Services), original.as_slice());
    }

    #[test]
    fn test_context_add_then_remove_by_index_restores_list() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(store);
        let original = context.content().items(Section::Reviews).to_vec();

        context
            .add_item(Section::Reviews, json!({ "text": "Solid.", "author": "K.", "role": "Driver", "rating": 4 }))
            .unwrap();
        context
            .remove_item(Section::Reviews, &ItemKey::Index(original.len()))
            .unwrap();
        assert_eq!(context.content().items(Section::Reviews), original.as_slice());
    }

    #[test]
    fn test_context_update_item() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(store);

        context
            .update_item(Section::HowItWorks, &ItemKey::id("howItWorks-2"), json!({ "title": "We Book Loads" }))
            .unwrap();

        let steps = context.content().items(Section::HowItWorks).to_vec();
        assert_eq!(steps[1]["title"], "We Book Loads");
        assert_eq!(steps[1]["number"], "02");
        assert_eq!(steps[0]["title"], "Tell Us About Your Truck");
    }

    #[test]
    fn test_context_rejected_edits_leave_state_alone() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(Arc::clone(&store));
        let revision = store.revision().unwrap();

        let missing = context.update_item(Section::Faq, &ItemKey::id("nope"), json!({ "answer": "x" }));
        assert!(matches!(missing, Err(AppResponse::NotFound(_))));

        let flat = context.add_item(Section::Footer, json!({ "text": "x" }));
        assert!(matches!(flat, Err(AppResponse::BadRequest(_))));

        let out_of_range = context.remove_item(Section::Faq, &ItemKey::Index(99));
        assert!(matches!(out_of_range, Err(AppResponse::NotFound(_))));

        assert_eq!(context.content(), default_content());
        assert_eq!(store.revision().unwrap(), revision);
    }

    #[test]
    fn test_context_item_ids_survive_unrelated_writes() {
        let (_dir, store) = open_store();
        store_legacy_document(&store);
        let context = ContentContext::open(Arc::clone(&store));

        let held = item_id(&context.content().items(Section::Faq)[0]).unwrap().to_string();
        assert_eq!(item_id(&store.fetch().items(Section::Faq)[0]), Some(held.as_str()));

        // A visitor comment pushes the whole document to the context.
        assert!(store.append_comment("1", &sample_comment("Ann")));
        assert_eq!(comments_of(&context.content(), "1").len(), 1);

        let outcome = context
            .update_item(Section::Faq, &ItemKey::Id(held.clone()), json!({ "answer": "Never." }))
            .unwrap();
        assert!(outcome.saved);
        let stored = store.load().unwrap().unwrap().data;
        let first = &stored.items(Section::Faq)[0];
        assert_eq!(item_id(first), Some(held.as_str()));
        assert_eq!(first["answer"], "Never.");
    }

    #[test]
    fn test_context_edit_keeps_writes_it_has_not_seen() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(Arc::clone(&store));
        context.teardown();

        assert!(store.append_comment("2", &sample_comment("Ann")));
        assert!(comments_of(&context.content(), "2").is_empty());

        let outcome = context.update_section(Section::Footer, json!({ "description": "Edited" })).unwrap();
        assert!(outcome.saved);

        let stored = store.load().unwrap().unwrap().data;
        assert_eq!(comments_of(&stored, "2").len(), 1);
        assert_eq!(stored.section(Section::Footer).unwrap()["description"], "Edited");
    }

    #[test]
    fn test_context_edit_from_inside_a_push() {
        let (_dir, store) = open_store();
        let context = Arc::new(ContentContext::open(Arc::clone(&store)));

        let editor = Arc::downgrade(&context);
        let _subscription = store.subscribe(move |document| {
            if document.as_value()["hero"]["title"] == "Go" {
                if let Some(context) = editor.upgrade() {
                    context.update_section(Section::Hero, json!({ "title": "Done" })).unwrap();
                }
            }
        });

        context.update_section(Section::Hero, json!({ "title": "Go" })).unwrap();

        assert_eq!(context.section(Section::Hero).unwrap()["title"], "Done");
        assert_eq!(store.load().unwrap().unwrap().data.section(Section::Hero).unwrap()["title"], "Done");
    }

    #[test]
    fn test_context_reset_all_restores_default() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(Arc::clone(&store));
        context.update_section(Section::Hero, json!({ "tagline": "Changed" })).unwrap();
        context.remove_item(Section::Faq, &ItemKey::Index(0)).unwrap();

        let outcome = context.reset_all();
        assert!(outcome.saved);
        assert_eq!(context.content(), default_content());
        assert_eq!(store.load().unwrap().unwrap().data, default_content());
    }

    #[test]
    fn test_context_receives_pushes_from_other_writers() {
        let (_dir, store) = open_store();
        let reader = ContentContext::open(Arc::clone(&store));
        let writer = ContentContext::open(Arc::clone(&store));

        writer.update_section(Section::Footer, json!({ "description": "Shared" })).unwrap();
        assert_eq!(reader.section(Section::Footer).unwrap()["description"], "Shared");

        assert!(store.append_comment("3", &sample_comment("Ann")));
        assert_eq!(comments_of(&reader.content(), "3").len(), 1);
        assert_eq!(comments_of(&writer.content(), "3").len(), 1);
    }

    #[test]
    fn test_context_teardown_stops_pushes() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(Arc::clone(&store));
        context.teardown();
        assert!(!context.is_subscribed());
        assert_eq!(store.subscriber_count(), 0);

        let mut document = store.fetch();
        document.merge_section(Section::Hero, json!({ "title": "Elsewhere" })).unwrap();
        assert!(store.save(&document));
        assert_eq!(context.content(), default_content());
    }

    #[test]
    fn test_context_save_to_store_writes_local_copy() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(Arc::clone(&store));
        store.delete_document().unwrap();
        assert_eq!(context.content(), default_content());

        assert!(context.save_to_store());
        assert_eq!(store.load().unwrap().unwrap().data, default_content());
    }

    // ===============================
    // COMMENT FLOW
    // ===============================

    #[test]
    fn test_comment_text_length_boundary() {
        let mut draft = valid_draft();
        draft.text = "123456789".to_string();
        assert_eq!(draft.validate(0), Err(CommentValidationError::TextTooShort));

        draft.text = "1234567890".to_string();
        assert!(draft.validate(0).is_ok());

        draft.text = "   123456789   ".to_string();
        assert_eq!(draft.validate(0), Err(CommentValidationError::TextTooShort));
    }

    #[test]
    fn test_comment_email_shape() {
        let mut draft = valid_draft();
        draft.email = "a@b".to_string();
        assert_eq!(draft.validate(0), Err(CommentValidationError::EmailInvalid));

        draft.email = "a@b.com".to_string();
        assert!(draft.validate(0).is_ok());

        draft.email = "a b@c.com".to_string();
        assert_eq!(draft.validate(0), Err(CommentValidationError::EmailInvalid));
    }

    #[test]
    fn test_comment_validation_order_and_messages() {
        let empty = CommentDraft::default();
        assert_eq!(empty.rating, 5);
        let err = empty.validate(0).unwrap_err();
        assert_eq!(err.to_string(), "Name is required");

        let mut draft = valid_draft();
        draft.email = "   ".to_string();
        assert_eq!(draft.validate(0).unwrap_err().to_string(), "Email is required");

        let mut draft = valid_draft();
        draft.text = " ".to_string();
        assert_eq!(draft.validate(0).unwrap_err().to_string(), "Comment cannot be empty");

        let mut draft = valid_draft();
        draft.text = "short".to_string();
        assert_eq!(
            draft.validate(0).unwrap_err().to_string(),
            "Comment must be at least 10 characters"
        );

        let mut draft = valid_draft();
        draft.rating = 0;
        assert_eq!(draft.validate(0), Err(CommentValidationError::RatingOutOfRange));
        draft.rating = 6;
        assert_eq!(draft.validate(0), Err(CommentValidationError::RatingOutOfRange));
    }

    #[test]
    fn test_comment_is_trimmed_and_stamped() {
        let draft = CommentDraft {
            name: "  Dana ".to_string(),
            email: " dana@example.com ".to_string(),
            rating: 3,
            text: "  Great breakdown.  ".to_string(),
        };
        let comment = draft.validate(42).unwrap();
        assert_eq!(comment.name, "Dana");
        assert_eq!(comment.email, "dana@example.com");
        assert_eq!(comment.text, "Great breakdown.");
        assert_eq!(comment.rating, 3);
        assert_eq!(comment.timestamp, 42);
    }

    #[test]
    fn test_comment_length_hint() {
        let mut draft = CommentDraft::default();
        draft.text = "hello".to_string();
        assert_eq!(draft.length_hint(), "5/500 characters");
    }

    #[test]
    fn test_comment_form_success_clears_draft_and_shows_notice() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(Arc::clone(&store));
        let mut form = CommentForm::new("1");
        form.draft = valid_draft();
        form.draft.rating = 2;

        let now = Instant::now();
        let comment = form.submit(&store, now, 1_717_000_000_000).unwrap();
        assert_eq!(comment.name, "Dana");
        assert_eq!(comment.timestamp, 1_717_000_000_000);

        assert_eq!(form.draft, CommentDraft::default());
        assert!(form.error().is_none());
        assert!(form.is_success_visible(now + Duration::from_secs(3)));
        assert!(!form.is_success_visible(now + Duration::from_secs(4)));

        // The parent view refreshes through the store's push.
        let comments = comments_of(&context.content(), "1");
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["rating"], 2);
        assert_eq!(comments[0]["timestamp"], 1_717_000_000_000i64);
    }

    #[test]
    fn test_comment_form_validation_failure_keeps_draft() {
        let (_dir, store) = open_store();
        store.fetch();
        let mut form = CommentForm::new("1");
        form.draft = valid_draft();
        form.draft.email = "a@b".to_string();
        let draft_before = form.draft.clone();

        let result = form.submit(&store, Instant::now(), 0);
        assert!(matches!(result, Err(AppResponse::ValidationError(_))));
        assert_eq!(form.error(), Some("Please enter a valid email"));
        assert_eq!(form.draft, draft_before);
        assert!(comments_of(&store.fetch(), "1").is_empty());
    }

    #[test]
    fn test_comment_form_unknown_post_shows_generic_failure() {
        let (_dir, store) = open_store();
        store.fetch();
        let mut form = CommentForm::new("missing-post");
        form.draft = valid_draft();

        let now = Instant::now();
        assert!(form.submit(&store, now, 0).is_err());
        assert_eq!(form.error(), Some(SUBMIT_FAILED_MESSAGE));
        assert_eq!(form.draft, valid_draft());
        assert!(!form.is_success_visible(now));
    }

    // ===============================
    // ADMIN GATE
    // ===============================

    #[test]
    fn test_admin_sign_in_and_out() {
        let gate = AdminGate::from_digest_hex(&password_digest_hex(TEST_PASSWORD)).unwrap();
        let session = AdminSession::new();

        let wrong = gate.sign_in("guess", &session);
        assert_eq!(wrong, Err(AppResponse::Unauthorized(INCORRECT_PASSWORD_MESSAGE.to_string())));
        assert!(!session.is_signed_in());

        assert!(matches!(gate.sign_in("", &session), Err(AppResponse::ValidationError(_))));

        gate.sign_in(TEST_PASSWORD, &session).unwrap();
        assert!(session.is_signed_in());

        session.sign_out();
        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_admin_closed_gate_and_bad_digest() {
        let closed = AdminGate::closed();
        assert!(closed.is_closed());
        assert!(!closed.verify(TEST_PASSWORD));

        assert!(matches!(AdminGate::from_digest_hex("zz"), Err(AppResponse::BadRequest(_))));
        assert!(matches!(AdminGate::from_digest_hex("abcd"), Err(AppResponse::BadRequest(_))));
    }

    #[test]
    fn test_admin_editor_requires_session() {
        let (_dir, store) = open_store();
        let context = ContentContext::open(store);
        let gate = AdminGate::from_digest_hex(&password_digest_hex(TEST_PASSWORD)).unwrap();
        let session = AdminSession::new();

        assert!(matches!(AdminEditor::open(&session, &context), Err(AppResponse::Unauthorized(_))));

        gate.sign_in(TEST_PASSWORD, &session).unwrap();
        let editor = AdminEditor::open(&session, &context).unwrap();
        editor.update_section(Section::Faq, json!({ "subtitle": "Questions?" })).unwrap();
        assert_eq!(context.section(Section::Faq).unwrap()["subtitle"], "Questions?");
    }

    #[test]
    fn test_routes_resolve_against_session() {
        let session = AdminSession::new();
        assert_eq!(Route::resolve("/", &session), Route::Home);
        assert_eq!(Route::resolve("/#blog", &session), Route::Home);
        assert_eq!(Route::resolve("/admin", &session), Route::AdminLogin);
        assert_eq!(Route::resolve("/admin/dashboard", &session), Route::AdminLogin);
        assert_eq!(Route::resolve("/pricing", &session), Route::NotFound);

        let gate = AdminGate::from_digest_hex(&password_digest_hex(TEST_PASSWORD)).unwrap();
        gate.sign_in(TEST_PASSWORD, &session).unwrap();
        assert_eq!(Route::resolve("/admin/dashboard/", &session), Route::AdminDashboard);
        assert_eq!(Route::AdminDashboard.path(), "/admin/dashboard");
    }

    // ===============================
    // BLOB STORAGE
    // ===============================

    #[test]
    fn test_blob_upload_path_and_progress() {
        let dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(dir.path().join("blobs"), "https://cdn.example.com/");
        let bytes = vec![7u8; 150 * 1024];
        let mut progress = Vec::new();
        let mut record = |percent: u8| progress.push(percent);

        let uploaded = blobs
            .upload_blog_image("2", "../../cover photo.jpg", &bytes, Some(&mut record))
            .expect("upload succeeds");

        assert!(uploaded.storage_path.starts_with("blog/2/"));
        assert!(uploaded.storage_path.ends_with("_cover photo.jpg"));
        assert_eq!(
            uploaded.public_url,
            format!("https://cdn.example.com/{}", uploaded.storage_path)
        );
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|pair| pair[0] <= pair[1]));

        let on_disk = std::fs::read(blobs.root().join(&uploaded.storage_path)).unwrap();
        assert_eq!(on_disk.len(), bytes.len());
    }

    #[test]
    fn test_blob_upload_rejects_bad_names() {
        let dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(dir.path(), "/uploads");
        assert!(blobs.upload_blog_image("..", "a.jpg", b"x", None).is_none());
        assert!(blobs.upload_blog_image("1", "folder/", b"x", None).is_none());
    }

    // ===============================
    // SITE VIEWS
    // ===============================

    #[test]
    fn test_site_view_reads_default_content() {
        let view = SiteView::from_document(&default_content());
        assert_eq!(view.hero.tagline, "With you Every mile of the way");
        assert_eq!(view.hero.cta_text, "Start Dispatching Now");
        assert_eq!(view.how_it_works.steps.len(), 3);
        assert_eq!(view.services.items[0].features.len(), 4);
        assert_eq!(view.who_we_serve.clients[2].benefits[0], "Setup assistance");
        assert_eq!(view.reviews.items.len(), 4);
        assert_eq!(view.cta.secondary_cta, "Call Us Today");
        assert_eq!(view.contact.phone_href(), "tel:+15551234567");
        assert_eq!(view.contact.email_href(), "mailto:info@bahatidispatch.com");

        let post = view.blog.find_post("2").unwrap();
        assert_eq!(post.category, "Compliance");
        assert!(post.comments.is_empty());
        assert_eq!(post.average_rating(), None);
    }

    #[test]
    fn test_site_view_is_lenient_with_malformed_sections() {
        let document = ContentDocument::from_value(json!({
            "hero": { "title": "Only a title" },
            "reviews": "not an object",
            "blog": { "items": [ { "id": "9", "comments": [ { "name": "A", "rating": 4 }, { "name": "B", "rating": 2 } ] } ] }
        }));
        let view = SiteView::from_document(&document);
        assert_eq!(view.hero.title, "Only a title");
        assert_eq!(view.hero.tagline, "");
        assert!(view.reviews.items.is_empty());
        assert!(view.faq.items.is_empty());
        assert_eq!(view.blog.find_post("9").unwrap().average_rating(), Some(3.0));
    }

    #[test]
    fn test_site_view_keeps_good_items_next_to_bad_ones() {
        let document = ContentDocument::from_value(json!({
            "reviews": {
                "title": "Voices",
                "subtitle": 12,
                "items": [
                    { "id": "r1", "text": "Good", "author": "A", "rating": 4.5 },
                    "garbage",
                    { "id": "r3", "text": "Fine", "author": 7, "rating": 5 },
                    { "id": "r4", "text": "Okay", "author": "D", "rating": "3" }
                ]
            },
            "blog": { "items": [ {
                "id": "1",
                "title": "Rates",
                "comments": [ { "name": "X", "rating": -1 }, 5, { "name": "Y", "rating": 4 } ]
            } ] }
        }));
        let view = SiteView::from_document(&document);

        assert_eq!(view.reviews.title, "Voices");
        assert_eq!(view.reviews.subtitle, "");
        let ids: Vec<_> = view.reviews.items.iter().map(|review| review.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r3", "r4"]);
        assert_eq!(view.reviews.items[0].rating, 5);
        assert_eq!(view.reviews.items[1].author, "");
        assert_eq!(view.reviews.items[1].text, "Fine");
        assert_eq!(view.reviews.items[2].rating, 3);

        let post = view.blog.find_post("1").unwrap();
        assert_eq!(post.title, "Rates");
        assert_eq!(post.comments.len(), 2);
        assert_eq!(post.comments[0].rating, 0);
        assert_eq!(post.average_rating(), Some(2.0));
    }

    #[test]
    fn test_review_carousel_wraps_and_locks_while_animating() {
        let start = Instant::now();
        let mut carousel = ReviewCarousel::new(4, start);

        assert!(carousel.prev(start));
        assert_eq!(carousel.current(), 3);

        // Still animating: ignored.
        assert!(!carousel.next(start + Duration::from_millis(100)));
        assert_eq!(carousel.current(), 3);

        let later = start + CAROUSEL_ANIMATION;
        assert!(carousel.next(later));
        assert_eq!(carousel.current(), 0);

        assert!(!carousel.tick(later + Duration::from_secs(1)));
        assert!(carousel.tick(later + CAROUSEL_AUTO_ADVANCE));
        assert_eq!(carousel.current(), 1);

        carousel.set_len(1);
        assert_eq!(carousel.current(), 0);

        let mut empty = ReviewCarousel::new(0, start);
        assert!(empty.is_empty());
        assert!(!empty.next(start));
    }

    // ===============================
    // APP STATE
    // ===============================

    #[test]
    fn test_app_state_wires_components() {
        init_logging();
        let dir = TempDir::new().unwrap();
        let state = AppState::init(test_config(&dir)).unwrap();

        assert_eq!(state.view().hero.tagline, "With you Every mile of the way");
        assert!(matches!(state.editor(), Err(AppResponse::Unauthorized(_))));

        state.sign_in(TEST_PASSWORD).unwrap();
        state
            .editor()
            .unwrap()
            .update_section(Section::Contact, json!({ "hours": "Always" }))
            .unwrap();
        assert_eq!(state.view().contact.hours, "Always");

        let comment = state.submit_comment("3", valid_draft()).unwrap();
        assert_eq!(comment.email, "dana@example.com");
        assert_eq!(state.view().blog.find_post("3").unwrap().comments.len(), 1);

        state.sign_out();
        assert!(state.editor().is_err());
    }

    // ===============================
    // FFI FUNCTION TESTS
    // ===============================

    static PUSHES: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn count_push(json: *const c_char) {
        let text = unsafe { CStr::from_ptr(json) }.to_str().unwrap();
        assert!(text.contains("hero"));
        PUSHES.fetch_add(1, Ordering::SeqCst);
    }

    fn take_response(ptr: *const c_char) -> AppResponse {
        assert!(!ptr.is_null(), "response should not be null");
        let owned = unsafe { CString::from_raw(ptr as *mut c_char) };
        serde_json::from_str(owned.to_str().unwrap()).unwrap()
    }

    fn ffi_site(dir: &TempDir) -> *mut AppState {
        use crate::create_site;

        init_logging();
        let config = json!({
            "name": dir.path().join("ffi_site").display().to_string(),
            "map_size_mb": 8,
            "admin_password_sha256": password_digest_hex(TEST_PASSWORD),
            "blob_root": dir.path().join("ffi_blobs"),
        });
        let config = CString::new(config.to_string()).unwrap();
        let site = create_site(config.as_ptr());
        assert!(!site.is_null(), "site should open");
        site
    }

    #[test]
    fn test_ffi_create_site_rejects_bad_input() {
        use crate::create_site;

        assert!(create_site(std::ptr::null()).is_null());

        let not_json = CString::new("name=site").unwrap();
        assert!(create_site(not_json.as_ptr()).is_null());

        let empty_name = CString::new(r#"{"name":"  "}"#).unwrap();
        assert!(create_site(empty_name.as_ptr()).is_null());

        let invalid_bytes = [0xFFu8, 0xFE, 0xFD, 0x00];
        assert!(create_site(invalid_bytes.as_ptr() as *const c_char).is_null());
    }

    #[test]
    fn test_ffi_get_content_and_view() {
        use crate::{close_site, get_content, get_site_view};

        let dir = TempDir::new().unwrap();
        let site = ffi_site(&dir);

        let AppResponse::Ok(json) = take_response(get_content(site)) else {
            panic!("expected Ok");
        };
        let document: JsonValue = serde_json::from_str(&json).unwrap();
        assert_eq!(document["hero"]["tagline"], "With you Every mile of the way");

        let AppResponse::Ok(json) = take_response(get_site_view(site)) else {
            panic!("expected Ok");
        };
        let view: SiteView = serde_json::from_str(&json).unwrap();
        assert_eq!(view.blog.items.len(), 3);

        assert!(take_response(close_site(site)).is_ok());
    }

    #[test]
    fn test_ffi_editor_calls_require_sign_in() {
        use crate::{add_item, admin_sign_in, close_site, remove_item, update_item, update_section};

        let dir = TempDir::new().unwrap();
        let site = ffi_site(&dir);
        let section = CString::new("contact").unwrap();
        let fields = CString::new(r#"{"phone":"A"}"#).unwrap();

        let denied = take_response(update_section(site, section.as_ptr(), fields.as_ptr()));
        assert!(matches!(denied, AppResponse::Unauthorized(_)));

        let wrong = CString::new("nope").unwrap();
        let rejected = take_response(admin_sign_in(site, wrong.as_ptr()));
        assert_eq!(rejected, AppResponse::Unauthorized(INCORRECT_PASSWORD_MESSAGE.to_string()));

        let password = CString::new(TEST_PASSWORD).unwrap();
        assert!(take_response(admin_sign_in(site, password.as_ptr())).is_ok());
        assert!(take_response(update_section(site, section.as_ptr(), fields.as_ptr())).is_ok());

        let faq = CString::new("faq").unwrap();
        let item = CString::new(r#"{"question":"Fuel cards?","answer":"Yes."}"#).unwrap();
        let AppResponse::Ok(json) = take_response(add_item(site, faq.as_ptr(), item.as_ptr())) else {
            panic!("expected Ok");
        };
        let outcome: JsonValue = serde_json::from_str(&json).unwrap();
        let new_id = CString::new(outcome["item_id"].as_str().unwrap()).unwrap();

        let answer = CString::new(r#"{"answer":"Yes, on request."}"#).unwrap();
        assert!(take_response(update_item(site, faq.as_ptr(), new_id.as_ptr(), answer.as_ptr())).is_ok());
        assert!(take_response(remove_item(site, faq.as_ptr(), new_id.as_ptr())).is_ok());
        let gone = take_response(remove_item(site, faq.as_ptr(), new_id.as_ptr()));
        assert!(matches!(gone, AppResponse::NotFound(_)));

        let unknown = CString::new("pricing").unwrap();
        let bad_section = take_response(update_section(site, unknown.as_ptr(), fields.as_ptr()));
        assert!(matches!(bad_section, AppResponse::BadRequest(_)));

        let broken = CString::new("{").unwrap();
        let bad_json = take_response(update_section(site, section.as_ptr(), broken.as_ptr()));
        assert!(matches!(bad_json, AppResponse::SerializationError(_)));

        let state = unsafe { &*site };
        assert_eq!(state.content().section(Section::Contact).unwrap()["phone"], "A");

        assert!(take_response(close_site(site)).is_ok());
    }

    #[test]
    fn test_ffi_reset_and_upload() {
        use crate::{admin_sign_in, close_site, reset_content, update_section, upload_blog_image};

        let dir = TempDir::new().unwrap();
        let site = ffi_site(&dir);
        let post = CString::new("1").unwrap();
        let name = CString::new("truck.png").unwrap();
        let bytes = [1u8, 2, 3];

        let denied = take_response(upload_blog_image(site, post.as_ptr(), name.as_ptr(), bytes.as_ptr(), bytes.len()));
        assert!(matches!(denied, AppResponse::Unauthorized(_)));

        let password = CString::new(TEST_PASSWORD).unwrap();
        assert!(take_response(admin_sign_in(site, password.as_ptr())).is_ok());

        let AppResponse::Ok(json) =
            take_response(upload_blog_image(site, post.as_ptr(), name.as_ptr(), bytes.as_ptr(), bytes.len()))
        else {
            panic!("expected Ok");
        };
        let uploaded: JsonValue = serde_json::from_str(&json).unwrap();
        assert!(uploaded["public_url"].as_str().unwrap().starts_with("/uploads/blog/1/"));

        let section = CString::new("hero").unwrap();
        let fields = CString::new(r#"{"tagline":"Changed"}"#).unwrap();
        assert!(take_response(update_section(site, section.as_ptr(), fields.as_ptr())).is_ok());
        assert!(take_response(reset_content(site)).is_ok());

        let state = unsafe { &*site };
        assert_eq!(state.content(), default_content());

        assert!(take_response(close_site(site)).is_ok());
    }

    #[test]
    fn test_ffi_submit_comment_and_subscriptions() {
        use crate::{close_site, submit_comment, subscribe_content, unsubscribe_content};

        let dir = TempDir::new().unwrap();
        let site = ffi_site(&dir);

        let AppResponse::Ok(id) = take_response(subscribe_content(site, Some(count_push))) else {
            panic!("expected Ok");
        };
        let subscription_id: u64 = id.parse().unwrap();
        assert_eq!(PUSHES.load(Ordering::SeqCst), 1);

        let post = CString::new("2").unwrap();
        let too_short = CString::new(r#"{"name":"Dana","email":"dana@example.com","text":"123456789"}"#).unwrap();
        let rejected = take_response(submit_comment(site, post.as_ptr(), too_short.as_ptr()));
        assert_eq!(
            rejected,
            AppResponse::ValidationError("Comment must be at least 10 characters".to_string())
        );
        assert_eq!(PUSHES.load(Ordering::SeqCst), 1);

        let good = CString::new(r#"{"name":"Dana","email":"dana@example.com","text":"1234567890"}"#).unwrap();
        let AppResponse::Ok(json) = take_response(submit_comment(site, post.as_ptr(), good.as_ptr())) else {
            panic!("expected Ok");
        };
        let comment: Comment = serde_json::from_str(&json).unwrap();
        assert_eq!(comment.rating, 5);
        assert_eq!(PUSHES.load(Ordering::SeqCst), 2);

        let missing = CString::new("404").unwrap();
        let failed = take_response(submit_comment(site, missing.as_ptr(), good.as_ptr()));
        assert_eq!(failed.message(), SUBMIT_FAILED_MESSAGE);

        assert!(take_response(unsubscribe_content(site, subscription_id)).is_ok());
        let again = take_response(unsubscribe_content(site, subscription_id));
        assert!(matches!(again, AppResponse::NotFound(_)));

        let no_callback = take_response(subscribe_content(site, None));
        assert!(matches!(no_callback, AppResponse::BadRequest(_)));

        assert!(take_response(close_site(site)).is_ok());
    }

    #[test]
    fn test_ffi_save_content_requires_sign_in() {
        use crate::{admin_sign_in, admin_sign_out, close_site, free_response, save_content};

        let dir = TempDir::new().unwrap();
        let site = ffi_site(&dir);

        let denied = take_response(save_content(site));
        assert!(matches!(denied, AppResponse::Unauthorized(_)));

        let password = CString::new(TEST_PASSWORD).unwrap();
        assert!(take_response(admin_sign_in(site, password.as_ptr())).is_ok());

        let state = unsafe { &*site };
        let before = state.store().revision().unwrap();
        assert_eq!(take_response(save_content(site)), AppResponse::success("Content saved"));
        assert_eq!(state.store().revision().unwrap(), before + 1);
        assert_eq!(state.store().load().unwrap().unwrap().data, state.content());

        free_response(admin_sign_out(site));
        free_response(std::ptr::null());
        assert!(matches!(take_response(save_content(site)), AppResponse::Unauthorized(_)));

        assert!(take_response(close_site(site)).is_ok());
    }

    #[test]
    fn test_ffi_null_state_pointers() {
        use crate::{admin_sign_out, close_site, get_content, reset_content};

        let null = std::ptr::null_mut();
        assert!(matches!(take_response(get_content(null)), AppResponse::BadRequest(_)));
        assert!(matches!(take_response(admin_sign_out(null)), AppResponse::BadRequest(_)));
        assert!(matches!(take_response(reset_content(null)), AppResponse::BadRequest(_)));
        assert!(matches!(take_response(close_site(null)), AppResponse::BadRequest(_)));
    }
}
