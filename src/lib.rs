//! # Site Content Core
//!
//! Content engine for a truck dispatching website, designed to be driven
//! through FFI by whatever renders the site (web view, desktop shell, mobile
//! app). All site copy lives in one JSON document persisted in LMDB.
//!
//! ## Features
//!
//! - **Single content document**: every section of the site in one record,
//!   initialised from built-in defaults on first read
//! - **Live updates**: subscribers receive the full document after every write
//! - **Optimistic editing**: section and item edits apply locally first, then save
//! - **Stable item ids**: list items are addressed by id, not by position
//! - **Atomic comments**: blog comments are appended inside one write transaction
//! - **Safe error handling**: every FFI call answers with a JSON [`AppResponse`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use site_content_core::{create_site, get_content};
//! use std::ffi::CString;
//!
//! let config = CString::new(r#"{"name":"site_content"}"#).unwrap();
//! let site = create_site(config.as_ptr());
//!
//! let content = get_content(site);
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_site`] - Open the store and load the content
//! - [`get_content`] - Current content document
//! - [`get_site_view`] - Typed per-section view of the content
//! - [`admin_sign_in`] / [`admin_sign_out`] - Toggle the admin session
//! - [`update_section`] - Merge fields into a section (admin)
//! - [`update_item`] - Merge fields into one list item (admin)
//! - [`add_item`] / [`remove_item`] - Edit a section's item list (admin)
//! - [`reset_content`] - Restore the built-in content (admin)
//! - [`save_content`] - Save the local content as it is (admin)
//! - [`submit_comment`] - Validate and append a blog comment
//! - [`upload_blog_image`] - Store an image for a blog post (admin)
//! - [`subscribe_content`] / [`unsubscribe_content`] - Live content pushes
//! - [`close_site`] - Release the instance
//! - [`free_response`] - Release a response string
//!
//! Every function except [`create_site`] and [`free_response`] answers with
//! a JSON [`AppResponse`] C string owned by the caller.

#![recursion_limit = "256"]

pub mod admin_gate;
pub mod app_config;
pub mod app_response;
pub mod app_state;
pub mod blob_store;
pub mod comment_form;
pub mod content_context;
pub mod content_model;
pub mod content_store;
pub mod default_content;
pub mod site_view;
mod test;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;
use serde_json::Value as JsonValue;

pub use crate::app_config::StoreConfig;
pub use crate::app_response::AppResponse;
pub use crate::app_state::AppState;
pub use crate::content_model::{Comment, ContentDocument, ItemKey, Section};

use crate::comment_form::CommentDraft;
use crate::content_context::MutationOutcome;

/// Callback receiving the content document as a JSON C string. The string
/// is only valid for the duration of the call.
pub type ContentCallback = extern "C" fn(*const c_char);

/// Opens a site instance.
///
/// Opens (or creates) the LMDB environment named by the configuration,
/// loads the content document and subscribes the instance's content context
/// to live updates.
///
/// # Parameters
///
/// * `config_json` - Null-terminated JSON [`StoreConfig`]
///
/// # Returns
///
/// A pointer to the [`AppState`], or null on failure. The caller owns the
/// instance and must release it with [`close_site`].
///
/// # Safety
///
/// `config_json` must be null or a valid null-terminated C string.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use site_content_core::create_site;
///
/// let config = CString::new(r#"{"name":"test_site","map_size_mb":8}"#).unwrap();
/// let site = create_site(config.as_ptr());
///
/// if !site.is_null() {
///     // Site ready
/// }
/// ```
///
/// # Errors
///
/// Returns null if:
/// - The config pointer is null or not valid UTF-8
/// - The JSON does not describe a valid [`StoreConfig`]
/// - The store cannot be opened
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_site(config_json: *const c_char) -> *mut AppState {
    if config_json.is_null() {
        warn!("Null config pointer passed to create_site");
        return std::ptr::null_mut();
    }

    let json = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = match StoreConfig::from_json(json) {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid site config: {e}");
            return std::ptr::null_mut();
        }
    };

    info!("Opening site store at: {}", config.lmdb_dir().display());

    match AppState::init(config) {
        Ok(state) => Box::into_raw(Box::new(state)),
        Err(e) => {
            warn!("Failed to initialize site: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns the current content document.
///
/// The payload of the `Ok` response is the document as JSON.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_content(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "get_content") {
        Ok(state) => state,
        Err(err) => return err,
    };
    json_response(&state.content())
}

/// Returns the typed per-section view of the current content.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_site_view(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "get_site_view") {
        Ok(state) => state,
        Err(err) => return err,
    };
    json_response(&state.view())
}

/// Signs the admin session in when the password matches.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
///
/// # Errors
///
/// - `ValidationError` for an empty password
/// - `Unauthorized` for a wrong password, or when no admin password is configured
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn admin_sign_in(state: *mut AppState, password: *const c_char) -> *const c_char {
    let state = match state_ref(state, "admin_sign_in") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let password = match c_ptr_to_string(password, "password") {
        Ok(password) => password,
        Err(err) => return err,
    };

    match state.sign_in(&password) {
        Ok(()) => response_to_c_string(&AppResponse::success("Signed in")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Clears the admin session flag.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn admin_sign_out(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "admin_sign_out") {
        Ok(state) => state,
        Err(err) => return err,
    };
    state.sign_out();
    response_to_c_string(&AppResponse::success("Signed out"))
}

/// Merges a JSON object of fields into a section.
///
/// # JSON Format
///
/// ```json
/// { "phone": "+1 (555) 000-0000", "hours": "Mon-Fri" }
/// ```
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
///
/// # Errors
///
/// - `Unauthorized` unless the admin session is signed in
/// - `BadRequest` for an unknown section or a section without an item list
/// - `SerializationError` for malformed JSON
/// - `DatabaseError` when the change was applied locally but not saved
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_section(
    state: *mut AppState,
    section: *const c_char,
    fields_json: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "update_section") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let (section, fields) = match section_and_json(section, fields_json) {
        Ok(parsed) => parsed,
        Err(err) => return err,
    };

    let outcome = state
        .editor()
        .and_then(|editor| editor.update_section(section, fields));
    outcome_response(outcome)
}

/// Merges a JSON object of fields into the item with id `item_id`. The
/// item's `id` itself cannot be changed.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
///
/// # Errors
///
/// - `Unauthorized` unless the admin session is signed in
/// - `BadRequest` for an unknown section or a section without an item list
/// - `SerializationError` for malformed JSON
/// - `DatabaseError` when the change was applied locally but not saved
/// - `NotFound` when no item has that id
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_item(
    state: *mut AppState,
    section: *const c_char,
    item_id: *const c_char,
    fields_json: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "update_item") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let (section, fields) = match section_and_json(section, fields_json) {
        Ok(parsed) => parsed,
        Err(err) => return err,
    };
    let item_id = match c_ptr_to_string(item_id, "item id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let outcome = state
        .editor()
        .and_then(|editor| editor.update_item(section, &ItemKey::Id(item_id), fields));
    outcome_response(outcome)
}

/// Appends an item to a section's list. The response payload carries the
/// item id (`{"saved":true,"item_id":"..."}`).
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
///
/// # Errors
///
/// - `Unauthorized` unless the admin session is signed in
/// - `BadRequest` for an unknown section or a section without an item list
/// - `SerializationError` for malformed JSON
/// - `DatabaseError` when the change was applied locally but not saved
/// - `Conflict` when the item brings an id that is already taken
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn add_item(state: *mut AppState, section: *const c_char, item_json: *const c_char) -> *const c_char {
    let state = match state_ref(state, "add_item") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let (section, item) = match section_and_json(section, item_json) {
        Ok(parsed) => parsed,
        Err(err) => return err,
    };

    let outcome = state.editor().and_then(|editor| editor.add_item(section, item));
    outcome_response(outcome)
}

/// Removes the item with id `item_id` from a section's list.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
///
/// # Errors
///
/// - `Unauthorized` unless the admin session is signed in
/// - `BadRequest` for an unknown section or a section without an item list
/// - `SerializationError` for malformed JSON
/// - `DatabaseError` when the change was applied locally but not saved
/// - `NotFound` when no item has that id
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn remove_item(state: *mut AppState, section: *const c_char, item_id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "remove_item") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let section = match c_ptr_to_section(section) {
        Ok(section) => section,
        Err(err) => return err,
    };
    let item_id = match c_ptr_to_string(item_id, "item id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let outcome = state
        .editor()
        .and_then(|editor| editor.remove_item(section, &ItemKey::Id(item_id)));
    outcome_response(outcome)
}

/// Restores the built-in content and saves it.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
///
/// # Errors
///
/// - `Unauthorized` unless the admin session is signed in
/// - `DatabaseError` when the reset was applied locally but not saved
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn reset_content(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "reset_content") {
        Ok(state) => state,
        Err(err) => return err,
    };
    outcome_response(state.editor().map(|editor| editor.reset_all()))
}

/// Saves the current local content as it is, the editor's "Save" action.
///
/// Use it to push the local copy again after an edit reported
/// `Change applied locally but not saved`.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`].
///
/// # Errors
///
/// - `Unauthorized` unless the admin session is signed in
/// - `DatabaseError` when the write fails
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_content(state: *mut AppState) -> *const c_char {
    let state = match state_ref(state, "save_content") {
        Ok(state) => state,
        Err(err) => return err,
    };
    match state.editor() {
        Ok(editor) if editor.save_to_store() => response_to_c_string(&AppResponse::success("Content saved")),
        Ok(_) => response_to_c_string(&AppResponse::DatabaseError("Failed to save content".to_string())),
        Err(e) => response_to_c_string(&e),
    }
}

/// Validates a comment and appends it to a blog post.
///
/// # JSON Format
///
/// ```json
/// { "name": "Jane", "email": "jane@example.com", "rating": 5, "text": "Very helpful post." }
/// ```
///
/// A missing `rating` counts as 5. The payload of the `Ok` response is the
/// stored comment.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
///
/// # Errors
///
/// - `ValidationError` with the message to show next to the form
/// - `DatabaseError` with a generic message when the post does not exist or
///   the write fails
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn submit_comment(
    state: *mut AppState,
    post_id: *const c_char,
    comment_json: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "submit_comment") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let post_id = match c_ptr_to_string(post_id, "post id") {
        Ok(id) => id,
        Err(err) => return err,
    };
    let json = match c_ptr_to_string(comment_json, "comment JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };
    let draft: CommentDraft = match serde_json::from_str(&json) {
        Ok(draft) => draft,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid comment JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    match state.submit_comment(&post_id, draft) {
        Ok(comment) => json_response(&comment),
        Err(e) => response_to_c_string(&e),
    }
}

/// Stores an image for a blog post. The response payload carries the
/// storage path and public URL.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
/// `data` must point to `len` readable bytes; it may be null only when `len`
/// is 0.
///
/// # Errors
///
/// - `Unauthorized` unless the admin session is signed in
/// - `DatabaseError` when the file cannot be written
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn upload_blog_image(
    state: *mut AppState,
    post_id: *const c_char,
    file_name: *const c_char,
    data: *const u8,
    len: usize,
) -> *const c_char {
    let state = match state_ref(state, "upload_blog_image") {
        Ok(state) => state,
        Err(err) => return err,
    };
    if let Err(e) = state.session().require_signed_in() {
        return response_to_c_string(&e);
    }
    let post_id = match c_ptr_to_string(post_id, "post id") {
        Ok(id) => id,
        Err(err) => return err,
    };
    let file_name = match c_ptr_to_string(file_name, "file name") {
        Ok(name) => name,
        Err(err) => return err,
    };
    if data.is_null() && len > 0 {
        let error = AppResponse::BadRequest("Null data pointer passed to upload_blog_image".to_string());
        return response_to_c_string(&error);
    }

    let bytes: &[u8] = if len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(data, len) }
    };

    match state.blobs().upload_blog_image(&post_id, &file_name, bytes, None) {
        Some(uploaded) => json_response(&uploaded),
        None => response_to_c_string(&AppResponse::DatabaseError("Failed to upload blog image".to_string())),
    }
}

/// Registers `callback` for live content pushes. The response payload is the
/// subscription id for [`unsubscribe_content`].
///
/// The callback is called once right away with the current document, then
/// after every committed write, on the thread that made the write. Each
/// callback sees the document in commit order. The string passed to it is
/// only valid during the call and must not be freed.
///
/// The callback may call back into this library, including the editor
/// functions; the resulting push is delivered before that call returns.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn subscribe_content(state: *mut AppState, callback: Option<ContentCallback>) -> *const c_char {
    let state = match state_ref(state, "subscribe_content") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let Some(callback) = callback else {
        let error = AppResponse::BadRequest("Null callback passed to subscribe_content".to_string());
        return response_to_c_string(&error);
    };

    let subscription = state.store().subscribe(move |document| {
        let json = match serde_json::to_string(document) {
            Ok(json) => json,
            Err(e) => {
                warn!("Error serializing pushed content: {e}");
                return;
            }
        };
        match CString::new(json) {
            Ok(c_str) => callback(c_str.as_ptr()),
            Err(e) => warn!("Error creating CString for pushed content: {e}"),
        }
    });
    let id = state.add_host_subscription(subscription);
    response_to_c_string(&AppResponse::Ok(id.to_string()))
}

/// Stops a subscription made with [`subscribe_content`].
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`] that has not
/// been passed to [`close_site`]. String arguments must be null or valid
/// null-terminated C strings.
///
/// # Errors
///
/// - `NotFound` when the id is unknown or already unsubscribed
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn unsubscribe_content(state: *mut AppState, subscription_id: u64) -> *const c_char {
    let state = match state_ref(state, "unsubscribe_content") {
        Ok(state) => state,
        Err(err) => return err,
    };
    if state.remove_host_subscription(subscription_id) {
        response_to_c_string(&AppResponse::success("Unsubscribed"))
    } else {
        let error = AppResponse::NotFound(format!("No subscription with id: {subscription_id}"));
        response_to_c_string(&error)
    }
}

/// Releases a site instance created by [`create_site`].
///
/// Stops the content context's live updates and closes the store.
///
/// # Returns
///
/// A JSON [`AppResponse`] as a null-terminated C string. The caller owns it
/// and must release it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_site`]. It must not
/// be used again afterwards, and no other call may be running on it.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_site(state: *mut AppState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_site".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { Box::from_raw(state) };
    state.context().teardown();
    drop(state);
    response_to_c_string(&AppResponse::success("Site closed successfully"))
}

/// Releases a response string returned by any function of this library.
///
/// # Safety
///
/// `response` must be null or a pointer returned by this library that has
/// not been freed yet.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(response: *const c_char) {
    if response.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(response as *mut c_char) });
}

fn state_ref<'a>(state: *mut AppState, caller: &str) -> Result<&'a AppState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(state) => Ok(state),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn c_ptr_to_section(ptr: *const c_char) -> Result<Section, *const c_char> {
    let name = c_ptr_to_string(ptr, "section")?;
    name.parse::<Section>().map_err(|e| response_to_c_string(&e))
}

fn section_and_json(section: *const c_char, json_ptr: *const c_char) -> Result<(Section, JsonValue), *const c_char> {
    let section = c_ptr_to_section(section)?;
    let json = c_ptr_to_string(json_ptr, "JSON")?;
    let value: JsonValue = serde_json::from_str(&json).map_err(|e| {
        let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
        response_to_c_string(&error)
    })?;
    Ok((section, value))
}

fn outcome_response(outcome: Result<MutationOutcome, AppResponse>) -> *const c_char {
    match outcome {
        Ok(outcome) if outcome.saved => json_response(&outcome),
        Ok(outcome) => {
            let error = AppResponse::DatabaseError(format!(
                "Change applied locally but not saved: {}",
                serde_json::to_string(&outcome).unwrap_or_default()
            ));
            response_to_c_string(&error)
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Wraps a serializable value in `AppResponse::Ok` as a JSON C string.
fn json_response<T: Serialize>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Error serializing response: {e}"));
            response_to_c_string(&error)
        }
    }
}

/// Converts an [`AppResponse`] to a C-compatible string.
///
/// The caller owns the returned string. Returns null if serialization or C
/// string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust String, answering null pointers and
/// invalid UTF-8 with an error response.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
