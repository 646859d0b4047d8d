//! Data model for the site content document.
//!
//! The whole site copy is one JSON object, [`ContentDocument`], made of named
//! sections (see [`Section`]). A section is either a flat record of scalar
//! fields or a header plus an ordered list of items. The document is kept as
//! JSON rather than a fixed struct tree: editors merge arbitrary partial
//! fields into it, and the renderer reads it leniently through
//! [`crate::site_view`].
//!
//! What is persisted is a [`StoredContent`] record: the document plus a
//! revision counter bumped by every committed write.
//!
//! # Item identity
//!
//! Every item in a list section carries a string `id`. Edits address items
//! through [`ItemKey`], so removing or reordering one item never retargets an
//! edit meant for another.
//!
//! ```rust
//! use site_content_core::content_model::{ContentDocument, ItemKey, Section};
//! use serde_json::json;
//!
//! let mut document = ContentDocument::from_value(json!({
//!     "faq": { "title": "FAQ", "items": [{ "id": "q1", "question": "Why?", "answer": "Because." }] }
//! }));
//!
//! document.merge_item(Section::Faq, &ItemKey::id("q1"), json!({ "answer": "Because we can." }))?;
//! assert_eq!(document.section(Section::Faq).unwrap()["items"][0]["answer"], "Because we can.");
//! # Ok::<(), site_content_core::AppResponse>(())
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::app_response::AppResponse;

/// Fixed identifier of the single content document.
pub const CONTENT_DOCUMENT_ID: &str = "website/content";

/// Name of the field holding an item's stable identifier.
pub const ITEM_ID_FIELD: &str = "id";

/// Name of the field holding a blog post's comments.
pub const COMMENTS_FIELD: &str = "comments";

/// Top-level regions of the content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Hero,
    TrustBar,
    HowItWorks,
    Services,
    WhyChooseUs,
    WhoWeServe,
    Reviews,
    Faq,
    Cta,
    Contact,
    Footer,
    Blog,
}

impl Section {
    pub const ALL: [Section; 12] = [
        Section::Hero,
        Section::TrustBar,
        Section::HowItWorks,
        Section::Services,
        Section::WhyChooseUs,
        Section::WhoWeServe,
        Section::Reviews,
        Section::Faq,
        Section::Cta,
        Section::Contact,
        Section::Footer,
        Section::Blog,
    ];

    /// Key of the section inside the document.
    pub fn key(self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::TrustBar => "trustBar",
            Section::HowItWorks => "howItWorks",
            Section::Services => "services",
            Section::WhyChooseUs => "whyChooseUs",
            Section::WhoWeServe => "whoWeServe",
            Section::Reviews => "reviews",
            Section::Faq => "faq",
            Section::Cta => "cta",
            Section::Contact => "contact",
            Section::Footer => "footer",
            Section::Blog => "blog",
        }
    }

    /// Field holding the section's ordered item list, if it has one.
    pub fn list_field(self) -> Option<&'static str> {
        match self {
            Section::HowItWorks => Some("steps"),
            Section::WhyChooseUs => Some("features"),
            Section::WhoWeServe => Some("clients"),
            Section::TrustBar | Section::Services | Section::Reviews | Section::Faq | Section::Blog => {
                Some("items")
            }
            Section::Hero | Section::Cta | Section::Contact | Section::Footer => None,
        }
    }

    fn require_list_field(self) -> Result<&'static str, AppResponse> {
        self.list_field().ok_or_else(|| {
            AppResponse::BadRequest(format!("Section '{}' has no item list", self.key()))
        })
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = AppResponse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.key() == s)
            .ok_or_else(|| AppResponse::BadRequest(format!("Unknown section: {s}")))
    }
}

/// Addresses one item of a list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKey {
    /// Stable identifier stored in the item's `id` field.
    Id(String),
    /// Position in the list at the time of the call.
    Index(usize),
}

impl ItemKey {
    pub fn id(id: impl Into<String>) -> Self {
        ItemKey::Id(id.into())
    }
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKey::Id(id) => write!(f, "id '{id}'"),
            ItemKey::Index(index) => write!(f, "index {index}"),
        }
    }
}

/// A reader comment attached to one blog post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub name: String,
    pub email: String,
    #[serde(deserialize_with = "lenient_rating")]
    pub rating: u8,
    pub text: String,
    /// Creation instant in milliseconds since the Unix epoch (UTC).
    pub timestamp: i64,
}

/// Reads a star rating from any JSON number, rounded and clamped into the
/// `u8` range. A numeric string is accepted too; anything else reads as 0.
pub fn lenient_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let rating = match JsonValue::deserialize(deserializer)? {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(rating
        .filter(|rating| rating.is_finite())
        .map(|rating| rating.round().clamp(0.0, f64::from(u8::MAX)) as u8)
        .unwrap_or(0))
}

/// The persisted record: the document plus its write revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredContent {
    pub id: String,
    pub revision: u64,
    pub data: ContentDocument,
}

/// The single JSON document holding all site copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDocument(JsonValue);

impl Default for ContentDocument {
    fn default() -> Self {
        crate::default_content::default_content()
    }
}

impl ContentDocument {
    pub fn from_value(value: JsonValue) -> Self {
        Self(value)
    }

    /// Parses a document, rejecting anything whose root is not an object.
    pub fn from_json_str(json: &str) -> Result<Self, AppResponse> {
        let value: JsonValue = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(AppResponse::ValidationError(
                "Content document must be a JSON object".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.0
    }

    pub fn into_value(self) -> JsonValue {
        self.0
    }

    pub fn section(&self, section: Section) -> Option<&JsonValue> {
        self.0.get(section.key())
    }

    /// Items of a list section, empty when the section or its list is missing.
    pub fn items(&self, section: Section) -> &[JsonValue] {
        section
            .list_field()
            .and_then(|field| self.section(section)?.get(field)?.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Shallow-merges `partial` into a section. A missing section is created.
    pub fn merge_section(&mut self, section: Section, partial: JsonValue) -> Result<(), AppResponse> {
        let partial = into_object(partial)?;
        let target = self.section_object_mut(section)?;
        for (field, value) in partial {
            target.insert(field, value);
        }
        Ok(())
    }

    /// Shallow-merges `partial` into one item. The item's `id` cannot be changed.
    pub fn merge_item(&mut self, section: Section, key: &ItemKey, partial: JsonValue) -> Result<(), AppResponse> {
        let partial = into_object(partial)?;
        let items = self.list_mut(section)?;
        let position = locate(items, key).ok_or_else(|| item_not_found(section, key))?;
        let item = items[position].as_object_mut().ok_or_else(|| {
            AppResponse::ValidationError(format!("Item {key} in '{section}' is not an object"))
        })?;
        for (field, value) in partial {
            if field != ITEM_ID_FIELD {
                item.insert(field, value);
            }
        }
        Ok(())
    }

    /// Appends an item and returns its id. A generated id is used when the
    /// item does not bring one of its own.
    pub fn push_item(&mut self, section: Section, item: JsonValue) -> Result<String, AppResponse> {
        let mut item = into_object(item)?;
        let id = match item.get(ITEM_ID_FIELD).and_then(JsonValue::as_str) {
            Some(existing) if !existing.is_empty() => existing.to_string(),
            _ => {
                let generated = uuid::Uuid::new_v4().to_string();
                item.insert(ITEM_ID_FIELD.to_string(), JsonValue::String(generated.clone()));
                generated
            }
        };
        let items = self.list_mut(section)?;
        if items.iter().any(|existing| item_id(existing) == Some(id.as_str())) {
            return Err(AppResponse::Conflict(format!(
                "An item with id '{id}' already exists in '{section}'"
            )));
        }
        items.push(JsonValue::Object(item));
        Ok(id)
    }

    /// Removes one item and returns it.
    pub fn remove_item(&mut self, section: Section, key: &ItemKey) -> Result<JsonValue, AppResponse> {
        let items = self.list_mut(section)?;
        let position = locate(items, key).ok_or_else(|| item_not_found(section, key))?;
        Ok(items.remove(position))
    }

    /// Looks up a blog post by id.
    pub fn blog_post(&self, post_id: &str) -> Option<&JsonValue> {
        self.items(Section::Blog)
            .iter()
            .find(|post| item_id(post) == Some(post_id))
    }

    /// Appends a comment to a blog post's comment list, creating the list if
    /// needed. Returns `false`, leaving the document untouched, when no post
    /// has that id.
    pub fn append_comment(&mut self, post_id: &str, comment: &Comment) -> Result<bool, AppResponse> {
        let comment = serde_json::to_value(comment)?;
        let Some(post) = self
            .0
            .get_mut(Section::Blog.key())
            .and_then(|blog| blog.get_mut("items"))
            .and_then(JsonValue::as_array_mut)
            .and_then(|posts| posts.iter_mut().find(|post| item_id(post) == Some(post_id)))
            .and_then(JsonValue::as_object_mut)
        else {
            return Ok(false);
        };

        let comments = post
            .entry(COMMENTS_FIELD)
            .or_insert_with(|| JsonValue::Array(Vec::new()));
        if !comments.is_array() {
            *comments = JsonValue::Array(Vec::new());
        }
        if let Some(list) = comments.as_array_mut() {
            list.push(comment);
        }
        Ok(true)
    }

    /// Gives every object item without an id one from `next_id`, which
    /// receives the section and the item's position. Returns how many ids
    /// were assigned.
    pub fn fill_missing_ids<F>(&mut self, mut next_id: F) -> usize
    where
        F: FnMut(Section, usize) -> String,
    {
        let mut assigned = 0;
        for section in Section::ALL {
            let Some(field) = section.list_field() else {
                continue;
            };
            let Some(items) = self
                .0
                .get_mut(section.key())
                .and_then(|value| value.get_mut(field))
                .and_then(JsonValue::as_array_mut)
            else {
                continue;
            };
            for (position, item) in items.iter_mut().enumerate() {
                let Some(object) = item.as_object_mut() else {
                    continue;
                };
                let has_id = object
                    .get(ITEM_ID_FIELD)
                    .and_then(JsonValue::as_str)
                    .is_some_and(|id| !id.is_empty());
                if !has_id {
                    object.insert(ITEM_ID_FIELD.to_string(), JsonValue::String(next_id(section, position)));
                    assigned += 1;
                }
            }
        }
        assigned
    }

    /// Assigns generated ids to items stored before ids existed.
    pub fn normalize_item_ids(&mut self) -> usize {
        self.fill_missing_ids(|_, _| uuid::Uuid::new_v4().to_string())
    }

    fn root_mut(&mut self) -> Result<&mut Map<String, JsonValue>, AppResponse> {
        self.0.as_object_mut().ok_or_else(|| {
            AppResponse::ValidationError("Content document must be a JSON object".to_string())
        })
    }

    fn section_object_mut(&mut self, section: Section) -> Result<&mut Map<String, JsonValue>, AppResponse> {
        let slot = self
            .root_mut()?
            .entry(section.key())
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if !slot.is_object() {
            *slot = JsonValue::Object(Map::new());
        }
        slot.as_object_mut().ok_or_else(|| {
            AppResponse::ValidationError(format!("Section '{section}' is not an object"))
        })
    }

    fn list_mut(&mut self, section: Section) -> Result<&mut Vec<JsonValue>, AppResponse> {
        let field = section.require_list_field()?;
        let list = self
            .section_object_mut(section)?
            .entry(field)
            .or_insert_with(|| JsonValue::Array(Vec::new()));
        if !list.is_array() {
            *list = JsonValue::Array(Vec::new());
        }
        list.as_array_mut().ok_or_else(|| {
            AppResponse::ValidationError(format!("'{section}.{field}' is not a list"))
        })
    }
}

/// The `id` of a list item, when it has one.
pub fn item_id(item: &JsonValue) -> Option<&str> {
    item.get(ITEM_ID_FIELD).and_then(JsonValue::as_str)
}

fn locate(items: &[JsonValue], key: &ItemKey) -> Option<usize> {
    match key {
        ItemKey::Id(id) => items.iter().position(|item| item_id(item) == Some(id.as_str())),
        ItemKey::Index(index) => (*index < items.len()).then_some(*index),
    }
}

fn item_not_found(section: Section, key: &ItemKey) -> AppResponse {
    AppResponse::NotFound(format!("No item with {key} in section '{section}'"))
}

fn into_object(value: JsonValue) -> Result<Map<String, JsonValue>, AppResponse> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(AppResponse::ValidationError(format!(
            "Expected a JSON object of fields, got: {other}"
        ))),
    }
}
