//! Read-side views for the rendering host.
//!
//! Every section of the content document is read into a typed view. Views
//! are lenient: a field missing from the stored document, or one with the
//! wrong shape, comes out empty. A malformed list item is read field by
//! field the same way, and dropped only when it is not an object at all.

use std::time::{Duration, Instant};

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::admin_gate::AdminSession;
use crate::content_model::{lenient_rating, Comment, ContentDocument};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroView {
    pub tagline: String,
    pub title: String,
    pub description: String,
    pub cta_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitledItem {
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustBarView {
    #[serde(deserialize_with = "lenient_list")]
    pub items: Vec<TitledItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    pub id: String,
    pub number: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HowItWorksView {
    pub title: String,
    #[serde(deserialize_with = "lenient_list")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceItem {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "lenient_list")]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesView {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_list")]
    pub items: Vec<ServiceItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhyChooseUsView {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_list")]
    pub features: Vec<TitledItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientGroup {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_list")]
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoWeServeView {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_list")]
    pub clients: Vec<ClientGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: String,
    pub text: String,
    pub author: String,
    pub role: String,
    #[serde(deserialize_with = "lenient_rating")]
    pub rating: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewsView {
    pub title: String,
    pub subtitle: String,
    #[serde(deserialize_with = "lenient_list")]
    pub items: Vec<Review>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    pub id: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqView {
    pub title: String,
    pub subtitle: String,
    #[serde(deserialize_with = "lenient_list")]
    pub items: Vec<FaqItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaView {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub primary_cta: String,
    pub secondary_cta: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactView {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub hours: String,
}

impl ContactView {
    /// `tel:` link with everything but digits and a leading `+` stripped.
    pub fn phone_href(&self) -> String {
        let digits: String = self
            .phone
            .chars()
            .enumerate()
            .filter(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '+'))
            .map(|(_, c)| c)
            .collect();
        format!("tel:{digits}")
    }

    pub fn email_href(&self) -> String {
        format!("mailto:{}", self.email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterView {
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub date: String,
    pub category: String,
    pub image: String,
    #[serde(deserialize_with = "lenient_list")]
    pub comments: Vec<Comment>,
}

impl BlogPost {
    /// Mean rating of the post's comments, `None` without comments.
    pub fn average_rating(&self) -> Option<f32> {
        if self.comments.is_empty() {
            return None;
        }
        let sum: u32 = self.comments.iter().map(|c| u32::from(c.rating)).sum();
        Some(sum as f32 / self.comments.len() as f32)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogView {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    #[serde(deserialize_with = "lenient_list")]
    pub items: Vec<BlogPost>,
}

impl BlogView {
    pub fn find_post(&self, post_id: &str) -> Option<&BlogPost> {
        self.items.iter().find(|post| post.id == post_id)
    }
}

/// The whole page, one view per section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteView {
    pub hero: HeroView,
    pub trust_bar: TrustBarView,
    pub how_it_works: HowItWorksView,
    pub services: ServicesView,
    pub why_choose_us: WhyChooseUsView,
    pub who_we_serve: WhoWeServeView,
    pub reviews: ReviewsView,
    pub faq: FaqView,
    pub cta: CtaView,
    pub contact: ContactView,
    pub footer: FooterView,
    pub blog: BlogView,
}

impl SiteView {
    /// Reads a document into views. A section whose shape does not fit falls
    /// back to an empty view rather than failing the rest of the page.
    pub fn from_document(document: &ContentDocument) -> Self {
        let value = document.as_value();
        Self {
            hero: lenient(value, "hero"),
            trust_bar: lenient(value, "trustBar"),
            how_it_works: lenient(value, "howItWorks"),
            services: lenient(value, "services"),
            why_choose_us: lenient(value, "whyChooseUs"),
            who_we_serve: lenient(value, "whoWeServe"),
            reviews: lenient(value, "reviews"),
            faq: lenient(value, "faq"),
            cta: lenient(value, "cta"),
            contact: lenient(value, "contact"),
            footer: lenient(value, "footer"),
            blog: lenient(value, "blog"),
        }
    }
}

fn lenient<T>(root: &JsonValue, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    root.get(key).and_then(salvage::<T>).unwrap_or_default()
}

/// Reads `value` as `T`. When that fails for an object, the fields that do
/// not fit `T` on their own are left out and the rest is read again.
fn salvage<T: DeserializeOwned>(value: &JsonValue) -> Option<T> {
    match T::deserialize(value) {
        Ok(parsed) => return Some(parsed),
        Err(e) => debug!("Reading view field by field: {}", e),
    }

    let fields = value.as_object()?;
    let usable: Map<String, JsonValue> = fields
        .iter()
        .filter(|(name, field)| {
            let mut single = Map::new();
            single.insert((*name).clone(), (*field).clone());
            T::deserialize(&JsonValue::Object(single)).is_ok()
        })
        .map(|(name, field)| (name.clone(), field.clone()))
        .collect();
    T::deserialize(&JsonValue::Object(usable)).ok()
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let JsonValue::Array(items) = JsonValue::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items.iter().filter_map(salvage::<T>).collect())
}

/// In-page anchors of the public site, in navigation order.
pub const NAV_ANCHORS: [(&str, &str); 5] = [
    ("Home", "#home"),
    ("Services", "#services"),
    ("About", "#about"),
    ("Blog", "#blog"),
    ("Contact", "#contact"),
];

/// Scroll offset after which the navigation bar switches to its solid style.
pub const NAV_SOLID_AFTER_PX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// `/`, the public single page.
    Home,
    /// `/admin`, the password gate.
    AdminLogin,
    /// `/admin/dashboard`, the editor.
    AdminDashboard,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/admin" => Route::AdminLogin,
            "/admin/dashboard" => Route::AdminDashboard,
            _ => Route::NotFound,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home | Route::NotFound => "/",
            Route::AdminLogin => "/admin",
            Route::AdminDashboard => "/admin/dashboard",
        }
    }

    /// The route to actually show: the dashboard sends sessions that are not
    /// signed in back to the gate.
    pub fn resolve(path: &str, session: &AdminSession) -> Self {
        match Route::parse(path) {
            Route::AdminDashboard if !session.is_signed_in() => Route::AdminLogin,
            route => route,
        }
    }
}

pub const CAROUSEL_AUTO_ADVANCE: Duration = Duration::from_secs(5);
pub const CAROUSEL_ANIMATION: Duration = Duration::from_millis(500);

/// Position of the reviews carousel.
///
/// Moves wrap around. While a slide animation runs, further moves are
/// ignored; the carousel advances on its own every [`CAROUSEL_AUTO_ADVANCE`].
#[derive(Debug, Clone)]
pub struct ReviewCarousel {
    len: usize,
    current: usize,
    animating_until: Option<Instant>,
    last_move: Instant,
}

impl ReviewCarousel {
    pub fn new(len: usize, now: Instant) -> Self {
        Self {
            len,
            current: 0,
            animating_until: None,
            last_move: now,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adopts a new review count, e.g. after an edit, keeping the position in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.current >= len {
            self.current = 0;
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.animating_until.is_some_and(|until| now < until)
    }

    pub fn next(&mut self, now: Instant) -> bool {
        self.step(now, |current, len| (current + 1) % len)
    }

    pub fn prev(&mut self, now: Instant) -> bool {
        self.step(now, |current, len| (current + len - 1) % len)
    }

    pub fn go_to(&mut self, index: usize, now: Instant) -> bool {
        if index >= self.len {
            return false;
        }
        self.step(now, |_, _| index)
    }

    /// Advances when the auto-advance interval has elapsed. Returns whether
    /// it moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_move) < CAROUSEL_AUTO_ADVANCE {
            return false;
        }
        self.next(now)
    }

    fn step<F>(&mut self, now: Instant, target: F) -> bool
    where
        F: FnOnce(usize, usize) -> usize,
    {
        if self.len == 0 || self.is_animating(now) {
            return false;
        }
        self.current = target(self.current, self.len);
        self.animating_until = Some(now + CAROUSEL_ANIMATION);
        self.last_move = now;
        true
    }
}
