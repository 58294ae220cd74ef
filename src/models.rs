use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Identifier the Firebase API assigns to every item.
pub type StoryId = u64;

/// A story as returned by `/v0/item/{id}.json`.
///
/// Only `id` is guaranteed by the API. Every other field may be missing on
/// deleted, dead or job items, so they are optional or defaulted here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Story {
    pub id: StoryId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub by: Option<String>,
    // Unix seconds
    #[serde(default)]
    pub time: Option<i64>,
    // Total comment count
    #[serde(default)]
    pub descendants: Option<i64>,
}

impl Story {
    /// Title used for display and matching. A missing title reads as empty.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// The discussion page on news.ycombinator.com.
    pub fn item_url(&self) -> String {
        format!("https://news.ycombinator.com/item?id={}", self.id)
    }

    /// Where "Read more" should go. Text posts have no url and link to
    /// their discussion page instead.
    pub fn link(&self) -> String {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.item_url(),
        }
    }

    /// Host of the linked article without a leading `www.`.
    pub fn domain(&self) -> Option<String> {
        let url = reqwest::Url::parse(self.url.as_deref()?).ok()?;
        let host = url.host_str()?;
        Some(host.strip_prefix("www.").unwrap_or(host).to_string())
    }

    pub fn comments_count(&self) -> i64 {
        self.descendants.unwrap_or(0)
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        self.time.and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// Human readable age relative to `now`, e.g. "3 hours ago".
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let Some(posted) = self.posted_at() else {
            return String::new();
        };
        let secs = (now - posted).num_seconds().max(0);

        let (value, unit) = match secs {
            0..=59 => return "just now".to_string(),
            60..=3_599 => (secs / 60, "minute"),
            3_600..=86_399 => (secs / 3_600, "hour"),
            _ => (secs / 86_400, "day"),
        };
        let plural = if value == 1 { "" } else { "s" };
        format!("{} {}{} ago", value, unit, plural)
    }
}
