use std::time::Duration;

use crate::models::StoryId;

pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// How many ranked ids are kept from the index.
pub const TOP_STORIES_LIMIT: usize = 100;

/// Settings for the Firebase client and the load pipeline.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root without a trailing slash. Endpoints are appended to it.
    pub base_url: String,
    pub story_limit: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            story_limit: TOP_STORIES_LIMIT,
            timeout: Duration::from_secs(60),
            user_agent: concat!("hn_top_stories/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn top_stories_url(&self) -> String {
        format!("{}/topstories.json", self.base_url)
    }

    pub fn item_url(&self, id: StoryId) -> String {
        format!("{}/item/{}.json", self.base_url, id)
    }
}
