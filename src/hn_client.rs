use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::models::{Story, StoryId};

/// The two reads the pipeline needs from Hacker News.
///
/// `top_story_ids` returns the index exactly as served; truncation to the
/// configured limit happens in the pipeline, not here.
#[async_trait]
pub trait StorySource: Send + Sync {
    async fn top_story_ids(&self) -> Result<Vec<StoryId>, FetchError>;

    async fn story(&self, id: StoryId) -> Result<Story, FetchError>;
}

/// Firebase API client. Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct HackerNewsClient {
    client: Client,
    config: ClientConfig,
}

impl HackerNewsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl StorySource for HackerNewsClient {
    async fn top_story_ids(&self) -> Result<Vec<StoryId>, FetchError> {
        let url = self.config.top_stories_url();
        debug!(%url, "requesting story index");

        let ids = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(FetchError::ids)?
            .json::<Vec<StoryId>>()
            .await
            .map_err(FetchError::ids)?;

        Ok(ids)
    }

    async fn story(&self, id: StoryId) -> Result<Story, FetchError> {
        let url = self.config.item_url(id);

        // Firebase answers unknown ids with a literal `null`
        let story = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| FetchError::details(id, e))?
            .json::<Option<Story>>()
            .await
            .map_err(|e| FetchError::details(id, e))?
            .ok_or_else(|| FetchError::details(id, "item not found"))?;

        Ok(story)
    }
}
