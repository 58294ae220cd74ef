//! Story acquisition: the ranked id index first, then one detail request per id.

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::hn_client::StorySource;
use crate::models::{Story, StoryId};

/// Fetches the ranked index and keeps the first `limit` ids in source order.
pub async fn fetch_top_story_ids(
    source: &dyn StorySource,
    limit: usize,
) -> Result<Vec<StoryId>, FetchError> {
    let mut ids = source.top_story_ids().await?;
    let total = ids.len();
    ids.truncate(limit);

    info!(total, kept = ids.len(), "story index loaded");
    Ok(ids)
}

/// Requests every story concurrently and waits for all of them.
///
/// The result lines up with `ids` index for index, whatever order the
/// responses come back in. The first failure fails the whole batch.
pub async fn fetch_story_details(
    source: &dyn StorySource,
    ids: &[StoryId],
) -> Result<Vec<Story>, FetchError> {
    debug!(count = ids.len(), "fetching story details");

    let stories = try_join_all(ids.iter().map(|&id| source.story(id))).await?;

    info!(count = stories.len(), "story details loaded");
    Ok(stories)
}
