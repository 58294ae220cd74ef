#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use hn_top_stories::{FetchError, Story, StoryId, StorySource};
use tokio::sync::Semaphore;

pub fn story(id: StoryId, title: &str, score: i64) -> Story {
    Story {
        id,
        title: Some(title.to_string()),
        score,
        url: Some(format!("https://example.com/{id}")),
        by: None,
        time: None,
        descendants: None,
    }
}

/// The three stories used throughout the scenarios.
pub fn scenario_stories() -> Vec<Story> {
    vec![
        story(1, "Rust in prod", 10),
        story(2, "Go concurrency", 5),
        story(3, "rusty tools", 1),
    ]
}

pub fn ids_of<'a>(stories: impl IntoIterator<Item = &'a Story>) -> Vec<StoryId> {
    stories.into_iter().map(|s| s.id).collect()
}

/// In-memory source with per-item delays, failures and an optional gate
/// that holds the index request until released.
pub struct MockSource {
    index: Result<Vec<StoryId>, FetchError>,
    stories: HashMap<StoryId, Story>,
    failing: HashSet<StoryId>,
    delays: HashMap<StoryId, Duration>,
    gate: Option<Semaphore>,
    pub index_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub completed: Mutex<Vec<StoryId>>,
}

impl MockSource {
    pub fn new(stories: Vec<Story>) -> Self {
        let index = stories.iter().map(|s| s.id).collect();
        Self {
            index: Ok(index),
            stories: stories.into_iter().map(|s| (s.id, s)).collect(),
            failing: HashSet::new(),
            delays: HashMap::new(),
            gate: None,
            index_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
        }
    }

    /// Index of `n` ids, each resolving to a generated story.
    pub fn numbered(n: usize) -> Self {
        Self::new((1..=n as StoryId).map(|id| story(id, &format!("Story {id}"), 1)).collect())
    }

    pub fn with_index(mut self, index: Result<Vec<StoryId>, FetchError>) -> Self {
        self.index = index;
        self
    }

    pub fn failing(mut self, id: StoryId) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn delay(mut self, id: StoryId, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    /// Later ids answer sooner, so responses complete in reverse order.
    pub fn reverse_completion(mut self, ids: &[StoryId]) -> Self {
        let count = ids.len() as u64;
        for (i, &id) in ids.iter().enumerate() {
            self.delays.insert(id, Duration::from_millis((count - i as u64) * 10));
        }
        self
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<StoryId> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorySource for MockSource {
    async fn top_story_ids(&self) -> Result<Vec<StoryId>, FetchError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.index.clone()
    }

    async fn story(&self, id: StoryId) -> Result<Story, FetchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }
        self.completed.lock().unwrap().push(id);

        if self.failing.contains(&id) {
            return Err(FetchError::details(id, "HTTP status server error (500)"));
        }
        self.stories
            .get(&id)
            .cloned()
            .ok_or_else(|| FetchError::details(id, "item not found"))
    }
}
