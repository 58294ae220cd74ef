//! Load state and search query for the top stories page.
//!
//! Network work runs on a Tokio runtime and reports back through a channel.
//! The UI drains that channel once per frame with [`StoriesController::poll`],
//! the same way the reader used to poll its loader thread. Every load cycle
//! gets a generation number so results from a superseded cycle, or anything
//! arriving after [`StoriesController::teardown`], never reach the state.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::filter::filter_stories;
use crate::hn_client::StorySource;
use crate::models::{Story, StoryId};
use crate::pipeline;

/// What the page can show. Exactly one of these at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded(Vec<Story>),
    Failed(FetchError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn stories(&self) -> Option<&[Story]> {
        match self {
            LoadState::Loaded(stories) => Some(stories),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            LoadState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum LoadEvent {
    Ids {
        generation: u64,
        result: Result<Vec<StoryId>, FetchError>,
    },
    Details {
        generation: u64,
        result: Result<Vec<Story>, FetchError>,
    },
}

impl LoadEvent {
    fn generation(&self) -> u64 {
        match self {
            LoadEvent::Ids { generation, .. } | LoadEvent::Details { generation, .. } => *generation,
        }
    }
}

type Waker = Arc<dyn Fn() + Send + Sync>;

pub struct StoriesController {
    source: Arc<dyn StorySource>,
    runtime: Handle,
    story_limit: usize,
    query: String,
    state: LoadState,
    generation: u64,
    torn_down: bool,
    events_tx: UnboundedSender<LoadEvent>,
    events_rx: UnboundedReceiver<LoadEvent>,
    task: Option<JoinHandle<()>>,
    waker: Option<Waker>,
}

impl StoriesController {
    /// Creates an idle controller in the `Loading` state. Nothing is
    /// requested until [`load`](Self::load) is called.
    pub fn new(source: Arc<dyn StorySource>, story_limit: usize, runtime: Handle) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            source,
            runtime,
            story_limit,
            query: String::new(),
            state: LoadState::Loading,
            generation: 0,
            torn_down: false,
            events_tx,
            events_rx,
            task: None,
            waker: None,
        }
    }

    /// Called from the runtime whenever an event is queued, so a UI can
    /// schedule a repaint instead of polling continuously.
    pub fn set_waker(&mut self, waker: impl Fn() + Send + Sync + 'static) {
        self.waker = Some(Arc::new(waker));
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query_mut(&mut self) -> &mut String {
        &mut self.query
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// The loaded stories that match the current query. Empty unless loaded.
    pub fn visible_stories(&self) -> Vec<&Story> {
        match &self.state {
            LoadState::Loaded(stories) => filter_stories(stories, &self.query),
            _ => Vec::new(),
        }
    }

    pub fn total_stories(&self) -> usize {
        self.state.stories().map_or(0, <[Story]>::len)
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Starts a new load cycle, replacing whatever was loaded or in flight.
    pub fn load(&mut self) {
        if self.torn_down {
            return;
        }

        self.abort_task();
        self.generation += 1;
        self.state = LoadState::Loading;
        info!(generation = self.generation, "loading top stories");

        let source = Arc::clone(&self.source);
        let limit = self.story_limit;
        let generation = self.generation;
        self.spawn(async move {
            let result = pipeline::fetch_top_story_ids(source.as_ref(), limit).await;
            LoadEvent::Ids { generation, result }
        });
    }

    /// Applies every queued event. Returns `true` if the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.events_rx.try_recv() {
            changed |= self.apply(event);
        }
        changed
    }

    /// Waits until the current cycle leaves `Loading`.
    ///
    /// Returns immediately after teardown or if no cycle was started.
    pub async fn settle(&mut self) -> &LoadState {
        while self.state.is_loading() && !self.torn_down && self.generation > 0 {
            match self.events_rx.recv().await {
                Some(event) => {
                    self.apply(event);
                }
                None => break,
            }
        }
        &self.state
    }

    /// Stops accepting results. In-flight work is aborted and anything it
    /// still delivers is dropped.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.generation += 1;
        self.abort_task();
        debug!("stories controller torn down");
    }

    fn apply(&mut self, event: LoadEvent) -> bool {
        if self.torn_down || event.generation() != self.generation {
            debug!(
                stale = event.generation(),
                current = self.generation,
                "discarding stale load result"
            );
            return false;
        }

        match event {
            LoadEvent::Ids { result: Ok(ids), .. } => {
                self.on_ids_loaded(ids);
                false
            }
            LoadEvent::Details {
                result: Ok(stories), ..
            } => {
                self.state = LoadState::Loaded(stories);
                true
            }
            LoadEvent::Ids { result: Err(err), .. } | LoadEvent::Details { result: Err(err), .. } => {
                warn!(error = %err, "load failed");
                self.state = LoadState::Failed(err);
                true
            }
        }
    }

    // A fresh id list always triggers exactly one detail fan-out.
    fn on_ids_loaded(&mut self, ids: Vec<StoryId>) {
        let source = Arc::clone(&self.source);
        let generation = self.generation;
        self.spawn(async move {
            let result = pipeline::fetch_story_details(source.as_ref(), &ids).await;
            LoadEvent::Details { generation, result }
        });
    }

    fn spawn<F>(&mut self, work: F)
    where
        F: std::future::Future<Output = LoadEvent> + Send + 'static,
    {
        let events_tx = self.events_tx.clone();
        let waker = self.waker.clone();
        let task = self.runtime.spawn(async move {
            let event = work.await;
            // The receiver lives as long as the controller
            if events_tx.send(event).is_ok() {
                if let Some(wake) = waker {
                    wake();
                }
            }
        });
        self.task = Some(task);
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for StoriesController {
    fn drop(&mut self) {
        self.abort_task();
    }
}
