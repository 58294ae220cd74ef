//! Loads the Hacker News top stories and filters them by title.
//!
//! The pipeline has two network stages: [`pipeline::fetch_top_story_ids`]
//! reads the ranked index, then [`pipeline::fetch_story_details`] requests
//! every story at once. [`filter::filter_stories`] is the local search.
//! [`controller::StoriesController`] ties them to a UI.

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod hn_client;
pub mod models;
pub mod pipeline;

pub use config::ClientConfig;
pub use controller::{LoadState, StoriesController};
pub use error::FetchError;
pub use filter::filter_stories;
pub use hn_client::{HackerNewsClient, StorySource};
pub use models::{Story, StoryId};
