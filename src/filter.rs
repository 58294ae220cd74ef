use crate::models::Story;

/// Stories whose title contains `query`, ignoring case, in their original
/// order. An empty query keeps everything.
pub fn filter_stories<'a>(stories: &'a [Story], query: &str) -> Vec<&'a Story> {
    if query.is_empty() {
        return stories.iter().collect();
    }

    let query = query.to_lowercase();
    stories
        .iter()
        .filter(|story| story.title().to_lowercase().contains(&query))
        .collect()
}
