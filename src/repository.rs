use std::sync::Arc;

use tracing::{debug, error, info};

use crate::article::Article;
use crate::error::{LoadError, LoadResult};
use crate::fetcher::FeedSource;
use crate::normalize::normalize;
use crate::schema::RawFeed;

/// Fetches the feed and turns it into articles, folding every failure into
/// a [`LoadError`].
#[derive(Clone)]
pub struct FeedRepository {
    source: Arc<dyn FeedSource>,
}

impl FeedRepository {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    pub async fn load_articles(&self) -> LoadResult<Vec<Article>> {
        let feed = match self.source.fetch_feed().await {
            Ok(feed) => feed,
            Err(e) => {
                error!(error = %e, "Failed to load feed");
                return Err(LoadError::from_error(&e));
            }
        };

        log_raw_feed(&feed);

        let articles = normalize(feed.items());

        if let Some(first) = articles.first() {
            debug!(
                title = %first.title,
                thumbnail = ?first.thumbnail_url,
                images = first.media_images.len(),
                "First normalized article"
            );
        }
        info!(count = articles.len(), "Feed loaded");

        Ok(articles)
    }
}

fn log_raw_feed(feed: &RawFeed) {
    let channel_title = feed.channel.as_ref().and_then(|c| c.title.as_deref());
    debug!(
        channel = ?channel_title,
        items = feed.items().len(),
        "Feed parsed"
    );

    if let Some(item) = feed.items().first() {
        debug!(
            title = ?item.title,
            creator = ?item.creator,
            contributor = ?item.contributor,
            thumbnail = ?item.thumbnail.as_ref().and_then(|t| t.url.as_deref()),
            media_content = item.content.len(),
            "First raw item"
        );
        for media in &item.content {
            debug!(medium = ?media.medium, url = ?media.url, credit = ?media.credit, "Media content");
        }
    }
}
