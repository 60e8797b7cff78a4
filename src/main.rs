use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_news::config::Config;
use media_news::display::{describe_state, render_article};
use media_news::{FeedController, FeedRepository, FeedState, HttpFeedSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_news=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut json = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ => config_path = Some(arg),
        }
    }

    // Load configuration
    let config = match &config_path {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load {}", path))?,
        None => Config::default(),
    };
    info!(url = %config.feed_url, "Using feed");

    let source = HttpFeedSource::new(&config)?;
    let controller = FeedController::new(FeedRepository::new(Arc::new(source)));
    let mut states = controller.subscribe();

    controller.load_feed();

    // Report every transition observed until the load settles.
    let settled = loop {
        let current = states.borrow_and_update().clone();
        eprintln!("{}", describe_state(&current));
        if current.is_settled() {
            break current;
        }
        if states.changed().await.is_err() {
            anyhow::bail!("feed loader stopped before finishing");
        }
    };

    match settled {
        FeedState::Success(articles) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&*articles)?);
            } else if articles.is_empty() {
                println!("No articles in feed.");
            } else {
                for article in articles.iter() {
                    println!("{}", render_article(article));
                }
            }
            Ok(())
        }
        FeedState::Error(_) => std::process::exit(1),
        FeedState::Initial | FeedState::Loading => {
            anyhow::bail!("feed loader stopped before finishing")
        }
    }
}
