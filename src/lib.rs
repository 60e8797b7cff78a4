//! Media News - an RSS reader core
//!
//! This crate turns an RSS 2.0 feed with Media RSS and Dublin Core
//! extensions into display-ready articles, and exposes the loading of that
//! feed as a single observable state.

pub mod article;
pub mod config;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod repository;
pub mod schema;
pub mod state;
pub mod xml;

pub use article::{Article, MediaImage};
pub use error::LoadError;
pub use fetcher::{FeedSource, FetchError, HttpFeedSource};
pub use repository::FeedRepository;
pub use state::{FeedController, FeedState};
