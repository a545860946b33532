pub mod bridge;
pub mod catalog;
pub mod config;
pub mod duration;
pub mod error;
pub mod feed;
pub mod models;
pub mod normalizer;
pub mod observer;
pub mod shield;
pub mod stream;

pub use bridge::MusicBridge;
pub use catalog::{CatalogClient, InnerTubeClient};
pub use config::Config;
pub use error::{AppError, Result};
pub use feed::{FallbackOrchestrator, FeedAggregator, Section};
pub use models::{AlbumDetails, AlbumItem, HomeFeedData, SongItem, StreamData};
pub use observer::{FeedObserver, TracingObserver};
