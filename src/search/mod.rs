pub mod controller;
pub mod debounce;
pub mod popularity;
pub mod trending;

pub use controller::{FetchOutcome, MovieFetchController, FALLBACK_FETCH_ERROR, GENERIC_FETCH_ERROR};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use popularity::{spawn_update, update_search_count};
pub use trending::{load_trending, TRENDING_LIMIT};
