pub mod archive_fetch;
pub mod classify;
pub mod http_cache;
pub mod http_client;
pub mod ingest;
pub mod normalize;
pub mod openings;
pub mod opponents;
pub mod persist;
pub mod rating_series;
pub mod roster;
pub mod stats;
