pub mod cache;
pub mod invalidation;

pub use cache::{CacheStats, QueryCache};
