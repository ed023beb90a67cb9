//! Cache backend implementations.

mod memory;
mod noop;
mod redis;

pub use memory::MokaCacheService;
pub use noop::NoOpCacheService;
pub use redis::RedisCacheService;
