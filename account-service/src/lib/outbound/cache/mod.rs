pub mod user_cache;

pub use user_cache::RedisUserCache;
