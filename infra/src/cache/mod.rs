//! Redis-backed storage
//!
//! One [`RedisClient`] is shared by the durable store, the TTL cache and the
//! profile repository.

pub mod redis_client;
pub mod stores;


pub use redis_client::RedisClient;
pub use stores::{RedisEphemeralCache, RedisKeyValueStore, RedisProfileRepository};
