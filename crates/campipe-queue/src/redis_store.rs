//! Redis-backed set store (`SADD` / `SPOP` / `SCARD`).

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::error::{QueueError, QueueResult};
use crate::store::SetStore;

/// Set store backed by Redis sets.
pub struct RedisSetStore {
    client: redis::Client,
}

impl RedisSetStore {
    /// Create a store for `redis_url`. No connection is made until first use.
    pub fn new(redis_url: &str) -> QueueResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| QueueError::connection_failed(format!("{redis_url}: {e}")))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> QueueResult<redis::aio::MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// Round-trip a `PING` to check the service is reachable.
    pub async fn ping(&self) -> QueueResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl SetStore for RedisSetStore {
    async fn add(&self, key: &str, member: &str) -> QueueResult<bool> {
        let mut conn = self.connection().await?;
        let added: i64 = conn.sadd(key, member).await?;
        debug!(key, added, "SADD");
        Ok(added > 0)
    }

    async fn pop(&self, key: &str) -> QueueResult<Option<String>> {
        let mut conn = self.connection().await?;
        let member: Option<String> = conn.spop(key).await?;
        Ok(member)
    }

    async fn cardinality(&self, key: &str) -> QueueResult<u64> {
        let mut conn = self.connection().await?;
        let len: u64 = conn.scard(key).await?;
        Ok(len)
    }
}
