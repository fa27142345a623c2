//! Set-store seam between the queue client and the queue service.

use async_trait::async_trait;

use crate::error::QueueResult;

/// The three set operations the queue protocol is built on.
///
/// Implementations must make `pop` atomic: a member is removed before it is
/// returned, so concurrent callers never receive the same member.
#[async_trait]
pub trait SetStore: Send + Sync {
    /// Add `member` to `key`. Returns `true` if it was not already present.
    async fn add(&self, key: &str, member: &str) -> QueueResult<bool>;

    /// Remove and return an arbitrary member of `key`, or `None` if empty.
    async fn pop(&self, key: &str) -> QueueResult<Option<String>>;

    /// Number of members in `key`.
    async fn cardinality(&self, key: &str) -> QueueResult<u64>;
}
