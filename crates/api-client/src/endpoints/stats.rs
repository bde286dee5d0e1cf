//! User statistics endpoints

use crate::client::EcoRouteClient;
use crate::error::{ApiError, ApiResult};
use ecoroute_core::retry::{retry_async, RetryFailure};
use serde::{Deserialize, Serialize};

/// Statistics API interface
#[derive(Clone)]
pub struct StatsApi {
    client: EcoRouteClient,
}

impl StatsApi {
    /// Create a new stats API interface
    pub(crate) fn new(client: EcoRouteClient) -> Self {
        Self { client }
    }

    /// Apply a delta to the remote points and pickup counters
    pub async fn update(&self, token: &str, delta: &StatsUpdate) -> ApiResult<()> {
        self.client
            .post_discard("update-stats/", delta, Some(token))
            .await
    }

    /// Apply a delta, retrying transient failures per the client's retry policy
    ///
    /// Returns the number of attempts made on success.
    pub async fn update_with_retry(&self, token: &str, delta: &StatsUpdate) -> ApiResult<u32> {
        let policy = &self.client.config().retry;
        match retry_async(policy, ApiError::is_retryable, || self.update(token, delta)).await {
            Ok(result) => Ok(result.attempts),
            Err(RetryFailure { error, .. }) => Err(error),
        }
    }
}

/// Counter deltas understood by `update-stats/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsUpdate {
    pub points_delta: i64,
    pub pickups_delta: i64,
}

impl StatsUpdate {
    /// A single completed pickup
    #[must_use]
    pub fn pickup() -> Self {
        Self {
            points_delta: 0,
            pickups_delta: 1,
        }
    }

    /// A points award
    #[must_use]
    pub fn points(amount: i64) -> Self {
        Self {
            points_delta: amount,
            pickups_delta: 0,
        }
    }

    /// True when applying the update would change nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points_delta == 0 && self.pickups_delta == 0
    }

    /// Combine two deltas, or `None` if either counter would overflow
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self {
            points_delta: self.points_delta.checked_add(rhs.points_delta)?,
            pickups_delta: self.pickups_delta.checked_add(rhs.pickups_delta)?,
        })
    }
}

/// Saturating; use [`StatsUpdate::checked_add`] when the exact sum matters.
impl std::ops::Add for StatsUpdate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            points_delta: self.points_delta.saturating_add(rhs.points_delta),
            pickups_delta: self.pickups_delta.saturating_add(rhs.pickups_delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(StatsUpdate::pickup()).unwrap();
        assert_eq!(json, serde_json::json!({"points_delta": 0, "pickups_delta": 1}));
    }

    #[test]
    fn test_combine_deltas() {
        let combined = StatsUpdate::pickup() + StatsUpdate::points(50) + StatsUpdate::pickup();
        assert_eq!(combined, StatsUpdate { points_delta: 50, pickups_delta: 2 });
        assert!(StatsUpdate::default().is_empty());
        assert!(!combined.is_empty());
    }

    #[test]
    fn test_checked_add_detects_overflow() {
        let big = StatsUpdate::points(i64::MAX);
        assert_eq!(big.checked_add(StatsUpdate::points(1)), None);
        assert_eq!(
            big.checked_add(StatsUpdate::pickup()),
            Some(StatsUpdate { points_delta: i64::MAX, pickups_delta: 1 })
        );
        assert_eq!(big + StatsUpdate::points(1), big);
    }
}
