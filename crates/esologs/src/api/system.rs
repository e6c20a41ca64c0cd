//! API bookkeeping.

use tracing::{debug, instrument};

use super::operation;
use crate::client::EsoLogsClient;
use crate::error::EsoLogsResult;
use crate::models::{RateLimitData, Root};
use crate::params::ParamBundle;

operation! {
    GetRateLimitData => Root<RateLimitData>,
    "query GetRateLimitData { rateLimitData { limitPerHour pointsSpentThisHour pointsResetIn } }"
}

/// System queries.
#[derive(Debug, Clone, Copy)]
pub struct SystemApi<'a> {
    client: &'a EsoLogsClient,
}

impl<'a> SystemApi<'a> {
    pub(crate) const fn new(client: &'a EsoLogsClient) -> Self {
        Self { client }
    }

    /// Point budget for the current hour.
    #[instrument(skip(self))]
    pub async fn rate_limit(&self) -> EsoLogsResult<RateLimitData> {
        let data = self
            .client
            .fetch::<GetRateLimitData>(ParamBundle::new())
            .await?
            .into_inner();
        debug!(
            spent = data.points_spent_this_hour,
            limit = data.limit_per_hour,
            reset_in = data.points_reset_in,
            "rate limit"
        );
        Ok(data)
    }
}
