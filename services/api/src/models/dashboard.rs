//! Dashboard aggregation models

use serde::Serialize;

/// Channel-level aggregates for the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub videos_count: i64,
    pub views_count: i64,
    pub likes_count: i64,
    pub subscribers_count: i64,
}
