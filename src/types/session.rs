//! Session snapshot types exposed to clients.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{ActiveEvent, NewsEntry, Ticker};

/// Append-only price history for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<f64>);

impl PriceSeries {
    pub fn new(initial: f64) -> Self {
        Self(vec![initial])
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn push(&mut self, price: f64) {
        self.0.push(price);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Current trading date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSnapshot {
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    /// Unix timestamp (ms) of the date at midnight UTC
    pub timestamp: i64,
    pub day_index: usize,
    /// Business days left after this one
    pub remaining_days: usize,
}

/// Latest prices after one tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSnapshot {
    pub tick: u64,
    pub prices: BTreeMap<Ticker, f64>,
    pub active_events: usize,
    pub timestamp: i64,
}

/// Full session state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub running: bool,
    pub tick: u64,
    pub prices: BTreeMap<Ticker, PriceSeries>,
    pub active_events: Vec<ActiveEvent>,
    pub news: Vec<NewsEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_route: Option<String>,
    pub finished: bool,
}

/// Row of the leaderboard, ranked by total value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player_id: String,
    pub total_value: f64,
    pub pnl: f64,
    pub bankrupt: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_series_last() {
        let mut series = PriceSeries::new(100.0);
        assert_eq!(series.last(), Some(100.0));
        series.push(101.5);
        assert_eq!(series.last(), Some(101.5));
        assert_eq!(series.len(), 2);
        assert_eq!(PriceSeries::empty().last(), None);
    }

    #[test]
    fn test_price_series_serializes_as_array() {
        let series = PriceSeries::new(2.5);
        assert_eq!(serde_json::to_string(&series).unwrap(), "[2.5]");
    }
}
