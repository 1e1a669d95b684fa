//! Player Types
//!
//! Cash, signed positions and the fill receipts produced by order execution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::Ticker;

/// Order side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            _ => Err(format!("Unknown side: {}", s)),
        }
    }
}

/// Signed holding in one instrument.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Positive long, negative short, zero flat
    pub quantity: i64,
    /// Size-weighted entry price; zero whenever flat
    pub avg_price: f64,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    pub fn is_long(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_short(&self) -> bool {
        self.quantity < 0
    }

    /// Fold `added` units at `price` into the running average.
    ///
    /// Incremental form avoids materialising `avg * qty` for large books.
    pub fn blend_entry(&mut self, price: f64, added: i64) {
        let held = self.quantity.unsigned_abs() as f64;
        let added = added as f64;
        self.avg_price += (price - self.avg_price) * added / (held + added);
    }

    /// Contribution to equity at `price`.
    ///
    /// A long is worth its market value. A short is worth the margin posted
    /// (`avg * |q|`) plus its unrealized gain (`(avg - price) * |q|`).
    pub fn value_at(&self, price: f64) -> f64 {
        if self.is_long() {
            self.quantity as f64 * price
        } else if self.is_short() {
            let size = self.quantity.unsigned_abs() as f64;
            self.avg_price * size + (self.avg_price - price) * size
        } else {
            0.0
        }
    }
}

/// A participant's account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub cash: f64,
    pub positions: BTreeMap<Ticker, Position>,
    /// Cash plus marked-to-market positions
    pub total_value: f64,
    /// `total_value - initial capital`
    pub pnl: f64,
    /// Sum of gains booked by reducing trades
    pub realized_pnl: f64,
    pub bankrupt: bool,
    /// Unix timestamp (ms)
    pub created_at: i64,
}

impl Player {
    /// Fresh account: all capital in cash, flat in every instrument.
    pub fn new(id: impl Into<String>, initial_capital: f64) -> Self {
        Self {
            id: id.into(),
            cash: initial_capital,
            positions: Ticker::ALL
                .iter()
                .map(|t| (*t, Position::default()))
                .collect(),
            total_value: initial_capital,
            pnl: 0.0,
            realized_pnl: 0.0,
            bankrupt: false,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn position(&self, ticker: Ticker) -> Position {
        self.positions.get(&ticker).copied().unwrap_or_default()
    }

    pub fn position_mut(&mut self, ticker: Ticker) -> &mut Position {
        self.positions.entry(ticker).or_default()
    }

    pub fn open_positions(&self) -> usize {
        self.positions.values().filter(|p| !p.is_flat()).count()
    }
}

/// Receipt for one executed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub id: Uuid,
    pub player_id: String,
    pub ticker: Ticker,
    pub side: TradeSide,
    /// Quantity after truncation
    pub requested_quantity: i64,
    /// Quantity actually traded; less than requested when a close is capped
    pub filled_quantity: i64,
    pub price: f64,
    /// Signed change to cash
    pub cash_delta: f64,
    /// Gain booked by the reducing part of this fill
    pub realized_pnl: f64,
    /// Position after the fill
    pub position_after: Position,
    /// Unix timestamp (ms)
    pub timestamp: i64,
}

impl Fill {
    pub fn was_capped(&self) -> bool {
        self.filled_quantity < self.requested_quantity
    }
}

/// Order request, shared by the REST and WebSocket surfaces.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub player_id: String,
    pub ticker: String,
    pub side: TradeSide,
    pub quantity: f64,
}

/// Order response: updated account plus the receipt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(flatten)]
    pub player: Player,
    pub fill: Fill,
}
