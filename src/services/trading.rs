//! Trading Engine
//!
//! Market orders against the latest simulated price. Long positions are paid
//! in full; shorts post their notional as margin, released with the realized
//! gain or loss when covered. An order never flips a position: a reducing
//! order larger than the position is capped at the position size.

use chrono::Utc;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::services::price_engine::MarketState;
use crate::types::{Fill, Player, Ticker, TradeSide};

/// Trading service errors.
#[derive(Debug, Error, PartialEq)]
pub enum TradingError {
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(f64),

    #[error("No price available for {0}")]
    NoPriceAvailable(Ticker),

    #[error("Insufficient funds: need {needed:.2}, have {available:.2}")]
    InsufficientFunds { needed: f64, available: f64 },

    #[error("Insufficient margin: need {needed:.2}, have {available:.2}")]
    InsufficientMargin { needed: f64, available: f64 },

    #[error("Account {0} is bankrupt")]
    AccountBankrupt(String),
}

impl TradingError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            TradingError::UnknownInstrument(_) => "UNKNOWN_INSTRUMENT",
            TradingError::InvalidQuantity(_) => "INVALID_QUANTITY",
            TradingError::NoPriceAvailable(_) => "NO_PRICE_AVAILABLE",
            TradingError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            TradingError::InsufficientMargin { .. } => "INSUFFICIENT_MARGIN",
            TradingError::AccountBankrupt(_) => "ACCOUNT_BANKRUPT",
        }
    }
}

/// Truncate toward zero; reject anything below one whole unit.
pub fn normalize_quantity(quantity: f64) -> Result<i64, TradingError> {
    if !quantity.is_finite() {
        return Err(TradingError::InvalidQuantity(quantity));
    }
    let whole = quantity.trunc();
    if whole < 1.0 || whole > i64::MAX as f64 {
        return Err(TradingError::InvalidQuantity(quantity));
    }
    Ok(whole as i64)
}

/// Apply one fill to `player`. Either the whole order is applied or nothing is.
pub fn apply_order(
    player: &mut Player,
    ticker: Ticker,
    side: TradeSide,
    quantity: i64,
    price: f64,
) -> Result<Fill, TradingError> {
    let position = player.position(ticker);
    let cash = player.cash;

    let (filled, cash_delta, realized) = match side {
        TradeSide::Buy if position.is_short() => {
            let covered = quantity.min(position.quantity.abs());
            let size = covered as f64;
            let released = position.avg_price * size;
            let gain = (position.avg_price - price) * size;
            let credit = released + gain;
            if cash + credit < 0.0 {
                return Err(TradingError::InsufficientFunds {
                    needed: -credit,
                    available: cash,
                });
            }
            (covered, credit, gain)
        }
        TradeSide::Buy => {
            let cost = price * quantity as f64;
            if cost > cash {
                return Err(TradingError::InsufficientFunds {
                    needed: cost,
                    available: cash,
                });
            }
            (quantity, -cost, 0.0)
        }
        TradeSide::Sell if position.is_long() => {
            let sold = quantity.min(position.quantity);
            let size = sold as f64;
            (sold, price * size, (price - position.avg_price) * size)
        }
        TradeSide::Sell => {
            let margin = price * quantity as f64;
            if margin > cash {
                return Err(TradingError::InsufficientMargin {
                    needed: margin,
                    available: cash,
                });
            }
            (quantity, -margin, 0.0)
        }
    };

    let pos = player.position_mut(ticker);
    let opening = match side {
        TradeSide::Buy => pos.quantity >= 0,
        TradeSide::Sell => pos.quantity <= 0,
    };
    if opening {
        pos.blend_entry(price, filled);
    }
    pos.quantity += match side {
        TradeSide::Buy => filled,
        TradeSide::Sell => -filled,
    };
    if pos.quantity == 0 {
        pos.avg_price = 0.0;
    }
    let position_after = *pos;

    player.cash += cash_delta;
    player.realized_pnl += realized;

    Ok(Fill {
        id: Uuid::new_v4(),
        player_id: player.id.clone(),
        ticker,
        side,
        requested_quantity: quantity,
        filled_quantity: filled,
        price,
        cash_delta,
        realized_pnl: realized,
        position_after,
        timestamp: Utc::now().timestamp_millis(),
    })
}

/// Mark `player` to the given prices. Missing prices fall back to entry price.
pub fn revalue(player: &mut Player, prices: &BTreeMap<Ticker, f64>, initial_capital: f64) {
    let held: f64 = player
        .positions
        .iter()
        .map(|(ticker, pos)| {
            let price = prices.get(ticker).copied().unwrap_or(pos.avg_price);
            pos.value_at(price)
        })
        .sum();
    player.total_value = player.cash + held;
    player.pnl = player.total_value - initial_capital;
}

/// Order execution over a player book.
#[derive(Debug, Clone)]
pub struct TradingEngine {
    initial_capital: f64,
}

impl TradingEngine {
    pub fn new(initial_capital: f64) -> Self {
        Self { initial_capital }
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Look up a player, creating a fresh account on first reference.
    pub fn player_entry<'a>(
        &self,
        players: &'a mut BTreeMap<String, Player>,
        player_id: &str,
    ) -> &'a mut Player {
        players
            .entry(player_id.to_string())
            .or_insert_with(|| Player::new(player_id, self.initial_capital))
    }

    /// Validate and execute a market order, then revalue the account.
    pub fn execute_trade(
        &self,
        players: &mut BTreeMap<String, Player>,
        market: &MarketState,
        player_id: &str,
        instrument: &str,
        side: TradeSide,
        quantity: f64,
    ) -> Result<Fill, TradingError> {
        let ticker: Ticker = instrument
            .parse()
            .map_err(|_| TradingError::UnknownInstrument(instrument.to_string()))?;
        let series = market
            .series
            .get(&ticker)
            .ok_or_else(|| TradingError::UnknownInstrument(instrument.to_string()))?;
        let quantity = normalize_quantity(quantity)?;
        let price = series.last().ok_or(TradingError::NoPriceAvailable(ticker))?;

        let player = self.player_entry(players, player_id);
        if player.bankrupt {
            return Err(TradingError::AccountBankrupt(player.id.clone()));
        }

        let fill = apply_order(player, ticker, side, quantity, price)?;
        revalue(player, &market.latest_prices(), self.initial_capital);
        Ok(fill)
    }

    /// Revalue every player at the latest prices.
    pub fn recompute_all(&self, players: &mut BTreeMap<String, Player>, market: &MarketState) {
        let prices = market.latest_prices();
        for player in players.values_mut() {
            revalue(player, &prices, self.initial_capital);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new("trader", 1_000_000.0)
    }

    // =========================================================================
    // Quantity
    // =========================================================================

    #[test]
    fn test_normalize_quantity_truncates() {
        assert_eq!(normalize_quantity(10.9), Ok(10));
        assert_eq!(normalize_quantity(1.0), Ok(1));
    }

    #[test]
    fn test_normalize_quantity_rejects() {
        assert!(normalize_quantity(0.99).is_err());
        assert!(normalize_quantity(0.0).is_err());
        assert!(normalize_quantity(-5.0).is_err());
        assert!(normalize_quantity(f64::NAN).is_err());
        assert!(normalize_quantity(f64::INFINITY).is_err());
    }

    // =========================================================================
    // Long side
    // =========================================================================

    #[test]
    fn test_buy_opens_long() {
        let mut p = player();
        let fill = apply_order(&mut p, Ticker::Bank, TradeSide::Buy, 100, 2300.0).unwrap();
        assert_eq!(p.cash, 1_000_000.0 - 230_000.0);
        assert_eq!(p.position(Ticker::Bank).quantity, 100);
        assert_eq!(p.position(Ticker::Bank).avg_price, 2300.0);
        assert_eq!(fill.cash_delta, -230_000.0);
        assert_eq!(fill.filled_quantity, 100);
    }

    #[test]
    fn test_buy_rejects_insufficient_funds_without_mutation() {
        let mut p = player();
        let before = p.clone();
        let err = apply_order(&mut p, Ticker::Semi, TradeSide::Buy, 100, 12000.0).unwrap_err();
        assert!(matches!(err, TradingError::InsufficientFunds { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn test_sell_long_is_capped_and_resets_avg() {
        let mut p = player();
        apply_order(&mut p, Ticker::Auto, TradeSide::Buy, 10, 2600.0).unwrap();
        let fill = apply_order(&mut p, Ticker::Auto, TradeSide::Sell, 25, 2700.0).unwrap();
        assert_eq!(fill.requested_quantity, 25);
        assert_eq!(fill.filled_quantity, 10);
        assert!(fill.was_capped());
        assert_eq!(fill.realized_pnl, 1000.0);
        assert_eq!(p.position(Ticker::Auto).quantity, 0);
        assert_eq!(p.position(Ticker::Auto).avg_price, 0.0);
        assert_eq!(p.cash, 1_001_000.0);
    }

    #[test]
    fn test_partial_sell_keeps_avg() {
        let mut p = player();
        apply_order(&mut p, Ticker::Game, TradeSide::Buy, 10, 6000.0).unwrap();
        apply_order(&mut p, Ticker::Game, TradeSide::Buy, 10, 6200.0).unwrap();
        assert!((p.position(Ticker::Game).avg_price - 6100.0).abs() < 1e-9);
        apply_order(&mut p, Ticker::Game, TradeSide::Sell, 5, 7000.0).unwrap();
        assert!((p.position(Ticker::Game).avg_price - 6100.0).abs() < 1e-9);
        assert_eq!(p.position(Ticker::Game).quantity, 15);
    }

    // =========================================================================
    // Short side
    // =========================================================================

    #[test]
    fn test_short_then_cover_at_profit() {
        let mut p = player();
        apply_order(&mut p, Ticker::Util, TradeSide::Sell, 50, 1000.0).unwrap();
        assert_eq!(p.cash, 950_000.0);
        assert_eq!(p.position(Ticker::Util).quantity, -50);
        assert_eq!(p.position(Ticker::Util).avg_price, 1000.0);

        let fill = apply_order(&mut p, Ticker::Util, TradeSide::Buy, 50, 900.0).unwrap();
        assert_eq!(fill.cash_delta, 55_000.0);
        assert_eq!(fill.realized_pnl, 5_000.0);
        assert_eq!(p.cash, 1_005_000.0);
        assert_eq!(p.position(Ticker::Util).quantity, 0);
        assert_eq!(p.position(Ticker::Util).avg_price, 0.0);
    }

    #[test]
    fn test_short_rejects_insufficient_margin() {
        let mut p = Player::new("small", 1000.0);
        let err = apply_order(&mut p, Ticker::Gold, TradeSide::Sell, 1, 20000.0).unwrap_err();
        assert!(matches!(err, TradingError::InsufficientMargin { .. }));
        assert_eq!(p.cash, 1000.0);
    }

    #[test]
    fn test_cover_rejected_when_loss_exceeds_cash() {
        let mut p = Player::new("thin", 1000.0);
        apply_order(&mut p, Ticker::Air, TradeSide::Sell, 1, 1000.0).unwrap();
        assert_eq!(p.cash, 0.0);
        // Price tripled: credit = 1000 + (1000 - 3000) = -1000
        let err = apply_order(&mut p, Ticker::Air, TradeSide::Buy, 1, 3000.0).unwrap_err();
        assert!(matches!(err, TradingError::InsufficientFunds { .. }));
        assert_eq!(p.position(Ticker::Air).quantity, -1);
    }

    #[test]
    fn test_buy_never_flips_short() {
        let mut p = player();
        apply_order(&mut p, Ticker::Eneos, TradeSide::Sell, 10, 1200.0).unwrap();
        let fill = apply_order(&mut p, Ticker::Eneos, TradeSide::Buy, 30, 1200.0).unwrap();
        assert_eq!(fill.filled_quantity, 10);
        assert_eq!(p.position(Ticker::Eneos).quantity, 0);
    }

    // =========================================================================
    // Valuation
    // =========================================================================

    #[test]
    fn test_revalue_long_and_short() {
        let mut p = player();
        apply_order(&mut p, Ticker::Bank, TradeSide::Buy, 100, 2300.0).unwrap();
        apply_order(&mut p, Ticker::Util, TradeSide::Sell, 100, 600.0).unwrap();
        let mut prices = BTreeMap::new();
        prices.insert(Ticker::Bank, 2400.0);
        prices.insert(Ticker::Util, 500.0);
        revalue(&mut p, &prices, 1_000_000.0);
        // long +10,000, short +10,000
        assert!((p.total_value - 1_020_000.0).abs() < 1e-6);
        assert!((p.pnl - 20_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_restores_cash() {
        let mut p = player();
        apply_order(&mut p, Ticker::Pharma, TradeSide::Buy, 37, 4500.0).unwrap();
        apply_order(&mut p, Ticker::Pharma, TradeSide::Sell, 37, 4500.0).unwrap();
        assert!((p.cash - 1_000_000.0).abs() < 1e-6);
    }
}
