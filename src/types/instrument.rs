//! Instrument Types
//!
//! The closed set of tradable tickers and their static simulation parameters.

use serde::{Deserialize, Serialize};

/// Ticker identifier. The set is closed: every instrument the game knows about
/// is listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ticker {
    Bank,
    Semi,
    Auto,
    Pharma,
    Nitori,
    Util,
    Air,
    Game,
    Eneos,
    Gold,
    Usdjpy,
    Nikkei,
}

impl Ticker {
    /// All tickers in display order.
    pub const ALL: [Ticker; 12] = [
        Ticker::Bank,
        Ticker::Semi,
        Ticker::Auto,
        Ticker::Pharma,
        Ticker::Nitori,
        Ticker::Util,
        Ticker::Air,
        Ticker::Game,
        Ticker::Eneos,
        Ticker::Gold,
        Ticker::Usdjpy,
        Ticker::Nikkei,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ticker::Bank => "BANK",
            Ticker::Semi => "SEMI",
            Ticker::Auto => "AUTO",
            Ticker::Pharma => "PHARMA",
            Ticker::Nitori => "NITORI",
            Ticker::Util => "UTIL",
            Ticker::Air => "AIR",
            Ticker::Game => "GAME",
            Ticker::Eneos => "ENEOS",
            Ticker::Gold => "GOLD",
            Ticker::Usdjpy => "USDJPY",
            Ticker::Nikkei => "NIKKEI",
        }
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Ticker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Ticker::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| format!("Unknown instrument: {}", s))
    }
}

/// Macro role an instrument plays in the cross-asset model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroRole {
    /// Exchange rate feeding export- and commodity-sensitive instruments
    CurrencyDriver,
    /// Energy price feeding energy-sensitive instruments
    EnergyDriver,
    /// Weighted composite of the other instruments
    CompositeIndex,
}

/// Static definition of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub ticker: Ticker,
    pub display_name: &'static str,
    /// Starting price for every session
    pub initial_price: f64,
    /// Standard deviation of the per-tick fractional noise
    pub volatility: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MacroRole>,
    /// Share of the currency driver's change passed through each tick
    pub currency_weight: f64,
    /// Share of the energy driver's change passed through each tick
    pub energy_weight: f64,
    /// Weight inside the composite index (0 = excluded)
    pub index_weight: f64,
}

impl Instrument {
    /// Plain equity with no cross-asset links.
    pub fn new(
        ticker: Ticker,
        display_name: &'static str,
        initial_price: f64,
        volatility: f64,
    ) -> Self {
        Self {
            ticker,
            display_name,
            initial_price,
            volatility,
            role: None,
            currency_weight: 0.0,
            energy_weight: 0.0,
            index_weight: 0.0,
        }
    }

    pub fn with_role(mut self, role: MacroRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_currency_weight(mut self, weight: f64) -> Self {
        self.currency_weight = weight;
        self
    }

    pub fn with_energy_weight(mut self, weight: f64) -> Self {
        self.energy_weight = weight;
        self
    }

    pub fn with_index_weight(mut self, weight: f64) -> Self {
        self.index_weight = weight;
        self
    }

    pub fn is_composite(&self) -> bool {
        self.role == Some(MacroRole::CompositeIndex)
    }
}
