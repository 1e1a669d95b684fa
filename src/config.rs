use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::price_engine::PriceParams;
use crate::services::session::SessionSettings;

/// Game simulation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Wall-clock tick period (ms).
    pub tick_ms: u64,
    /// Ticks per business day.
    pub ticks_per_day: u64,
    /// Starting cash for every player.
    pub initial_capital: f64,
    /// Chance of a random event on a day without a story beat.
    pub random_event_probability: f64,
    /// Ticks an event stays active.
    pub event_horizon_ticks: u32,
    /// Minimum price of any instrument.
    pub price_floor: f64,
    /// Absolute per-tick drift of the currency driver.
    pub fx_drift: f64,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_ms: 3000,
            ticks_per_day: 1,
            initial_capital: 100_000_000.0,
            random_event_probability: 0.07,
            event_horizon_ticks: 10,
            price_floor: 0.001,
            fx_drift: 0.10,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            initial_capital: self.initial_capital,
            random_event_probability: self.random_event_probability,
            ticks_per_day: self.ticks_per_day,
            price: PriceParams {
                horizon: self.event_horizon_ticks,
                floor: self.price_floor,
                fx_drift: self.fx_drift,
            },
            seed: self.seed,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Capacity of the game event broadcast channel.
    pub broadcast_capacity: usize,
    /// Simulation settings.
    pub game: GameConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            broadcast_capacity: 1024,
            game: GameConfig::default(),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = GameConfig::default();

        let game = GameConfig {
            tick_ms: parse_or(&lookup, "TICK_MS", defaults.tick_ms).max(1),
            ticks_per_day: parse_or(&lookup, "TICKS_PER_DAY", defaults.ticks_per_day).max(1),
            initial_capital: positive_or(
                parse_or(&lookup, "INITIAL_CAPITAL", defaults.initial_capital),
                defaults.initial_capital,
            ),
            random_event_probability: finite_or(
                parse_or(
                    &lookup,
                    "RANDOM_EVENT_PROB",
                    defaults.random_event_probability,
                ),
                defaults.random_event_probability,
            )
            .clamp(0.0, 1.0),
            event_horizon_ticks: parse_or(
                &lookup,
                "EVENT_HORIZON_TICKS",
                defaults.event_horizon_ticks,
            )
            .max(1),
            price_floor: positive_or(
                parse_or(&lookup, "PRICE_FLOOR", defaults.price_floor),
                defaults.price_floor,
            ),
            fx_drift: finite_or(
                parse_or(&lookup, "FX_DRIFT", defaults.fx_drift),
                defaults.fx_drift,
            ),
            seed: lookup("SIM_SEED").and_then(|v| v.trim().parse().ok()),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            broadcast_capacity: parse_or(&lookup, "BROADCAST_CAPACITY", 1024usize).max(1),
            game,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
