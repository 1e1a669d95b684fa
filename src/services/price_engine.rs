//! Price Engine
//!
//! Advances every price series by one tick. The change for each instrument is
//! Gaussian noise plus the decaying contribution of active events plus its
//! share of the currency and energy drivers. The composite index moves by the
//! weighted average of its constituents.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::services::catalog::Catalog;
use crate::types::{impulse, ActiveEvent, MacroRole, PriceSeries, Ticker};

#[derive(Debug, Error, PartialEq)]
pub enum PriceEngineError {
    #[error("Price series for {0} is empty")]
    EmptySeries(Ticker),

    #[error("Non-finite price computed for {0}")]
    NonFinitePrice(Ticker),
}

/// Numeric parameters of the tick update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceParams {
    /// Ticks an event instance stays active
    pub horizon: u32,
    /// Lowest price any series may reach
    pub floor: f64,
    /// Absolute per-tick drift of the currency driver
    pub fx_drift: f64,
}

impl Default for PriceParams {
    fn default() -> Self {
        Self {
            horizon: 10,
            floor: 0.001,
            fx_drift: 0.10,
        }
    }
}

/// Price histories and the active-event set.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketState {
    pub series: BTreeMap<Ticker, PriceSeries>,
    pub active_events: Vec<ActiveEvent>,
}

impl MarketState {
    /// One initial entry per instrument, no events.
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            series: catalog
                .instruments()
                .iter()
                .map(|i| (i.ticker, PriceSeries::new(i.initial_price)))
                .collect(),
            active_events: Vec::new(),
        }
    }

    pub fn last_price(&self, ticker: Ticker) -> Option<f64> {
        self.series.get(&ticker).and_then(|s| s.last())
    }

    pub fn latest_prices(&self) -> BTreeMap<Ticker, f64> {
        self.series
            .iter()
            .filter_map(|(t, s)| s.last().map(|p| (*t, p)))
            .collect()
    }

    pub fn push_event(&mut self, event: ActiveEvent) {
        self.active_events.push(event);
    }
}

/// Fractional change applied to each instrument on the last tick.
pub type TickChanges = BTreeMap<Ticker, f64>;

#[derive(Debug, Clone)]
pub struct PriceEngine {
    params: PriceParams,
}

impl PriceEngine {
    pub fn new(params: PriceParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PriceParams {
        &self.params
    }

    /// Sum of active-event impulses per instrument. Ages every instance by one
    /// tick and drops those past the horizon.
    pub fn decay_events(&self, market: &mut MarketState) -> BTreeMap<Ticker, f64> {
        let horizon = self.params.horizon;
        let mut contribution: BTreeMap<Ticker, f64> = BTreeMap::new();

        market.active_events.retain_mut(|active| {
            active.elapsed_ticks += 1;
            if active.elapsed_ticks > horizon {
                return false;
            }
            for effect in &active.event.effects {
                *contribution.entry(effect.ticker).or_insert(0.0) +=
                    impulse(effect.amplitude, effect.k, active.elapsed_ticks, horizon);
            }
            true
        });

        contribution
    }

    /// Advance every series by one tick.
    pub fn advance(
        &self,
        catalog: &Catalog,
        market: &mut MarketState,
        rng: &mut StdRng,
    ) -> Result<TickChanges, PriceEngineError> {
        let mut noise: BTreeMap<Ticker, f64> = BTreeMap::new();
        for inst in catalog.instruments() {
            if inst.is_composite() {
                continue;
            }
            let z: f64 = rng.sample(StandardNormal);
            noise.insert(inst.ticker, z * inst.volatility);
        }

        let events = self.decay_events(market);
        let own = |t: Ticker| {
            noise.get(&t).copied().unwrap_or(0.0) + events.get(&t).copied().unwrap_or(0.0)
        };

        let mut changes = TickChanges::new();

        let currency = catalog.with_role(MacroRole::CurrencyDriver);
        let fx_change = match currency {
            Some(driver) => {
                let last = market
                    .last_price(driver.ticker)
                    .ok_or(PriceEngineError::EmptySeries(driver.ticker))?;
                let change = own(driver.ticker) + self.params.fx_drift / last;
                changes.insert(driver.ticker, change);
                change
            }
            None => 0.0,
        };

        let energy = catalog.with_role(MacroRole::EnergyDriver);
        let energy_change = match energy {
            Some(driver) => {
                let change = own(driver.ticker) + driver.currency_weight * fx_change;
                changes.insert(driver.ticker, change);
                change
            }
            None => 0.0,
        };

        for inst in catalog.instruments() {
            if inst.role.is_some() {
                continue;
            }
            let change = own(inst.ticker)
                + inst.currency_weight * fx_change
                + inst.energy_weight * energy_change;
            changes.insert(inst.ticker, change);
        }

        if let Some(index) = catalog.with_role(MacroRole::CompositeIndex) {
            let (weighted, total) = catalog
                .instruments()
                .iter()
                .filter(|i| !i.is_composite() && i.index_weight != 0.0)
                .fold((0.0, 0.0), |(sum, w), i| {
                    let c = changes.get(&i.ticker).copied().unwrap_or(0.0);
                    (sum + i.index_weight * c, w + i.index_weight)
                });
            let average = if total != 0.0 { weighted / total } else { 0.0 };
            changes.insert(index.ticker, average + own(index.ticker));
        }

        // Nothing is appended unless every instrument has a valid next price
        let mut next_prices = Vec::with_capacity(changes.len());
        for (ticker, change) in &changes {
            let last = market
                .last_price(*ticker)
                .ok_or(PriceEngineError::EmptySeries(*ticker))?;
            let raw = last * (1.0 + change);
            if !change.is_finite() || !raw.is_finite() {
                return Err(PriceEngineError::NonFinitePrice(*ticker));
            }
            next_prices.push((*ticker, raw.max(self.params.floor)));
        }
        for (ticker, next) in next_prices {
            if let Some(series) = market.series.get_mut(&ticker) {
                series.push(next);
            }
        }

        Ok(changes)
    }
}

impl Default for PriceEngine {
    fn default() -> Self {
        Self::new(PriceParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::{
        builtin_events, builtin_instruments, builtin_routes, BusinessCalendar,
        RANDOM_POOL_BOUNDARY,
    };
    use crate::types::{ActiveEvent, ResolvedEffect, ResolvedEvent};
    use rand::SeedableRng;

    /// Builtin catalog with every volatility zeroed.
    fn quiet_catalog() -> Catalog {
        let instruments = builtin_instruments()
            .into_iter()
            .map(|mut i| {
                i.volatility = 0.0;
                i
            })
            .collect();
        Catalog::new(
            instruments,
            builtin_events(),
            builtin_routes(),
            RANDOM_POOL_BOUNDARY,
            BusinessCalendar::tokyo_2026(),
        )
    }

    fn single_effect(ticker: Ticker, amplitude: f64, k: f64) -> ActiveEvent {
        ActiveEvent::new(ResolvedEvent {
            id: "test".to_string(),
            name: "Test".to_string(),
            description: String::new(),
            effects: vec![ResolvedEffect {
                ticker,
                amplitude,
                k,
            }],
        })
    }

    #[test]
    fn test_currency_drift_without_noise() {
        let catalog = quiet_catalog();
        let mut market = MarketState::new(&catalog);
        let mut rng = StdRng::seed_from_u64(1);
        let engine = PriceEngine::default();

        let changes = engine.advance(&catalog, &mut market, &mut rng).unwrap();
        let fx = 0.10 / 150.0;
        assert!((changes[&Ticker::Usdjpy] - fx).abs() < 1e-12);
        assert!((market.last_price(Ticker::Usdjpy).unwrap() - 150.1).abs() < 1e-9);
        assert!((changes[&Ticker::Auto] - 2.4 * fx).abs() < 1e-12);
        assert!((changes[&Ticker::Nitori] + fx).abs() < 1e-12);
        assert_eq!(changes[&Ticker::Bank], 0.0);
        assert_eq!(changes[&Ticker::Gold], 0.0);
    }

    #[test]
    fn test_energy_driver_feeds_sensitive_instruments() {
        let catalog = quiet_catalog();
        let mut market = MarketState::new(&catalog);
        let mut rng = StdRng::seed_from_u64(1);
        let engine = PriceEngine::default();

        let changes = engine.advance(&catalog, &mut market, &mut rng).unwrap();
        let energy = changes[&Ticker::Eneos];
        assert!((changes[&Ticker::Air] + 0.6 * energy).abs() < 1e-12);
        assert!((changes[&Ticker::Util] + 0.3 * energy).abs() < 1e-12);
    }

    #[test]
    fn test_composite_is_weighted_average() {
        let catalog = quiet_catalog();
        let mut market = MarketState::new(&catalog);
        let mut rng = StdRng::seed_from_u64(3);
        let engine = PriceEngine::default();

        let changes = engine.advance(&catalog, &mut market, &mut rng).unwrap();
        let (num, den) = catalog
            .instruments()
            .iter()
            .filter(|i| !i.is_composite() && i.index_weight != 0.0)
            .fold((0.0, 0.0), |(n, d), i| {
                (n + i.index_weight * changes[&i.ticker], d + i.index_weight)
            });
        assert!((changes[&Ticker::Nikkei] - num / den).abs() < 1e-12);
    }

    #[test]
    fn test_event_on_composite_adds_directly() {
        let catalog = quiet_catalog();
        let mut with_event = MarketState::new(&catalog);
        let mut without = MarketState::new(&catalog);
        with_event.push_event(single_effect(Ticker::Nikkei, 2.0, 0.12));
        let engine = PriceEngine::default();

        let a = engine
            .advance(&catalog, &mut with_event, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = engine
            .advance(&catalog, &mut without, &mut StdRng::seed_from_u64(9))
            .unwrap();
        let expected = impulse(2.0, 0.12, 1, 10);
        assert!((a[&Ticker::Nikkei] - b[&Ticker::Nikkei] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_event_expires_after_horizon() {
        let catalog = quiet_catalog();
        let mut market = MarketState::new(&catalog);
        market.push_event(single_effect(Ticker::Gold, 3.0, 0.5));
        let engine = PriceEngine::default();
        let mut rng = StdRng::seed_from_u64(5);

        for tick in 1..=10 {
            let changes = engine.advance(&catalog, &mut market, &mut rng).unwrap();
            assert_eq!(market.active_events.len(), 1);
            assert!((changes[&Ticker::Gold] - impulse(3.0, 0.5, tick, 10)).abs() < 1e-12);
        }

        let changes = engine.advance(&catalog, &mut market, &mut rng).unwrap();
        assert!(market.active_events.is_empty());
        assert_eq!(changes[&Ticker::Gold], 0.0);
    }

    #[test]
    fn test_prices_respect_floor() {
        let catalog = quiet_catalog();
        let mut market = MarketState::new(&catalog);
        market.push_event(single_effect(Ticker::Bank, 1.0, -50.0));
        let engine = PriceEngine::default();
        let mut rng = StdRng::seed_from_u64(5);

        engine.advance(&catalog, &mut market, &mut rng).unwrap();
        assert_eq!(market.last_price(Ticker::Bank), Some(0.001));
    }

    #[test]
    fn test_every_price_positive_over_long_run() {
        let catalog = Catalog::builtin();
        let mut market = MarketState::new(&catalog);
        let engine = PriceEngine::default();
        let mut rng = StdRng::seed_from_u64(2026);

        for _ in 0..500 {
            engine.advance(&catalog, &mut market, &mut rng).unwrap();
        }
        for series in market.series.values() {
            assert_eq!(series.len(), 501);
            assert!(series.as_slice().iter().all(|p| *p > 0.0));
        }
    }

    #[test]
    fn test_nan_change_fails_instead_of_clamping() {
        let catalog = quiet_catalog();
        let mut market = MarketState::new(&catalog);
        market.push_event(single_effect(Ticker::Semi, 2.0, f64::NAN));
        let engine = PriceEngine::default();
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(
            engine.advance(&catalog, &mut market, &mut rng),
            Err(PriceEngineError::NonFinitePrice(Ticker::Semi))
        );
        // No series moved on the failed tick
        assert!(market.series.values().all(|s| s.len() == 1));
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let catalog = quiet_catalog();
        let mut market = MarketState::new(&catalog);
        market.series.insert(Ticker::Usdjpy, PriceSeries::empty());
        let engine = PriceEngine::default();
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(
            engine.advance(&catalog, &mut market, &mut rng),
            Err(PriceEngineError::EmptySeries(Ticker::Usdjpy))
        );
    }
}
