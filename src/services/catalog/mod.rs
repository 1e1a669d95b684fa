//! Instrument Catalog
//!
//! Static game data: the instrument list with its cross-asset weights, the
//! event catalog, the story routes and the business calendar. Loaded once at
//! startup and validated before the server accepts connections.

mod calendar;
mod events;
mod routes;

pub use calendar::BusinessCalendar;
pub use events::{builtin_events, draw_finance_ministry_remark, draw_rating_change};
pub use routes::builtin_routes;

use std::collections::HashSet;
use thiserror::Error;

use crate::types::{EventDefinition, Instrument, MacroRole, Magnitude, StoryRoute, Ticker};

/// Last story-only event; everything after it may fire at random.
pub const RANDOM_POOL_BOUNDARY: &str = "defense_budget_increase";

/// Load-time catalog violations.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate instrument: {0}")]
    DuplicateInstrument(Ticker),

    #[error("Invalid instrument {ticker}: {reason}")]
    InvalidInstrument { ticker: Ticker, reason: String },

    #[error("{context} references unlisted instrument {ticker}")]
    UnknownInstrument { context: String, ticker: Ticker },

    #[error("Duplicate event id: {0}")]
    DuplicateEvent(String),

    #[error("Invalid effect in event {event}: {reason}")]
    InvalidEffect { event: String, reason: String },

    #[error("Route {route} day {day} references unknown event {event}")]
    UnknownRouteEvent {
        route: String,
        day: usize,
        event: String,
    },

    #[error("Random pool boundary {0} is not a catalog event")]
    UnknownBoundary(String),

    #[error("More than one instrument has role {0:?}")]
    DuplicateRole(MacroRole),

    #[error("Cross weights require a {0:?} instrument")]
    MissingRole(MacroRole),

    #[error("Composite index has no weighted constituents")]
    EmptyIndex,

    #[error("No story routes defined")]
    NoRoutes,

    #[error("Business calendar is empty")]
    EmptyCalendar,
}

/// Static game data.
#[derive(Debug, Clone)]
pub struct Catalog {
    instruments: Vec<Instrument>,
    events: Vec<EventDefinition>,
    routes: Vec<StoryRoute>,
    boundary: String,
    calendar: BusinessCalendar,
}

impl Catalog {
    pub fn new(
        instruments: Vec<Instrument>,
        events: Vec<EventDefinition>,
        routes: Vec<StoryRoute>,
        boundary: impl Into<String>,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            instruments,
            events,
            routes,
            boundary: boundary.into(),
            calendar,
        }
    }

    /// The shipped game: twelve instruments, the full event list, five routes
    /// and the 2026 Tokyo calendar.
    pub fn builtin() -> Self {
        Self::new(
            builtin_instruments(),
            builtin_events(),
            builtin_routes(),
            RANDOM_POOL_BOUNDARY,
            BusinessCalendar::tokyo_2026(),
        )
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn instrument(&self, ticker: Ticker) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.ticker == ticker)
    }

    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&EventDefinition> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn routes(&self) -> &[StoryRoute] {
        &self.routes
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// Indices of events strictly after the boundary entry.
    pub fn random_pool(&self) -> Vec<usize> {
        match self.events.iter().position(|e| e.id == self.boundary) {
            Some(pos) => (pos + 1..self.events.len()).collect(),
            None => Vec::new(),
        }
    }

    pub fn with_role(&self, role: MacroRole) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.role == Some(role))
    }

    /// Check every cross reference. The server refuses to start on failure.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut listed = HashSet::new();
        for inst in &self.instruments {
            if !listed.insert(inst.ticker) {
                return Err(CatalogError::DuplicateInstrument(inst.ticker));
            }
            if !(inst.initial_price.is_finite() && inst.initial_price > 0.0) {
                return Err(CatalogError::InvalidInstrument {
                    ticker: inst.ticker,
                    reason: format!("initial price {} must be positive", inst.initial_price),
                });
            }
            if !(inst.volatility.is_finite() && inst.volatility >= 0.0) {
                return Err(CatalogError::InvalidInstrument {
                    ticker: inst.ticker,
                    reason: format!("volatility {} must be non-negative", inst.volatility),
                });
            }
        }

        for role in [
            MacroRole::CurrencyDriver,
            MacroRole::EnergyDriver,
            MacroRole::CompositeIndex,
        ] {
            let count = self
                .instruments
                .iter()
                .filter(|i| i.role == Some(role))
                .count();
            if count > 1 {
                return Err(CatalogError::DuplicateRole(role));
            }
        }

        let uses_currency = self.instruments.iter().any(|i| i.currency_weight != 0.0);
        if uses_currency && self.with_role(MacroRole::CurrencyDriver).is_none() {
            return Err(CatalogError::MissingRole(MacroRole::CurrencyDriver));
        }
        let uses_energy = self.instruments.iter().any(|i| i.energy_weight != 0.0);
        if uses_energy && self.with_role(MacroRole::EnergyDriver).is_none() {
            return Err(CatalogError::MissingRole(MacroRole::EnergyDriver));
        }
        if self.with_role(MacroRole::CompositeIndex).is_some() {
            let total: f64 = self
                .instruments
                .iter()
                .filter(|i| !i.is_composite())
                .map(|i| i.index_weight)
                .sum();
            if total == 0.0 {
                return Err(CatalogError::EmptyIndex);
            }
        }

        let mut ids = HashSet::new();
        for event in &self.events {
            if !ids.insert(event.id) {
                return Err(CatalogError::DuplicateEvent(event.id.to_string()));
            }
            for effect in &event.effects {
                if !listed.contains(&effect.ticker) {
                    return Err(CatalogError::UnknownInstrument {
                        context: format!("Event {}", event.id),
                        ticker: effect.ticker,
                    });
                }
                if !(effect.amplitude.is_finite() && effect.amplitude > 0.0) {
                    return Err(CatalogError::InvalidEffect {
                        event: event.id.to_string(),
                        reason: format!("amplitude {} must be positive", effect.amplitude),
                    });
                }
                if let Magnitude::Fixed(k) = effect.magnitude {
                    if !k.is_finite() {
                        return Err(CatalogError::InvalidEffect {
                            event: event.id.to_string(),
                            reason: format!("magnitude {} must be finite", k),
                        });
                    }
                }
            }
        }

        if self.routes.is_empty() {
            return Err(CatalogError::NoRoutes);
        }
        for route in &self.routes {
            for (day, event_id) in &route.beats {
                if !ids.contains(event_id) {
                    return Err(CatalogError::UnknownRouteEvent {
                        route: route.name.to_string(),
                        day: *day,
                        event: event_id.to_string(),
                    });
                }
            }
        }

        if !ids.contains(self.boundary.as_str()) {
            return Err(CatalogError::UnknownBoundary(self.boundary.clone()));
        }

        if self.calendar.is_empty() {
            return Err(CatalogError::EmptyCalendar);
        }

        Ok(())
    }
}

/// Twelve instruments with their volatility and cross weights.
pub fn builtin_instruments() -> Vec<Instrument> {
    vec![
        Instrument::new(Ticker::Bank, "Megabank", 2300.0, 0.02).with_index_weight(2.0),
        Instrument::new(Ticker::Semi, "Semiconductor", 12000.0, 0.025)
            .with_currency_weight(1.6)
            .with_index_weight(3.0),
        Instrument::new(Ticker::Auto, "Automaker", 2600.0, 0.018)
            .with_currency_weight(2.4)
            .with_index_weight(2.5),
        Instrument::new(Ticker::Pharma, "Pharmaceutical", 4500.0, 0.015).with_index_weight(1.5),
        Instrument::new(Ticker::Nitori, "Home Retail", 5000.0, 0.017)
            .with_currency_weight(-1.0)
            .with_index_weight(0.5),
        Instrument::new(Ticker::Util, "Power Utility", 600.0, 0.014)
            .with_energy_weight(-0.3)
            .with_index_weight(0.5),
        Instrument::new(Ticker::Air, "Airline", 3200.0, 0.022)
            .with_energy_weight(-0.6)
            .with_index_weight(0.5),
        Instrument::new(Ticker::Game, "Game Maker", 6000.0, 0.023)
            .with_currency_weight(1.2)
            .with_index_weight(1.0),
        Instrument::new(Ticker::Eneos, "Oil Refiner", 1200.0, 0.024)
            .with_role(MacroRole::EnergyDriver)
            .with_currency_weight(1.0)
            .with_index_weight(1.0),
        Instrument::new(Ticker::Gold, "Gold", 20000.0, 0.018),
        Instrument::new(Ticker::Usdjpy, "USD/JPY", 150.0, 0.003)
            .with_role(MacroRole::CurrencyDriver),
        Instrument::new(Ticker::Nikkei, "Nikkei 225", 40000.0, 0.0)
            .with_role(MacroRole::CompositeIndex),
    ]
}
