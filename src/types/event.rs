//! Market Event Types
//!
//! Event definitions from the catalog, their resolved (triggered) form, and the
//! decay curve that turns an active event into a per-tick price contribution.

use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::BTreeMap;

use super::Ticker;

/// Draw function for a randomized magnitude. Called exactly once per trigger.
pub type DrawFn = fn(&mut StdRng) -> f64;

/// Direction/magnitude of an effect.
#[derive(Debug, Clone, Copy)]
pub enum Magnitude {
    Fixed(f64),
    Randomized(DrawFn),
}

impl Magnitude {
    /// Resolve to a concrete number for one occurrence.
    pub fn resolve(&self, rng: &mut StdRng) -> f64 {
        match self {
            Magnitude::Fixed(k) => *k,
            Magnitude::Randomized(draw) => draw(rng),
        }
    }
}

/// One (instrument, amplitude, magnitude) tuple of an event definition.
#[derive(Debug, Clone)]
pub struct EffectSpec {
    pub ticker: Ticker,
    /// Tick at which the impulse peaks
    pub amplitude: f64,
    pub magnitude: Magnitude,
}

impl EffectSpec {
    pub fn fixed(ticker: Ticker, amplitude: f64, k: f64) -> Self {
        Self {
            ticker,
            amplitude,
            magnitude: Magnitude::Fixed(k),
        }
    }

    pub fn randomized(ticker: Ticker, amplitude: f64, draw: DrawFn) -> Self {
        Self {
            ticker,
            amplitude,
            magnitude: Magnitude::Randomized(draw),
        }
    }
}

/// Catalog entry for a named market event.
#[derive(Debug, Clone)]
pub struct EventDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub effects: Vec<EffectSpec>,
}

impl EventDefinition {
    /// Resolve every magnitude, producing the data stored on an active instance.
    pub fn resolve(&self, rng: &mut StdRng) -> ResolvedEvent {
        ResolvedEvent {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            effects: self
                .effects
                .iter()
                .map(|e| ResolvedEffect {
                    ticker: e.ticker,
                    amplitude: e.amplitude,
                    k: e.magnitude.resolve(rng),
                })
                .collect(),
        }
    }
}

/// Effect tuple with its magnitude fixed for this occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEffect {
    pub ticker: Ticker,
    pub amplitude: f64,
    pub k: f64,
}

/// A triggered event, fully numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEvent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub effects: Vec<ResolvedEffect>,
}

/// A triggered event still inside its decay horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEvent {
    pub elapsed_ticks: u32,
    pub event: ResolvedEvent,
}

impl ActiveEvent {
    pub fn new(event: ResolvedEvent) -> Self {
        Self {
            elapsed_ticks: 0,
            event,
        }
    }
}

/// News log line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEntry {
    /// Wall-clock time, HH:MM:SS
    pub time: String,
    /// Unix timestamp (ms)
    pub timestamp: i64,
    pub event_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_index: Option<usize>,
}

/// Pre-authored timeline of events keyed by business-day index.
#[derive(Debug, Clone)]
pub struct StoryRoute {
    pub name: &'static str,
    pub beats: BTreeMap<usize, &'static str>,
}

impl StoryRoute {
    pub fn new(name: &'static str, beats: &[(usize, &'static str)]) -> Self {
        Self {
            name,
            beats: beats.iter().copied().collect(),
        }
    }

    pub fn event_for_day(&self, day_index: usize) -> Option<&'static str> {
        self.beats.get(&day_index).copied()
    }
}

/// Tent-shaped impulse response `k * (t/a) * exp(-t/a)`, zero past the horizon.
pub fn impulse(amplitude: f64, k: f64, elapsed: u32, horizon: u32) -> f64 {
    if elapsed > horizon || amplitude <= 0.0 {
        return 0.0;
    }
    let x = elapsed as f64 / amplitude;
    k * x * (-x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn coin(rng: &mut StdRng) -> f64 {
        use rand::Rng;
        rng.gen_range(-1.0..1.0)
    }

    #[test]
    fn test_impulse_peaks_at_amplitude() {
        let a = 3.0;
        let peak = impulse(a, 1.0, 3, 10);
        for t in 0..=10 {
            assert!(impulse(a, 1.0, t, 10) <= peak + 1e-12);
        }
        assert!((peak - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_impulse_zero_at_start_and_past_horizon() {
        assert_eq!(impulse(2.0, 0.5, 0, 10), 0.0);
        assert_eq!(impulse(2.0, 0.5, 11, 10), 0.0);
        assert!(impulse(2.0, 0.5, 10, 10) > 0.0);
    }

    #[test]
    fn test_impulse_sign_follows_k() {
        assert!(impulse(2.0, -0.3, 2, 10) < 0.0);
        assert!(impulse(2.0, 0.3, 2, 10) > 0.0);
    }

    #[test]
    fn test_resolve_fixes_randomized_magnitude_once() {
        let def = EventDefinition {
            id: "test",
            name: "Test",
            description: "",
            effects: vec![
                EffectSpec::fixed(Ticker::Bank, 2.0, 0.1),
                EffectSpec::randomized(Ticker::Gold, 1.0, coin),
            ],
        };
        let mut rng = StdRng::seed_from_u64(7);
        let resolved = def.resolve(&mut rng);
        assert_eq!(resolved.effects[0].k, 0.1);
        let drawn = resolved.effects[1].k;
        assert!((-1.0..1.0).contains(&drawn));

        // Cloning the resolved event never re-draws
        let copy = resolved.clone();
        assert_eq!(copy.effects[1].k, drawn);
    }

    #[test]
    fn test_story_route_lookup() {
        let route = StoryRoute::new("test", &[(3, "a"), (10, "b")]);
        assert_eq!(route.event_for_day(3), Some("a"));
        assert_eq!(route.event_for_day(4), None);
    }
}
