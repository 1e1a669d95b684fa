//! Event Scheduler
//!
//! Picks one story route per session and, on days without a story beat,
//! rolls for a random event from the pool after the catalog boundary.

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::services::catalog::Catalog;
use crate::types::ResolvedEvent;

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Uninitialized,
    StorySelected,
    Running,
    Ended,
}

/// Where a triggered event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Story,
    Random,
}

/// Event fired by one scheduler step, magnitudes already drawn.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub source: EventSource,
    pub event: ResolvedEvent,
}

#[derive(Debug, Clone)]
pub struct EventScheduler {
    phase: SchedulerPhase,
    route: Option<usize>,
    pool: Vec<usize>,
    probability: f64,
}

impl EventScheduler {
    pub fn new(probability: f64) -> Self {
        Self {
            phase: SchedulerPhase::Uninitialized,
            route: None,
            pool: Vec::new(),
            probability,
        }
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn route_index(&self) -> Option<usize> {
        self.route
    }

    pub fn route_name<'a>(&self, catalog: &'a Catalog) -> Option<&'a str> {
        self.route
            .and_then(|i| catalog.routes().get(i))
            .map(|r| r.name)
    }

    pub fn pool(&self) -> &[usize] {
        &self.pool
    }

    /// Draw the route and compute the random pool. No-op once selected.
    pub fn select_story(&mut self, catalog: &Catalog, rng: &mut StdRng) {
        if self.phase != SchedulerPhase::Uninitialized {
            return;
        }
        let routes = catalog.routes();
        self.route = if routes.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..routes.len()))
        };
        self.pool = catalog.random_pool();
        self.phase = SchedulerPhase::StorySelected;

        info!(
            "Story route selected: {} ({} random-eligible events)",
            self.route_name(catalog).unwrap_or("none"),
            self.pool.len()
        );
    }

    /// Run one business day. A story beat pre-empts the random roll.
    pub fn step(
        &mut self,
        catalog: &Catalog,
        day_index: usize,
        rng: &mut StdRng,
    ) -> Option<ScheduledEvent> {
        match self.phase {
            SchedulerPhase::Ended => return None,
            SchedulerPhase::Uninitialized => self.select_story(catalog, rng),
            _ => {}
        }
        self.phase = SchedulerPhase::Running;

        let beat = self
            .route
            .and_then(|i| catalog.routes().get(i))
            .and_then(|r| r.event_for_day(day_index));

        if let Some(event_id) = beat {
            let definition = catalog.event(event_id)?;
            debug!("Story beat on day {}: {}", day_index, event_id);
            return Some(ScheduledEvent {
                source: EventSource::Story,
                event: definition.resolve(rng),
            });
        }

        let roll: f64 = rng.gen();
        if roll >= self.probability || self.pool.is_empty() {
            return None;
        }
        let pick = self.pool[rng.gen_range(0..self.pool.len())];
        let definition = catalog.events().get(pick)?;
        debug!("Random event on day {}: {}", day_index, definition.id);
        Some(ScheduledEvent {
            source: EventSource::Random,
            event: definition.resolve(rng),
        })
    }

    pub fn finish(&mut self) {
        self.phase = SchedulerPhase::Ended;
    }

    /// Forget the route and pool; the next start draws again.
    pub fn reset(&mut self) {
        self.phase = SchedulerPhase::Uninitialized;
        self.route = None;
        self.pool.clear();
    }
}
