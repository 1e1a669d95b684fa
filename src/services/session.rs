//! Game Session
//!
//! All mutable game state in one place: prices, active events, the news log,
//! the scheduler, players and their fills. The orchestrator owns a session
//! behind a single mutex; each tick and each order runs to completion under it.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::services::catalog::Catalog;
use crate::services::price_engine::{MarketState, PriceEngine, PriceEngineError, PriceParams};
use crate::services::scheduler::{EventScheduler, EventSource, SchedulerPhase};
use crate::services::trading::{TradingEngine, TradingError};
use crate::types::{
    ActiveEvent, DateSnapshot, Fill, LeaderboardEntry, NewsEntry, OrderResponse, Player,
    ResolvedEvent, StateSnapshot, TickSnapshot, TradeSide,
};

/// Tick-level failures. Any of these stops the game loop.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Price update failed: {0}")]
    Price(#[from] PriceEngineError),

    #[error("Game is over; reset before starting again")]
    GameOver,

    #[error("Session lock poisoned")]
    LockPoisoned,
}

/// Knobs the session needs from configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub initial_capital: f64,
    pub random_event_probability: f64,
    pub ticks_per_day: u64,
    pub price: PriceParams,
    /// Fixed seed; advanced by one for every reset
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            initial_capital: 100_000_000.0,
            random_event_probability: 0.07,
            ticks_per_day: 1,
            price: PriceParams::default(),
            seed: None,
        }
    }
}

/// Everything one tick produced, for broadcasting.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: TickSnapshot,
    pub date: Option<DateSnapshot>,
    pub news: Option<(ResolvedEvent, NewsEntry)>,
    pub players: BTreeMap<String, Player>,
    /// Players flagged bankrupt on this tick, with their equity
    pub bankruptcies: Vec<(String, f64)>,
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Not running (stopped, never started, or already ended)
    Idle,
    Advanced(TickReport),
    /// Calendar exhausted on this tick
    Ended(Vec<LeaderboardEntry>),
}

pub struct Session {
    catalog: Arc<Catalog>,
    settings: SessionSettings,
    rng: StdRng,
    generation: u64,
    engine: PriceEngine,
    trading: TradingEngine,
    scheduler: EventScheduler,
    market: MarketState,
    news: Vec<NewsEntry>,
    pending: Option<(ResolvedEvent, NewsEntry)>,
    players: BTreeMap<String, Player>,
    fills: BTreeMap<String, Vec<Fill>>,
    running: bool,
    finished: bool,
    tick: u64,
    day_index: Option<usize>,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, settings: SessionSettings) -> Self {
        let rng = Self::seeded_rng(settings.seed, 0);
        let market = MarketState::new(&catalog);
        Self {
            engine: PriceEngine::new(settings.price),
            trading: TradingEngine::new(settings.initial_capital),
            scheduler: EventScheduler::new(settings.random_event_probability),
            catalog,
            settings,
            rng,
            generation: 0,
            market,
            news: Vec::new(),
            pending: None,
            players: BTreeMap::new(),
            fills: BTreeMap::new(),
            running: false,
            finished: false,
            tick: 0,
            day_index: None,
        }
    }

    fn seeded_rng(seed: Option<u64>, generation: u64) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(generation)),
            None => StdRng::from_entropy(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn market(&self) -> &MarketState {
        &self.market
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn day_index(&self) -> Option<usize> {
        self.day_index
    }

    pub fn news(&self) -> &[NewsEntry] {
        &self.news
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn current_date(&self) -> Option<DateSnapshot> {
        self.day_index
            .and_then(|d| self.catalog.calendar().snapshot(d))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start the clock. Returns false when already running.
    pub fn start(&mut self) -> Result<bool, SessionError> {
        if self.finished {
            return Err(SessionError::GameOver);
        }
        if self.running {
            return Ok(false);
        }
        if self.scheduler.phase() == SchedulerPhase::Uninitialized {
            self.scheduler.select_story(&self.catalog, &mut self.rng);
        }
        self.running = true;
        info!("Game session started at tick {}", self.tick);
        Ok(true)
    }

    /// Halt without clearing state. Returns false when already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        info!("Game session stopped at tick {}", self.tick);
        true
    }

    /// Back to process-start state: initial prices, no players, no events.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.rng = Self::seeded_rng(self.settings.seed, self.generation);
        self.market = MarketState::new(&self.catalog);
        self.scheduler.reset();
        self.news.clear();
        self.pending = None;
        self.players.clear();
        self.fills.clear();
        self.running = false;
        self.finished = false;
        self.tick = 0;
        self.day_index = None;
        info!("Game session reset (generation {})", self.generation);
    }

    // =========================================================================
    // Tick
    // =========================================================================

    pub fn tick(&mut self) -> Result<TickOutcome, SessionError> {
        if !self.running || self.finished {
            return Ok(TickOutcome::Idle);
        }

        self.tick += 1;
        let ticks_per_day = self.settings.ticks_per_day.max(1);
        let new_day = self.day_index.is_none() || (self.tick - 1) % ticks_per_day == 0;

        if new_day {
            let next = self.day_index.map_or(0, |d| d + 1);
            if next >= self.catalog.calendar().len() {
                self.running = false;
                self.finished = true;
                self.scheduler.finish();
                info!("Calendar exhausted after {} ticks, game over", self.tick - 1);
                return Ok(TickOutcome::Ended(self.leaderboard()));
            }
            self.day_index = Some(next);

            if let Some(scheduled) = self.scheduler.step(&self.catalog, next, &mut self.rng) {
                self.trigger(scheduled.event, scheduled.source, next);
            }
        }

        self.engine
            .advance(&self.catalog, &mut self.market, &mut self.rng)?;
        self.trading.recompute_all(&mut self.players, &self.market);

        let mut bankruptcies = Vec::new();
        for player in self.players.values_mut() {
            if !player.bankrupt && player.total_value <= 0.0 {
                player.bankrupt = true;
                warn!(
                    "Player {} is bankrupt (equity {:.2})",
                    player.id, player.total_value
                );
                bankruptcies.push((player.id.clone(), player.total_value));
            }
        }

        Ok(TickOutcome::Advanced(TickReport {
            tick: self.tick_snapshot(),
            date: self.current_date(),
            news: self.pending.take(),
            players: self.players.clone(),
            bankruptcies,
        }))
    }

    fn trigger(&mut self, event: ResolvedEvent, source: EventSource, day_index: usize) {
        let now = Utc::now();
        let entry = NewsEntry {
            time: now.format("%H:%M:%S").to_string(),
            timestamp: now.timestamp_millis(),
            event_id: event.id.clone(),
            name: event.name.clone(),
            day_index: Some(day_index),
        };
        info!(
            "Event triggered ({:?}) on day {}: {}",
            source, day_index, event.id
        );
        self.market.push_event(ActiveEvent::new(event.clone()));
        self.news.push(entry.clone());
        self.pending = Some((event, entry));
    }

    // =========================================================================
    // Players
    // =========================================================================

    pub fn submit_order(
        &mut self,
        player_id: &str,
        instrument: &str,
        side: TradeSide,
        quantity: f64,
    ) -> Result<OrderResponse, TradingError> {
        let result = self.trading.execute_trade(
            &mut self.players,
            &self.market,
            player_id,
            instrument,
            side,
            quantity,
        );

        match result {
            Ok(fill) => {
                debug!(
                    "{} {} {} x{} @ {:.3}",
                    player_id, fill.side, fill.ticker, fill.filled_quantity, fill.price
                );
                self.fills
                    .entry(player_id.to_string())
                    .or_default()
                    .push(fill.clone());
                let player = self.player_snapshot(player_id);
                Ok(OrderResponse { player, fill })
            }
            Err(e) => {
                debug!("Order rejected for {}: {}", player_id, e);
                Err(e)
            }
        }
    }

    /// Current account for `player_id`, created on first reference.
    pub fn player_snapshot(&mut self, player_id: &str) -> Player {
        let prices = self.market.latest_prices();
        let capital = self.trading.initial_capital();
        let player = self.trading.player_entry(&mut self.players, player_id);
        crate::services::trading::revalue(player, &prices, capital);
        player.clone()
    }

    pub fn players(&self) -> &BTreeMap<String, Player> {
        &self.players
    }

    pub fn fills(&self, player_id: &str) -> &[Fill] {
        self.fills
            .get(player_id)
            .map(|f| f.as_slice())
            .unwrap_or(&[])
    }

    /// Players ranked by total value, highest first.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<&Player> = self.players.values().collect();
        ranked.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
        ranked
            .into_iter()
            .enumerate()
            .map(|(i, p)| LeaderboardEntry {
                rank: i + 1,
                player_id: p.id.clone(),
                total_value: p.total_value,
                pnl: p.pnl,
                bankrupt: p.bankrupt,
            })
            .collect()
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub fn tick_snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            tick: self.tick,
            prices: self.market.latest_prices(),
            active_events: self.market.active_events.len(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn state_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            running: self.running,
            tick: self.tick,
            prices: self.market.series.clone(),
            active_events: self.market.active_events.clone(),
            news: self.news.clone(),
            date: self.current_date(),
            story_route: self
                .scheduler
                .route_name(&self.catalog)
                .map(str::to_string),
            finished: self.finished,
        }
    }
}
