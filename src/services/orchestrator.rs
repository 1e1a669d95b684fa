//! Game Server
//!
//! Drives a session with a fixed-period tick loop and fans the results out
//! over a broadcast channel. Start/stop/reset mirror the operator commands.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::services::session::{Session, SessionError, TickOutcome};
use crate::services::trading::TradingError;
use crate::types::{OrderResponse, ServerMessage, TradeSide};

/// Running tick loop.
struct ActiveLoop {
    handle: JoinHandle<()>,
    cancel: Arc<AtomicBool>,
}

pub struct GameServer {
    session: Mutex<Session>,
    events: broadcast::Sender<ServerMessage>,
    tick_interval: Duration,
    active: Mutex<Option<ActiveLoop>>,
}

impl GameServer {
    pub fn new(session: Session, tick_interval: Duration, capacity: usize) -> Arc<Self> {
        let (events, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self {
            session: Mutex::new(session),
            events,
            tick_interval,
            active: Mutex::new(None),
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.events.subscribe()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>, SessionError> {
        self.session.lock().map_err(|_| SessionError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> Result<R, SessionError> {
        let mut session = self.lock()?;
        Ok(f(&mut session))
    }

    fn publish(&self, msg: ServerMessage) {
        // No receivers is fine: nobody is connected yet.
        let _ = self.events.send(msg);
    }

    pub fn is_running(&self) -> bool {
        self.lock().map(|s| s.is_running()).unwrap_or(false)
    }

    // =========================================================================
    // Operator commands
    // =========================================================================

    // Every publish below happens under the session guard, so subscribers
    // see messages in the same order the session changed.

    /// Start the session and the tick loop. Idempotent.
    pub fn start(self: &Arc<Self>) -> Result<bool, SessionError> {
        let started = {
            let mut session = self.lock()?;
            let started = session.start()?;
            if started {
                self.publish(ServerMessage::GameStart {
                    timestamp: Utc::now().timestamp_millis(),
                });
            }
            started
        };
        self.ensure_loop();
        Ok(started)
    }

    /// Halt the loop; state is kept.
    pub fn stop(&self) -> Result<bool, SessionError> {
        let stopped = {
            let mut session = self.lock()?;
            let stopped = session.stop();
            if stopped {
                self.publish(ServerMessage::GameStop {
                    timestamp: Utc::now().timestamp_millis(),
                });
            }
            stopped
        };
        self.cancel_loop();
        Ok(stopped)
    }

    /// Stop and clear everything, then announce the cleared state.
    pub fn reset(&self) -> Result<(), SessionError> {
        self.cancel_loop();
        let mut session = self.lock()?;
        session.reset();
        self.publish(ServerMessage::GameReset {
            timestamp: Utc::now().timestamp_millis(),
        });
        self.publish(ServerMessage::Players {
            data: session.players().clone(),
        });
        self.publish(ServerMessage::Tick {
            data: session.tick_snapshot(),
        });
        Ok(())
    }

    pub fn submit_order(
        &self,
        player_id: &str,
        instrument: &str,
        side: TradeSide,
        quantity: f64,
    ) -> Result<Result<OrderResponse, TradingError>, SessionError> {
        let mut session = self.lock()?;
        let result = session.submit_order(player_id, instrument, side, quantity);
        if result.is_ok() {
            self.publish(ServerMessage::Players {
                data: session.players().clone(),
            });
        }
        Ok(result)
    }

    // =========================================================================
    // Loop
    // =========================================================================

    fn ensure_loop(self: &Arc<Self>) {
        let Ok(mut active) = self.active.lock() else {
            error!("Loop registry lock poisoned");
            return;
        };
        if let Some(existing) = active.as_ref() {
            if !existing.handle.is_finished() && !existing.cancel.load(Ordering::SeqCst) {
                return;
            }
        }

        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel.clone();
        let server = self.clone();
        let handle = tokio::spawn(async move {
            server.run_loop(cancel_clone).await;
        });
        *active = Some(ActiveLoop { handle, cancel });
    }

    fn cancel_loop(&self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(running) = active.take() {
                running.cancel.store(true, Ordering::SeqCst);
                running.handle.abort();
            }
        }
    }

    async fn run_loop(self: Arc<Self>, cancel: Arc<AtomicBool>) {
        info!(
            "Game loop started ({}ms ticks)",
            self.tick_interval.as_millis()
        );
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            match self.tick_once() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("Tick failed, stopping game loop: {}", e);
                    if let Ok(mut session) = self.lock() {
                        session.stop();
                        self.publish(ServerMessage::GameStop {
                            timestamp: Utc::now().timestamp_millis(),
                        });
                    }
                    break;
                }
            }
        }
        info!("Game loop exited");
    }

    /// Run one tick and broadcast the outcome. Returns false once the loop
    /// should exit.
    pub fn tick_once(&self) -> Result<bool, SessionError> {
        let mut session = self.lock()?;
        let outcome = session.tick()?;

        match outcome {
            TickOutcome::Idle => Ok(false),
            TickOutcome::Ended(leaderboard) => {
                self.publish(ServerMessage::GameEnd {
                    leaderboard,
                    timestamp: Utc::now().timestamp_millis(),
                });
                Ok(false)
            }
            TickOutcome::Advanced(report) => {
                if let Some(date) = report.date {
                    self.publish(ServerMessage::Date { data: date });
                }
                self.publish(ServerMessage::Players {
                    data: report.players,
                });
                self.publish(ServerMessage::Tick { data: report.tick });
                if let Some((event, entry)) = report.news {
                    self.publish(ServerMessage::News { event, entry });
                }
                for (player_id, total_value) in report.bankruptcies {
                    self.publish(ServerMessage::Bankrupt {
                        player_id,
                        total_value,
                    });
                }
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::{
        builtin_events, builtin_instruments, builtin_routes, BusinessCalendar, Catalog,
        RANDOM_POOL_BOUNDARY,
    };
    use crate::services::session::SessionSettings;
    use crate::types::Ticker;

    fn server() -> Arc<GameServer> {
        let settings = SessionSettings {
            seed: Some(1),
            ..SessionSettings::default()
        };
        let session = Session::new(Arc::new(Catalog::builtin()), settings);
        GameServer::new(session, Duration::from_secs(3600), 64)
    }

    #[tokio::test]
    async fn test_start_broadcasts_once() {
        let server = server();
        let mut rx = server.subscribe();
        assert!(server.start().unwrap());
        assert!(!server.start().unwrap());
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::GameStart { .. })));
        assert!(rx.try_recv().is_err());
        server.stop().unwrap();
    }

    #[tokio::test]
    async fn test_tick_once_message_order() {
        let server = server();
        server.start().unwrap();
        let mut rx = server.subscribe();
        assert!(server.tick_once().unwrap());

        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Date { .. })));
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Players { .. })));
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Tick { .. })));
        server.stop().unwrap();
    }

    #[tokio::test]
    async fn test_stopped_session_does_not_tick() {
        let server = server();
        server.start().unwrap();
        server.stop().unwrap();
        assert!(!server.tick_once().unwrap());
        assert_eq!(server.with_session(|s| s.tick_count()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reset_announces_cleared_state() {
        let server = server();
        server.start().unwrap();
        server.tick_once().unwrap();
        server
            .submit_order("alice", "BANK", TradeSide::Buy, 10.0)
            .unwrap()
            .unwrap();

        let mut rx = server.subscribe();
        server.reset().unwrap();

        assert!(matches!(rx.try_recv(), Ok(ServerMessage::GameReset { .. })));
        match rx.try_recv() {
            Ok(ServerMessage::Players { data }) => assert!(data.is_empty()),
            other => panic!("expected players, got {:?}", other),
        }
        match rx.try_recv() {
            Ok(ServerMessage::Tick { data }) => {
                assert_eq!(data.tick, 0);
                assert_eq!(data.prices[&Ticker::Bank], 2300.0);
            }
            other => panic!("expected tick, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_order_publishes_player_map() {
        let server = server();
        let mut rx = server.subscribe();

        server
            .submit_order("alice", "BANK", TradeSide::Buy, 10.0)
            .unwrap()
            .unwrap();
        match rx.try_recv() {
            Ok(ServerMessage::Players { data }) => {
                assert_eq!(data["alice"].position(Ticker::Bank).quantity, 10);
            }
            other => panic!("expected players, got {:?}", other),
        }

        // Rejected orders change nothing, so nothing is published
        assert!(server
            .submit_order("alice", "TSLA", TradeSide::Buy, 1.0)
            .unwrap()
            .is_err());
        assert!(rx.try_recv().is_err());
    }

    // =========================================================================
    // Loop
    // =========================================================================

    fn fast_server(catalog: Catalog) -> Arc<GameServer> {
        let settings = SessionSettings {
            seed: Some(2),
            ..SessionSettings::default()
        };
        let session = Session::new(Arc::new(catalog), settings);
        GameServer::new(session, Duration::from_millis(10), 256)
    }

    #[tokio::test]
    async fn test_stop_halts_loop_before_next_tick() {
        let server = fast_server(Catalog::builtin());
        server.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        server.stop().unwrap();

        let ticks = server.with_session(|s| s.tick_count()).unwrap();
        assert!(ticks > 0);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(server.with_session(|s| s.tick_count()).unwrap(), ticks);

        server.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        server.stop().unwrap();
        assert!(server.with_session(|s| s.tick_count()).unwrap() > ticks);
    }

    #[tokio::test]
    async fn test_tick_failure_stops_the_game() {
        let mut instruments = builtin_instruments();
        for inst in instruments.iter_mut().filter(|i| i.ticker == Ticker::Gold) {
            inst.initial_price = f64::NAN;
        }
        let catalog = Catalog::new(
            instruments,
            builtin_events(),
            builtin_routes(),
            RANDOM_POOL_BOUNDARY,
            BusinessCalendar::tokyo_2026(),
        );
        let server = fast_server(catalog);
        let mut rx = server.subscribe();

        assert!(server.start().unwrap());
        assert!(matches!(rx.recv().await, Ok(ServerMessage::GameStart { .. })));

        let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("loop never reported the failure");
        assert!(matches!(next, Ok(ServerMessage::GameStop { .. })));
        assert!(!server.is_running());
        assert_eq!(
            server
                .with_session(|s| s.market().series[&Ticker::Gold].len())
                .unwrap(),
            1
        );
    }
}
