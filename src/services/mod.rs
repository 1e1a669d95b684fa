pub mod catalog;
pub mod orchestrator;
pub mod price_engine;
pub mod scheduler;
pub mod session;
pub mod trading;

pub use catalog::{Catalog, CatalogError};
pub use orchestrator::GameServer;
pub use price_engine::{MarketState, PriceEngine, PriceEngineError, PriceParams};
pub use scheduler::{EventScheduler, EventSource, SchedulerPhase};
pub use session::{Session, SessionError, SessionSettings, TickOutcome, TickReport};
pub use trading::{TradingEngine, TradingError};
