pub mod event;
pub mod instrument;
pub mod player;
pub mod session;
pub mod ws;

pub use event::*;
pub use instrument::*;
pub use player::*;
pub use session::*;
pub use ws::*;
