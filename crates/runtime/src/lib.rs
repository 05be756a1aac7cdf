pub mod assistant;
pub mod automations;
pub mod error;
pub mod mux;
pub mod router;
pub mod undo;

pub use assistant::Assistant;
pub use automations::{AutomationBook, Schedule};
pub use error::RuntimeError;
pub use mux::InputMultiplexer;
pub use router::Router;
