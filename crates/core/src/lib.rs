pub mod emergency;
pub mod types;

pub use emergency::EmergencyController;
pub use types::{ActionRequest, BrainReply, Command, CommandSource, DispatchOutcome};
