pub mod security;

pub use security::{Confirmer, SecurityGate, SecurityPolicy};
