pub mod rule_brain;

pub use rule_brain::RuleBrain;
