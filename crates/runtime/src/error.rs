use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Memory error: {0}")]
    Memory(#[from] veda_memory::MemoryError),

    #[error("Classifier error: {0}")]
    Brain(#[from] veda_interfaces::BrainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Automation file error: {0}")]
    AutomationFile(#[from] serde_yaml::Error),
}
