pub mod terminal;
pub mod traits;
pub mod voice;

pub use terminal::{ConsoleSpeech, KeyEvent, KeyboardFeed, TerminalConfirmer};
pub use traits::{Brain, BrainError, SpeechOutput, VoiceInput};
pub use voice::VoicePipe;
