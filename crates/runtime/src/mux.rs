//! Input multiplexer: one command per cycle, voice before keyboard.

use std::sync::Arc;
use std::time::Duration;
use veda_core::{Command, CommandSource};
use veda_interfaces::{KeyEvent, KeyboardFeed, VoiceInput};

pub struct InputMultiplexer {
    voice: Arc<dyn VoiceInput>,
    keys: KeyboardFeed,
    /// Grace period for draining a voice command that has already arrived.
    poll_interval: Duration,
    /// How long one cycle blocks on the keyboard before giving voice another
    /// chance.
    keyboard_wait: Duration,
}

impl InputMultiplexer {
    pub fn new(
        voice: Arc<dyn VoiceInput>,
        keys: KeyboardFeed,
        poll_interval: Duration,
        keyboard_wait: Duration,
    ) -> Self {
        Self {
            voice,
            keys,
            poll_interval,
            keyboard_wait,
        }
    }

    /// The next command, or `None` when the cycle produced nothing (idle
    /// keyboard window, or a blank line). Closed stdin becomes a synthetic
    /// quit so the loop winds down instead of spinning.
    pub async fn next_command(&self) -> Option<Command> {
        if self.voice.has_command() {
            if let Some(text) = self.voice.get_command(self.poll_interval) {
                let text = text.trim().to_string();
                if !text.is_empty() {
                    return Some(Command::new(text, CommandSource::Voice));
                }
            }
        }

        match self.keys.read_line(self.keyboard_wait).await {
            KeyEvent::Line(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    None
                } else {
                    Some(Command::new(line, CommandSource::Keyboard))
                }
            }
            KeyEvent::Eof => Some(Command::new("quit", CommandSource::Keyboard)),
            KeyEvent::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veda_interfaces::VoicePipe;

    fn mux(voice: VoicePipe, keys: KeyboardFeed) -> InputMultiplexer {
        InputMultiplexer::new(
            Arc::new(voice),
            keys,
            Duration::from_millis(20),
            Duration::from_millis(20),
        )
    }

    #[tokio::test]
    async fn test_voice_takes_priority_over_keyboard() {
        let voice = VoicePipe::default();
        voice.start();
        voice.push("open firefox");

        let (keys, tx) = KeyboardFeed::pair();
        tx.send("typed line".to_string()).unwrap();

        let mux = mux(voice, keys.clone());
        let cmd = mux.next_command().await.unwrap();
        assert_eq!(cmd.source, CommandSource::Voice);
        assert_eq!(cmd.text, "open firefox");

        // The typed line is still queued for the next cycle.
        let cmd = mux.next_command().await.unwrap();
        assert_eq!(cmd.source, CommandSource::Keyboard);
        assert_eq!(cmd.text, "typed line");
    }

    #[tokio::test]
    async fn test_idle_cycle_yields_none() {
        let voice = VoicePipe::default();
        voice.start();
        let (keys, _tx) = KeyboardFeed::pair();

        assert!(mux(voice, keys).next_command().await.is_none());
    }

    #[tokio::test]
    async fn test_blank_keyboard_line_dropped() {
        let voice = VoicePipe::default();
        let (keys, tx) = KeyboardFeed::pair();
        tx.send("   ".to_string()).unwrap();

        assert!(mux(voice, keys).next_command().await.is_none());
    }

    #[tokio::test]
    async fn test_closed_stdin_becomes_quit() {
        let voice = VoicePipe::default();
        let (keys, tx) = KeyboardFeed::pair();
        drop(tx);

        let cmd = mux(voice, keys).next_command().await.unwrap();
        assert_eq!(cmd.text, "quit");
        assert_eq!(cmd.source, CommandSource::Keyboard);
    }
}
