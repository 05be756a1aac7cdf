//! Keyboard feed and console speech.
//!
//! One long-lived reader thread owns stdin and forwards whole lines over a
//! channel. Every consumer (the input multiplexer, the security gate's
//! confirmation prompt) pulls from the same feed, so a line typed while a
//! read deadline has already lapsed is simply picked up by the next read
//! instead of leaking into a stale worker.

use crate::traits::SpeechOutput;
use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use veda_policy::Confirmer;

#[derive(Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Line(String),
    /// stdin closed or interrupted; callers map this to a quit command.
    Eof,
    /// Nothing typed within the wait window.
    Idle,
}

#[derive(Clone)]
pub struct KeyboardFeed {
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>>,
    closed: Arc<AtomicBool>,
}

impl KeyboardFeed {
    /// Spawns the stdin reader thread. The prompt is reprinted before each
    /// line read, matching the interactive `  > ` surface.
    pub fn stdin(prompt: &'static str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            loop {
                print!("{prompt}");
                let _ = std::io::stdout().flush();
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) | Err(_) => break, // sender drop closes the channel
                    Ok(_) => {
                        if tx.send(line.trim_end_matches(['\r', '\n']).to_string()).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Self::from_receiver(rx)
    }

    /// Wraps an arbitrary line channel; used by tests and by embedders that
    /// feed commands programmatically.
    pub fn from_receiver(rx: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            rx: Arc::new(tokio::sync::Mutex::new(rx)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Channel-backed feed plus its sender, for driving the loop in tests.
    pub fn pair() -> (Self, mpsc::UnboundedSender<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::from_receiver(rx), tx)
    }

    /// Waits up to `wait` for the next typed line. The deadline only bounds
    /// this call; a line arriving later stays queued for the next caller.
    pub async fn read_line(&self, wait: Duration) -> KeyEvent {
        if self.closed.load(Ordering::Relaxed) {
            return KeyEvent::Eof;
        }
        let mut rx = self.rx.lock().await;
        match timeout(wait, rx.recv()).await {
            Ok(Some(line)) => KeyEvent::Line(line),
            Ok(None) => {
                self.closed.store(true, Ordering::Relaxed);
                KeyEvent::Eof
            }
            Err(_) => KeyEvent::Idle,
        }
    }
}

/// Asks confirmation questions over the shared keyboard feed.
pub struct TerminalConfirmer {
    feed: KeyboardFeed,
    wait: Duration,
}

impl TerminalConfirmer {
    pub fn new(feed: KeyboardFeed, wait: Duration) -> Self {
        Self { feed, wait }
    }
}

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn read_reply(&self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        match self.feed.read_line(self.wait).await {
            KeyEvent::Line(line) => Some(line),
            KeyEvent::Eof | KeyEvent::Idle => None,
        }
    }
}

/// Console rendering of the speech-output collaborator.
pub struct ConsoleSpeech;

#[async_trait]
impl SpeechOutput for ConsoleSpeech {
    async fn speak(&self, text: &str, priority: bool) {
        if priority {
            println!("  [veda!] {text}");
        } else {
            println!("  [veda] {text}");
        }
        let _ = std::io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feed_delivers_lines_in_order() {
        let (feed, tx) = KeyboardFeed::pair();
        tx.send("first".to_string()).unwrap();
        tx.send("second".to_string()).unwrap();

        assert_eq!(
            feed.read_line(Duration::from_millis(50)).await,
            KeyEvent::Line("first".to_string())
        );
        assert_eq!(
            feed.read_line(Duration::from_millis(50)).await,
            KeyEvent::Line("second".to_string())
        );
    }

    #[tokio::test]
    async fn test_idle_then_late_line_not_lost() {
        let (feed, tx) = KeyboardFeed::pair();
        assert_eq!(feed.read_line(Duration::from_millis(10)).await, KeyEvent::Idle);

        tx.send("late".to_string()).unwrap();
        assert_eq!(
            feed.read_line(Duration::from_millis(50)).await,
            KeyEvent::Line("late".to_string())
        );
    }

    #[tokio::test]
    async fn test_closed_channel_is_eof() {
        let (feed, tx) = KeyboardFeed::pair();
        drop(tx);
        assert_eq!(feed.read_line(Duration::from_millis(10)).await, KeyEvent::Eof);
        // And stays EOF afterwards.
        assert_eq!(feed.read_line(Duration::from_millis(10)).await, KeyEvent::Eof);
    }

    #[tokio::test]
    async fn test_confirmer_returns_typed_reply() {
        let (feed, tx) = KeyboardFeed::pair();
        tx.send("1234".to_string()).unwrap();
        let confirmer = TerminalConfirmer::new(feed, Duration::from_millis(50));
        assert_eq!(confirmer.read_reply("PIN: ").await.as_deref(), Some("1234"));
    }
}
