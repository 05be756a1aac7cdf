//! Keyword-rule language frontend. Maps a normalized utterance to either an
//! action request or a conversational reply. It is deliberately offline: no
//! model call, no network, just patterns over lowercase text.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use veda_core::{ActionRequest, BrainReply};
use veda_interfaces::{Brain, BrainError};

pub struct RuleBrain {
    user_name: String,
}

impl RuleBrain {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
        }
    }
}

#[async_trait]
impl Brain for RuleBrain {
    async fn process(&self, text: &str) -> Result<BrainReply, BrainError> {
        let reply = parse(text, &self.user_name);
        debug!(input = text, "rule brain decision");
        Ok(reply)
    }
}

fn action(name: &str, params: serde_json::Value) -> BrainReply {
    BrainReply::Action(ActionRequest::new(name, params))
}

fn conversation(reply: impl Into<String>) -> BrainReply {
    BrainReply::Conversation {
        reply: reply.into(),
    }
}

/// Everything after the first occurrence of any of `markers`, trimmed.
fn after<'a>(text: &'a str, markers: &[&str]) -> Option<&'a str> {
    for marker in markers {
        if let Some(idx) = text.find(marker) {
            let rest = text[idx + marker.len()..].trim();
            if !rest.is_empty() {
                return Some(rest);
            }
        }
    }
    None
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

fn on_off_state(text: &str) -> bool {
    !(text.contains("off") || text.contains("disable"))
}

pub fn parse(raw: &str, user_name: &str) -> BrainReply {
    let text = raw.trim().to_lowercase();

    // Control words first so "quit" never falls through to app matching.
    if text == "quit" || text == "exit" || text == "goodbye" || text == "bye" {
        return action("quit", json!({}));
    }
    if text == "undo" || text.starts_with("undo ") || text.contains("undo that") {
        return action("undo", json!({}));
    }
    if contains_any(&text, &["emergency stop", "stop everything", "abort everything"]) {
        return action("emergency_stop", json!({}));
    }

    // Power, before open/close so "shut down" is never read as "close down".
    if contains_any(&text, &["shut down", "shutdown", "power off"]) {
        return action("shutdown", json!({}));
    }
    if contains_any(&text, &["restart", "reboot"]) {
        return action("restart", json!({}));
    }
    if contains_any(&text, &["go to sleep", "suspend"]) || text == "sleep" {
        return action("sleep", json!({}));
    }

    // Hardware toggles.
    if text.contains("volume") || text.contains("mute") {
        let direction = if text.contains("mute") {
            "mute"
        } else if contains_any(&text, &["down", "lower", "decrease"]) {
            "down"
        } else {
            "up"
        };
        return action("set_volume", json!({ "direction": direction }));
    }
    if text.contains("brightness") {
        let direction = if contains_any(&text, &["down", "lower", "decrease", "dim"]) {
            "down"
        } else {
            "up"
        };
        return action("set_brightness", json!({ "direction": direction }));
    }
    if contains_any(&text, &["wifi", "wi-fi"]) {
        return action("wifi_toggle", json!({ "state": on_off_state(&text) }));
    }
    if text.contains("bluetooth") {
        return action("bluetooth_toggle", json!({ "state": on_off_state(&text) }));
    }

    // Smart home.
    if contains_any(&text, &["light", "lamp"]) && contains_any(&text, &["on", "off"]) {
        return action("control_light", json!({ "state": on_off_state(&text) }));
    }
    if text.contains("fan") && contains_any(&text, &["on", "off"]) {
        return action("control_fan", json!({ "state": on_off_state(&text) }));
    }
    if contains_any(&text, &[" ac ", "the ac", "air conditioner"])
        && contains_any(&text, &["on", "off"])
    {
        return action("control_ac", json!({ "state": on_off_state(&text) }));
    }

    // Screen.
    if contains_any(&text, &["screenshot", "capture the screen", "capture screen"]) {
        return action("take_screenshot", json!({}));
    }
    if contains_any(&text, &["read the screen", "read my screen", "what's on my screen", "whats on my screen"]) {
        return action("read_screen", json!({}));
    }

    // Web searches before generic open so "open youtube and play x" stays sane.
    if let Some(query) = after(&text, &["search wikipedia for", "wikipedia "]) {
        return action("search_wikipedia", json!({ "query": query }));
    }
    if let Some(query) = after(&text, &["search for", "search ", "google "]) {
        return action("search_google", json!({ "query": query }));
    }
    if let Some(query) = after(&text, &["play "]) {
        return action("play_youtube", json!({ "query": query }));
    }
    if contains_any(&text, &["the news", "open news"]) {
        return action("open_news", json!({}));
    }
    if text.contains("spotify") {
        return action("open_spotify", json!({}));
    }
    if text.contains("whatsapp") {
        return action("open_whatsapp", json!({}));
    }
    if contains_any(&text, &["gmail", "my email", "my mail"]) {
        return action("open_gmail", json!({}));
    }
    if let Some(url) = after(&text, &["download "]) {
        if url.contains('.') {
            return action("download_file", json!({ "url": url }));
        }
    }
    if let Some(target) = after(&text, &["go to ", "open url "]) {
        if target.contains('.') {
            return action("open_url", json!({ "url": target }));
        }
    }

    // Files.
    if let Some(name) = after(&text, &["find file", "find the file", "look for file"]) {
        return action("find_file", json!({ "name": name }));
    }
    if let Some(name) = after(&text, &["create folder", "create a folder called", "make a folder called", "new folder"]) {
        return action("create_folder", json!({ "name": name }));
    }
    if let Some(path) = after(&text, &["delete file", "delete the file"]) {
        return action("delete_file", json!({ "path": path }));
    }
    if let Some(folder) = after(&text, &["compress ", "zip up "]) {
        return action("compress_folder", json!({ "folder": folder }));
    }
    if contains_any(&text, &["organize my downloads", "organize downloads", "tidy downloads"]) {
        return action("organize_downloads", json!({}));
    }
    if contains_any(&text, &["clean junk", "clean up junk", "remove junk"]) {
        return action("clean_junk", json!({}));
    }
    if let Some(file) = after(&text, &["summarize "]) {
        return action("summarize", json!({ "file": file }));
    }

    // Notes and reminders.
    if let Some(task) = after(&text, &["remind me to", "remind me"]) {
        return action(
            "write_note",
            json!({ "type": "reminder", "text": task }),
        );
    }
    if contains_any(&text, &["my reminders", "any reminders", "list reminders"]) {
        return action("get_reminders", json!({}));
    }
    if let Some(body) = after(&text, &["write a note", "take a note", "note that", "write note"]) {
        let body = body.trim_start_matches(':').trim();
        return action("write_note", json!({ "text": body }));
    }

    // Automations by routine name.
    if let Some(name) = after(&text, &["run automation", "run the", "run "]) {
        let name = name.trim_end_matches(" routine").trim();
        return action("run_automation", json!({ "name": name }));
    }
    for routine in ["good morning", "good night", "start work", "backup files"] {
        if text == routine || text == format!("{routine} routine") {
            return action("run_automation", json!({ "name": routine }));
        }
    }

    // Generic app open/close comes last among actions.
    if let Some(app) = after(&text, &["open up", "open ", "launch ", "start "]) {
        let app = app.trim_start_matches("the ").trim();
        return action("open_app", json!({ "app": app }));
    }
    if let Some(app) = after(&text, &["close ", "kill "]) {
        let app = app.trim_start_matches("the ").trim();
        return action("close_app", json!({ "app": app }));
    }

    // Small talk.
    if contains_any(&text, &["what time", "the time"]) {
        return conversation(format!(
            "It's {}.",
            chrono::Local::now().format("%H:%M")
        ));
    }
    if contains_any(&text, &["what day", "the date", "today's date", "todays date"]) {
        return conversation(format!(
            "Today is {}.",
            chrono::Local::now().format("%A, %B %-d")
        ));
    }
    if contains_any(&text, &["hello", "hi ", "hey"]) || text == "hi" {
        return conversation(format!("Hi {user_name}! What can I do for you?"));
    }
    if text.contains("how are you") {
        return conversation("Running smoothly. What do you need?");
    }
    if contains_any(&text, &["thank", "thanks"]) {
        return conversation("Anytime!");
    }

    conversation("I'm not sure what you meant. You can ask me to open apps, search the web, manage files, or control the system.")
}
