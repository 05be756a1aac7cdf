//! Web services: searches, URLs, downloads. Browser work goes through
//! xdg-open so the user's default browser decides.

use crate::record;
use crate::shell::spawn_detached;
use crate::traits::ActionHandler;
use async_trait::async_trait;
use std::path::PathBuf;
use veda_core::{ActionRequest, DispatchOutcome};
use veda_memory::SharedActivityLog;

fn normalize_url(url: &str) -> String {
    let lower = url.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn open_in_browser(url: &str) -> Result<(), String> {
    spawn_detached("xdg-open", &[url])
}

macro_rules! query_handler {
    ($name:ident, $action:literal, $url:literal, $verb:literal) => {
        pub struct $name {
            pub log: SharedActivityLog,
        }

        #[async_trait]
        impl ActionHandler for $name {
            fn name(&self) -> &str {
                $action
            }

            async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
                let query = ActionRequest::param_str(params, "query");
                let outcome = if query.is_empty() {
                    DispatchOutcome::fail("What should I search for?")
                } else {
                    match open_in_browser(&format!($url, urlencoding::encode(query))) {
                        Ok(()) => DispatchOutcome::ok(format!(concat!($verb, " {}."), query)),
                        Err(e) => DispatchOutcome::fail(format!("Browser launch failed: {e}")),
                    }
                };
                record(&self.log, self.name(), params, &outcome);
                outcome
            }
        }
    };
}

query_handler!(
    SearchGoogle,
    "search_google",
    "https://www.google.com/search?q={}",
    "Searching Google for"
);
query_handler!(
    PlayYoutube,
    "play_youtube",
    "https://www.youtube.com/results?search_query={}",
    "Pulling up YouTube results for"
);
query_handler!(
    SearchWikipedia,
    "search_wikipedia",
    "https://en.wikipedia.org/wiki/Special:Search?search={}",
    "Searching Wikipedia for"
);

pub struct OpenUrl {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for OpenUrl {
    fn name(&self) -> &str {
        "open_url"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let url = ActionRequest::param_str(params, "url");
        let outcome = if url.is_empty() {
            DispatchOutcome::fail("Which address should I open?")
        } else {
            let full = normalize_url(url);
            match open_in_browser(&full) {
                Ok(()) => DispatchOutcome::ok(format!("Opening {full}.")),
                Err(e) => DispatchOutcome::fail(format!("Browser launch failed: {e}")),
            }
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

/// Fixed-destination shortcuts: news, Spotify, WhatsApp, Gmail.
pub struct OpenSite {
    pub action: String,
    pub url: String,
    pub message: String,
    pub log: SharedActivityLog,
}

impl OpenSite {
    pub fn new(
        action: &str,
        url: &str,
        message: &str,
        log: SharedActivityLog,
    ) -> Self {
        Self {
            action: action.to_string(),
            url: url.to_string(),
            message: message.to_string(),
            log,
        }
    }
}

#[async_trait]
impl ActionHandler for OpenSite {
    fn name(&self) -> &str {
        &self.action
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let outcome = match open_in_browser(&self.url) {
            Ok(()) => DispatchOutcome::ok(self.message.clone()),
            Err(e) => DispatchOutcome::fail(format!("Browser launch failed: {e}")),
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct DownloadFile {
    pub dir: PathBuf,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for DownloadFile {
    fn name(&self) -> &str {
        "download_file"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let url = ActionRequest::param_str(params, "url");
        let outcome = if url.is_empty() {
            DispatchOutcome::fail("I need a URL to download.")
        } else {
            let filename = params
                .get("filename")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    url.rsplit('/')
                        .next()
                        .filter(|s| !s.is_empty())
                        .unwrap_or("download.bin")
                        .to_string()
                });
            self.fetch(url, &filename).await
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

impl DownloadFile {
    async fn fetch(&self, url: &str, filename: &str) -> DispatchOutcome {
        let response = match reqwest::get(normalize_url(url)).await {
            Ok(r) => r,
            Err(e) => return DispatchOutcome::fail(format!("Download failed: {e}")),
        };
        if !response.status().is_success() {
            return DispatchOutcome::fail(format!(
                "Download failed: server returned {}.",
                response.status()
            ));
        }
        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => return DispatchOutcome::fail(format!("Download failed: {e}")),
        };
        let target = self.dir.join(filename);
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            return DispatchOutcome::fail(format!("Download failed: {e}"));
        }
        match tokio::fs::write(&target, &bytes).await {
            Ok(()) => DispatchOutcome::ok(format!(
                "Downloaded {filename} ({} KB) to {}.",
                bytes.len() / 1024,
                self.dir.display()
            )),
            Err(e) => DispatchOutcome::fail(format!("Couldn't save {filename}: {e}")),
        }
    }
}
