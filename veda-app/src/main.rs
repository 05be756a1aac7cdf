use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use veda_interfaces::{ConsoleSpeech, KeyboardFeed, SpeechOutput, TerminalConfirmer, VoiceInput, VoicePipe};
use veda_memory::{ActivityLog, SharedActivityLog, UserProfile};
use veda_policy::{SecurityGate, SecurityPolicy};
use veda_providers::RuleBrain;
use veda_runtime::{Assistant, AutomationBook, InputMultiplexer, Router};
use veda_tools::{files, pc_control, screen, smart_home, web, writing, ActionRegistry};

mod config;

use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    println!("╔══════════════════════════════════════════════════╗");
    println!("║                V E D A   Assistant                ║");
    println!("╚══════════════════════════════════════════════════╝");
    println!();

    let config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Err(e);
        }
    };
    std::fs::create_dir_all(&config.data_dir)?;

    let log = SharedActivityLog::new(ActivityLog::open(config.activity_log_path())?);
    let profile = UserProfile::load_or_create(config.profile_path())?;
    let automations = AutomationBook::load(&config.automations_path())?;

    let registry = build_registry(&config, log.clone());

    let policy = SecurityPolicy {
        pin: config.pin.clone(),
        dangerous: config.dangerous.iter().cloned().collect::<HashSet<_>>(),
        admin: config.admin.iter().cloned().collect::<HashSet<_>>(),
    };

    let voice = VoicePipe::default();
    let keys = KeyboardFeed::stdin("  > ");
    let speech: Arc<dyn SpeechOutput> = Arc::new(ConsoleSpeech);
    let confirmer = Arc::new(TerminalConfirmer::new(
        keys.clone(),
        Duration::from_secs(config.confirm_wait_secs),
    ));

    let router = Router::new(
        registry,
        SecurityGate::new(policy),
        confirmer,
        speech.clone(),
        log,
        automations,
    );
    let mux = InputMultiplexer::new(
        Arc::new(voice.clone()),
        keys,
        Duration::from_millis(config.poll_interval_ms),
        Duration::from_secs(config.keyboard_wait_secs),
    );

    let brain = Arc::new(RuleBrain::new(&profile.user_name));
    let mut assistant = Assistant::new(
        brain,
        Arc::new(voice.clone()),
        speech.clone(),
        mux,
        router,
    );

    voice.start();
    speech
        .speak(
            &format!("{}, {}! I'm listening.", time_greeting(), profile.user_name),
            false,
        )
        .await;

    assistant.run().await;
    Ok(())
}

fn build_registry(config: &AppConfig, log: SharedActivityLog) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    let app_map: pc_control::AppMap = Arc::new(config.app_map.clone());
    let junk: HashSet<String> = config.junk_extensions.iter().cloned().collect();

    registry.register(Arc::new(pc_control::OpenApp {
        app_map: app_map.clone(),
        log: log.clone(),
    }));
    registry.register(Arc::new(pc_control::CloseApp {
        app_map,
        log: log.clone(),
    }));
    registry.register(Arc::new(pc_control::SetVolume { log: log.clone() }));
    registry.register(Arc::new(pc_control::SetBrightness { log: log.clone() }));
    registry.register(Arc::new(pc_control::WifiToggle { log: log.clone() }));
    registry.register(Arc::new(pc_control::BluetoothToggle { log: log.clone() }));
    registry.register(Arc::new(pc_control::Shutdown { log: log.clone() }));
    registry.register(Arc::new(pc_control::Restart { log: log.clone() }));
    registry.register(Arc::new(pc_control::Sleep { log: log.clone() }));

    registry.register(Arc::new(files::FindFile {
        roots: config.search_roots.clone(),
        log: log.clone(),
    }));
    registry.register(Arc::new(files::CreateFolder {
        base: config.downloads_dir.clone(),
        log: log.clone(),
    }));
    registry.register(Arc::new(files::DeleteFile { log: log.clone() }));
    registry.register(Arc::new(files::CompressFolder { log: log.clone() }));
    registry.register(Arc::new(files::OrganizeDownloads {
        downloads: config.downloads_dir.clone(),
        rules: config.organize_rules.clone(),
        log: log.clone(),
    }));
    registry.register(Arc::new(files::CleanJunk {
        roots: vec![config.downloads_dir.clone()],
        junk_extensions: junk,
        log: log.clone(),
    }));

    registry.register(Arc::new(web::SearchGoogle { log: log.clone() }));
    registry.register(Arc::new(web::PlayYoutube { log: log.clone() }));
    registry.register(Arc::new(web::SearchWikipedia { log: log.clone() }));
    registry.register(Arc::new(web::OpenUrl { log: log.clone() }));
    registry.register(Arc::new(web::OpenSite::new(
        "open_news",
        "https://news.google.com",
        "Here's the news.",
        log.clone(),
    )));
    registry.register(Arc::new(web::OpenSite::new(
        "open_spotify",
        "https://open.spotify.com",
        "Opening Spotify.",
        log.clone(),
    )));
    registry.register(Arc::new(web::OpenSite::new(
        "open_whatsapp",
        "https://web.whatsapp.com",
        "Opening WhatsApp.",
        log.clone(),
    )));
    registry.register(Arc::new(web::OpenSite::new(
        "open_gmail",
        "https://mail.google.com",
        "Opening Gmail.",
        log.clone(),
    )));
    registry.register(Arc::new(web::DownloadFile {
        dir: config.downloads_dir.clone(),
        log: log.clone(),
    }));

    registry.register(Arc::new(writing::WriteNote {
        notes_dir: config.notes_dir(),
        log: log.clone(),
    }));
    registry.register(Arc::new(writing::GetReminders {
        notes_dir: config.notes_dir(),
        log: log.clone(),
    }));
    registry.register(Arc::new(writing::Summarize { log: log.clone() }));

    registry.register(Arc::new(screen::TakeScreenshot {
        dir: config.screenshots_dir(),
        log: log.clone(),
    }));
    registry.register(Arc::new(screen::ReadScreen {
        dir: config.screenshots_dir(),
        log: log.clone(),
    }));
    registry.register(Arc::new(screen::FindElement { log: log.clone() }));

    registry.register(Arc::new(smart_home::ControlLight { log: log.clone() }));
    registry.register(Arc::new(smart_home::ControlFan { log: log.clone() }));
    registry.register(Arc::new(smart_home::ControlAc { log }));

    registry
}

fn time_greeting() -> &'static str {
    use chrono::Timelike;
    match chrono::Local::now().hour() {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}
