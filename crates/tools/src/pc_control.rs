//! PC control: app launch/close, volume, brightness, radios, power.
//! Each handler is a thin wrapper over one system command.

use crate::shell::{run_checked, spawn_detached};
use crate::traits::ActionHandler;
use crate::record;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use veda_core::{ActionRequest, DispatchOutcome};
use veda_memory::SharedActivityLog;

/// Friendly-name to executable mapping, shared by open and close.
pub type AppMap = Arc<HashMap<String, String>>;

fn resolve_app<'a>(map: &'a AppMap, app: &'a str) -> &'a str {
    map.get(&app.to_lowercase()).map(String::as_str).unwrap_or(app)
}

pub struct OpenApp {
    pub app_map: AppMap,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for OpenApp {
    fn name(&self) -> &str {
        "open_app"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let app = ActionRequest::param_str(params, "app");
        let outcome = if app.is_empty() {
            DispatchOutcome::fail("Which app should I open?")
        } else {
            match spawn_detached(resolve_app(&self.app_map, app), &[]) {
                Ok(()) => DispatchOutcome::ok(format!("Opening {app}.")),
                Err(e) => DispatchOutcome::fail(format!("I couldn't open {app}: {e}")),
            }
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct CloseApp {
    pub app_map: AppMap,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for CloseApp {
    fn name(&self) -> &str {
        "close_app"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let app = ActionRequest::param_str(params, "app");
        let outcome = if app.is_empty() {
            DispatchOutcome::fail("Which app should I close?")
        } else {
            match run_checked("pkill", &["-f", resolve_app(&self.app_map, app)]).await {
                Ok(()) => DispatchOutcome::ok(format!("Closed {app}.")),
                Err(_) => DispatchOutcome::fail(format!("{app} doesn't seem to be running.")),
            }
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct SetVolume {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for SetVolume {
    fn name(&self) -> &str {
        "set_volume"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let direction = params
            .get("direction")
            .and_then(|v| v.as_str())
            .unwrap_or("up");
        let (args, message): (&[&str], &str) = match direction {
            "down" => (
                &["set-sink-volume", "@DEFAULT_SINK@", "-10%"],
                "Volume down.",
            ),
            "mute" => (&["set-sink-mute", "@DEFAULT_SINK@", "toggle"], "Toggled mute."),
            _ => (&["set-sink-volume", "@DEFAULT_SINK@", "+10%"], "Volume up."),
        };
        let outcome = match run_checked("pactl", args).await {
            Ok(()) => DispatchOutcome::ok(message),
            Err(e) => DispatchOutcome::fail(format!("I couldn't change the volume: {e}")),
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct SetBrightness {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for SetBrightness {
    fn name(&self) -> &str {
        "set_brightness"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let direction = params
            .get("direction")
            .and_then(|v| v.as_str())
            .unwrap_or("up");
        let (step, message) = if direction == "down" {
            ("10%-", "Brightness down.")
        } else {
            ("+10%", "Brightness up.")
        };
        let outcome = match run_checked("brightnessctl", &["set", step]).await {
            Ok(()) => DispatchOutcome::ok(message),
            Err(e) => DispatchOutcome::fail(format!("I couldn't change the brightness: {e}")),
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct WifiToggle {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for WifiToggle {
    fn name(&self) -> &str {
        "wifi_toggle"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let state = ActionRequest::param_bool(params, "state", true);
        let word = if state { "on" } else { "off" };
        let outcome = match run_checked("nmcli", &["radio", "wifi", word]).await {
            Ok(()) => DispatchOutcome::ok(format!("Wi-Fi turned {word}.")),
            Err(e) => DispatchOutcome::fail(format!("I couldn't switch Wi-Fi {word}: {e}")),
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

pub struct BluetoothToggle {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for BluetoothToggle {
    fn name(&self) -> &str {
        "bluetooth_toggle"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let state = ActionRequest::param_bool(params, "state", true);
        let word = if state { "on" } else { "off" };
        let outcome = match run_checked("bluetoothctl", &["power", word]).await {
            Ok(()) => DispatchOutcome::ok(format!("Bluetooth turned {word}.")),
            Err(e) => DispatchOutcome::fail(format!("I couldn't switch Bluetooth {word}: {e}")),
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

macro_rules! power_handler {
    ($name:ident, $action:literal, $unit_arg:literal, $message:literal) => {
        pub struct $name {
            pub log: SharedActivityLog,
        }

        #[async_trait]
        impl ActionHandler for $name {
            fn name(&self) -> &str {
                $action
            }

            async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
                let outcome = match run_checked("systemctl", &[$unit_arg]).await {
                    Ok(()) => DispatchOutcome::ok($message),
                    Err(e) => DispatchOutcome::fail(format!("That didn't work: {e}")),
                };
                record(&self.log, self.name(), params, &outcome);
                outcome
            }
        }
    };
}

power_handler!(Shutdown, "shutdown", "poweroff", "Shutting down the computer now.");
power_handler!(Restart, "restart", "reboot", "Restarting the computer now.");
power_handler!(Sleep, "sleep", "suspend", "Putting the computer to sleep.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_app_falls_back_to_raw_name() {
        let mut map = HashMap::new();
        map.insert("browser".to_string(), "firefox".to_string());
        let map = Arc::new(map);

        assert_eq!(resolve_app(&map, "Browser"), "firefox");
        assert_eq!(resolve_app(&map, "kitty"), "kitty");
    }
}
