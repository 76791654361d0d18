//! Desktop notifications via notify-rust (D-Bus).

use notify_rust::Notification;
use tracing::debug;

use crate::announcer::Announcer;
use crate::config::{DesktopConfig, Urgency};
use crate::error::{RelayError, Result};
use crate::event::NotificationEvent;

/// No server on the session bus means no one to show the popup.
#[cfg(all(unix, not(target_os = "macos")))]
fn server_running() -> bool {
    match notify_rust::get_server_information() {
        Ok(info) => {
            debug!("Notification server: {} {}", info.name, info.version);
            true
        }
        Err(e) => {
            debug!("No notification server: {e}");
            false
        }
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn server_running() -> bool {
    true
}

pub struct DesktopNotifier {
    config: DesktopConfig,
}

impl DesktopNotifier {
    pub fn new(config: DesktopConfig) -> Self {
        Self { config }
    }

    fn build(&self, body: &str) -> Notification {
        let mut notification = Notification::new();
        notification
            .summary(&self.config.title)
            .body(body)
            .icon(&self.config.icon)
            .timeout(self.config.timeout_ms);

        #[cfg(all(unix, not(target_os = "macos")))]
        notification.urgency(match self.config.urgency {
            Urgency::Low => notify_rust::Urgency::Low,
            Urgency::Normal => notify_rust::Urgency::Normal,
            Urgency::Critical => notify_rust::Urgency::Critical,
        });

        notification
    }
}

impl Announcer for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn is_available(&self) -> bool {
        if !self.config.enabled {
            return false;
        }

        server_running()
    }

    fn announce(&self, event: &NotificationEvent) -> Result<()> {
        debug!("Notification: {}", self.config.title);

        self.build(&event.message)
            .show()
            .map(|_| ())
            .map_err(|e| RelayError::Desktop(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_rust::Timeout;

    #[test]
    fn disabled_notifier_is_unavailable() {
        let notifier = DesktopNotifier::new(DesktopConfig {
            enabled: false,
            ..DesktopConfig::default()
        });
        assert!(!notifier.is_available());
        assert_eq!(notifier.name(), "desktop");
    }

    #[test]
    fn notification_carries_title_icon_and_message() {
        let notifier = DesktopNotifier::new(DesktopConfig::default());
        let notification = notifier.build("Build finished");

        assert_eq!(notification.summary, "Claude Code");
        assert_eq!(notification.body, "Build finished");
        assert_eq!(notification.icon, "dialog-information");
    }

    #[test]
    fn timeout_keeps_freedesktop_meaning() {
        let with_timeout = |timeout_ms| {
            DesktopNotifier::new(DesktopConfig {
                timeout_ms,
                ..DesktopConfig::default()
            })
            .build("x")
            .timeout
        };

        assert_eq!(with_timeout(-1), Timeout::Default);
        assert_eq!(with_timeout(0), Timeout::Never);
        assert_eq!(with_timeout(5000), Timeout::Milliseconds(5000));
    }
}
