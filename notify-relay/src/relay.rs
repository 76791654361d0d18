//! The relay pipeline.
//!
//! Parse → each announcer (if available) → log append

use tracing::{debug, info, warn};

use crate::announcer::Announcer;
use crate::config::Config;
use crate::error::Result;
use crate::event::NotificationEvent;
use crate::history::NotificationLog;
use crate::notifier::DesktopNotifier;
use crate::speech::PiperSpeaker;

/// What happened to each announcer during one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayReport {
    pub delivered: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
    pub failed: Vec<&'static str>,
}

pub struct Relay {
    message_field: String,
    announcers: Vec<Box<dyn Announcer>>,
    log: NotificationLog,
}

impl Relay {
    pub fn new(
        message_field: impl Into<String>,
        announcers: Vec<Box<dyn Announcer>>,
        log: NotificationLog,
    ) -> Self {
        Self {
            message_field: message_field.into(),
            announcers,
            log,
        }
    }

    /// Desktop popup first, then speech, backed by the configured log file.
    pub fn from_config(config: &Config) -> Self {
        let announcers: Vec<Box<dyn Announcer>> = vec![
            Box::new(DesktopNotifier::new(config.desktop.clone())),
            Box::new(PiperSpeaker::new(config.speech.clone())),
        ];
        Self::new(
            config.message_field.clone(),
            announcers,
            NotificationLog::new(config.log_file.clone()),
        )
    }

    pub fn log(&self) -> &NotificationLog {
        &self.log
    }

    /// Relay one raw stdin payload.
    ///
    /// A payload that does not parse aborts before any side effect. Optional
    /// announcers never abort the run; a failed log append does.
    pub fn run(&self, payload: &str) -> Result<RelayReport> {
        let event = NotificationEvent::parse(payload, &self.message_field)?;
        debug!("Relaying notification ({} chars)", event.message.len());

        let mut report = RelayReport::default();
        for announcer in &self.announcers {
            let name = announcer.name();
            if !announcer.is_available() {
                debug!("{name}: unavailable, skipping");
                report.skipped.push(name);
                continue;
            }

            match announcer.announce(&event) {
                Ok(()) => report.delivered.push(name),
                Err(e) => {
                    warn!("{name}: {e}");
                    report.failed.push(name);
                }
            }
        }

        self.log.append(&event.message)?;
        info!(
            "Notification relayed (delivered: {:?}, skipped: {:?}, failed: {:?})",
            report.delivered, report.skipped, report.failed
        );

        Ok(report)
    }
}
