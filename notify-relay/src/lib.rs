//! notify-relay: Claude Code notification hook.
//!
//! Turns one hook payload on stdin into a desktop popup, spoken audio and a
//! line in the notification log.

pub mod announcer;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod notifier;
pub mod relay;
pub mod speech;

pub use announcer::Announcer;
pub use config::Config;
pub use error::{RelayError, Result};
pub use event::NotificationEvent;
pub use history::{LogEntry, NotificationLog};
pub use relay::{Relay, RelayReport};
