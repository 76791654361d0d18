use crate::error::Result;
use crate::event::NotificationEvent;

/// An optional, capability-gated output for a notification.
///
/// The relay asks `is_available` first and skips the announcer silently when
/// it returns false. `announce` is only called on available announcers.
pub trait Announcer {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn announce(&self, event: &NotificationEvent) -> Result<()>;
}
