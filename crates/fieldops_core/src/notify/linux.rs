use crate::error::AppError;
use crate::notify::{APP_TITLE, Notice, NoticeKind, Notifier};
use notify_rust::{Notification, Urgency};

pub struct LinuxNotifier;

impl Notifier for LinuxNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let urgency = match notice.kind {
            NoticeKind::Success => Urgency::Normal,
            NoticeKind::Warning => Urgency::Critical,
        };

        Notification::new()
            .summary(APP_TITLE)
            .body(&notice.message)
            .urgency(urgency)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
