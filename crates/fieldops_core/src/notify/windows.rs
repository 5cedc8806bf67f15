use crate::error::AppError;
use crate::notify::{APP_TITLE, Notice, NoticeKind, Notifier};
use tauri_winrt_notification::Toast;

pub struct WindowsNotifier;

impl Notifier for WindowsNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), AppError> {
        let heading = match notice.kind {
            NoticeKind::Success => "Berhasil",
            NoticeKind::Warning => "Perhatian",
        };

        Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_TITLE)
            .text1(heading)
            .text2(&notice.message)
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;
        Ok(())
    }
}
