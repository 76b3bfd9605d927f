use crate::theme::Theme;

#[derive(Default)]
pub struct AppState {
    pub theme: Theme,
    pub should_quit: bool,
    /// Outcome of the last shortcut or command, shown in the footer.
    pub status: Option<StatusLine>,
}

pub struct StatusLine {
    pub message: String,
    pub is_error: bool,
}

impl AppState {
    pub fn info(&mut self, message: impl Into<String>) {
        self.status = Some(StatusLine {
            message: message.into(),
            is_error: false,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.status = Some(StatusLine {
            message: message.into(),
            is_error: true,
        });
    }
}
