//! Terminal rendering of controller signals and notifications.

use attendance::{Notification, NotificationLevel, NotificationSurface, SessionSignal};
use colored::Colorize;

/// `mm:ss` for a countdown value.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub struct CountdownView {
    json: bool,
    code: Option<String>,
}

impl CountdownView {
    pub fn new(json: bool) -> Self {
        Self { json, code: None }
    }

    /// Text line for `signal`, or `None` when nothing should be printed.
    pub fn line(&mut self, signal: &SessionSignal) -> Option<String> {
        if self.json {
            return signal.to_json();
        }

        let text = match signal {
            SessionSignal::Started { session } => {
                self.code = Some(session.code.clone());
                format!(
                    "{} code {} for {} ({} left)",
                    "Attendance open:".green().bold(),
                    session.code.bold(),
                    session.class_name.as_deref().unwrap_or(session.class_id.as_str()),
                    format_clock(session.time_remaining_seconds)
                )
            }
            SessionSignal::Tick { remaining_seconds } => {
                let clock = format_clock(*remaining_seconds);
                let code = self.code.as_deref().unwrap_or("------");
                format!("[{}] {}", clock, code)
            }
            SessionSignal::WarningThresholdReached => {
                "Almost out of time. Type `extend` to keep the code open."
                    .yellow()
                    .to_string()
            }
            SessionSignal::Extended { remaining_seconds } => format!(
                "{} {} left",
                "Extended:".green(),
                format_clock(*remaining_seconds)
            ),
            SessionSignal::Expired { .. } => "Code expired".red().bold().to_string(),
            SessionSignal::Cleared => "Session closed".dimmed().to_string(),
            // Failures are already shown by the notifier
            SessionSignal::Error { .. } => return None,
        };
        Some(text)
    }

    pub fn render(&mut self, signal: &SessionSignal) {
        if let Some(line) = self.line(signal) {
            println!("{line}");
        }
    }

    pub fn help(&self) {
        println!("commands: extend (e), cancel (c), quit (q)");
    }
}

/// Prints notifications to stderr.
pub struct ConsoleNotifier;

impl NotificationSurface for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        let title = match n.level {
            NotificationLevel::Success => n.title.green().bold(),
            NotificationLevel::Error => n.title.red().bold(),
        };
        eprintln!("{title}: {}", n.message);
    }
}
