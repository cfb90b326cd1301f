/// A line typed by the lecturer while a session is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Extend,
    Cancel,
    Quit,
    Help,
    Unknown,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "e" | "extend" => Command::Extend,
            "c" | "cancel" => Command::Cancel,
            "q" | "quit" | "exit" => Command::Quit,
            "h" | "help" | "?" => Command::Help,
            _ => Command::Unknown,
        }
    }

    /// Result of reading one line from stdin. A closed or unreadable stdin quits.
    pub fn from_input(line: std::io::Result<Option<String>>) -> Self {
        match line {
            Ok(Some(line)) => Command::parse(&line),
            Ok(None) => {
                tracing::info!("stdin closed");
                Command::Quit
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stdin");
                Command::Quit
            }
        }
    }
}
