use std::io::{self, BufRead, Write};

/// How the dashboard asks the administrator to confirm destructive actions and
/// tells them about failures.
pub trait Prompt {
    fn confirm(&self, message: &str) -> bool;

    fn alert(&self, message: &str);

    /// Asks for a replacement value, offering `current` as the default.
    fn ask(&self, message: &str, current: &str) -> Option<String>;
}

pub struct Terminal {
    assume_yes: bool,
}

impl Terminal {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl Prompt for Terminal {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/N] ", message);
        io::stderr().flush().ok();
        self.read_line()
            .map(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn ask(&self, message: &str, current: &str) -> Option<String> {
        eprint!("{} [{}] ", message, current);
        io::stderr().flush().ok();
        self.read_line()
            .map(|answer| if answer.is_empty() { current.to_string() } else { answer })
    }
}
