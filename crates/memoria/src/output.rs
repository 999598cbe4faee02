//! Colored terminal output utilities.

use console::{Style, Term};
use memoria_comments::{Confirm, NoticeKind, UiEvent};
use tracing::debug;

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a highlighted message (cyan bold).
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }

    /// Print secondary detail (dim).
    pub(crate) fn detail(&self, msg: &str) {
        let _ = self.term.write_line(&self.dim.apply_to(msg).to_string());
    }

    /// Print a separator line.
    pub(crate) fn separator(&self) {
        let _ = self.term.write_line(&"=".repeat(70));
    }

    /// Print success notices from drained panel events.
    ///
    /// Error notices are skipped: the failing call also returns the error,
    /// which `main` prints.
    pub(crate) fn notices(&self, events: Vec<UiEvent>) {
        for event in events {
            match event {
                UiEvent::Notice(notice) if notice.kind == NoticeKind::Success => {
                    self.success(&notice.text);
                }
                UiEvent::Notice(_) => {}
                UiEvent::FocusRequested(field) => debug!("Focus requested on {}", field),
            }
        }
    }
}

impl Confirm for Output {
    fn confirm(&self, prompt: &str) -> bool {
        let _ = self
            .term
            .write_str(&format!("{} [s/N] ", self.yellow.apply_to(prompt)));
        match self.term.read_line() {
            Ok(answer) => is_affirmative(&answer),
            Err(err) => {
                debug!("Could not read confirmation: {}", err);
                false
            }
        }
    }
}

/// Accept Spanish or English yes answers.
fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        for answer in ["s", "Sí", " si ", "y", "YES"] {
            assert!(is_affirmative(answer), "{answer:?} should confirm");
        }
    }

    #[test]
    fn test_default_is_decline() {
        for answer in ["", "n", "no", "tal vez"] {
            assert!(!is_affirmative(answer), "{answer:?} should decline");
        }
    }
}
