//! Terminal implementations of the presentation seams.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use tracing::warn;

use crate::crud::{Confirmer, Presenter};

/// Prints outcomes to stdout; progress and failures go to stderr.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn loading(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, title: &str, messages: &[String]) {
        for line in error_lines(title, messages) {
            eprintln!("{}", line);
        }
    }
}

/// `Error: <title>` followed by one indented line per message.
pub fn error_lines(title: &str, messages: &[String]) -> Vec<String> {
    std::iter::once(format!("Error: {}", title))
        .chain(messages.iter().map(|m| format!("  - {}", m)))
        .collect()
}

/// Reads a `y/N` answer from stdin unless `--yes` was given.
#[derive(Debug, Clone, Copy)]
pub struct StdinConfirmer {
    assume_yes: bool,
}

impl StdinConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

/// Only an explicit `y` or `yes` confirms.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            eprint!("{}\nProceed? (y/N) ", prompt);
            io::stderr().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_affirmative(&line),
            Ok(Err(e)) => {
                warn!("Could not read confirmation: {}", e);
                false
            }
            Err(e) => {
                warn!("Confirmation prompt aborted: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_explicit_yes_confirms() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[test]
    fn test_error_lines_are_plain_text() {
        let lines = error_lines(
            "Could not save user",
            &["RUT is invalid".to_string(), "Email is required".to_string()],
        );
        assert_eq!(
            lines,
            vec![
                "Error: Could not save user".to_string(),
                "  - RUT is invalid".to_string(),
                "  - Email is required".to_string(),
            ]
        );
        assert!(lines.iter().all(|l| l.is_ascii()));
    }

    #[tokio::test]
    async fn test_assume_yes_skips_prompt() {
        assert!(StdinConfirmer::new(true).confirm("Delete?").await);
    }
}
