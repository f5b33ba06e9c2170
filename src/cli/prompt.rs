//! Interactive prompts on the terminal

use crate::domain::migration::Prompter;
use crate::shared::error::{MigrateError, Result};
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Reads answers from stdin. End of input counts as cancelling.
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_line(&self, prompt: &str) -> Result<String> {
        print!("{} ", prompt.cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(MigrateError::Cancelled);
        }
        Ok(line.trim().to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, label: &str, items: &[String]) -> Result<usize> {
        if items.is_empty() {
            return Err(MigrateError::validation(format!("nothing to choose for '{}'", label)));
        }

        println!("{}", label.bold());
        for (index, item) in items.iter().enumerate() {
            println!("  {}) {}", index + 1, item);
        }

        loop {
            let answer = self.read_line(&format!("Choose 1-{}:", items.len()))?;
            match parse_choice(&answer, items.len()) {
                Some(index) => return Ok(index),
                None => println!("{}", format!("'{}' is not one of the choices", answer).yellow()),
            }
        }
    }

    fn input(&self, label: &str) -> Result<String> {
        self.read_line(&format!("{}:", label))
    }

    fn confirm(&self, label: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{} [y/N]", label.bold()))?;
        Ok(is_yes(&answer))
    }
}

/// 1-based answer to 0-based index.
fn parse_choice(answer: &str, count: usize) -> Option<usize> {
    match answer.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        _ => None,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
