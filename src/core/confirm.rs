//! Yes/no decisions that need a human.

use std::io::{self, BufRead, Write};
use tracing::warn;

pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Always answers yes. Used for `--yes` and headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// Prompts on stdout and reads one line from stdin. An empty line means yes;
/// closed or unreadable stdin means no.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [Y/n]: ");
        let _ = io::stdout().flush();
        read_answer(&mut io::stdin().lock())
    }
}

fn read_answer(reader: &mut impl BufRead) -> bool {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => {
            warn!("no answer on stdin, treating as no");
            false
        }
        Ok(_) => parse_answer(&line),
        Err(e) => {
            warn!(error = %e, "failed to read answer");
            false
        }
    }
}

/// Replays canned answers, then answers no.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct ScriptedConfirm {
    answers: Vec<bool>,
    pub prompts: Vec<String>,
}

#[cfg(test)]
impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        let mut answers: Vec<bool> = answers.into_iter().collect();
        answers.reverse();
        ScriptedConfirm {
            answers,
            prompts: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop().unwrap_or(false)
    }
}

fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_parse() {
        assert!(parse_answer("\n"));
        assert!(parse_answer("Y\n"));
        assert!(parse_answer(" yes "));
        assert!(!parse_answer("n"));
        assert!(!parse_answer("nope"));
    }

    #[test]
    fn closed_input_is_a_no() {
        assert!(!read_answer(&mut io::Cursor::new("")));
        assert!(read_answer(&mut io::Cursor::new("\n")));
        assert!(read_answer(&mut io::Cursor::new("yes\n")));
        assert!(!read_answer(&mut io::Cursor::new("n\n")));
    }

    #[test]
    fn scripted_answers_replay_in_order() {
        let mut c = ScriptedConfirm::new([true, false]);
        assert!(c.confirm("a"));
        assert!(!c.confirm("b"));
        assert!(!c.confirm("c"));
        assert_eq!(c.prompts, vec!["a", "b", "c"]);
    }
}
