//! Operator I/O: line-based question/answer over a swappable backend.
//!
//! The interactive backend wraps rustyline; tests drive the same flows with
//! a scripted backend. The re-prompt loops (constrained choice, yes/no)
//! live here so every caller gets identical validation behavior.

use crate::cli_style;
use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Editor, Helper};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors surfaced by console backends.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Operator pressed Ctrl-C or Ctrl-D.
    #[error("input interrupted")]
    Interrupted,

    #[error("readline error: {0}")]
    Readline(String),

    /// A scripted console ran out of answers (test-only condition).
    #[error("no scripted answer left for prompt: {0}")]
    ScriptExhausted(String),
}

/// A line-based console the operator answers questions on.
pub trait Console: Send {
    /// Show `prompt` and read one line of input.
    fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError>;

    /// Print an informational line to the operator.
    fn say(&mut self, message: &str);
}

/// Ask a free-form question, trimming the answer.
pub fn ask(console: &mut dyn Console, label: &str) -> Result<String, ConsoleError> {
    let answer = console.read_line(&cli_style::question(label))?;
    Ok(answer.trim().to_string())
}

/// Ask a free-form question, re-prompting until the answer is non-empty.
pub fn ask_nonempty(console: &mut dyn Console, label: &str) -> Result<String, ConsoleError> {
    loop {
        let answer = ask(console, label)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
    }
}

/// Ask a constrained question, re-prompting with the valid options until one
/// of them is given verbatim.
pub fn ask_choice(
    console: &mut dyn Console,
    label: &str,
    options: &[&str],
) -> Result<String, ConsoleError> {
    let mut prompt = cli_style::question(label);
    loop {
        let answer = console.read_line(&prompt)?;
        let answer = answer.trim();
        if options.contains(&answer) {
            return Ok(answer.to_string());
        }
        prompt = cli_style::question(&format!("{} ({})", label, options.join(", ")));
    }
}

/// Ask a yes/no question, accepting y/yes/n/no case-insensitively and
/// re-prompting on anything else.
pub fn confirm(console: &mut dyn Console, label: &str) -> Result<bool, ConsoleError> {
    let mut prompt = cli_style::question(&format!("{} (y/n)", label));
    loop {
        let answer = console.read_line(&prompt)?;
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => prompt = cli_style::question("(y/n)"),
        }
    }
}

#[derive(rustyline_derive::Hinter)]
struct PromptHelper;

impl Completer for PromptHelper {
    type Candidate = String;
}
impl Highlighter for PromptHelper {}
impl Validator for PromptHelper {}
impl Helper for PromptHelper {}

/// Interactive console backed by a rustyline editor.
pub struct RustylineConsole {
    editor: Editor<PromptHelper, FileHistory>,
}

impl RustylineConsole {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(PromptHelper));
        Ok(Self { editor })
    }
}

impl Console for RustylineConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(&line);
                Ok(line)
            }
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => Err(ConsoleError::Interrupted),
            Err(e) => Err(ConsoleError::Readline(e.to_string())),
        }
    }

    fn say(&mut self, message: &str) {
        cli_style::print_status(message);
    }
}

/// Scripted console for tests: answers come from a queue, output is captured.
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    /// Every prompt shown, in order.
    pub prompts: Vec<String>,
    /// Every line said to the operator, in order.
    pub transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            transcript: Vec::new(),
        }
    }

    /// True when every scripted answer has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ConsoleError::ScriptExhausted(prompt.to_string()))
    }

    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_trims_answer() {
        let mut console = ScriptedConsole::new(["  hello world  "]);
        assert_eq!(ask(&mut console, "NAME").unwrap(), "hello world");
    }

    #[test]
    fn test_ask_nonempty_reprompts_on_blank() {
        let mut console = ScriptedConsole::new(["", "   ", "tag"]);
        assert_eq!(ask_nonempty(&mut console, "TAG").unwrap(), "tag");
        assert_eq!(console.prompts.len(), 3);
    }

    #[test]
    fn test_ask_choice_reprompts_until_valid() {
        let mut console = ScriptedConsole::new(["banana", "delete"]);
        let answer = ask_choice(&mut console, "ACTION", &["catalog", "delete", "exit"]).unwrap();
        assert_eq!(answer, "delete");
        // The second prompt lists the valid options.
        assert!(console.prompts[1].contains("catalog, delete, exit"));
    }

    #[test]
    fn test_confirm_accepts_variants() {
        let mut console = ScriptedConsole::new(["YES"]);
        assert!(confirm(&mut console, "CONTINUE?").unwrap());

        let mut console = ScriptedConsole::new([" n "]);
        assert!(!confirm(&mut console, "CONTINUE?").unwrap());

        let mut console = ScriptedConsole::new(["maybe", "y"]);
        assert!(confirm(&mut console, "CONTINUE?").unwrap());
    }

    #[test]
    fn test_script_exhaustion_is_an_error() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        assert!(matches!(
            ask(&mut console, "NAME"),
            Err(ConsoleError::ScriptExhausted(_))
        ));
    }
}
