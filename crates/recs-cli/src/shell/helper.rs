use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use super::command::COMMAND_NAMES;

const FIELD_NAMES: &[&str] = &["start", "end", "phone", "voicemail", "user_id", "cluster"];

/// Completion, hints and highlighting for the console prompt.
#[derive(Clone)]
pub struct ShellHelper {
    color: bool,
}

impl ShellHelper {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Words that may follow `line`, which ends at the cursor.
    fn candidates(line: &str) -> (usize, Vec<&'static str>) {
        match line.split_once(' ') {
            None => (0, COMMAND_NAMES.iter().copied().filter(|c| c.starts_with(line)).collect()),
            Some((command, rest)) if matches!(command, "set" | "unset") && !rest.contains(' ') => {
                let start = command.len() + 1;
                let names = FIELD_NAMES.iter().copied().filter(|f| f.starts_with(rest));
                let names: Vec<&str> = if command == "unset" {
                    names.filter(|f| !matches!(*f, "start" | "end")).collect()
                } else {
                    names.collect()
                };
                (start, names)
            }
            Some(_) => (0, Vec::new()),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = Self::candidates(&line[..pos]);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.to_string(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !self.color {
            return Borrowed(line);
        }
        let command = line.split(' ').next().unwrap_or_default();
        if COMMAND_NAMES.contains(&command) {
            Owned(format!("{}{}", command.bright_cyan(), &line[command.len()..]))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        if self.color {
            Owned(hint.bright_black().to_string())
        } else {
            Borrowed(hint)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.color
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let (start, names) = Self::candidates(line);
        let typed = &line[start..];
        if typed.is_empty() {
            return None;
        }
        names
            .into_iter()
            .find(|name| name.len() > typed.len())
            .map(|name| name[typed.len()..].to_string())
    }
}

impl Validator for ShellHelper {}
