//! Parsing of shell input lines.

use recs_core::search::FilterField;
use recs_core::table::PAGE_SIZE_OPTIONS;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// A field of the search form that `set` and `unset` can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Start,
    End,
    Filter(FilterField),
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" | "from" => Ok(FormField::Start),
            "end" | "to" => Ok(FormField::End),
            other => FilterField::from_str(other)
                .map(FormField::Filter)
                .map_err(|_| format!("Unknown field '{}'. Fields: start, end, phone, voicemail, user_id, cluster", s)),
        }
    }
}

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login { username: Option<String> },
    Logout,
    Set { field: FormField, value: String },
    Unset(FormField),
    Criteria,
    Search,
    Show,
    /// Column key; resolved against the active table.
    Sort(String),
    /// Zero-based page index. Users type page numbers starting at 1.
    Page(usize),
    Next,
    Prev,
    Rows(NonZeroUsize),
    Export,
    Audit,
    Back,
    Check,
    Diagnostics,
    Help,
    Quit,
    Empty,
}

/// Names offered by tab completion.
pub const COMMAND_NAMES: &[&str] = &[
    "login", "logout", "set", "unset", "criteria", "search", "show", "sort", "page", "next", "prev", "rows",
    "export", "audit", "back", "check", "diagnostics", "help", "quit", "exit",
];

impl ShellCommand {
    /// Commands that need no session.
    pub fn allowed_without_session(&self) -> bool {
        matches!(
            self,
            ShellCommand::Login { .. }
                | ShellCommand::Help
                | ShellCommand::Quit
                | ShellCommand::Diagnostics
                | ShellCommand::Empty
        )
    }
}

/// Parses one input line.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellCommand::Empty);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "login" => ShellCommand::Login {
            username: (!rest.is_empty()).then(|| rest.to_string()),
        },
        "logout" => ShellCommand::Logout,
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "Usage: set <field> <value>".to_string())?;
            ShellCommand::Set {
                field: field.parse()?,
                value: value.trim().to_string(),
            }
        }
        "unset" | "clear" => {
            if rest.is_empty() {
                return Err("Usage: unset <field>".to_string());
            }
            let field: FormField = rest.parse()?;
            if matches!(field, FormField::Start | FormField::End) {
                return Err("The date range cannot be unset; use 'set' to change it".to_string());
            }
            ShellCommand::Unset(field)
        }
        "criteria" | "form" => ShellCommand::Criteria,
        "search" | "s" => ShellCommand::Search,
        "show" | "ls" => ShellCommand::Show,
        "sort" => {
            if rest.is_empty() {
                return Err("Usage: sort <column>".to_string());
            }
            ShellCommand::Sort(rest.to_string())
        }
        "page" => {
            let number: usize = rest
                .parse()
                .map_err(|_| "Usage: page <number> (starting at 1)".to_string())?;
            if number == 0 {
                return Err("Page numbers start at 1".to_string());
            }
            ShellCommand::Page(number - 1)
        }
        "next" | "n" => ShellCommand::Next,
        "prev" | "p" => ShellCommand::Prev,
        "rows" => {
            let size: usize = rest.parse().unwrap_or(0);
            match NonZeroUsize::new(size).filter(|_| PAGE_SIZE_OPTIONS.contains(&size)) {
                Some(size) => ShellCommand::Rows(size),
                None => return Err(format!("Usage: rows <{}>", join_sizes())),
            }
        }
        "export" => ShellCommand::Export,
        "audit" => ShellCommand::Audit,
        "back" => ShellCommand::Back,
        "check" => ShellCommand::Check,
        "diagnostics" | "diag" => ShellCommand::Diagnostics,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
    };
    Ok(command)
}

fn join_sizes() -> String {
    PAGE_SIZE_OPTIONS
        .iter()
        .map(|size| size.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

pub const HELP: &str = "\
Session
  login [username]        Log in (password is prompted)
  logout                  End the session and reset the form
  check                   Ask the server whether the session is still valid

Record search
  set <field> <value>     Set start, end, phone, voicemail, user_id or cluster
  unset <field>           Clear a filter
  criteria                Show the search form
  search                  Fetch records for the form

Tables (records or audit, whichever is open)
  show                    Print the current page
  sort <column>           Sort by a column; again to reverse
  page <n>, next, prev    Move between pages
  rows <10|25|50|100>     Rows per page
  export                  Write the full table as CSV

Screens
  audit                   Open the audit log
  back                    Return to record search

  diagnostics             Show recent warnings captured this run
  help                    This text
  quit                    Leave the shell";

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_login_with_and_without_username() {
        assert_eq!(parse_command("login").unwrap(), ShellCommand::Login { username: None });
        assert_eq!(
            parse_command("login  alice ").unwrap(),
            ShellCommand::Login {
                username: Some("alice".to_string())
            }
        );
    }

    #[test]
    fn test_set_keeps_value_with_spaces() {
        assert_eq!(
            parse_command("set start 2024-03-05 14:00").unwrap(),
            ShellCommand::Set {
                field: FormField::Start,
                value: "2024-03-05 14:00".to_string()
            }
        );
        assert_eq!(
            parse_command("set user u1").unwrap(),
            ShellCommand::Set {
                field: FormField::Filter(FilterField::UserId),
                value: "u1".to_string()
            }
        );
    }

    #[test]
    fn test_set_rejects_unknown_field() {
        let err = parse_command("set colour red").unwrap_err();
        assert!(err.contains("Unknown field 'colour'"));
        assert!(parse_command("set phone").is_err());
    }

    #[test]
    fn test_unset_only_filters() {
        assert_eq!(
            parse_command("unset cluster").unwrap(),
            ShellCommand::Unset(FormField::Filter(FilterField::Cluster))
        );
        assert!(parse_command("unset start").is_err());
    }

    #[test]
    fn test_page_is_one_based_for_users() {
        assert_eq!(parse_command("page 3").unwrap(), ShellCommand::Page(2));
        assert!(parse_command("page 0").is_err());
        assert!(parse_command("page two").is_err());
    }

    #[test]
    fn test_rows_limited_to_options() {
        assert_eq!(
            parse_command("rows 25").unwrap(),
            ShellCommand::Rows(NonZeroUsize::new(25).unwrap())
        );
        let err = parse_command("rows 7").unwrap_err();
        assert_eq!(err, "Usage: rows <10|25|50|100>");
    }

    #[test]
    fn test_aliases_and_case() {
        assert_eq!(parse_command("EXIT").unwrap(), ShellCommand::Quit);
        assert_eq!(parse_command("n").unwrap(), ShellCommand::Next);
        assert_eq!(parse_command("   ").unwrap(), ShellCommand::Empty);
        assert_eq!(parse_command("sort phone").unwrap(), ShellCommand::Sort("phone".to_string()));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_command("frobnicate now").unwrap_err();
        assert!(err.starts_with("Unknown command 'frobnicate'"));
    }

    #[test]
    fn test_session_gate() {
        assert!(parse_command("login").unwrap().allowed_without_session());
        assert!(parse_command("help").unwrap().allowed_without_session());
        assert!(!parse_command("search").unwrap().allowed_without_session());
        assert!(!parse_command("audit").unwrap().allowed_without_session());
    }
}
