//! Interactive console.

pub mod command;
mod helper;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use recs_application::{AuditOutcome, Screen, SearchOutcome};
use recs_core::search::parse_datetime;
use recs_core::session::Credentials;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use crate::context::ConsoleContext;
use crate::render::{render_criteria, render_diagnostics};
use crate::table_ops::{self, TableOp};
use command::{FormField, HELP, ShellCommand, parse_command};
use helper::ShellHelper;

const HISTORY_FILE: &str = "history.txt";

pub struct Shell {
    ctx: ConsoleContext,
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl Shell {
    pub fn new(ctx: ConsoleContext) -> Result<Self> {
        let mut editor = Editor::<ShellHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(ShellHelper::new(ctx.config.ui.color)));
        if editor.load_history(&ctx.paths.config_dir().join(HISTORY_FILE)).is_err() {
            tracing::debug!("No shell history yet");
        }
        Ok(Self { ctx, editor })
    }

    pub async fn run(mut self) -> Result<()> {
        println!("{}", "Records Console".bright_magenta().bold());
        println!("{}", format!("Server: {}", self.ctx.config.server.base_url).bright_black());
        println!("{}", "Type 'help' for commands.".bright_black());

        loop {
            let screen = self.ctx.router.current_screen().await;
            let prompt = format!("recs({})> ", screen);

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    let command = match parse_command(&line) {
                        Ok(command) => command,
                        Err(message) => {
                            println!("{}", message.yellow());
                            continue;
                        }
                    };
                    if command == ShellCommand::Quit {
                        break;
                    }
                    if screen == Screen::Login && !command.allowed_without_session() {
                        println!("{}", "Please log in first: login [username]".yellow());
                        continue;
                    }
                    if let Err(e) = self.dispatch(command, screen).await {
                        println!("{}", format!("{:#}", e).red());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }

        if let Err(e) = self.editor.save_history(&self.ctx.paths.config_dir().join(HISTORY_FILE)) {
            tracing::debug!(error = %e, "Could not save shell history");
        }
        Ok(())
    }

    async fn dispatch(&mut self, command: ShellCommand, screen: Screen) -> Result<()> {
        match command {
            ShellCommand::Login { username } => self.login(username).await?,
            ShellCommand::Logout => {
                self.ctx.router.logout().await;
                println!("{}", "Logged out.".bright_green());
            }
            ShellCommand::Set { field, value } => self.set_field(field, &value).await?,
            ShellCommand::Unset(field) => {
                if let FormField::Filter(filter) = field {
                    self.ctx
                        .router
                        .records()
                        .update_criteria(|c| c.set_filter(filter, ""))
                        .await;
                }
            }
            ShellCommand::Criteria => {
                println!("{}", render_criteria(&self.ctx.router.records().criteria().await));
            }
            ShellCommand::Search => {
                if screen == Screen::AuditLogs {
                    println!("{}", "Search is on the record screen; type 'back' first.".yellow());
                } else {
                    self.search().await?;
                }
            }
            ShellCommand::Show => self.show(screen).await,
            ShellCommand::Sort(key) => self.table_op(screen, TableOp::Sort(key)).await,
            ShellCommand::Page(page) => self.table_op(screen, TableOp::Page(page)).await,
            ShellCommand::Next => self.table_op(screen, TableOp::Next).await,
            ShellCommand::Prev => self.table_op(screen, TableOp::Prev).await,
            ShellCommand::Rows(size) => self.table_op(screen, TableOp::Rows(size)).await,
            ShellCommand::Export => self.export(screen).await?,
            ShellCommand::Audit => self.open_audit().await?,
            ShellCommand::Back => {
                self.ctx.router.back().await;
                self.show(Screen::RecordSearch).await;
            }
            ShellCommand::Check => match self.ctx.router.check_token().await {
                Ok(()) => println!("{}", "Session is valid.".bright_green()),
                Err(e) if e.is_unauthorized() => self.session_expired(&e.user_message()),
                Err(e) => println!("{}", e.user_message().red()),
            },
            ShellCommand::Diagnostics => {
                println!("{}", render_diagnostics(&self.ctx.diagnostics.snapshot().await));
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Quit | ShellCommand::Empty => {}
        }
        Ok(())
    }

    async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username {
            Some(username) => username,
            None => match self.editor.readline("Username: ") {
                Ok(line) => line.trim().to_string(),
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
                Err(e) => return Err(e.into()),
            },
        };
        let password = dialoguer::Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()?;

        match self.ctx.router.login(&Credentials::new(username.clone(), password)).await {
            Ok(()) => println!("{}", format!("Logged in as {}.", username).bright_green()),
            Err(e) => println!("{}", e.login_message().red()),
        }
        Ok(())
    }

    async fn set_field(&self, field: FormField, value: &str) -> Result<()> {
        let records = self.ctx.router.records();
        match field {
            FormField::Start => {
                let start = parse_datetime(value)?;
                records.update_criteria(|c| c.start = start).await;
            }
            FormField::End => {
                let end = parse_datetime(value)?;
                records.update_criteria(|c| c.end = end).await;
            }
            FormField::Filter(filter) => {
                records.update_criteria(|c| c.set_filter(filter, value)).await;
            }
        }
        Ok(())
    }

    async fn search(&self) -> Result<()> {
        match self.ctx.router.records().search().await? {
            SearchOutcome::Loaded(_) => self.show(Screen::RecordSearch).await,
            SearchOutcome::Failed(message) => println!("{}", message.red()),
            SearchOutcome::SessionExpired(message) => self.session_expired(&message),
            SearchOutcome::Superseded => {}
        }
        Ok(())
    }

    async fn open_audit(&self) -> Result<()> {
        let (view, outcome) = self.ctx.router.open_audit_logs().await?;
        match outcome {
            AuditOutcome::Loaded(_) | AuditOutcome::Unavailable => {
                let table = view.read(|state| self.ctx.renderer.render(state.table())).await;
                print!("{}", table);
            }
            AuditOutcome::SessionExpired(message) => self.session_expired(&message),
            AuditOutcome::Superseded => {}
        }
        Ok(())
    }

    async fn show(&self, screen: Screen) {
        match screen {
            Screen::AuditLogs => {
                if let Some(view) = self.ctx.router.audit().await {
                    let table = view.read(|state| self.ctx.renderer.render(state.table())).await;
                    print!("{}", table);
                }
            }
            _ => {
                let (table, error) = self
                    .ctx
                    .router
                    .records()
                    .read(|state| {
                        (
                            self.ctx.renderer.render(state.table()),
                            state.error().map(str::to_string),
                        )
                    })
                    .await;
                match error {
                    Some(message) => println!("{}", message.red()),
                    None => print!("{}", table),
                }
            }
        }
    }

    async fn table_op(&self, screen: Screen, op: TableOp) {
        let result = match screen {
            Screen::AuditLogs => match self.ctx.router.audit().await {
                Some(view) => view.update_table(|table| table_ops::apply(table, &op)).await,
                None => Ok(()),
            },
            _ => {
                self.ctx
                    .router
                    .records()
                    .update_table(|table| table_ops::apply(table, &op))
                    .await
            }
        };
        match result {
            Ok(()) => self.show(screen).await,
            Err(message) => println!("{}", message.yellow()),
        }
    }

    async fn export(&self, screen: Screen) -> Result<()> {
        let export = match screen {
            Screen::AuditLogs => match self.ctx.router.audit().await {
                Some(view) => Some(view.export(Utc::now()).await),
                None => None,
            },
            _ => self.ctx.router.records().export(Utc::now()).await,
        };
        let Some(export) = export else {
            println!("{}", "Nothing to export; run a search first.".yellow());
            return Ok(());
        };
        let path = self.ctx.save_export(&export.file_name, &export.contents)?;
        println!("{}", format!("Saved {}", path.display()).bright_green());
        Ok(())
    }

    fn session_expired(&self, message: &str) {
        println!("{}", message.red());
        println!("{}", "Session ended; please log in again.".yellow());
    }
}
