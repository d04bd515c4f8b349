//! Non-interactive subcommands.

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use colored::Colorize;
use recs_application::{AuditOutcome, CsvExport, SearchOutcome};
use recs_core::search::FilterField;
use recs_core::session::Credentials;
use recs_core::table::{Column, SortDirection, SortState, TableView};
use std::str::FromStr;

use crate::context::ConsoleContext;
use crate::table_ops::{go_to_page, parse_column};
use crate::{SearchArgs, TableArgs};

const SESSION_EXPIRED_HINT: &str = "Session ended; run `recs login` again.";

pub async fn login(ctx: &ConsoleContext, username: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()?,
    };
    ctx.router
        .login(&Credentials::new(username.clone(), password))
        .await
        .map_err(|e| anyhow!(e.login_message()))?;
    println!("{}", format!("Logged in as {}.", username).bright_green());
    Ok(())
}

pub async fn logout(ctx: &ConsoleContext) -> Result<()> {
    ctx.router.logout().await;
    println!("{}", "Logged out.".bright_green());
    Ok(())
}

pub async fn check(ctx: &ConsoleContext) -> Result<()> {
    match ctx.router.check_token().await {
        Ok(()) => {
            println!("{}", "Session is valid.".bright_green());
            Ok(())
        }
        Err(e) if e.is_unauthorized() => bail!("{} {}", e.user_message(), SESSION_EXPIRED_HINT),
        Err(e) => Err(e.into()),
    }
}

pub async fn search(ctx: &ConsoleContext, args: &SearchArgs) -> Result<()> {
    let records = ctx.router.records();
    records
        .update_criteria(|criteria| {
            criteria.start = args.start;
            criteria.end = args.end;
            for (field, value) in [
                (FilterField::Phone, &args.phone),
                (FilterField::Voicemail, &args.voicemail),
                (FilterField::UserId, &args.user_id),
                (FilterField::Cluster, &args.cluster),
            ] {
                criteria.set_filter(field, value.clone().unwrap_or_default());
            }
        })
        .await;

    match records.search().await? {
        SearchOutcome::Loaded(_) => {}
        SearchOutcome::Failed(message) => bail!(message),
        SearchOutcome::SessionExpired(message) => bail!("{} {}", message, SESSION_EXPIRED_HINT),
        SearchOutcome::Superseded => bail!("Search was cancelled"),
    }

    let table = records
        .update_table(|table| {
            arrange(table, &args.table)?;
            Ok::<_, String>(ctx.renderer.render(&*table))
        })
        .await
        .map_err(|message| anyhow!(message))?;
    print!("{}", table);

    if args.table.export {
        match records.export(Utc::now()).await {
            Some(export) => save(ctx, &export)?,
            None => println!("{}", "No records; nothing exported.".yellow()),
        }
    }
    Ok(())
}

pub async fn audit(ctx: &ConsoleContext, args: &TableArgs) -> Result<()> {
    let (view, outcome) = ctx.router.open_audit_logs().await?;
    match outcome {
        AuditOutcome::Loaded(_) | AuditOutcome::Unavailable => {}
        AuditOutcome::SessionExpired(message) => bail!("{} {}", message, SESSION_EXPIRED_HINT),
        AuditOutcome::Superseded => bail!("Audit fetch was cancelled"),
    }

    let table = view
        .update_table(|table| {
            arrange(table, args)?;
            Ok::<_, String>(ctx.renderer.render(&*table))
        })
        .await
        .map_err(|message| anyhow!(message))?;
    print!("{}", table);

    if args.export {
        save(ctx, &view.export(Utc::now()).await)?;
    }
    Ok(())
}

/// Applies the sort, page size and page requested on the command line.
fn arrange<T, C>(table: &mut TableView<T, C>, args: &TableArgs) -> Result<(), String>
where
    C: Column<T> + FromStr,
{
    let column = match &args.sort {
        Some(key) => parse_column::<T, C>(key)?,
        None => table.sort_state().column,
    };
    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    table.set_sort(SortState::with_direction(column, direction));
    if let Some(rows) = args.rows {
        table.set_page_size(rows);
    }
    let page = usize::try_from(args.page.saturating_sub(1)).unwrap_or(usize::MAX);
    go_to_page(table, page)
}

fn save(ctx: &ConsoleContext, export: &CsvExport) -> Result<()> {
    let path = ctx.save_export(&export.file_name, &export.contents)?;
    println!("{}", format!("Saved {}", path.display()).bright_green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recs_core::audit::{AuditColumn, AuditLogEntry};
    use std::num::NonZeroUsize;

    fn entry(id: i64) -> AuditLogEntry {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "path": "/records",
            "method": "GET",
            "status_code": 200,
            "timestamp": format!("2024-03-05T14:{:02}:00Z", id),
        }))
        .unwrap()
    }

    fn args(sort: Option<&str>, desc: bool, page: u64, rows: Option<usize>) -> TableArgs {
        TableArgs {
            sort: sort.map(str::to_string),
            desc,
            page,
            rows: rows.and_then(NonZeroUsize::new),
            export: false,
        }
    }

    fn table() -> TableView<AuditLogEntry, AuditColumn> {
        let mut table = TableView::new(AuditColumn::Timestamp);
        table.replace_rows((1..=30).map(entry).collect());
        table
    }

    #[test]
    fn test_arrange_defaults_keep_column() {
        let mut t = table();
        arrange(&mut t, &args(None, true, 1, None)).unwrap();
        assert_eq!(
            t.sort_state(),
            SortState::with_direction(AuditColumn::Timestamp, SortDirection::Descending)
        );
        assert_eq!(t.visible()[0].id, 30);
    }

    #[test]
    fn test_arrange_page_after_rows() {
        let mut t = table();
        arrange(&mut t, &args(Some("id"), false, 2, Some(25))).unwrap();
        assert_eq!(t.page(), 1);
        let ids: Vec<i64> = t.visible().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![26, 27, 28, 29, 30]);
    }

    #[test]
    fn test_arrange_rejects_missing_page() {
        let mut t = table();
        let err = arrange(&mut t, &args(None, false, 9, None)).unwrap_err();
        assert_eq!(err, "Page 9 does not exist; there are 3 pages");
    }

    #[test]
    fn test_arrange_rejects_unknown_column() {
        let mut t = table();
        assert!(arrange(&mut t, &args(Some("bogus"), false, 1, None)).is_err());
    }
}
