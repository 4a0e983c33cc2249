//! copy-record — duplicate matched rows of a MySQL table.
//!
//! Selects every row matching the key predicates and re-inserts each one,
//! with per-column overrides: literal replacements, forced DEFAULT,
//! NOW(), or NULL. Auto-increment columns always take DEFAULT.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use sqlrecord::prelude::*;

#[derive(Parser)]
#[command(name = "copy-record")]
#[command(about = "Copy rows of a MySQL table with column-level overrides")]
#[command(disable_help_flag = true)]
#[command(after_help = "EXAMPLES:
    copy-record -d shop -t users -u app -p -k id -v 5 -c email -r b@x.com
    copy-record -d shop -t users -u app -P secret -k id -v 5 \\
        -c email -r b@x.com -n created_at -N notes")]
struct Cli {
    /// show this help
    #[arg(short = '?', long = "help", action = clap::ArgAction::Help)]
    help: Option<bool>,

    #[command(flatten)]
    connect: ConnectArgs,

    /// key column for the WHERE clause (repeatable, pairs with -v)
    #[arg(short = 'k', long = "key-name", required = true)]
    key_name: Vec<String>,

    /// key value (repeatable, pairs with -k)
    #[arg(short = 'v', long = "key-value", required = true)]
    key_value: Vec<String>,

    /// column name to replace value (repeatable, pairs with -r)
    #[arg(short = 'c', long = "column-name", required = true)]
    column_name: Vec<String>,

    /// replace value for column (repeatable, pairs with -c)
    #[arg(short = 'r', long = "replace-value", required = true)]
    replace_value: Vec<String>,

    /// use the default value for the column (repeatable)
    #[arg(short = 'D', long = "default-value")]
    default_value: Vec<String>,

    /// use NOW() for the column (repeatable)
    #[arg(short = 'n', long = "now")]
    now: Vec<String>,

    /// use NULL for the column (repeatable)
    #[arg(short = 'N', long = "null")]
    null: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if matches!(
            e.downcast_ref::<RecordError>(),
            Some(RecordError::Validation(_))
        ) {
            eprintln!();
            let _ = Cli::command().print_help();
        }
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    // All argument validation happens before any connection attempt.
    let keys = KeySpec::new(pair_values(
        &cli.key_name,
        &cli.key_value,
        "key",
        "value",
    )?)?;
    let overrides = OverrideSpec::new(
        pair_values(&cli.column_name, &cli.replace_value, "column", "replace")?,
        cli.default_value.clone(),
        cli.now.clone(),
        cli.null.clone(),
    )?;
    let cfg = cli.connect.to_config()?;

    let db = Db::connect(&cfg, prompt_password)
        .await
        .context("connecting to database")?;
    let columns = db
        .load_columns(&cfg.database, &cli.connect.table)
        .await
        .context("loading table metadata")?;

    let copied = db
        .copy_records(&cli.connect.table, &columns, &overrides, &keys)
        .await
        .context("copying records")?;
    db.close().await;

    println!("{} {} row(s) copied", "✓".green(), copied);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_copy_invocation() {
        let cli = Cli::try_parse_from([
            "copy-record",
            "-d",
            "shop",
            "-t",
            "users",
            "-u",
            "app",
            "-P",
            "secret",
            "-k",
            "id",
            "-v",
            "5",
            "-c",
            "email",
            "-r",
            "b@x.com",
            "-n",
            "created_at",
        ])
        .unwrap();
        assert_eq!(cli.connect.database, "shop");
        assert_eq!(cli.key_name, ["id"]);
        assert_eq!(cli.key_value, ["5"]);
        assert_eq!(cli.now, ["created_at"]);
    }

    #[test]
    fn test_prompt_conflicts_with_password() {
        let result = Cli::try_parse_from([
            "copy-record",
            "-d",
            "shop",
            "-t",
            "users",
            "-u",
            "app",
            "-p",
            "-P",
            "secret",
            "-k",
            "id",
            "-v",
            "5",
            "-c",
            "email",
            "-r",
            "b@x.com",
        ]);
        assert!(result.is_err());
    }
}
