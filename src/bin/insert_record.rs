//! insert-record — insert one row into a MySQL table.
//!
//! Every column's value comes from a literal (-c/-v pair), NOW(), NULL,
//! or falls back to its SQL DEFAULT. Auto-increment columns always take
//! DEFAULT.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use sqlrecord::prelude::*;

#[derive(Parser)]
#[command(name = "insert-record")]
#[command(about = "Insert a row into a MySQL table from column-level values")]
#[command(disable_help_flag = true)]
#[command(after_help = "EXAMPLES:
    insert-record -d shop -t users -u app -P secret -c name -v Alice
    insert-record -d shop -t users -u app -p \\
        -c name -v Alice -c email -v a@x.com -n created_at -N notes")]
struct Cli {
    /// show this help
    #[arg(short = '?', long = "help", action = clap::ArgAction::Help)]
    help: Option<bool>,

    #[command(flatten)]
    connect: ConnectArgs,

    /// column name to set value (repeatable, pairs with -v)
    #[arg(short = 'c', long = "column-name")]
    column_name: Vec<String>,

    /// a value for column (repeatable, pairs with -c)
    #[arg(short = 'v', long = "column-value")]
    column_value: Vec<String>,

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
    let overrides = OverrideSpec::new(
        pair_values(&cli.column_name, &cli.column_value, "column", "value")?,
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

    let inserted = db
        .insert_record(&cli.connect.table, &columns, &overrides)
        .await
        .context("inserting record")?;
    db.close().await;

    println!("{} {} row(s) inserted", "✓".green(), inserted);
    Ok(())
}
