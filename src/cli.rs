use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::commands::{self, CommandReport};
use crate::ttt::line::DONE_DATE_FORMAT;

#[derive(Debug, Parser)]
#[command(name = "ttt")]
#[command(about = "Tiny task tool: tag, cascade, and archive a Markdown task list", long_about = None)]
#[command(version)]
struct Cli {
    /// Print the command report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the working directory, task file, and default config
    Init,
    /// Append an open task to the task file
    #[command(alias = "t")]
    Add {
        /// Task text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },
    /// Cascade completion and add missing @done tags
    Tag {
        /// Date to stamp instead of the local calendar day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
    /// Move old completed tasks into the archive file
    Archive {
        /// Days a task must stay done before it moves (overrides config)
        #[arg(long)]
        delay_days: Option<u32>,
        /// Date to treat as today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
        /// Show what would move without writing either file
        #[arg(long)]
        dry_run: bool,
    },
    /// Show resolved paths, settings, and task counts
    Status {
        /// Date to treat as today (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DONE_DATE_FORMAT)
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Init => commands::init::run()?,
        Command::Add { words } => commands::add::run(&commands::add::AddOptions { words })?,
        Command::Tag { today } => commands::tag::run(&commands::tag::TagOptions { today })?,
        Command::Archive {
            delay_days,
            today,
            dry_run,
        } => commands::archive::run(&commands::archive::ArchiveOptions {
            delay_days,
            today,
            dry_run,
        })?,
        Command::Status { today } => {
            commands::status::run(&commands::status::StatusOptions { today })?
        }
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        anyhow::bail!(
            "{} reported {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}
