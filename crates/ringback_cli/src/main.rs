//! Ringback command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto `ringback_core` service calls.
//! - Sample "now" once per invocation and pass it down explicitly.

mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, ReminderArgs, ScheduleArgs};
use log::debug;
use ringback_core::db::open_db;
use ringback_core::{
    init_logging, Instant, ReminderDraft, ReminderListQuery, ReminderService, ScheduleDraft,
    ScheduleValidator, SqliteReminderRepository, TimeResolver,
};

fn main() -> Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or(ringback_core::default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let now = evaluation_now(&cli)?;
    debug!("event=cli_start module=cli status=ok now={now} json={}", cli.json);
    let validator = ScheduleValidator::new(TimeResolver::new(cli.ambient_tz));

    if let Command::Resolve(schedule) = &cli.command {
        let decision = validator.validate(&schedule_draft(schedule), now);
        return output::print_decision(&decision, cli.json);
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open reminder store `{}`", cli.db.display()))?;
    let service =
        ReminderService::with_validator(SqliteReminderRepository::new(&conn), validator);

    match cli.command {
        Command::Resolve(_) => Ok(()),
        Command::Add(args) => {
            let reminder = service.create_reminder(&reminder_draft(&args)?, now)?;
            output::print_reminder(&reminder, cli.json)
        }
        Command::Update { id, reminder } => {
            let reminder = service.update_reminder(id, &reminder_draft(&reminder)?, now)?;
            output::print_reminder(&reminder, cli.json)
        }
        Command::Delete { id } => {
            service.delete_reminder(id)?;
            println!("deleted reminder {id}");
            Ok(())
        }
        Command::Complete { id } => {
            service.mark_completed(id, now)?;
            println!("reminder {id} marked completed");
            Ok(())
        }
        Command::Fail { id } => {
            service.mark_failed(id, now)?;
            println!("reminder {id} marked failed");
            Ok(())
        }
        Command::List {
            status,
            search,
            page,
            limit,
        } => {
            let page = service.list_reminders(&ReminderListQuery {
                status,
                search,
                page,
                limit,
            })?;
            output::print_page(&page, cli.json)
        }
        Command::Timeline => {
            let partition = service.timeline(now)?;
            output::print_partition(&partition, cli.json)
        }
    }
}

fn evaluation_now(cli: &Cli) -> Result<Instant> {
    match cli.now.as_deref() {
        Some(raw) => Instant::parse(raw).context("invalid --now value"),
        None => Ok(Instant::from(chrono::Utc::now())),
    }
}

fn schedule_draft(args: &ScheduleArgs) -> ScheduleDraft {
    ScheduleDraft {
        date: args.date,
        time_of_day: args.time.clone(),
        timezone: args.tz.clone(),
    }
}

fn reminder_draft(args: &ReminderArgs) -> Result<ReminderDraft> {
    let phone = args
        .phone
        .choice()
        .context("exactly one of --phone or --own-phone is required")?;
    Ok(ReminderDraft {
        title: args.title.clone(),
        description: args.description.clone(),
        schedule: schedule_draft(&args.schedule),
        phone,
    })
}
