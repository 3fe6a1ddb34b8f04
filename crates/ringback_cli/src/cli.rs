use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ringback_core::{AmbientZone, PhoneChoice, ReminderId, ReminderStatus};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ringback")]
#[command(about = "Schedule phone-call reminders and review the call timeline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Reminder store file
    #[arg(long, global = true, env = "RINGBACK_DB_PATH", default_value = "ringback.sqlite3")]
    pub db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "RINGBACK_LOG_DIR")]
    pub log_dir: Option<String>,

    /// trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, global = true, env = "RINGBACK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Zone used when no --tz is given or the given zone is unusable
    #[arg(long, global = true, env = "RINGBACK_AMBIENT_TZ", default_value = "system")]
    pub ambient_tz: AmbientZone,

    /// Evaluate against this RFC 3339 instant instead of the system clock
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve and validate a schedule without saving anything
    Resolve(ScheduleArgs),

    /// Create a reminder
    Add(ReminderArgs),

    /// Replace every field of an existing reminder
    Update {
        #[arg(long)]
        id: ReminderId,

        #[command(flatten)]
        reminder: ReminderArgs,
    },

    /// Delete a reminder permanently
    Delete {
        #[arg(long)]
        id: ReminderId,
    },

    /// Mark a reminder's call as placed
    Complete {
        #[arg(long)]
        id: ReminderId,
    },

    /// Mark a reminder's call as failed
    Fail {
        #[arg(long)]
        id: ReminderId,
    },

    /// List reminders, newest first
    List {
        /// scheduled|completed|failed
        #[arg(long)]
        status: Option<ReminderStatus>,

        /// Case-insensitive text in title or description
        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Show upcoming and past reminders
    Timeline,
}

#[derive(Args)]
pub struct ScheduleArgs {
    /// Calendar date (YYYY-MM-DD); omit to leave the reminder unscheduled
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Time of day, 24h HH:MM (defaults to 10:30)
    #[arg(long)]
    pub time: Option<String>,

    /// IANA time zone, e.g. America/New_York
    #[arg(long)]
    pub tz: Option<String>,
}

#[derive(Args)]
pub struct ReminderArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub description: Option<String>,

    #[command(flatten)]
    pub schedule: ScheduleArgs,

    #[command(flatten)]
    pub phone: PhoneArgs,
}

/// Exactly one of the two number sources.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct PhoneArgs {
    /// Number to call for this reminder only
    #[arg(long)]
    pub phone: Option<String>,

    /// The account's own number
    #[arg(long)]
    pub own_phone: Option<String>,
}

impl PhoneArgs {
    /// `None` only when clap's group check was bypassed.
    pub fn choice(&self) -> Option<PhoneChoice> {
        match (&self.phone, &self.own_phone) {
            (Some(number), None) => Some(PhoneChoice::Custom(number.clone())),
            (None, Some(number)) => Some(PhoneChoice::Own(number.clone())),
            _ => None,
        }
    }
}
