use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tasklog_core::filter::{FilterError, FilterField, SortKey, SortOrder, TaskFilters};
use tasklog_core::form::FormField;
use tasklog_core::task::{TaskId, TaskStatus};

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tasklog",
    version,
    about = "Tasklog: command-line client for the task log service",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "tasklogrc", global = true)]
    pub tasklogrc: Option<PathBuf>,

    /// Base URL of the task API, e.g. http://localhost:5000/api
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List tasks, optionally filtered and sorted
    List(ListArgs),
    /// Create a task
    Add(AddArgs),
    /// Change fields of an existing task
    Edit {
        id: TaskId,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Create an open copy of a task, usually at a new time
    Duplicate {
        id: TaskId,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Flip a task between open and closed
    Toggle { id: TaskId },
    /// Delete a task
    Delete {
        id: TaskId,
        /// Do not ask for confirmation
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
    /// Known task types
    Types,
    /// Known contact persons
    Contacts,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long = "entity-name")]
    pub entity_name: Option<String>,

    #[arg(long = "task-type")]
    pub task_type: Option<String>,

    #[arg(long = "status")]
    pub status: Option<TaskStatus>,

    #[arg(long = "contact-person")]
    pub contact_person: Option<String>,

    /// Only tasks due on this day (YYYY-MM-DD)
    #[arg(long = "date")]
    pub date: Option<NaiveDate>,

    /// Free-text search across entity, type, contact and note
    #[arg(long = "search")]
    pub search: Option<String>,

    #[arg(long = "sort-by")]
    pub sort_by: Option<SortKey>,

    #[arg(long = "order")]
    pub order: Option<SortOrder>,
}

impl ListArgs {
    pub fn to_filters(&self) -> Result<TaskFilters, FilterError> {
        let mut filters = TaskFilters::default();
        let fields = [
            (FilterField::EntityName, self.entity_name.clone()),
            (FilterField::TaskType, self.task_type.clone()),
            (FilterField::Status, self.status.map(|s| s.as_str().to_string())),
            (FilterField::ContactPerson, self.contact_person.clone()),
            (
                FilterField::TaskDate,
                self.date.map(|d| d.format("%Y-%m-%d").to_string()),
            ),
            (FilterField::SearchTerm, self.search.clone()),
            (FilterField::SortBy, self.sort_by.map(|k| k.as_str().to_string())),
            (FilterField::SortOrder, self.order.map(|o| o.as_str().to_string())),
        ];

        for (field, value) in fields {
            if let Some(value) = value {
                filters.set(field, &value)?;
            }
        }
        Ok(filters)
    }
}

/// Date and 12-hour time pickers.
#[derive(Args, Debug, Clone, Default)]
pub struct ScheduleArgs {
    /// Due day (YYYY-MM-DD)
    #[arg(long = "date")]
    pub date: Option<String>,

    /// 1-12
    #[arg(long = "hour")]
    pub hour: Option<String>,

    /// 00, 15, 30 or 45
    #[arg(long = "minute")]
    pub minute: Option<String>,

    /// AM or PM
    #[arg(long = "meridiem")]
    pub meridiem: Option<String>,
}

impl ScheduleArgs {
    pub fn form_edits(&self) -> Vec<(FormField, String)> {
        [
            (FormField::TaskDate, &self.date),
            (FormField::Hour, &self.hour),
            (FormField::Minute, &self.minute),
            (FormField::Meridiem, &self.meridiem),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskFields {
    #[arg(long = "entity-name")]
    pub entity_name: Option<String>,

    #[arg(long = "task-type")]
    pub task_type: Option<String>,

    #[command(flatten)]
    pub schedule: ScheduleArgs,

    #[arg(long = "contact-person")]
    pub contact_person: Option<String>,

    #[arg(long = "note")]
    pub note: Option<String>,

    #[arg(long = "status")]
    pub status: Option<TaskStatus>,
}

impl TaskFields {
    /// Form inputs to overwrite; fields left out keep their current value.
    pub fn form_edits(&self) -> Vec<(FormField, String)> {
        let mut edits: Vec<(FormField, String)> = [
            (FormField::EntityName, &self.entity_name),
            (FormField::TaskType, &self.task_type),
            (FormField::ContactPerson, &self.contact_person),
            (FormField::Note, &self.note),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|v| (field, v)))
        .collect();
        edits.extend(self.schedule.form_edits());
        edits
    }
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(long = "entity-name")]
    pub entity_name: String,

    #[arg(long = "task-type")]
    pub task_type: String,

    /// Due day (YYYY-MM-DD)
    #[arg(long = "date")]
    pub date: String,

    #[arg(long = "hour")]
    pub hour: String,

    #[arg(long = "minute")]
    pub minute: String,

    #[arg(long = "meridiem")]
    pub meridiem: String,

    #[arg(long = "contact-person")]
    pub contact_person: String,

    #[arg(long = "note")]
    pub note: Option<String>,

    #[arg(long = "status")]
    pub status: Option<TaskStatus>,
}

impl From<AddArgs> for TaskFields {
    fn from(args: AddArgs) -> Self {
        Self {
            entity_name: Some(args.entity_name),
            task_type: Some(args.task_type),
            schedule: ScheduleArgs {
                date: Some(args.date),
                hour: Some(args.hour),
                minute: Some(args.minute),
                meridiem: Some(args.meridiem),
            },
            contact_person: Some(args.contact_person),
            note: args.note,
            status: args.status,
        }
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls `rc.KEY=VALUE` (or `rc.KEY:VALUE`) tokens out of the argument
/// list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else if let Some((k, v)) = rest.split_once(':') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                None
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}
