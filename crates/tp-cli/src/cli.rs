//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::done::DoneArgs;
use crate::commands::edit::EditArgs;
use crate::commands::free::FreeArgs;
use crate::commands::list::ListArgs;
use crate::commands::reminders::RemindersArgs;
use crate::commands::star::StarArgs;
use crate::commands::suggest::SuggestArgs;

/// Personal task picker.
///
/// Keeps a task list and suggests what to do next for the energy and time
/// you have, working around your calendar.
#[derive(Debug, Parser)]
#[command(name = "tp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Quick-add a task by title.
    Add(AddArgs),

    /// List tasks, newest first.
    List(ListArgs),

    /// Change a task's details.
    Edit(EditArgs),

    /// Mark a task done, or reopen it.
    Done(DoneArgs),

    /// Star a task as one of today's priorities, or unstar it.
    Star(StarArgs),

    /// Delete a task.
    Delete(DeleteArgs),

    /// Show today's starred priorities and the brain dump.
    Today,

    /// Suggest what to work on next.
    Suggest(SuggestArgs),

    /// Show free time between calendar events.
    Free(FreeArgs),

    /// Preview the deadline and evening reminders.
    Reminders(RemindersArgs),
}
