//! CLI subcommand implementations.

pub mod add;
pub mod calendar_file;
pub mod delete;
pub mod done;
pub mod edit;
pub mod free;
pub mod list;
pub mod reminders;
pub mod star;
pub mod suggest;
pub mod today;
pub mod util;
