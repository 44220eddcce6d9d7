//! One module per subcommand.  Each exposes an `execute` function.

pub mod add_entry;
pub mod add_folder;
pub mod attach;
pub mod change_password;
pub mod completions;
pub mod create;
pub mod delete;
pub mod generate;
pub mod get;
pub mod list;
pub mod show;
