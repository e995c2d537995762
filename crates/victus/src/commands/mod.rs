//! Command dispatch: bridges CLI args -> catalog store -> output formatting.

pub mod administrators;
pub mod cities;
pub mod complexes;
pub mod config_cmd;
pub mod departments;
pub mod dwellings;
pub mod util;
pub mod watch;

use victus_core::CatalogStore;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    store: &CatalogStore,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Departments(args) => departments::handle(store, args, global).await,
        Command::Cities(args) => cities::handle(store, args, global).await,
        Command::Complexes(args) => complexes::handle(store, args, global).await,
        Command::Administrators(args) => administrators::handle(store, args, global).await,
        Command::Dwellings(args) => dwellings::handle(store, args, global).await,
        Command::Watch(args) => watch::handle(store, args, global).await,
        // Config is handled before a store exists
        Command::Config(args) => config_cmd::handle(args, global),
    }
}
