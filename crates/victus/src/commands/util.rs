//! Shared helpers for command handlers.

use std::io::IsTerminal;

use victus_core::{CatalogEntity, CoreError};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the action is refused
/// instead of silently declined.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a core failure, pointing 404s at the list command for `resource`.
pub fn core_err(resource: &str) -> impl Fn(CoreError) -> CliError + '_ {
    move |err| CliError::from(err).with_list_command(&format!("{resource} list"))
}

/// An entity of the wrong kind came back from a typed call.
pub fn unexpected(entity: &CatalogEntity) -> CliError {
    CliError::InvalidResponse {
        message: format!("expected a different record kind, got {}", entity.kind()),
    }
}
