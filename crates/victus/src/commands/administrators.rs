//! Administrator command handlers.

use tabled::Tabled;
use victus_core::{Administrator, CatalogKind, CatalogStore, sorted_by_name};

use crate::cli::{AdministratorsArgs, AdministratorsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct AdministratorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&Administrator> for AdministratorRow {
    fn from(a: &Administrator) -> Self {
        Self {
            id: a.id.clone(),
            name: a.name.clone(),
            email: a.email.clone(),
        }
    }
}

pub async fn handle(
    store: &CatalogStore,
    args: AdministratorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AdministratorsCommand::List { name } => {
            store.refresh().await?;
            let snap = store.snapshot();
            let needle = name.map(|n| n.to_lowercase());
            let matching: Vec<Administrator> = snap
                .administrators
                .iter()
                .filter(|a| {
                    needle
                        .as_deref()
                        .is_none_or(|n| a.name.to_lowercase().contains(n))
                })
                .cloned()
                .collect();
            let sorted = sorted_by_name(matching, |a: &Administrator| &a.name);
            let out = output::render_list(
                global.output,
                &sorted,
                |a| AdministratorRow::from(a),
                |a| a.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AdministratorsCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete administrator '{id}'?"),
                "administrators delete",
                global.yes,
            )? {
                return Ok(());
            }
            store
                .delete(CatalogKind::Administrator, &id)
                .await
                .map_err(util::core_err("administrators"))?;
            output::notice("Administrator deleted", global.quiet);
            Ok(())
        }
    }
}
