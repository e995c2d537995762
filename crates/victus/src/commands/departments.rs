//! Department command handlers.

use tabled::Tabled;
use victus_core::{
    CatalogEntity, CatalogKind, CatalogStore, Department, DepartmentRequest, sorted_by_name,
};

use crate::cli::{DepartmentsArgs, DepartmentsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DepartmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Department> for DepartmentRow {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
        }
    }
}

fn expect_department(entity: CatalogEntity) -> Result<Department, CliError> {
    match entity {
        CatalogEntity::Department(d) => Ok(d),
        other => Err(util::unexpected(&other)),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    store: &CatalogStore,
    args: DepartmentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DepartmentsCommand::List { name } => {
            store.refresh().await?;
            let snap = store.snapshot();
            let needle = name.map(|n| n.to_lowercase());
            let matching: Vec<Department> = snap
                .departments
                .iter()
                .filter(|d| {
                    needle
                        .as_deref()
                        .is_none_or(|n| d.name.to_lowercase().contains(n))
                })
                .cloned()
                .collect();
            let sorted = sorted_by_name(matching, |d: &Department| &d.name);
            let out = output::render_list(
                global.output,
                &sorted,
                |d| DepartmentRow::from(d),
                |d| d.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DepartmentsCommand::Create { name } => {
            let request = DepartmentRequest { nombre: name };
            request.validate()?;
            let created = store
                .create(CatalogKind::Department, &request)
                .await
                .map_err(util::core_err("departments"))?;
            let department = expect_department(created)?;
            let out = output::render_single(
                global.output,
                &department,
                |d| DepartmentRow::from(d),
                |d| d.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DepartmentsCommand::Update { id, name } => {
            let request = DepartmentRequest { nombre: name };
            request.validate()?;
            let updated = store
                .update(CatalogKind::Department, &id, &request)
                .await
                .map_err(util::core_err("departments"))?;
            let department = expect_department(updated)?;
            let out = output::render_single(
                global.output,
                &department,
                |d| DepartmentRow::from(d),
                |d| d.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DepartmentsCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete department '{id}'? Its cities and complexes go with it."),
                "departments delete",
                global.yes,
            )? {
                return Ok(());
            }
            store
                .delete(CatalogKind::Department, &id)
                .await
                .map_err(util::core_err("departments"))?;
            output::notice("Department deleted", global.quiet);
            Ok(())
        }
    }
}
