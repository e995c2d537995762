//! Residential complex command handlers.
//!
//! Listings are joined against the cached departments, cities and
//! administrators so the table shows names instead of ids.

use tabled::Tabled;
use victus_core::{
    CatalogEntity, CatalogKind, CatalogStore, ComplexFilter, ComplexRequest, ComplexRow,
    ResidentialComplex,
};

use crate::cli::{ComplexFields, ComplexesArgs, ComplexesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ComplexTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Administrator")]
    administrator: String,
}

impl From<&ComplexRow> for ComplexTableRow {
    fn from(r: &ComplexRow) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            address: r.address.clone(),
            phone: r.phone.clone(),
            department: r.department.clone(),
            city: r.city.clone(),
            administrator: r.administrator.clone(),
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn list_filter(
    department: Option<String>,
    city: Option<String>,
    administrator: Option<String>,
    name: Option<String>,
) -> ComplexFilter {
    if let Some(id) = department {
        ComplexFilter::ByDepartment(id)
    } else if let Some(id) = city {
        ComplexFilter::ByCity(id)
    } else if let Some(id) = administrator {
        ComplexFilter::ByAdministrator(id)
    } else if let Some(needle) = name {
        ComplexFilter::NameContains(needle)
    } else {
        ComplexFilter::All
    }
}

impl From<ComplexFields> for ComplexRequest {
    fn from(f: ComplexFields) -> Self {
        Self {
            nombre: f.name,
            direccion: f.address,
            telefono: f.phone,
            departamento_id: f.department,
            ciudad_id: f.city,
            administrador_id: f.administrator,
        }
    }
}

fn expect_complex(entity: CatalogEntity) -> Result<ResidentialComplex, CliError> {
    match entity {
        CatalogEntity::Complex(c) => Ok(c),
        other => Err(util::unexpected(&other)),
    }
}

/// Print a mutated complex, joined against the reference catalogs.
///
/// The names are a courtesy: when the catalogs cannot be loaded the row
/// falls back to whatever the server echoed.
async fn print_complex(
    complex: &ResidentialComplex,
    store: &CatalogStore,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Err(err) = store.refresh().await {
        tracing::debug!(error = %err, "reference catalogs unavailable for display");
    }
    let row = ComplexRow::join(complex, &store.snapshot());
    let out = output::render_single(
        global.output,
        &row,
        |r| ComplexTableRow::from(r),
        |r| r.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    store: &CatalogStore,
    args: ComplexesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ComplexesCommand::List {
            department,
            city,
            administrator,
            name,
        } => {
            store.refresh().await?;
            let filter = list_filter(department, city, administrator, name);
            let rows = ComplexRow::collect(&store.snapshot(), &filter);
            let out = output::render_list(
                global.output,
                &rows,
                |r| ComplexTableRow::from(r),
                |r| r.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ComplexesCommand::Create(fields) => {
            let request = ComplexRequest::from(fields);
            request.validate()?;
            let created = store
                .create(CatalogKind::Complex, &request)
                .await
                .map_err(util::core_err("complexes"))?;
            print_complex(&expect_complex(created)?, store, global).await
        }

        ComplexesCommand::Update { id, fields } => {
            let request = ComplexRequest::from(fields);
            request.validate()?;
            let updated = store
                .update(CatalogKind::Complex, &id, &request)
                .await
                .map_err(util::core_err("complexes"))?;
            print_complex(&expect_complex(updated)?, store, global).await
        }

        ComplexesCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete residential complex '{id}'?"),
                "complexes delete",
                global.yes,
            )? {
                return Ok(());
            }
            store
                .delete(CatalogKind::Complex, &id)
                .await
                .map_err(util::core_err("complexes"))?;
            output::notice("Residential complex deleted", global.quiet);
            Ok(())
        }
    }
}
