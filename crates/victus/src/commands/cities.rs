//! City command handlers.

use tabled::Tabled;
use victus_core::{
    CatalogEntity, CatalogKind, CatalogSnapshot, CatalogStore, City, CityFilter, CityRequest,
    sorted_by_name,
};

use crate::cli::{CitiesArgs, CitiesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CityRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
}

impl CityRow {
    fn new(city: &City, snap: &CatalogSnapshot) -> Self {
        Self {
            id: city.id.clone(),
            name: city.name.clone(),
            department: snap
                .department(&city.department_id)
                .map_or_else(|| city.department_id.clone(), |d| d.name.clone()),
        }
    }
}

fn expect_city(entity: CatalogEntity) -> Result<City, CliError> {
    match entity {
        CatalogEntity::City(c) => Ok(c),
        other => Err(util::unexpected(&other)),
    }
}

/// Every given flag narrows the listing.
fn list_filters(department: Option<String>, name: Option<String>) -> Vec<CityFilter> {
    let filters: Vec<CityFilter> = department
        .map(CityFilter::ByDepartment)
        .into_iter()
        .chain(name.map(CityFilter::NameContains))
        .collect();
    if filters.is_empty() {
        vec![CityFilter::All]
    } else {
        filters
    }
}

fn print_city(city: &City, snap: &CatalogSnapshot, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        global.output,
        city,
        |c| CityRow::new(c, snap),
        |c| c.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    store: &CatalogStore,
    args: CitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CitiesCommand::List { department, name } => {
            store.refresh().await?;
            let snap = store.snapshot();
            let filters = list_filters(department, name);
            let matching: Vec<City> = snap
                .cities
                .iter()
                .filter(|c| filters.iter().all(|f| f.matches(c)))
                .cloned()
                .collect();
            let cities = sorted_by_name(matching, |c: &City| &c.name);
            let out = output::render_list(
                global.output,
                &cities,
                |c| CityRow::new(c, &snap),
                |c| c.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CitiesCommand::Create { name, department } => {
            let request = CityRequest {
                nombre: name,
                departamento_id: department,
            };
            request.validate()?;
            let created = store
                .create(CatalogKind::City, &request)
                .await
                .map_err(util::core_err("cities"))?;
            print_city(&expect_city(created)?, &store.snapshot(), global)
        }

        CitiesCommand::Update {
            id,
            name,
            department,
        } => {
            let request = CityRequest {
                nombre: name,
                departamento_id: department,
            };
            request.validate()?;
            let updated = store
                .update(CatalogKind::City, &id, &request)
                .await
                .map_err(util::core_err("cities"))?;
            print_city(&expect_city(updated)?, &store.snapshot(), global)
        }

        CitiesCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete city '{id}'? Complexes in it go with it."),
                "cities delete",
                global.yes,
            )? {
                return Ok(());
            }
            store
                .delete(CatalogKind::City, &id)
                .await
                .map_err(util::core_err("cities"))?;
            output::notice("City deleted", global.quiet);
            Ok(())
        }
    }
}
