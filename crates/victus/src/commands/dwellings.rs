//! Dwelling command handlers, backed by a per-complex `DwellingFeed`.

use tabled::Tabled;
use victus_core::{CatalogStore, Dwelling, DwellingFeed, DwellingRequest};

use crate::cli::{DwellingFields, DwellingsArgs, DwellingsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct DwellingRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Type")]
    dwelling_type: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Dwelling> for DwellingRow {
    fn from(d: &Dwelling) -> Self {
        Self {
            id: d.id.clone(),
            number: d.number.clone(),
            dwelling_type: d.dwelling_type.to_string(),
            status: d.status.to_string(),
        }
    }
}

impl From<DwellingFields> for DwellingRequest {
    fn from(f: DwellingFields) -> Self {
        Self {
            numero: f.number,
            tipo: f.dwelling_type.into(),
            estado: f.status.into(),
        }
    }
}

fn print_dwelling(dwelling: &Dwelling, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        global.output,
        dwelling,
        |d| DwellingRow::from(d),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    store: &CatalogStore,
    args: DwellingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DwellingsCommand::List { complex, search } => {
            let mut feed = DwellingFeed::open(store, complex)
                .await
                .map_err(util::core_err("complexes"))?;
            let dwellings = match search {
                Some(query) => feed.search(&query),
                None => feed.snapshot().dwellings.to_vec(),
            };
            feed.close();
            let out = output::render_list(
                global.output,
                &dwellings,
                |d| DwellingRow::from(d),
                |d| d.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DwellingsCommand::Create { complex, fields } => {
            let request = DwellingRequest::from(fields);
            request.validate()?;
            let mut feed = DwellingFeed::open(store, complex)
                .await
                .map_err(util::core_err("complexes"))?;
            let created = feed.create(&request).await;
            feed.close();
            print_dwelling(&created?, global)
        }

        DwellingsCommand::Update {
            complex,
            id,
            fields,
        } => {
            let request = DwellingRequest::from(fields);
            request.validate()?;
            let mut feed = DwellingFeed::open(store, complex)
                .await
                .map_err(util::core_err("complexes"))?;
            let updated = feed.update(&id, &request).await;
            feed.close();
            print_dwelling(&updated.map_err(util::core_err("dwellings"))?, global)
        }

        DwellingsCommand::Delete { complex, id } => {
            if !util::confirm(
                &format!("Delete dwelling '{id}' of complex '{complex}'?"),
                "dwellings delete",
                global.yes,
            )? {
                return Ok(());
            }
            let mut feed = DwellingFeed::open(store, complex)
                .await
                .map_err(util::core_err("complexes"))?;
            let deleted = feed.delete(&id).await;
            feed.close();
            deleted.map_err(util::core_err("dwellings"))?;
            output::notice("Dwelling deleted", global.quiet);
            Ok(())
        }
    }
}
