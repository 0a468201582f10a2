use crate::cli::{OutputFormat, TeamListArgs};
use crate::client::TeamsClient;
use crate::config::Config;
use crate::error::{CourtsideError, Result};
use crate::output;
use crate::table::{Column, SortOrder, TableView};

pub async fn list(client: &TeamsClient, config: &Config, args: TeamListArgs) -> Result<()> {
    let page = args.page.max(1);
    let per_page = config.resolve_page_size(args.per_page);

    let mut view = TableView::new();
    if let Some(ref name) = args.sort {
        let column =
            Column::parse(name).ok_or_else(|| CourtsideError::UnknownColumn(name.clone()))?;
        let order = if args.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        view.set_sort(column, order);
    }

    let result = client.get_teams(page, per_page).await?;

    match output::format() {
        OutputFormat::Json => output::print_json(&result),
        OutputFormat::Compact => {
            for team in &result.data {
                println!(
                    "{}\t{}\t{}\t{}",
                    team.id,
                    team.abbreviation,
                    team.full_name,
                    output::conference_colored(&team.conference)
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", view.render(&result.data));
            output::print_message(&format!(
                "Showing {} results from {} (page {} of {})",
                result.data.len(),
                result.meta.total_count,
                result.meta.current_page,
                result.meta.total_pages
            ));
        }
    }

    Ok(())
}
