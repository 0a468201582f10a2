use std::io::{self, Write};
use std::sync::Arc;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::BrowseArgs;
use crate::client::TeamsClient;
use crate::config::Config;
use crate::error::Result;
use crate::output;
use crate::pagination::PaginationState;
use crate::query::{QueryCache, QuerySnapshot, QueryStatus};
use crate::table::{self, Column, NextControl, TableView};

/// Interactive paginated browser: wires pagination state, the query cache,
/// and the table view together for one terminal session.
pub async fn run(client: TeamsClient, config: &Config, args: BrowseArgs) -> Result<()> {
    let cache = QueryCache::new(Arc::new(client));
    let mut pagination = PaginationState::new(
        config.resolve_page_size(args.per_page),
        config.page_size_policy(),
    );
    let mut view = TableView::new();

    let snapshot = cache.fetch(pagination.key()).await;
    render(&snapshot, &pagination, &view);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, Some(arg.trim())),
            None => (line, None),
        };

        match command {
            "n" | "next" => {
                let allowed =
                    NextControl::from_snapshot(&cache.snapshot(pagination.key())).is_enabled();
                if pagination.advance(allowed) {
                    let snapshot = cache.fetch(pagination.key()).await;
                    render(&snapshot, &pagination, &view);
                } else {
                    output::print_message("No further page available yet.");
                }
            }
            "p" | "prev" | "previous" => {
                if pagination.retreat() {
                    let snapshot = cache.fetch(pagination.key()).await;
                    render(&snapshot, &pagination, &view);
                } else {
                    output::print_message("Already on the first page.");
                }
            }
            "s" | "sort" => match arg.and_then(Column::parse) {
                Some(column) => {
                    // local re-sort of the fetched rows, never a refetch
                    view.toggle_sort(column);
                    render(&cache.snapshot(pagination.key()), &pagination, &view);
                }
                None => output::print_message(
                    "Usage: s <id|abbr|name|city|conf|div>",
                ),
            },
            "z" | "size" => match arg.and_then(|a| a.parse::<u32>().ok()).filter(|&n| n > 0) {
                Some(size) => {
                    pagination.set_page_size(size);
                    let snapshot = cache.fetch(pagination.key()).await;
                    render(&snapshot, &pagination, &view);
                }
                None => output::print_message("Usage: z <positive page size>"),
            },
            "r" | "refresh" => {
                cache.refresh(pagination.key());
                let snapshot = cache.fetch(pagination.key()).await;
                render(&snapshot, &pagination, &view);
            }
            "q" | "quit" | "exit" => break,
            "h" | "help" | "?" => help(),
            "" => {}
            other => {
                output::print_message(&format!("Unknown command: {other} (h for help)"));
            }
        }

        prompt();
    }

    Ok(())
}

fn render(snapshot: &QuerySnapshot, pagination: &PaginationState, view: &TableView) {
    match &snapshot.data {
        Some(page) => {
            println!("{}", view.render(&page.data));

            let mut footer = format!(
                "Showing {} results from {} (page {} of {})",
                page.data.len(),
                page.meta.total_count,
                page.meta.current_page,
                page.meta.total_pages
            );
            if snapshot.is_previous || snapshot.is_loading() {
                footer.push_str(" ...");
            }
            println!("{footer}");

            if let Some(error) = &snapshot.error {
                output::print_error(error);
            }

            println!(
                "{}   {}",
                previous_label(pagination.page_index()),
                next_label(snapshot)
            );
        }
        None if snapshot.status == QueryStatus::Error => {
            output::print_error(
                snapshot
                    .error
                    .as_deref()
                    .unwrap_or("Failed to fetch teams."),
            );
        }
        None => println!("Loading data..."),
    }
}

fn previous_label(page_index: u32) -> String {
    if table::previous_enabled(page_index) {
        "[p] Previous".to_string()
    } else {
        "[p] Previous".bright_black().to_string()
    }
}

fn next_label(snapshot: &QuerySnapshot) -> String {
    match NextControl::from_snapshot(snapshot) {
        NextControl::Enabled => "[n] Next".to_string(),
        NextControl::NoMorePages => "[n] Next (no more pages)".bright_black().to_string(),
        NextControl::FetchInFlight => "[n] Next (loading)".bright_black().to_string(),
    }
}

fn prompt() {
    print!("courtside> ");
    let _ = io::stdout().flush();
}

fn help() {
    println!("Commands:");
    println!("  n           next page");
    println!("  p           previous page");
    println!("  s <column>  toggle sort (id, abbr, name, city, conf, div)");
    println!("  z <n>       set page size");
    println!("  r           refresh the current page");
    println!("  q           quit");
}
