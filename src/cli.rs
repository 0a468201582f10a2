use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "courtside")]
#[command(about = "A CLI for browsing NBA teams", version)]
#[command(after_help = "EXAMPLES:
    courtside teams                     List the first page of teams
    courtside teams --page 3 --sort city
    courtside browse                    Interactive paginated browser
    courtside init                      Write a config file")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress status messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of teams
    #[command(after_help = "EXAMPLES:
    courtside teams
    courtside teams --page 2 --per-page 10
    courtside teams --sort division --desc")]
    Teams(TeamListArgs),
    /// Browse teams interactively with pagination and sorting
    #[command(after_help = "EXAMPLES:
    courtside browse
    courtside browse --per-page 10

COMMANDS (inside the browser):
    n           next page
    p           previous page
    s <column>  toggle sort on a column (id, abbr, name, city, conf, div)
    z <n>       set page size
    r           refresh the current page
    q           quit")]
    Browse(BrowseArgs),
    /// Create a config file interactively
    Init,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    courtside completions bash > ~/.bash_completion.d/courtside
    courtside completions zsh > ~/.zfunc/_courtside")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
pub struct TeamListArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Teams per page
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Sort the fetched page by a column (id, abbreviation, full_name, city,
    /// conference, division)
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

#[derive(Args)]
pub struct BrowseArgs {
    /// Teams per page
    #[arg(long)]
    pub per_page: Option<u32>,
}
