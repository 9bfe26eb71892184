use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the docdesk binary.
#[derive(Debug, Parser)]
#[command(name = "docdesk", version, about = "Admin list pages from the command line")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "DOCDESK_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the admin server base URL.
    #[arg(long = "base-url", global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        global = true,
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render one page of a listing stored as JSON.
    List(ListArgs),
    /// Fetch a listing from the admin server and render one page of it.
    Fetch(FetchArgs),
    /// Build or submit a bulk action form.
    Bulk(BulkArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ViewArgs {
    /// URL query of the list page, e.g. `status=active&page=1`.
    #[arg(long, value_name = "QUERY", default_value = "")]
    pub query: String,

    /// Override the page size.
    #[arg(long = "page-size", value_name = "COUNT")]
    pub page_size: Option<usize>,

    /// Sortable column to click, in order; repeat to toggle direction.
    #[arg(long = "sort", value_name = "FIELD")]
    pub sort: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    /// JSON file holding a listing response.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Listing endpoint path, relative to the base URL.
    #[arg(long, value_name = "PATH")]
    pub path: String,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Args, Clone)]
pub struct BulkArgs {
    /// Bulk endpoint: categories-delete, categories-restore,
    /// categories-permanent-delete, coin-packages, transactions,
    /// withdrawals, reports or documents.
    #[arg(long, value_name = "TARGET")]
    pub target: String,

    /// Comma separated record identifiers.
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub ids: Vec<String>,

    /// Anti-forgery token value. Read from `--csrf-page` when omitted.
    #[arg(long, env = "DOCDESK_CSRF", value_name = "TOKEN")]
    pub csrf: Option<String>,

    /// Admin page whose markers carry the anti-forgery token.
    #[arg(long = "csrf-page", value_name = "PATH")]
    pub csrf_page: Option<String>,

    /// Action value for endpoints that take one.
    #[arg(long, value_name = "ACTION")]
    pub action: Option<String>,

    /// Optional reason sent with the action.
    #[arg(long, value_name = "TEXT")]
    pub reason: Option<String>,

    /// Post the form instead of printing its markup.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub submit: bool,

    /// Delete each record with its own request instead of posting one form.
    /// Only reports support this.
    #[arg(long = "per-item", action = clap::ArgAction::SetTrue, conflicts_with = "submit")]
    pub per_item: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Html,
}
