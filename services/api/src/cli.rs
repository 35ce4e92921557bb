use crate::render::{run_compare, run_report};
use crate::server;
use admissions::error::AppError;
use admissions::stats::{Category, SortDirection, SortKey, SortOrder, Tab, ViewState};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Admissions Competition Dashboard",
    about = "Serve and inspect admissions competition-rate statistics from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the current-period dashboard
    Report(ReportArgs),
    /// Compare the current period against the prior period
    Compare(CompareArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ViewArgs {
    /// Only show departments or tracks containing this text
    #[arg(long, default_value = "")]
    pub(crate) search: String,
    /// Only show one category (engineering, arts-sports, humanities-social, other)
    #[arg(long)]
    pub(crate) category: Option<Category>,
    /// Table ordering (competition_rate, applicants, capacity, department)
    #[arg(long, default_value = "competition_rate")]
    pub(crate) sort: SortKey,
    /// Table direction (asc or desc)
    #[arg(long, default_value = "desc")]
    pub(crate) direction: SortDirection,
    /// Number of departments in the ranking
    #[arg(long, default_value_t = admissions::stats::report::DEFAULT_TOP_N)]
    pub(crate) top: usize,
    /// Dashboard section to print (overview, tracks, comparison)
    #[arg(long)]
    pub(crate) tab: Option<Tab>,
}

impl ViewArgs {
    pub(crate) fn into_state(self, default_tab: Tab) -> ViewState {
        ViewState::default()
            .with_search(self.search)
            .with_category(self.category)
            .with_sort(SortOrder {
                key: self.sort,
                direction: self.direction,
            })
            .with_top(self.top)
            .with_tab(self.tab.unwrap_or(default_tab))
    }
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Current-period statistics endpoint (defaults to ADMISSIONS_CURRENT_URL)
    #[arg(long, conflicts_with = "current_file")]
    pub(crate) current_url: Option<String>,
    /// Read current-period statistics from a JSON export instead
    #[arg(long)]
    pub(crate) current_file: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) view: ViewArgs,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// Current-period statistics endpoint (defaults to ADMISSIONS_CURRENT_URL)
    #[arg(long, conflicts_with = "current_file")]
    pub(crate) current_url: Option<String>,
    /// Read current-period statistics from a JSON export instead
    #[arg(long)]
    pub(crate) current_file: Option<PathBuf>,
    /// Prior-period statistics endpoint (defaults to ADMISSIONS_PRIOR_URL)
    #[arg(long, conflicts_with = "prior_file")]
    pub(crate) prior_url: Option<String>,
    /// Read prior-period statistics from a JSON export instead
    #[arg(long)]
    pub(crate) prior_file: Option<PathBuf>,
    /// Write the comparison table as CSV to stdout instead of the text dashboard
    #[arg(long)]
    pub(crate) csv: bool,
    #[command(flatten)]
    pub(crate) view: ViewArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Compare(args) => run_compare(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_view_flags() {
        let cli = Cli::try_parse_from([
            "admissions-api",
            "compare",
            "--current-file",
            "current.json",
            "--prior-url",
            "http://localhost:8000/prior",
            "--category",
            "engineering",
            "--sort",
            "applicants",
            "--direction",
            "asc",
            "--top",
            "3",
        ])
        .expect("arguments parse");

        let Some(Command::Compare(args)) = cli.command else {
            panic!("expected compare command");
        };
        assert_eq!(args.current_file, Some(PathBuf::from("current.json")));
        let state = args.view.into_state(Tab::Comparison);
        assert_eq!(state.category, Some(Category::Engineering));
        assert_eq!(state.sort.key, SortKey::Applicants);
        assert_eq!(state.sort.direction, SortDirection::Ascending);
        assert_eq!(state.top, 3);
        assert_eq!(state.tab, Tab::Comparison);
    }

    #[test]
    fn url_and_file_for_one_period_conflict() {
        let result = Cli::try_parse_from([
            "admissions-api",
            "report",
            "--current-url",
            "http://localhost:8000/crawl",
            "--current-file",
            "current.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_category() {
        let result = Cli::try_parse_from(["admissions-api", "report", "--category", "astronomy"]);
        assert!(result.is_err());
    }
}
