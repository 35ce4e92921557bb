use crate::cli::{CompareArgs, ReportArgs};
use crate::infra::{format_count, resolve_source};
use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::stats::export::write_comparison_csv;
use admissions::stats::report::views::{ComparisonView, DashboardView, RecordView};
use admissions::stats::{reconcile, AdmissionRecord, Datasets, PercentChange, Period, StatsClient, Tab};
use admissions::telemetry;

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        current_url,
        current_file,
        view,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let current = resolve_source(
        "ADMISSIONS_CURRENT_URL",
        current_url,
        current_file,
        &config.sources.current_url,
    )?;
    let client = StatsClient::new(config.sources)?;
    let records = client.load(Period::Current, &current).await?;

    let state = view.into_state(Tab::Overview);
    let dashboard = Datasets::current_only(records).dashboard(&state);
    print!("{}", render_dashboard(&dashboard));
    Ok(())
}

pub(crate) async fn run_compare(args: CompareArgs) -> Result<(), AppError> {
    let CompareArgs {
        current_url,
        current_file,
        prior_url,
        prior_file,
        csv,
        view,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let current = resolve_source(
        "ADMISSIONS_CURRENT_URL",
        current_url,
        current_file,
        &config.sources.current_url,
    )?;
    let prior = resolve_source(
        "ADMISSIONS_PRIOR_URL",
        prior_url,
        prior_file,
        &config.sources.prior_url,
    )?;
    let client = StatsClient::new(config.sources)?;
    let datasets = client.load_pair(&current, &prior).await?;
    let state = view.into_state(Tab::Comparison);

    if csv {
        let visible: Vec<AdmissionRecord> = datasets
            .current
            .iter()
            .filter(|record| state.matches(record))
            .cloned()
            .collect();
        let rows = reconcile(&visible, datasets.prior.as_deref().unwrap_or(&[]));
        write_comparison_csv(&rows, std::io::stdout().lock())?;
        return Ok(());
    }

    print!("{}", render_dashboard(&datasets.dashboard(&state)));
    Ok(())
}

pub(crate) fn format_rate(rate: f64) -> String {
    format!("{rate:.1}:1")
}

pub(crate) fn format_change(change: PercentChange) -> String {
    match change {
        PercentChange::Finite(value) => format!("{value:+.1}%"),
        PercentChange::Unbounded => "new".to_string(),
    }
}

fn describe_record(record: &RecordView) -> String {
    if record.special {
        return format!(
            "{} | {} | {} applicants ({} + {} + {})",
            record.department,
            record.category_label,
            format_count(record.total_applicants),
            format_count(u64::from(record.applicants)),
            format_count(u64::from(record.subcategory_a.unwrap_or(0))),
            format_count(u64::from(record.subcategory_b.unwrap_or(0))),
        );
    }

    format!(
        "{} | {} | {} seats | {} applicants | {} [{}] | {}% filled",
        record.department,
        record.category_label,
        format_count(u64::from(record.capacity.unwrap_or(0))),
        format_count(u64::from(record.applicants)),
        format_rate(record.competition_rate.unwrap_or(0.0)),
        record.tier_label.unwrap_or("n/a"),
        record.fill_percent.unwrap_or(0),
    )
}

/// Text rendering of a dashboard. The active tab decides which sections follow the summary.
pub(crate) fn render_dashboard(view: &DashboardView) -> String {
    let mut lines = Vec::new();
    let state = &view.state;

    lines.push(format!("Admissions competition dashboard ({})", view.tab));
    lines.push(format!(
        "Filters: search \"{}\" | category {} | sort {} {:?} | top {}",
        state.search,
        state.category.map(|category| category.label()).unwrap_or("all"),
        state.sort.key,
        state.sort.direction,
        state.top
    ));

    let summary = &view.summary;
    lines.push(String::new());
    lines.push("Summary".to_string());
    lines.push(format!(
        "- Total applicants: {}",
        format_count(summary.total_applicants)
    ));
    lines.push(format!(
        "- Total capacity: {}",
        format_count(summary.total_capacity)
    ));
    lines.push(format!(
        "- Average competition rate: {}",
        format_rate(summary.average_rate)
    ));
    if summary.max_rate.is_no_data() {
        lines.push("- Highest competition rate: no data".to_string());
    } else {
        lines.push(format!(
            "- Highest competition rate: {} ({}, {})",
            format_rate(summary.max_rate.competition_rate),
            summary.max_rate.department,
            summary.max_rate.track_name
        ));
    }

    match view.tab {
        Tab::Overview => render_overview(view, &mut lines),
        Tab::Tracks => render_tracks(view, &mut lines),
        Tab::Comparison => match &view.comparison {
            Some(comparison) => render_comparison(comparison, &mut lines),
            None => {
                lines.push(String::new());
                lines.push("Comparison: no prior-period data loaded".to_string());
            }
        },
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

fn render_overview(view: &DashboardView, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push(format!("Top {} by competition rate", view.top.len()));
    if view.top.is_empty() {
        lines.push("- none".to_string());
    }
    for (rank, record) in view.top.iter().enumerate() {
        lines.push(format!(
            "{}. {} ({}) {}",
            rank + 1,
            record.department,
            record.track_name,
            format_rate(record.competition_rate.unwrap_or(0.0))
        ));
    }

    lines.push(String::new());
    lines.push("Applicants by category".to_string());
    for total in &view.category_totals {
        lines.push(format!(
            "- {}: {}",
            total.category_label,
            format_count(total.applicants)
        ));
    }
}

fn render_tracks(view: &DashboardView, lines: &mut Vec<String>) {
    for group in &view.tracks {
        lines.push(String::new());
        lines.push(format!(
            "{} ({} departments)",
            group.track_name, group.department_count
        ));
        for record in &group.records {
            lines.push(format!("- {}", describe_record(record)));
        }
    }
}

fn render_comparison(comparison: &ComparisonView, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push(format!(
        "Year-over-year comparison ({} matched, {} without prior data)",
        comparison.matched, comparison.unmatched
    ));

    for row in &comparison.rows {
        let current = &row.current;
        match (&row.prior, &row.delta) {
            (Some(prior), Some(delta)) => lines.push(format!(
                "- {} ({}): {} -> {} applicants ({}), rate {} -> {} ({}), capacity {}",
                current.department,
                current.track_name,
                format_count(u64::from(prior.applicants)),
                format_count(u64::from(current.applicants)),
                format_change(delta.applicants),
                format_rate(prior.competition_rate.unwrap_or(0.0)),
                format_rate(current.competition_rate.unwrap_or(0.0)),
                format_change(delta.competition_rate),
                format_change(delta.capacity),
            )),
            _ => lines.push(format!(
                "- {} ({}): {} applicants, no prior data",
                current.department,
                current.track_name,
                format_count(current.total_applicants)
            )),
        }
    }

    let insights = &comparison.insights;
    if let Some(shift) = &insights.largest_increase {
        lines.push(format!(
            "Largest increase: {} ({}) {:+.1}%",
            shift.department, shift.track_name, shift.change_pct
        ));
    }
    if let Some(shift) = &insights.largest_decrease {
        lines.push(format!(
            "Largest decrease: {} ({}) {:+.1}%",
            shift.department, shift.track_name, shift.change_pct
        ));
    }
    if !insights.new_demand.is_empty() {
        lines.push(format!(
            "New demand (no prior applicants): {}",
            insights.new_demand.join(", ")
        ));
    }
}
