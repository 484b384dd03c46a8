// Entry point and high-level CLI flow.
//
// - Option [1] loads both complaint tables (backend or snapshot files).
// - Option [2] changes the active filters.
// - Option [3] writes every report and export for the filtered set and
//   previews them as Markdown tables.
// A failed load leaves an empty working set; choosing [1] again retries.
use anyhow::{Context, Result};
use clap::Parser;
use pci_complaints::config::{DashboardConfig, CONFIG_ENV};
use pci_complaints::fetch::{self, FilterOptions, ServerFilters, Snapshot};
use pci_complaints::filter::{DirectionFilter, FilterSpec};
use pci_complaints::loader;
use pci_complaints::output;
use pci_complaints::reports::{Dashboard, Recompute};
use pci_complaints::util::{format_int, parse_list};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Press Council of India complaint reports
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Backend base URL (overrides the config file)
    #[arg(long)]
    api_base: Option<String>,

    /// Path to a JSON config file (overrides PCI_DASH_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for generated files
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Saved by-press list response; skips the backend when set
    #[arg(long)]
    by_file: Option<PathBuf>,

    /// Saved against-press list response; skips the backend when set
    #[arg(long)]
    against_file: Option<PathBuf>,

    /// Comma-separated years
    #[arg(long, default_value = "")]
    years: String,

    /// Comma-separated state names
    #[arg(long, default_value = "")]
    states: String,

    /// Comma-separated complaint types
    #[arg(long, default_value = "")]
    types: String,

    /// all, by_press or against_press
    #[arg(long, default_value = "all")]
    direction: String,

    /// Comma-separated affiliations (either party)
    #[arg(long, default_value = "")]
    affiliations: String,

    /// Comma-separated decision categories
    #[arg(long, default_value = "")]
    decisions: String,

    /// Load, write reports and exit without the menu
    #[arg(long)]
    batch: bool,
}

struct AppState {
    config: DashboardConfig,
    dashboard: Dashboard,
    options: FilterOptions,
    spec: FilterSpec,
}

fn load_config(args: &Args) -> Result<DashboardConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));
    let mut cfg = match path {
        Some(p) => {
            debug!("Using config file: {}", p.display());
            DashboardConfig::from_file(&p)?
        }
        None => DashboardConfig::default(),
    };
    if let Some(base) = &args.api_base {
        cfg.api_base = base.clone();
    }
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    Ok(cfg)
}

fn parse_years(s: &str) -> Result<Vec<i32>> {
    parse_list(s)
        .iter()
        .map(|y| y.parse::<i32>().with_context(|| format!("invalid year '{}'", y)))
        .collect()
}

fn parse_direction(s: &str) -> Result<DirectionFilter> {
    DirectionFilter::parse(s)
        .ok_or_else(|| anyhow::anyhow!("invalid direction '{}' (use all, by_press or against_press)", s))
}

fn spec_from_args(args: &Args) -> Result<FilterSpec> {
    Ok(FilterSpec::new()
        .with_years(parse_years(&args.years)?)
        .with_states(parse_list(&args.states))
        .with_complaint_types(parse_list(&args.types))
        .with_direction(parse_direction(&args.direction)?)
        .with_affiliations(parse_list(&args.affiliations))
        .with_decisions(parse_list(&args.decisions)))
}

/// Print `prompt` and read one trimmed line. `None` once input is closed.
fn read_line_from<R: BufRead>(input: &mut R, prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_line(prompt: &str) -> Option<String> {
    read_line_from(&mut io::stdin().lock(), prompt)
}

/// Field prompts treat closed input as a blank answer.
fn read_field(prompt: &str) -> String {
    read_line(prompt).unwrap_or_default()
}

/// `true` for Y, `false` for N or closed input.
fn back_to_menu_from<R: BufRead>(input: &mut R) -> bool {
    loop {
        let Some(answer) = read_line_from(input, "Back to Report Selection (Y/N): ") else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn prompt_back_to_menu() -> bool {
    back_to_menu_from(&mut io::stdin().lock())
}

async fn load_snapshot(args: &Args, cfg: &DashboardConfig) -> Result<(Snapshot, FilterOptions)> {
    if args.by_file.is_some() || args.against_file.is_some() {
        let read = |p: &Option<PathBuf>| -> Result<Vec<_>> {
            match p {
                Some(path) => Ok(loader::load_file(path)?),
                None => Ok(Vec::new()),
            }
        };
        let snapshot = Snapshot {
            by_press: read(&args.by_file)?,
            against_press: read(&args.against_file)?,
        };
        return Ok((snapshot, FilterOptions::default()));
    }

    let client = fetch::build_client()?;
    let default_filters = ServerFilters::default();
    let (snapshot, options) = tokio::join!(
        fetch::fetch_snapshot(&client, &cfg.api_base, &default_filters),
        fetch::fetch_filter_options(&client, &cfg.api_base),
    );
    let options = options.unwrap_or_else(|e| {
        warn!("Filter options unavailable - error={}", e);
        FilterOptions::default()
    });
    Ok((snapshot?, options))
}

/// Handle option [1]: load and normalize both tables.
async fn handle_load(state: &mut AppState, args: &Args) {
    println!("Loading complaints...");
    match load_snapshot(args, &state.config).await {
        Ok((snapshot, options)) => {
            let (complaints, report) = loader::normalize_all(&snapshot.by_press, &snapshot.against_press);
            println!(
                "Processing dataset... ({} complaints loaded: {} by press, {} against press)",
                format_int(report.total_rows),
                format_int(report.by_press),
                format_int(report.against_press)
            );
            if report.year_fallbacks > 0 {
                println!(
                    "Note: {} complaints had no year in the report id and use the current year.",
                    format_int(report.year_fallbacks)
                );
            }
            println!();
            let mut dashboard = Dashboard::new(complaints, state.config.clone());
            dashboard.apply(state.spec.clone());
            state.dashboard = dashboard;
            state.options = options;
        }
        Err(e) => {
            eprintln!("Failed to load complaints: {:#}", e);
            eprintln!("No data is shown. Choose [1] to retry.\n");
            state.dashboard = Dashboard::empty(state.config.clone());
        }
    }
}

fn preview_options(name: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let shown: Vec<&str> = values.iter().take(12).map(String::as_str).collect();
    let more = values.len().saturating_sub(shown.len());
    if more > 0 {
        println!("  {}: {} (+{} more)", name, shown.join(", "), more);
    } else {
        println!("  {}: {}", name, shown.join(", "));
    }
}

/// Handle option [2]: read a new filter spec from the console.
fn handle_set_filters(state: &mut AppState) {
    println!("Blank or _all_ means no constraint.");
    let years: Vec<String> = state.options.years.iter().map(|y| y.to_string()).collect();
    preview_options("Years", &years);
    preview_options("States", &state.options.states);
    preview_options("Types", &state.options.complaint_types);
    preview_options("Affiliations", &state.options.affiliations);
    preview_options("Decisions", &state.options.decisions);

    let years = match parse_years(&read_field("Years: ")) {
        Ok(y) => y,
        Err(e) => {
            println!("{}\n", e);
            return;
        }
    };
    let states = parse_list(&read_field("States: "));
    let types = parse_list(&read_field("Complaint types: "));
    let direction = match parse_direction(&read_field("Direction (all/by_press/against_press): ")) {
        Ok(d) => d,
        Err(e) => {
            println!("{}\n", e);
            return;
        }
    };
    let affiliations = parse_list(&read_field("Affiliations: "));
    let decisions = parse_list(&read_field("Decisions: "));

    let spec = FilterSpec::new()
        .with_years(years)
        .with_states(states)
        .with_complaint_types(types)
        .with_direction(direction)
        .with_affiliations(affiliations)
        .with_decisions(decisions);
    state.spec = spec.clone();
    match state.dashboard.apply(spec) {
        Recompute::Unchanged => println!("Filters unchanged.\n"),
        Recompute::FilterOnly | Recompute::Full => println!(
            "Filters applied: {} of {} complaints selected.\n",
            format_int(state.dashboard.current().filtered.len()),
            format_int(state.dashboard.complaints().len())
        ),
    }
}

fn report_error(file: &Path, res: pci_complaints::error::DashResult<()>) {
    if let Err(e) = res {
        eprintln!("Write error ({}): {}", file.display(), e);
    }
}

/// Handle option [3]: write every report plus exports for the filtered set.
fn handle_generate_reports(state: &AppState) -> Result<()> {
    let derived = state.dashboard.current();
    if state.dashboard.complaints().is_empty() {
        println!("Error: No data loaded. Please load the complaints first (option 1).\n");
        return Ok(());
    }

    let out = Path::new(&state.config.output_dir);
    std::fs::create_dir_all(out).with_context(|| format!("create {}", out.display()))?;
    info!("Writing reports - dir={}, rows={}", out.display(), derived.filtered.len());

    println!("Generating reports...");
    println!("Outputs saved to {}\n", out.display());

    let views = &derived.views;
    let count_reports = [
        ("report_states.csv", "Complaints by State", &views.by_state),
        ("report_years.csv", "Complaints by Year", &views.by_year),
        ("report_occupations.csv", "Complainant Occupations", &views.by_occupation),
        ("report_decisions.csv", "Decisions", &views.by_decision),
        ("report_types.csv", "Complaint Types", &views.by_complaint_type),
        ("report_targets.csv", "Most Accused", &views.top_targets),
        ("report_complainants.csv", "Most Frequent Complainants", &views.top_complainants),
    ];
    for (file, title, rows) in count_reports {
        let path = out.join(file);
        report_error(&path, output::write_csv(&path, rows));
        println!("{}\n", title);
        output::preview_table_rows(rows, 5);
    }

    let matrix_reports = [
        ("report_state_outcomes.csv", "Outcomes by State", &views.state_outcomes),
        ("report_upheld_rates.csv", "Upheld Rate by Complaint Type", &views.type_upheld_rates),
    ];
    for (file, title, rows) in matrix_reports {
        let path = out.join(file);
        report_error(&path, output::write_matrix_csv(&path, rows));
        println!("{}\n", title);
        output::preview_table_rows(rows, 5);
    }
    println!(
        "(Upheld rates shown only for types with at least {} complaints)\n",
        state.config.min_sample_size
    );

    let complaints_json = out.join("complaints.json");
    report_error(&complaints_json, output::write_json(&complaints_json, derived.filtered.as_slice()));
    let complaints_csv = out.join("complaints.csv");
    report_error(&complaints_csv, output::write_complaints_csv(&complaints_csv, &derived.filtered));
    let geojson = out.join("complaints.geojson");
    report_error(&geojson, output::write_geojson(&geojson, &derived.filtered));

    let summary = out.join("summary.json");
    report_error(&summary, output::write_json(&summary, &derived.stats));
    println!("Summary Stats (summary.json):\n");
    output::preview_table_rows(std::slice::from_ref(&derived.stats), 1);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_line_number(true)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let spec = spec_from_args(&args)?;
    info!("Starting pci_complaints - api_base={}, output_dir={}", config.api_base, config.output_dir);

    let mut state = AppState {
        dashboard: Dashboard::empty(config.clone()),
        config,
        options: FilterOptions::default(),
        spec,
    };

    if args.batch {
        handle_load(&mut state, &args).await;
        if state.dashboard.complaints().is_empty() {
            anyhow::bail!("no complaints loaded");
        }
        return handle_generate_reports(&state);
    }

    loop {
        println!("Press Council Complaint Reports");
        println!("[1] Load complaints");
        println!("[2] Set filters");
        println!("[3] Generate reports");
        println!("[4] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            println!("\nInput closed. Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut state, &args).await,
            "2" => handle_set_filters(&mut state),
            "3" => {
                println!();
                handle_generate_reports(&state)?;
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
    Ok(())
}
