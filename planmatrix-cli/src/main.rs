mod prefs_file;
mod reports;
mod util;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use planmatrix_engine::{
    CommandOutcome, ComparisonSession, FilterState, MatrixConfig, MatrixView, MemoryStore,
    PlanSnapshot, PlanStore,
};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use prefs_file::FilePreferences;
use reports::dropped_tokens;
use util::{parse_categories, parse_move};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored table with progress bars
    Console,
    /// Markdown table, one column per plan
    Markdown,
    /// The full matrix view as JSON
    Json,
    /// One line per characteristic and plan
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "planmatrix", version = "0.1.0")]
#[command(about = "Compare service plans characteristic by characteristic")]
struct Args {
    /// Plans snapshot (JSON: `{"plans": [...]}` or a bare array)
    #[arg(long, default_value = "data/sample_plans.json")]
    plans: PathBuf,

    /// Show only one section
    #[arg(long)]
    section: Option<String>,

    /// Personal pain categories to match (comma-separated)
    #[arg(long)]
    personal: Option<String>,

    /// Corporate pain categories to match (comma-separated)
    #[arg(long)]
    corporate: Option<String>,

    /// Preference file holding the saved section order
    #[arg(long)]
    prefs: Option<PathBuf>,

    /// Matrix configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// List sections with their characteristic counts and exit
    #[arg(long)]
    list_sections: bool,

    /// Move a section into another's position before reporting (DRAGGED:TARGET)
    #[arg(long, value_name = "DRAGGED:TARGET")]
    move_section: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

type Session = ComparisonSession<MemoryStore, FilePreferences>;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_ref())?;
    let store = MemoryStore::new(load_plans(&args.plans)?.plans);
    let prefs = FilePreferences::new(args.prefs.clone(), config.section_order_key.clone());
    let mut session = ComparisonSession::open(store, prefs, config)
        .context("failed to open comparison session")?;

    if maybe_list_sections(&args, &session)? {
        return Ok(());
    }

    if let Some(pair) = &args.move_section {
        apply_move(&mut session, pair)?;
    }

    session.set_filter(build_filter(&args)?);
    let view = session.view();
    write_reports(&args, &session, &view)
}

fn init_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<MatrixConfig> {
    let Some(path) = path else {
        return Ok(MatrixConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    MatrixConfig::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn load_plans(path: &PathBuf) -> Result<PlanSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = PlanSnapshot::from_json(&raw)
        .with_context(|| format!("invalid plans snapshot {}", path.display()))?;
    log::debug!(
        "loaded {} plans from {}: {}",
        snapshot.plans.len(),
        path.display(),
        snapshot.plan_names().join(", ")
    );
    Ok(snapshot)
}

fn build_filter(args: &Args) -> Result<FilterState> {
    let mut filter = FilterState::new();
    if let Some(section) = &args.section {
        filter = filter.with_section(section.trim());
    }
    if let Some(raw) = &args.personal {
        filter = filter.with_personal(parse_categories(raw).context("invalid --personal")?);
    }
    if let Some(raw) = &args.corporate {
        filter = filter.with_corporate(parse_categories(raw).context("invalid --corporate")?);
    }
    Ok(filter)
}

fn maybe_list_sections(args: &Args, session: &Session) -> Result<bool> {
    if !args.list_sections {
        return Ok(false);
    }
    let summaries = session
        .store()
        .list_sections()
        .context("failed to list sections")?;
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available sections:")?;
    for name in session.section_order() {
        let count = summaries
            .iter()
            .find(|summary| summary.name == name)
            .map_or(0, |summary| summary.characteristics_count);
        writeln!(output_target.writer(), "  {name:25} - {count} characteristics")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn apply_move(session: &mut Session, pair: &str) -> Result<()> {
    let (dragged, target) = parse_move(pair)?;
    match session.reorder_sections(&dragged, &target) {
        CommandOutcome::Unchanged => {
            eprintln!(
                "⚠️  Section order unchanged: {} -> {}",
                dragged.yellow(),
                target.yellow()
            );
        }
        CommandOutcome::Persisted => {
            eprintln!("✅ Moved {} to {}", dragged.green(), target.green());
        }
        CommandOutcome::Diverged(err) => {
            eprintln!(
                "⚠️  Moved {} to {} for this run only: {err}",
                dragged.yellow(),
                target.yellow()
            );
        }
    }
    Ok(())
}

fn write_reports(args: &Args, session: &Session, view: &MatrixView) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let dropped = dropped_tokens(view);
    for token in &dropped {
        log::warn!("{token}");
    }

    match args.report {
        ReportFormat::Json => reports::generate_json_report(&mut output_target, view)?,
        ReportFormat::Csv => reports::generate_csv_report(&mut output_target, view)?,
        ReportFormat::Markdown => {
            reports::generate_markdown_report(&mut output_target, view, session.filter(), &dropped)?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "_Generated {}_",
                chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
            )?;
        }
        ReportFormat::Console => {
            reports::generate_console_report(
                &mut output_target,
                view,
                session.filter(),
                session.config(),
                &dropped,
            )?;
            writeln!(&mut output_target)?;
            writeln!(
                &mut output_target,
                "🏁 {} rows, generated {}",
                view.sticky.len() + view.rows.len(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
