use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use quizsheet::{
    render_table, InputFile, PreviewQuery, ProcessEvent, ProcessorBuilder, SheetSelector,
    SortOrder, TypeFilter, TypeMode,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FilterArg {
    All,
    Multichoice,
    Truefalse,
    Shortanswer,
}

impl From<FilterArg> for TypeFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => TypeFilter::All,
            FilterArg::Multichoice => TypeFilter::Multichoice,
            FilterArg::Truefalse => TypeFilter::TrueFalse,
            FilterArg::Shortanswer => TypeFilter::ShortAnswer,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    Original,
    TitleAsc,
    TitleDesc,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Original => SortOrder::Original,
            SortArg::TitleAsc => SortOrder::TitleAsc,
            SortArg::TitleDesc => SortOrder::TitleDesc,
        }
    }
}

#[derive(Parser)]
#[command(
    version,
    about = "Convert CSV/XLS/XLSX/ODS question sheets into a Moodle XML question bank."
)]
struct Args {
    /// Spreadsheet files, processed in the given order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output path for the generated XML (`-` for stdout).
    #[arg(short, long, default_value = "questions.xml")]
    output: PathBuf,

    /// Maximum size of a single file in MiB.
    #[arg(long, default_value_t = 5)]
    max_file_size_mb: u64,

    /// Maximum number of data rows across all files.
    #[arg(long, default_value_t = quizsheet::DEFAULT_MAX_TOTAL_ROWS)]
    max_rows: usize,

    /// Only read the sheet with this name (repeatable).
    #[arg(long = "sheet")]
    sheets: Vec<String>,

    /// Skip rows whose Type is not multichoice, truefalse or shortanswer.
    #[arg(long)]
    strict: bool,

    /// Write the questions as JSON instead of Moodle XML.
    #[arg(long)]
    json: bool,

    /// Print a preview table of the generated questions.
    #[arg(long)]
    preview: bool,

    /// Question type shown in the preview.
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    filter: FilterArg,

    /// Sort order of the preview.
    #[arg(long, value_enum, default_value_t = SortArg::Original)]
    sort: SortArg,

    /// Case-insensitive search term for the preview.
    #[arg(long, default_value = "")]
    search: String,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "warn",
        1 => "quizsheet=info",
        _ => "quizsheet=debug",
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_owned());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let selector = match args.sheets.len() {
        0 => SheetSelector::All,
        1 => SheetSelector::Name(args.sheets[0].clone()),
        _ => SheetSelector::Names(args.sheets.clone()),
    };
    let processor = ProcessorBuilder::new()
        .with_max_file_size(args.max_file_size_mb.saturating_mul(1024 * 1024))
        .with_max_total_rows(args.max_rows)
        .with_sheet_selector(selector)
        .with_type_mode(if args.strict {
            TypeMode::Strict
        } else {
            TypeMode::Lenient
        })
        .build()?;

    let files = args
        .files
        .iter()
        .map(|path| {
            InputFile::from_path(path).with_context(|| format!("failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut on_event = |event: ProcessEvent| match event {
        ProcessEvent::Progress { message } => eprintln!("{}", message),
        ProcessEvent::Error { message } => eprintln!("error: {}", message),
        ProcessEvent::Done { .. } => {}
    };
    let result = processor.process_files(&files, &mut on_event);

    if args.preview {
        let query = PreviewQuery {
            filter: args.filter.into(),
            sort: args.sort.into(),
            search: args.search.clone(),
        };
        eprint!("{}", render_table(&query.apply(&result.questions)));
    }

    if result.questions.is_empty() {
        return Ok(ExitCode::FAILURE);
    }

    let document = if args.json {
        serde_json::to_string_pretty(&result.questions)?
    } else {
        result.xml
    };

    if args.output.as_os_str() == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.write_all(b"\n")?;
    } else {
        std::fs::write(&args.output, document)
            .with_context(|| format!("failed to write {}", args.output.display()))?;
        eprintln!("Wrote {}", args.output.display());
    }

    Ok(ExitCode::SUCCESS)
}
