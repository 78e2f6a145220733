use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use csv_to_excel::logging::init_logging;
use csv_to_excel::{ConvertOptions, DuplicatePolicy, Result};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Help and version output.
        Err(error) if !error.use_stderr() => error.exit(),
        Err(error) => {
            eprint!("{error}");
            std::process::exit(1);
        }
    };

    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(cli.quiet, cli.verbose)?;

    let options = ConvertOptions {
        duplicate_policy: cli.on_duplicate.into(),
    };
    let report = csv_to_excel::build(&cli.input, &cli.output, options)?;

    if let Some(path) = &cli.report {
        report.write_json(path)?;
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Creates an Excel workbook from CSV files, one sheet per file."
)]
struct Cli {
    /// CSV file, or directory whose CSV files become sheets.
    input: PathBuf,

    /// Workbook to write. `.xlsx` is appended when missing.
    output: PathBuf,

    /// How to handle two files that map to the same sheet name.
    #[arg(long, value_enum, default_value_t = DuplicateMode::Error)]
    on_duplicate: DuplicateMode,

    /// Also write a JSON summary of the conversion to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,

    /// Increase log detail (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum DuplicateMode {
    /// Skip the later file and report it.
    Error,
    /// Suffix the later sheet name with `_1`, `_2`, ...
    Rename,
}

impl From<DuplicateMode> for DuplicatePolicy {
    fn from(mode: DuplicateMode) -> Self {
        match mode {
            DuplicateMode::Error => DuplicatePolicy::Error,
            DuplicateMode::Rename => DuplicatePolicy::Rename,
        }
    }
}
