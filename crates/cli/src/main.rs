use anyhow::Result;
use clap::Parser;
use go_test_generator::commands::{generate_command, GenerateArgs};
use go_test_generator::init_logging;

/// Generate table-driven Go test skeletons.
///
/// Every exported function and method under `--path` gets a `Test...`
/// function in `<file>_test.go`, with one placeholder case per branch.
/// Existing test files are never modified.
#[derive(Parser, Debug)]
#[command(
    name = "go-test-generator",
    version,
    about = "Generate Go test skeletons",
    long_about = None
)]
struct Cli {
    /// Root directory to scan.
    #[arg(long, default_value = ".")]
    path: String,

    /// Detect calls through interface-typed values and report matching mocks.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    enable_go_mock: Option<bool>,

    /// Only consider call targets in packages whose import path contains this.
    #[arg(long)]
    module: Option<String>,

    /// Config file (.json, .yaml or .yml). Defaults to `.go-test-generator.*` in the root.
    #[arg(long)]
    config: Option<String>,

    /// Also count calls to predeclared interface methods such as `error.Error`.
    #[arg(long, default_value_t = false)]
    include_universe: bool,

    /// Render and validate output without writing files.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Emit the report as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    generate_command(&GenerateArgs {
        path: cli.path,
        enable_go_mock: cli.enable_go_mock,
        module: cli.module,
        config: cli.config,
        include_universe: cli.include_universe,
        dry_run: cli.dry_run,
        json: cli.json,
    })
}
