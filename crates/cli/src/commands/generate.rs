use std::path::Path;

use anyhow::{Context, Result};
use testgen_core::config::{discover_config, load_config_file, GeneratorConfig};
use testgen_core::generator::{GenerationReport, Generator};

use crate::canonicalize_or_current;

/// Command-line inputs of a generation run, before config-file merging.
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub path: String,
    pub enable_go_mock: Option<bool>,
    pub module: Option<String>,
    pub config: Option<String>,
    pub include_universe: bool,
    pub dry_run: bool,
    pub json: bool,
}

/// Effective configuration: CLI flag, then config file, then default.
pub fn resolve_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let root = canonicalize_or_current(&args.path)?;

    let file = match &args.config {
        Some(path) => Some(canonicalize_or_current(path)?),
        None => discover_config(&root),
    };
    let mut config = match &file {
        Some(path) => load_config_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    config.root = root;
    if let Some(enable) = args.enable_go_mock {
        config.enable_go_mock = enable;
    }
    if args.module.is_some() {
        config.module = args.module.clone();
    }
    if args.include_universe {
        config.include_universe_targets = true;
    }
    Ok(config)
}

/// Generate test skeletons and print the report.
pub fn generate_command(args: &GenerateArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let root = config.root.clone();

    let generator = Generator::new(config)
        .with_context(|| format!("Failed to load Go sources under {}", root.display()))?
        .dry_run(args.dry_run);
    let report = generator.generate().context("Test generation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }
    Ok(())
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Human-readable summary of a report.
pub fn format_report(report: &GenerationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Generated test skeletons under {}\n", report.root.display()));
    out.push_str(&format!("  Written: {}\n", report.written.len()));
    for path in &report.written {
        out.push_str(&format!("    + {}\n", display_relative(path, &report.root)));
    }
    out.push_str(&format!("  Skipped (already exist): {}\n", report.skipped_existing.len()));
    for path in &report.skipped_existing {
        out.push_str(&format!("    = {}\n", display_relative(path, &report.root)));
    }

    if !report.dependencies.is_empty() {
        out.push_str("  Interface dependencies:\n");
        for dep in &report.dependencies {
            out.push_str(&format!("    {}\n", dep.function));
            for site in &dep.call_sites {
                out.push_str(&format!("      calls {}\n", site.call));
            }
            for mock in &dep.mocks {
                let state = match (mock.generated, mock.imported) {
                    (true, true) => "generated, imported",
                    (true, false) => "generated, not imported",
                    (false, _) => "not generated",
                };
                out.push_str(&format!(
                    "      mock {} ({}) [{}]\n",
                    mock.package,
                    display_relative(&mock.destination, &report.root),
                    state
                ));
            }
        }
    }
    out
}
