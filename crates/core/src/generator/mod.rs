//! The generation pipeline: load, estimate, analyse, synthesise, emit.
//!
//! Files are processed in lexical path order and functions in source order,
//! so two runs over the same tree produce the same files and report.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{discover_config, load_config_file, ConfigError, GeneratorConfig};
use crate::emit::{EmitError, EmitOutcome, Emitter};
use crate::estimate::{BranchCountEstimator, CaseEstimator};
use crate::loader::{LoadError, SourceLoader, SourceSet, SourceUnit};
use crate::mock::{is_mock_package_imported, DependencyAnalyzer, DependencyCallSite, MockCatalog};
use crate::model::CaseEstimate;
use crate::semantic::{ModuleInfo, ResolutionContext, ResolutionFilter};
use crate::synth::synthesize_unit;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A generated mock a dependent function could use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockLink {
    pub destination: PathBuf,
    pub package: String,
    /// The mock file exists already.
    pub generated: bool,
    /// The function's file imports the mock package under its name.
    pub imported: bool,
}

/// Interface dependencies of one function that received a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub function: String,
    pub source: PathBuf,
    pub call_sites: Vec<DependencyCallSite>,
    pub mocks: Vec<MockLink>,
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub written: Vec<PathBuf>,
    pub skipped_existing: Vec<PathBuf>,
    pub dependencies: Vec<DependencyReport>,
}

/// State that only exists when mock analysis is enabled.
#[derive(Debug)]
struct MockAnalysis {
    context: ResolutionContext,
    catalog: MockCatalog,
    filter: ResolutionFilter,
}

pub struct Generator {
    config: GeneratorConfig,
    sources: SourceSet,
    mock: Option<MockAnalysis>,
    estimator: Box<dyn CaseEstimator>,
    emitter: Emitter,
}

impl Generator {
    /// Load the sources under `config.root` and, with mock analysis enabled,
    /// build the resolution context and mock catalog for the whole module.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerateError> {
        let root =
            config.root.canonicalize().map_err(|_| LoadError::MissingRoot(config.root.clone()))?;
        let load = |dir: &Path| SourceLoader::new(dir).skip_dirs(config.skip_dirs.clone()).load();

        let sources = load(&root)?;
        info!(root = %root.display(), files = sources.len(), "loaded sources");

        let mock = if config.enable_go_mock {
            let module = ModuleInfo::discover(&root)?;
            let resolution_set = match &module {
                Some(module) if module.root != root => {
                    let mut set = load(&module.root)?;
                    set.merge(&sources);
                    set
                }
                _ => sources.clone(),
            };
            let context = ResolutionContext::build(&resolution_set, module);
            let catalog = MockCatalog::build(&resolution_set);
            debug!(mocks = catalog.entries().len(), "built mock catalog");
            let filter = ResolutionFilter::new(config.module.clone())
                .include_universe(config.include_universe_targets);
            Some(MockAnalysis { context, catalog, filter })
        } else {
            None
        };

        Ok(Self {
            config: GeneratorConfig { root, ..config },
            sources,
            mock,
            estimator: Box::new(BranchCountEstimator),
            emitter: Emitter::new(),
        })
    }

    /// Like [`Generator::new`], reading settings from the config file found in
    /// `root` if there is one.
    pub fn discover(root: &Path) -> Result<Self, GenerateError> {
        let config = match discover_config(root) {
            Some(path) => load_config_file(&path)?,
            None => GeneratorConfig::default(),
        };
        Self::new(GeneratorConfig { root: root.to_path_buf(), ..config })
    }

    pub fn with_estimator(mut self, estimator: Box<dyn CaseEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.emitter = self.emitter.dry_run(dry_run);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    pub fn resolution(&self) -> Option<&ResolutionContext> {
        self.mock.as_ref().map(|m| &m.context)
    }

    pub fn catalog(&self) -> Option<&MockCatalog> {
        self.mock.as_ref().map(|m| &m.catalog)
    }

    /// Generate test files for every loaded source file.
    ///
    /// Stops at the first emission failure; files written before it stay.
    pub fn generate(&self) -> Result<GenerationReport, GenerateError> {
        let mut report = GenerationReport {
            generated_at: Utc::now(),
            root: self.config.root.clone(),
            written: Vec::new(),
            skipped_existing: Vec::new(),
            dependencies: Vec::new(),
        };

        for unit in self.sources.iter() {
            if unit.is_generated() {
                debug!(path = %unit.path.display(), "skipping generated file");
                continue;
            }

            let estimate = self.estimator.estimate(unit);
            if let Some(mock) = &self.mock {
                report.dependencies.extend(self.dependencies(mock, unit, &estimate));
            }

            let Some(generated) = synthesize_unit(unit, &estimate) else {
                debug!(path = %unit.path.display(), "no exported functions need tests");
                continue;
            };
            match self.emitter.emit(&generated)? {
                EmitOutcome::Written(path) => report.written.push(path),
                EmitOutcome::SkippedExisting(path) => report.skipped_existing.push(path),
                EmitOutcome::NothingToWrite => {}
            }
        }

        info!(
            written = report.written.len(),
            skipped = report.skipped_existing.len(),
            estimator = self.estimator.name(),
            "generation finished"
        );
        Ok(report)
    }

    fn dependencies(
        &self,
        mock: &MockAnalysis,
        unit: &SourceUnit,
        estimate: &CaseEstimate,
    ) -> Vec<DependencyReport> {
        let analyzer = DependencyAnalyzer::new(&mock.context, mock.filter.clone());
        unit.functions()
            .filter(|(sig, _)| sig.is_exported() && estimate.get(&sig.key()).is_some_and(|n| n > 0))
            .filter_map(|(sig, _)| {
                let call_sites = analyzer.call_sites(unit, &sig);
                if call_sites.is_empty() {
                    return None;
                }
                let entries =
                    call_sites.iter().flat_map(|site| mock.catalog.entries_for(&site.target));
                let mut mocks: Vec<MockLink> = Vec::new();
                for entry in entries {
                    if mocks.iter().any(|m| m.destination == entry.destination) {
                        continue;
                    }
                    mocks.push(MockLink {
                        destination: entry.destination.clone(),
                        package: entry.package.clone(),
                        generated: entry.generated,
                        imported: is_mock_package_imported(unit, &entry.package),
                    });
                }
                Some(DependencyReport {
                    function: sig.key(),
                    source: unit.path.clone(),
                    call_sites,
                    mocks,
                })
            })
            .collect()
    }
}
