//! Pipeline shared by the CLI and library users.
//! Loads records, builds the graph, lays it out and writes exports.

use std::path::{Path, PathBuf};

use crate::config::{ConfigError, PcbGraphConfig};
use crate::export::{export_all, ExportError, ExportedFiles, GraphFormat};
use crate::graph::{BuildResult, GraphBuilder, KnowledgeGraph};
use crate::layout::{Layout, LayoutAlgorithm, LayoutError, LayoutSettings};
use crate::model::ComponentRecord;
use crate::parser::{detect_and_parse, RecordSourceError};
use crate::report::Report;
use crate::taxonomy::TaxonomyClassifier;

#[derive(Debug, thiserror::Error)]
pub enum PcbGraphError {
    #[error("Record source error: {0}")]
    Source(#[from] RecordSourceError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Options for a full pipeline run.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Layout to compute; `None` skips layout.
    pub layout: Option<LayoutAlgorithm>,
    /// Overrides the configured spring seed.
    pub seed: Option<u64>,
    /// Directory for exports and reports; `None` skips writing files.
    pub output_dir: Option<PathBuf>,
    /// Overrides the configured graph interchange formats.
    pub graph_formats: Option<Vec<GraphFormat>>,
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub input: PathBuf,
    pub build: BuildResult,
    pub layout: Option<Layout>,
    pub exported: ExportedFiles,
}

/// Pipeline over one validated configuration.
#[derive(Debug, Clone)]
pub struct PcbGraphCore {
    config: PcbGraphConfig,
    classifier: TaxonomyClassifier,
}

impl Default for PcbGraphCore {
    fn default() -> Self {
        Self {
            config: PcbGraphConfig::default(),
            classifier: TaxonomyClassifier::default(),
        }
    }
}

impl PcbGraphCore {
    pub fn new(config: PcbGraphConfig) -> Result<Self, PcbGraphError> {
        config.validate()?;
        let classifier = TaxonomyClassifier::new(config.taxonomy.clone())?;
        Ok(Self { config, classifier })
    }

    /// Core configured from a JSON file, or the defaults when `path` is `None`.
    pub fn from_config_file(path: Option<&Path>) -> Result<Self, PcbGraphError> {
        match path {
            Some(path) => Self::new(PcbGraphConfig::load_file(path)?),
            None => Ok(Self::default()),
        }
    }

    pub fn config(&self) -> &PcbGraphConfig {
        &self.config
    }

    pub fn classifier(&self) -> &TaxonomyClassifier {
        &self.classifier
    }

    pub fn load_records(path: &Path) -> Result<Vec<ComponentRecord>, PcbGraphError> {
        Ok(detect_and_parse(path)?)
    }

    pub fn build(&self, records: &[ComponentRecord]) -> BuildResult {
        GraphBuilder::new(&self.classifier)
            .with_label_len(self.config.export.label_len)
            .build(records)
    }

    /// Lay out `graph`, optionally overriding the spring seed.
    pub fn layout(
        &self,
        graph: &KnowledgeGraph,
        algorithm: LayoutAlgorithm,
        seed: Option<u64>,
    ) -> Result<Layout, PcbGraphError> {
        let mut settings: LayoutSettings = self.config.layout.clone();
        if let Some(seed) = seed {
            settings.spring.seed = seed;
        }
        Ok(crate::layout::compute_layout(graph, algorithm, &settings)?)
    }

    pub fn report(&self, build: &BuildResult, layout: Option<&Layout>) -> Report {
        Report::new(
            &build.statistics,
            &build.diagnostics,
            layout,
            self.config.export.top_n,
        )
    }

    /// Write graph exports and both reports into `dir`, using the
    /// configured graph formats unless `formats` is given.
    pub fn export(
        &self,
        build: &BuildResult,
        layout: Option<&Layout>,
        formats: Option<&[GraphFormat]>,
        dir: &Path,
    ) -> Result<ExportedFiles, PcbGraphError> {
        let formats = formats.unwrap_or(self.config.export.graph_formats.as_slice());
        let mut files = export_all(&build.graph, layout, formats, dir)?;
        files.extend(self.report(build, layout).write_all(dir)?);
        Ok(files)
    }

    /// Load, build, lay out and export in one call.
    pub fn run(&self, input: &Path, options: &RunOptions) -> Result<RunResult, PcbGraphError> {
        let records = Self::load_records(input)?;
        let build = self.build(&records);
        for diagnostic in &build.diagnostics {
            tracing::debug!("{}", diagnostic);
        }

        let layout = match options.layout {
            Some(algorithm) => Some(self.layout(&build.graph, algorithm, options.seed)?),
            None => None,
        };

        let exported = match &options.output_dir {
            Some(dir) => self.export(
                &build,
                layout.as_ref(),
                options.graph_formats.as_deref(),
                dir,
            )?,
            None => ExportedFiles::new(),
        };

        Ok(RunResult {
            input: input.to_path_buf(),
            build,
            layout,
            exported,
        })
    }
}
