use crate::cancel::{self, CancellationToken};
use crate::collector::ArtifactCollector;
use crate::config::ProvenanceConfig;
use crate::context::{self, CiVariables};
use crate::error::Result;
use crate::in_toto::{self, Envelope, Statement};
use crate::slsa::generators;
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use log::debug;
use std::path::Path;

/// The linear provenance pipeline: collect subjects, map the build context,
/// build the statement, encode the envelope.
///
/// The first failing stage aborts the run; there is no partial output.
pub struct Pipeline {
    config: ProvenanceConfig,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    pub fn new(config: ProvenanceConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ProvenanceConfig {
        &self.config
    }

    /// Runs every stage except the envelope encoding.
    pub fn generate_statement(
        &self,
        artifact_path: &Path,
        vars: &CiVariables,
        finished_on: DateTime<Utc>,
    ) -> Result<Statement> {
        let mut collector = ArtifactCollector::new(self.config.collector.clone())
            .with_cancellation(self.cancel.clone());
        if let Some(progress) = &self.progress {
            collector = collector.with_progress(progress.clone());
        }
        let subjects = collector.collect(artifact_path)?;

        cancel::check(&self.cancel)?;
        let mapped = context::map_context(vars, &self.config.recipe)?;

        let mut materials = Vec::with_capacity(self.config.extra_materials.len() + 1);
        materials.extend(mapped.source_material);
        materials.extend(self.config.extra_materials.iter().cloned());

        let metadata = generators::make_metadata(
            &mapped.context.github.run_id,
            &self.config.metadata,
            &finished_on,
        );

        cancel::check(&self.cancel)?;
        let statement = generators::generate_provenance_statement(
            subjects,
            &self.config.statement_type,
            &self.config.predicate_type,
            mapped.builder,
            mapped.recipe,
            materials,
            metadata,
        )?;
        debug!(
            "assembled statement with {} subject(s) and {} material(s)",
            statement.subject.len(),
            statement.predicate.materials.len()
        );

        Ok(statement)
    }

    /// Runs the whole pipeline and returns an unsigned envelope.
    pub fn generate_envelope(
        &self,
        artifact_path: &Path,
        vars: &CiVariables,
        finished_on: DateTime<Utc>,
    ) -> Result<Envelope> {
        let statement = self.generate_statement(artifact_path, vars, finished_on)?;
        cancel::check(&self.cancel)?;
        in_toto::generate_statement_envelope(&statement)
    }
}
