use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::catalog::{ReferenceCatalog, SourceInventory};
use crate::config::UploadSettings;
use crate::consortium::{ConsortiumMinimizer, ConsortiumResult};
use crate::domain::ReferenceSource;
use crate::error::EngineError;
use crate::integrate::{self, AnnotatedTable, JoinReport};
use crate::table::Table;
use crate::toxicity::{self, ToxicityObservation};
use crate::upload::{self, UploadParser, UploadStats};

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub generated_at: String,
    pub upload: UploadStats,
    pub samples: usize,
    pub tables: BTreeMap<ReferenceSource, AnnotatedTable>,
    pub toxicity: Vec<ToxicityObservation>,
    pub reports: Vec<JoinReport>,
}

impl RunResult {
    pub fn table(&self, source: ReferenceSource) -> &Table {
        &self.tables[&source].table
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResult {
    pub sources: Vec<SourceInventory>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConsortiumOptions {
    pub source: ReferenceSource,
    pub against_catalog: bool,
}

impl Default for ConsortiumOptions {
    fn default() -> Self {
        Self {
            source: ReferenceSource::Bioremediation,
            against_catalog: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Integrate,
    Reshape,
    Minimize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Clone)]
pub struct App<'a> {
    catalog: &'a ReferenceCatalog,
    parser: UploadParser,
    minimizer: ConsortiumMinimizer,
}

impl<'a> App<'a> {
    pub fn new(catalog: &'a ReferenceCatalog, settings: UploadSettings) -> Self {
        Self {
            catalog,
            parser: UploadParser::new(settings),
            minimizer: ConsortiumMinimizer,
        }
    }

    pub fn catalog(&self) -> CatalogResult {
        CatalogResult {
            sources: self.catalog.inventory(),
        }
    }

    pub fn run(&self, raw: &str, sink: &dyn ProgressSink) -> Result<RunResult, EngineError> {
        let started = Instant::now();
        let (records, stats) = self.parser.parse_with_stats(raw);
        upload::validate(&records, &stats)?;
        let samples = records
            .iter()
            .map(|record| record.sample.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        sink.event(ProgressEvent {
            phase: Phase::Parse,
            message: format!(
                "{} ortholog(s) across {samples} sample(s), {} line(s) rejected",
                stats.accepted, stats.rejected
            ),
            elapsed: Some(started.elapsed()),
        });

        let integration = integrate::integrate(&records, self.catalog)?;
        for report in &integration.reports {
            sink.event(ProgressEvent {
                phase: Phase::Integrate,
                message: format!(
                    "{}: {} row(s), {} ortholog(s) unmatched",
                    report.source,
                    report.output_rows,
                    report.dropped_records()
                ),
                elapsed: Some(started.elapsed()),
            });
        }

        let toxicity_table = &integration.table(ReferenceSource::Toxicity).table;
        let toxicity = if toxicity_table.is_empty() {
            Vec::new()
        } else {
            toxicity::reshape(toxicity_table)?
        };
        sink.event(ProgressEvent {
            phase: Phase::Reshape,
            message: format!("{} toxicity observation(s)", toxicity.len()),
            elapsed: Some(started.elapsed()),
        });

        info!(
            samples,
            orthologs = records.len(),
            toxicity = toxicity.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline run complete"
        );

        Ok(RunResult {
            generated_at: Utc::now().to_rfc3339(),
            upload: stats,
            samples,
            tables: integration.tables,
            toxicity,
            reports: integration.reports,
        })
    }

    pub fn consortium(
        &self,
        run: &RunResult,
        compound_class: &str,
        options: ConsortiumOptions,
        sink: &dyn ProgressSink,
    ) -> Result<ConsortiumResult, EngineError> {
        let started = Instant::now();
        let annotated = run.table(options.source);
        let result = if options.against_catalog {
            let universe = self.catalog.compounds_in_class(compound_class)?;
            self.minimizer
                .minimize_against(annotated, compound_class, universe)?
        } else {
            self.minimizer.minimize(annotated, compound_class)?
        };
        sink.event(ProgressEvent {
            phase: Phase::Minimize,
            message: format!(
                "{} of {} group(s) cover {} compound(s)",
                result.selected.len(),
                result.groups.len(),
                result.covered().len()
            ),
            elapsed: Some(started.elapsed()),
        });
        Ok(result)
    }
}
