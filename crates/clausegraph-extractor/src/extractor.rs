//! Core extraction pipeline
//!
//! ```text
//! text → chunks → (chunk × pass) model calls → grounding → merge
//!      → relationships → ExtractionResult
//! ```
//!
//! Model calls run on a bounded pool (`worker_concurrency` per document
//! type). All calls settle before merging starts, and outcomes are
//! re-ordered by `(chunk, pass)` so the result never depends on which call
//! finished first.

use crate::assembler::{assemble, AssemblyInput};
use crate::chunking::TextChunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::grounding::resolve_all;
use crate::merger::merge;
use crate::relations::RelationshipInferencer;
use crate::retry::RetryPolicy;
use crate::schema::SchemaRegistry;
use clausegraph_domain::{
    Chunk, ChunkFailure, ClauseCandidate, DocumentTypeConfig, ExtractionError, ExtractionModel,
    ExtractionResult, ExtractionStats, PassFailure,
};
use futures::{stream, StreamExt};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one chunk × pass call after retries
#[derive(Debug)]
struct PassOutcome {
    chunk_index: usize,
    pass: usize,
    attempts: usize,
    result: Result<Vec<ClauseCandidate>, ExtractionError>,
}

/// Extracts grounded, merged clauses and their relationships from documents
pub struct ClauseExtractor<M: ExtractionModel> {
    model: M,
    registry: SchemaRegistry,
    config: ExtractorConfig,
    retry: RetryPolicy,
}

impl<M: ExtractionModel> ClauseExtractor<M> {
    /// Create an extractor; fails if `config` is invalid
    pub fn new(model: M, registry: SchemaRegistry, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let retry = RetryPolicy::from_config(&config);
        Ok(Self {
            model,
            registry,
            config,
            retry,
        })
    }

    /// Registered document types
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The model proposing candidates
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Engine configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract clauses from a document of a registered type
    ///
    /// Per-chunk failures are contained: they lower confidence and show up
    /// in `failures`, but a result is still returned. Only caller errors and
    /// the failure of every chunk are reported as `Err`.
    pub async fn extract(
        &self,
        document_text: &str,
        document_type: &str,
    ) -> Result<ExtractionResult, ExtractorError> {
        let started = Instant::now();

        let schema = self.registry.get_config(document_type)?;
        if document_text.is_empty() {
            return Err(ExtractorError::EmptyDocument);
        }
        if document_text.len() > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(
                document_text.len(),
                self.config.max_text_length,
            ));
        }

        let chunks = TextChunker::new(schema.max_chunk_chars, schema.overlap_chars)
            .with_slack_ratio(self.config.boundary_slack_ratio)
            .chunk(document_text);

        info!(
            document_type,
            text_len = document_text.len(),
            chunks = chunks.len(),
            passes = schema.pass_count,
            model = self.model.name(),
            "Starting extraction"
        );

        let outcomes = self.run_passes(document_text, &chunks, schema).await;

        let mut stats = ExtractionStats {
            chunks: chunks.len(),
            ..ExtractionStats::default()
        };
        let mut grounded = Vec::new();
        let mut failed: BTreeMap<usize, Vec<PassFailure>> = BTreeMap::new();
        let mut last_error = String::new();

        for outcome in outcomes {
            stats.passes_attempted += 1;
            let chunk = &chunks[outcome.chunk_index];
            match outcome.result {
                Ok(candidates) => {
                    stats.candidates_proposed += candidates.len();
                    let resolved = resolve_all(document_text, chunk, &candidates);
                    stats.candidates_grounded += resolved.grounded.len();
                    stats.candidates_ungrounded += resolved.dropped;
                    grounded.extend(resolved.grounded);
                }
                Err(e) => {
                    stats.passes_failed += 1;
                    warn!(
                        chunk = outcome.chunk_index,
                        pass = outcome.pass,
                        attempts = outcome.attempts,
                        kind = e.kind().as_str(),
                        error = %e,
                        "Extraction pass failed"
                    );
                    last_error = e.to_string();
                    failed.entry(outcome.chunk_index).or_default().push(PassFailure {
                        pass: outcome.pass,
                        kind: e.kind(),
                        attempts: outcome.attempts,
                        message: e.to_string(),
                    });
                }
            }
        }

        let failures: Vec<ChunkFailure> = failed
            .into_iter()
            .map(|(index, failed_passes)| {
                let chunk = &chunks[index];
                ChunkFailure {
                    chunk_index: index,
                    start_offset: chunk.start_offset,
                    end_offset: chunk.end_offset,
                    total: failed_passes.len() >= schema.pass_count,
                    failed_passes,
                }
            })
            .collect();

        let totally_failed = failures.iter().filter(|f| f.total).count();
        if !chunks.is_empty() && totally_failed == chunks.len() {
            warn!(document_type, chunks = chunks.len(), "Every chunk failed extraction");
            return Err(ExtractorError::AllChunksFailed {
                chunks: chunks.len(),
                last_error,
            });
        }

        let clauses = merge(&grounded, &chunks, schema.pass_count);
        info!(
            grounded = grounded.len(),
            ungrounded = stats.candidates_ungrounded,
            clauses = clauses.len(),
            "Merged candidates"
        );

        let relationships = RelationshipInferencer::new(schema, &self.config).infer(&clauses);
        info!(relationships = relationships.len(), "Inferred relationships");

        let result = assemble(
            &schema.name,
            AssemblyInput {
                clauses,
                relationships,
                failures,
                stats,
            },
            started.elapsed(),
        );

        info!(
            document_type,
            clauses = result.clauses().len(),
            confidence = result.confidence_score(),
            failed_chunks = result.failures().len(),
            elapsed_ms = result.processing_time().as_millis() as u64,
            "Extraction complete"
        );

        Ok(result)
    }

    /// Run every chunk × pass call on the bounded pool and wait for all of them
    async fn run_passes(
        &self,
        document: &str,
        chunks: &[Chunk],
        schema: &DocumentTypeConfig,
    ) -> Vec<PassOutcome> {
        let model = &self.model;
        let retry = &self.retry;

        let calls = chunks.iter().flat_map(|chunk| {
            (0..schema.pass_count).map(move |pass| {
                let chunk_text = chunk.text(document).unwrap_or_default();
                async move {
                    debug!(chunk = chunk.index, pass, bytes = chunk_text.len(), "Calling model");
                    let label = format!("chunk {} pass {}", chunk.index, pass);
                    let (result, attempts) = retry.run(&label, move || model.extract(chunk_text, schema)).await;
                    let result = result.map(|candidates| {
                        candidates
                            .into_iter()
                            .map(|mut candidate| {
                                candidate.pass = pass;
                                candidate
                            })
                            .collect()
                    });
                    PassOutcome {
                        chunk_index: chunk.index,
                        pass,
                        attempts,
                        result,
                    }
                }
            })
        });

        let mut outcomes: Vec<PassOutcome> = stream::iter(calls)
            .buffer_unordered(schema.worker_concurrency.max(1))
            .collect()
            .await;

        outcomes.sort_by_key(|o| (o.chunk_index, o.pass));
        outcomes
    }
}
