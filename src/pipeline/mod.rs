//! End-to-end generation run.
//!
//! Stages run strictly in order and the first failure halts the run:
//!
//! ```text
//! Idle -> Resolving -> Preprocessing -> Generating -> Extracting -> Validating -> Succeeded
//!            \______________\_______________\______________\______________\---> Failed
//! ```
//!
//! Nothing here retries; retries live inside [`ModelClient`]. A failed
//! validation still leaves the generated tree on disk.


use crate::config::Config;
use crate::context::RunContext;
use crate::error::{GenError, Result};
use crate::extract::{extract_blocks, write_blocks};
use crate::fs::{atomic_write_file, recreate_dir};
use crate::log::RunLog;
use crate::mdx::MdxPreprocessor;
use crate::model::{GenerationRequest, ModelClient, Transport};
use crate::prompt::{Fetcher, resolve_prompt};
use crate::validate::{ValidationReport, validate_tree};
use std::fmt;
use std::path::PathBuf;

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Resolving,
    Preprocessing,
    Generating,
    Extracting,
    Validating,
    Succeeded,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Resolving => "resolving",
            Stage::Preprocessing => "preprocessing",
            Stage::Generating => "generating",
            Stage::Extracting => "extracting",
            Stage::Validating => "validating",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A run that ended in [`Stage::Failed`].
#[derive(Debug)]
pub struct StageFailure {
    /// The stage that was running when the error occurred.
    pub stage: Stage,
    pub error: GenError,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.error)
    }
}

/// A run that reached [`Stage::Succeeded`].
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: String,
    pub output_root: PathBuf,
    pub files: Vec<String>,
    pub attempts: u32,
    pub report: ValidationReport,
}

/// One generation run over injected collaborators.
pub struct Pipeline<'a, T: Transport> {
    config: &'a Config,
    ctx: &'a RunContext,
    client: &'a ModelClient<T>,
    fetcher: &'a dyn Fetcher,
    log: &'a RunLog,
    stage: Stage,
}

impl<'a, T: Transport> Pipeline<'a, T> {
    pub fn new(
        config: &'a Config,
        ctx: &'a RunContext,
        client: &'a ModelClient<T>,
        fetcher: &'a dyn Fetcher,
        log: &'a RunLog,
    ) -> Self {
        Self {
            config,
            ctx,
            client,
            fetcher,
            log,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage for the prompt at `source_ref`.
    ///
    /// The failure is logged at ERROR with its stage before being returned.
    pub fn run(&mut self, source_ref: &str) -> std::result::Result<PipelineRun, StageFailure> {
        self.log
            .info(format!("run {} started (source {})", self.ctx.run_id, source_ref));

        match self.run_stages(source_ref) {
            Ok(run) => {
                self.stage = Stage::Succeeded;
                self.log.success(format!(
                    "run {} succeeded: {} file(s) in {}",
                    run.run_id,
                    run.files.len(),
                    run.output_root.display()
                ));
                Ok(run)
            }
            Err(error) => {
                let failure = StageFailure {
                    stage: self.stage,
                    error,
                };
                self.stage = Stage::Failed;
                self.log
                    .error(format!("run {}: {}", self.ctx.run_id, failure));
                Err(failure)
            }
        }
    }

    fn enter(&mut self, stage: Stage) {
        self.stage = stage;
        self.log.info(format!("stage: {}", stage));
    }

    fn run_stages(&mut self, source_ref: &str) -> Result<PipelineRun> {
        // Nothing from an earlier run survives, whichever stage this one ends in.
        recreate_dir(&self.ctx.output_root)?;

        self.enter(Stage::Resolving);
        let prompt = resolve_prompt(
            source_ref,
            &self.ctx.prompt_cache(source_ref),
            self.config.cache_ttl(),
            self.fetcher,
            self.log,
        )?;
        self.log.info(format!(
            "prompt: {} chars from {} ({})",
            prompt.text.len(),
            prompt.origin,
            prompt.fetched_at.to_rfc3339()
        ));

        self.enter(Stage::Preprocessing);
        let cleaned = MdxPreprocessor::from_config(self.config)?.clean(&prompt.text);
        if cleaned.trim().is_empty() {
            return Err(GenError::UserError(format!(
                "prompt from {} is empty after preprocessing",
                source_ref
            )));
        }
        self.log.info(format!(
            "preprocessed prompt: {} -> {} chars",
            prompt.text.len(),
            cleaned.len()
        ));

        self.enter(Stage::Generating);
        let request = GenerationRequest::from_config(self.config, cleaned);
        let completion = self.client.complete(
            &request,
            self.config.max_attempts,
            self.config.attempt_timeout(),
            self.log,
        )?;
        let response_file = self.ctx.response_file();
        atomic_write_file(&response_file, &completion.text)?;
        self.log.info(format!(
            "response saved to {}",
            response_file.display()
        ));

        self.enter(Stage::Extracting);
        let extraction = extract_blocks(&completion.text);
        for skipped in &extraction.skipped {
            self.log.warn(format!(
                "skipped fenced block #{} (info '{}'): {}",
                skipped.ordinal, skipped.info, skipped.reason
            ));
        }
        if extraction.has_unterminated() {
            self.log
                .warn("response ends inside a fenced block; output may be truncated");
        }
        extraction.require_blocks()?;

        let tree = write_blocks(&self.ctx.output_root, &extraction.blocks)?;
        for path in &tree.overwritten {
            self.log
                .warn(format!("{} was written more than once; last block kept", path));
        }
        self.log.info(format!(
            "wrote {} file(s) to {}",
            tree.files.len(),
            tree.root.display()
        ));

        self.enter(Stage::Validating);
        let report = validate_tree(
            &self.ctx.output_root,
            &self.config.required_paths,
            &self.config.type_check,
            self.log,
        )?
        .into_result()?;

        Ok(PipelineRun {
            run_id: self.ctx.run_id.clone(),
            output_root: tree.root,
            files: tree.files,
            attempts: completion.attempts.len() as u32,
            report,
        })
    }
}
