//! Prompt pipeline runner
//!
//! Executes a job's stages strictly in declared order: render the stage
//! prompt (job parameters plus all prior structured outputs), call the LLM
//! provider under a timeout, harvest the response, and collect emitted
//! files into the growing bundle. Any stage failure is fatal to the whole
//! job; no partial bundle is ever exposed as Completed.
//!
//! Cancellation is honored only at stage boundaries. An in-flight model
//! call runs to completion (or timeout) before the flag is observed, so a
//! stage's extraction state is never torn down midway.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use weaver_core::domain::job::{JobKind, JobResult};
use weaver_core::domain::log::LogEntry;
use weaver_core::domain::stage::{StageOutput, Strategy};
use weaver_core::harvest;
use weaver_core::pipeline::{self, StageEmit, StageSpec};
use weaver_core::verify;

use crate::llm::LlmProvider;
use crate::store::JobStore;

pub struct Runner {
    store: JobStore,
    provider: Arc<dyn LlmProvider>,
    stage_timeout: Duration,
}

impl Runner {
    pub fn new(store: JobStore, provider: Arc<dyn LlmProvider>, stage_timeout: Duration) -> Self {
        Self { store, provider, stage_timeout }
    }

    /// Drive one job from Pending to a terminal state. Spawned as its own
    /// task; this is the only writer for the job while it runs.
    pub async fn run(&self, job_id: Uuid) {
        let Some(job) = self.store.get(job_id).await else {
            tracing::warn!("Runner started for unknown job {}", job_id);
            return;
        };
        let stages = pipeline::pipeline_for(job.kind);

        self.store.mark_running(job_id).await;
        self.log(job_id, LogEntry::info(format!("pipeline started ({} stages)", stages.len())))
            .await;

        let mut outputs: Vec<StageOutput> = Vec::new();
        let mut bundle = weaver_core::domain::bundle::FileBundle::new();

        for (index, stage) in stages.iter().enumerate() {
            if self.store.should_abort(job_id).await {
                self.log(job_id, LogEntry::info("cancellation observed at stage boundary"))
                    .await;
                self.store.mark_cancelled(job_id).await;
                return;
            }

            match self.run_stage(job_id, index, stage, &job.parameters, &outputs).await {
                Ok(output) => {
                    match collect_files(stage.emit, &output) {
                        Ok(files) => {
                            for (path, content) in files {
                                bundle.insert(path, content);
                            }
                        }
                        Err(why) => {
                            let error = format!(
                                "stage {} ({}) produced an unusable file record: {}",
                                index + 1,
                                stage.name,
                                why
                            );
                            self.fail(job_id, error).await;
                            return;
                        }
                    }
                    outputs.push(output);
                }
                Err(error) => {
                    self.fail(job_id, error).await;
                    return;
                }
            }
        }

        let report = verify::verify(
            &bundle,
            pipeline::required_files(job.kind),
            pipeline::required_symbols(job.kind),
        );
        self.log(
            job_id,
            LogEntry::info(format!(
                "pipeline finished: {} files, verification {}",
                bundle.len(),
                if report.passed { "passed" } else { "failed" }
            )),
        )
        .await;

        self.store.complete(job_id, JobResult { bundle, report, stages: outputs }).await;
    }

    /// One prompt/response step. Err carries the final job error text.
    async fn run_stage(
        &self,
        job_id: Uuid,
        index: usize,
        stage: &StageSpec,
        parameters: &std::collections::HashMap<String, serde_json::Value>,
        prior: &[StageOutput],
    ) -> Result<StageOutput, String> {
        let prompt = stage.render_prompt(parameters, prior);
        self.log(job_id, LogEntry::info(format!("stage {} ({}): calling model", index + 1, stage.name)))
            .await;

        let response =
            tokio::time::timeout(self.stage_timeout, self.provider.generate(&prompt, true)).await;

        let output = match response {
            Err(_) => {
                return Err(format!(
                    "stage {} ({}) timed out after {}s waiting for the model",
                    index + 1,
                    stage.name,
                    self.stage_timeout.as_secs()
                ));
            }
            Ok(Err(e)) => {
                return Err(format!("stage {} ({}) provider call failed: {}", index + 1, stage.name, e));
            }
            Ok(Ok(output)) => output,
        };

        let extraction = harvest::extract(&output, stage.expected_fields);
        if !extraction.succeeded() {
            let diagnostic = extraction
                .diagnostic
                .unwrap_or_else(|| "no diagnostic recorded".to_string());
            return Err(format!(
                "stage {} ({}) extraction failed: {}",
                index + 1,
                stage.name,
                diagnostic
            ));
        }

        // Every stage runs in schema mode; anything other than a typed
        // response means the model ignored it and a fallback recovered it.
        let entry = match extraction.strategy {
            Strategy::TypedSchema => LogEntry::info(format!(
                "stage {} ({}): extracted via typed-schema",
                index + 1,
                stage.name
            )),
            fallback => LogEntry::warning(format!(
                "stage {} ({}): schema mode ignored by the model, recovered via {:?}",
                index + 1,
                stage.name,
                fallback
            )),
        };
        self.log(job_id, entry).await;

        Ok(StageOutput {
            stage_index: index,
            name: stage.name.to_string(),
            raw_text: output.text,
            strategy: extraction.strategy,
            structured_value: extraction.value,
        })
    }

    async fn fail(&self, job_id: Uuid, error: String) {
        tracing::warn!("Job {} failed: {}", job_id, error);
        self.log(job_id, LogEntry::error(error.clone())).await;
        self.store.fail(job_id, error).await;
    }

    async fn log(&self, job_id: Uuid, entry: LogEntry) {
        self.store.append_log(job_id, entry).await;
    }
}

/// Pull the bundle contributions out of a successful stage output.
fn collect_files(emit: StageEmit, output: &StageOutput) -> Result<Vec<(String, String)>, String> {
    // A stage only reaches this point after a successful extraction.
    let Some(value) = output.structured_value.as_ref() else {
        return Ok(Vec::new());
    };
    match emit {
        StageEmit::Nothing => Ok(Vec::new()),
        StageEmit::File => file_entry(value).map(|f| vec![f]),
        StageEmit::FileSet => {
            let files = value["files"]
                .as_array()
                .ok_or_else(|| "'files' is not an array".to_string())?;
            files.iter().map(file_entry).collect()
        }
    }
}

fn file_entry(value: &serde_json::Value) -> Result<(String, String), String> {
    let filename = value["filename"]
        .as_str()
        .ok_or_else(|| "missing string 'filename' field".to_string())?;
    let code = value["code"]
        .as_str()
        .ok_or_else(|| "missing string 'code' field".to_string())?;
    if filename.trim().is_empty() {
        return Err("'filename' is empty".to_string());
    }
    Ok((filename.to_string(), code.to_string()))
}
