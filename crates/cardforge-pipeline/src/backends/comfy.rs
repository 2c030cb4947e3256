//! ComfyUI image job backend
//!
//! Submits a workflow to `POST /prompt`, polls `GET /history/{id}` for a
//! completed output, and fetches the image via `GET /view`. The workflow
//! is a JSON template with the prompt text and latent size patched into
//! known node ids before submission.

use crate::backend::{ArtifactRef, ImageJobBackend, JobId, JobStatus};
use crate::config::ForgeConfig;
use cardforge_core::{ForgeError, Result};
use std::path::Path;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

// Node ids in the flux workflow template
const PROMPT_NODE: &str = "41";
const LATENT_NODE: &str = "27";
const SAVE_NODE: &str = "9";

/// ComfyUI client implementing submit/poll/fetch
pub struct ComfyImageBackend {
    base_url: String,
    workflow: serde_json::Value,
}

impl ComfyImageBackend {
    /// Create a client from config, using the built-in flux workflow
    pub fn from_config(config: &ForgeConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.api_url("image").to_string(),
            workflow: default_workflow(&config.generation.image_model),
        })
    }

    /// Create a client with a workflow template loaded from a JSON file
    pub fn with_workflow_file(config: &ForgeConfig, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let workflow: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            ForgeError::Config(format!(
                "Failed to parse workflow {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            base_url: config.api_url("image").to_string(),
            workflow,
        })
    }

    fn patched_workflow(&self, prompt: &str, width: u32, height: u32) -> serde_json::Value {
        let mut workflow = self.workflow.clone();
        if let Some(node) = workflow.get_mut(PROMPT_NODE) {
            node["inputs"]["clip_l"] = serde_json::json!(prompt);
            node["inputs"]["t5xxl"] = serde_json::json!(prompt);
        }
        if let Some(node) = workflow.get_mut(LATENT_NODE) {
            node["inputs"]["width"] = serde_json::json!(width);
            node["inputs"]["height"] = serde_json::json!(height);
        }
        workflow
    }

    fn post_json_with_retry(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent
                .post(url)
                .header("Content-Type", "application/json")
                .send_json(payload);

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        ForgeError::Submission(format!(
                            "Failed to parse submit response: {}",
                            e
                        ))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(ForgeError::Submission(format!(
                        "Workflow submission failed: {}",
                        e
                    )));
                }
            }
        }

        Err(ForgeError::Submission(
            "Workflow submission failed after retries".to_string(),
        ))
    }

    fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let agent = build_agent();
        let mut response = agent
            .get(url)
            .call()
            .map_err(|e| ForgeError::Backend(format!("Status request failed: {}", e)))?;
        response.body_mut().read_json().map_err(|e| {
            ForgeError::Backend(format!("Failed to parse status response: {}", e))
        })
    }
}

impl ImageJobBackend for ComfyImageBackend {
    fn name(&self) -> &str {
        "comfy"
    }

    fn submit(&self, prompt: &str, width: u32, height: u32) -> Result<JobId> {
        let workflow = self.patched_workflow(prompt, width, height);
        let payload = serde_json::json!({ "prompt": workflow });
        let url = format!("{}/prompt", self.base_url);

        let response = self.post_json_with_retry(&url, &payload)?;
        parse_submit_response(&response)
    }

    fn status(&self, job: &JobId) -> Result<JobStatus> {
        let url = format!("{}/history/{}", self.base_url, job.0);
        let history = self.get_json(&url)?;
        Ok(parse_history_response(&history, &job.0))
    }

    fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let url = format!("{}/view", self.base_url);
            let mut request = agent.get(&url).query("filename", &artifact.filename);
            if !artifact.subfolder.is_empty() {
                request = request.query("subfolder", &artifact.subfolder);
            }

            match request.call() {
                Ok(ok) => {
                    let mut reader = ok.into_body().into_reader();
                    let mut bytes = Vec::new();
                    std::io::Read::read_to_end(&mut reader, &mut bytes).map_err(|e| {
                        ForgeError::Fetch(format!("Failed to read image data: {}", e))
                    })?;
                    return Ok(bytes);
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(ForgeError::Fetch(format!(
                        "Failed to download image: {}",
                        e
                    )));
                }
            }
        }

        Err(ForgeError::Fetch(
            "Image download failed after retries".to_string(),
        ))
    }
}

/// Extract the job id from a submit response
pub fn parse_submit_response(response: &serde_json::Value) -> Result<JobId> {
    response
        .get("prompt_id")
        .and_then(|id| id.as_str())
        .map(|id| JobId(id.to_string()))
        .ok_or_else(|| {
            ForgeError::Submission(format!(
                "No prompt_id in submit response: {}",
                serde_json::to_string(response).unwrap_or_default()
            ))
        })
}

/// Interpret a history response for a given job id
pub fn parse_history_response(history: &serde_json::Value, job_id: &str) -> JobStatus {
    let Some(job_data) = history.get(job_id) else {
        return JobStatus::NotFound;
    };

    let image = job_data
        .get("outputs")
        .and_then(|o| o.get(SAVE_NODE))
        .and_then(|node| node.get("images"))
        .and_then(|imgs| imgs.as_array())
        .and_then(|arr| arr.first());

    match image {
        Some(info) => {
            let filename = info
                .get("filename")
                .and_then(|f| f.as_str())
                .unwrap_or_default()
                .to_string();
            let subfolder = info
                .get("subfolder")
                .and_then(|s| s.as_str())
                .unwrap_or_default()
                .to_string();
            if filename.is_empty() {
                JobStatus::Pending
            } else {
                JobStatus::Complete(ArtifactRef {
                    filename,
                    subfolder,
                })
            }
        }
        None => JobStatus::Pending,
    }
}

/// The built-in flux text-to-image workflow skeleton. Only the nodes the
/// client patches or reads are modeled.
fn default_workflow(model: &str) -> serde_json::Value {
    serde_json::json!({
        "41": {
            "class_type": "CLIPTextEncodeFlux",
            "inputs": { "clip_l": "", "t5xxl": "", "guidance": 3.5 }
        },
        "27": {
            "class_type": "EmptySD3LatentImage",
            "inputs": { "width": 1024, "height": 768, "batch_size": 1 }
        },
        "30": {
            "class_type": "CheckpointLoaderSimple",
            "inputs": { "ckpt_name": model }
        },
        "9": {
            "class_type": "SaveImage",
            "inputs": { "filename_prefix": "cardforge" }
        }
    })
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit_response() {
        let response = serde_json::json!({"prompt_id": "abc-123", "number": 4});
        let job = parse_submit_response(&response).unwrap();
        assert_eq!(job.0, "abc-123");
    }

    #[test]
    fn test_parse_submit_response_missing_id() {
        let response = serde_json::json!({"error": "queue full"});
        let err = parse_submit_response(&response).unwrap_err();
        assert!(matches!(err, ForgeError::Submission(_)));
    }

    #[test]
    fn test_parse_history_not_found() {
        let history = serde_json::json!({});
        assert_eq!(parse_history_response(&history, "abc"), JobStatus::NotFound);
    }

    #[test]
    fn test_parse_history_pending() {
        let history = serde_json::json!({"abc": {"status": {"completed": false}}});
        assert_eq!(parse_history_response(&history, "abc"), JobStatus::Pending);
    }

    #[test]
    fn test_parse_history_complete() {
        let history = serde_json::json!({
            "abc": {
                "outputs": {
                    "9": {
                        "images": [
                            {"filename": "cardforge_00001.png", "subfolder": "batch1", "type": "output"}
                        ]
                    }
                }
            }
        });
        let status = parse_history_response(&history, "abc");
        assert_eq!(
            status,
            JobStatus::Complete(ArtifactRef {
                filename: "cardforge_00001.png".to_string(),
                subfolder: "batch1".to_string(),
            })
        );
    }

    #[test]
    fn test_workflow_patching() {
        let config = ForgeConfig {
            backends: std::collections::HashMap::new(),
            generation: Default::default(),
        };
        let backend = ComfyImageBackend::from_config(&config).unwrap();
        let patched = backend.patched_workflow("a stormy coast", 768, 1024);

        assert_eq!(patched["41"]["inputs"]["clip_l"], "a stormy coast");
        assert_eq!(patched["41"]["inputs"]["t5xxl"], "a stormy coast");
        assert_eq!(patched["27"]["inputs"]["width"], 768);
        assert_eq!(patched["27"]["inputs"]["height"], 1024);
    }
}
