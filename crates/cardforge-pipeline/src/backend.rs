//! Backend traits and wire types
//!
//! The pipeline talks to two unreliable external services: a prompt
//! completion backend and an asynchronous image job queue with
//! submit/poll/fetch semantics. Both are modeled as traits so tests can
//! swap in the mock implementations.

use cardforge_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier returned by the image backend on submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a completed job's image can be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub filename: String,
    #[serde(default)]
    pub subfolder: String,
}

/// Status reported by the image backend for a submitted job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued or still generating
    Pending,
    /// Finished with a discoverable image reference
    Complete(ArtifactRef),
    /// The backend has no record of the job
    NotFound,
}

/// A prompt-completion service (theme synthesis, art prompts, card synthesis)
pub trait CompletionBackend: Send {
    /// Backend name for progress output
    fn name(&self) -> &str;

    /// Issue a single-user-message completion request and return the
    /// free-text response.
    fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}

/// An asynchronous image generation job queue
pub trait ImageJobBackend: Send {
    /// Backend name for progress output
    fn name(&self) -> &str;

    /// Submit a generation request; fails with `ForgeError::Submission`
    /// if the backend does not return a job identifier.
    fn submit(&self, prompt: &str, width: u32, height: u32) -> Result<JobId>;

    /// Ask the backend for the job's current status
    fn status(&self, job: &JobId) -> Result<JobStatus>;

    /// Retrieve the bytes of a completed job's artifact
    fn fetch(&self, artifact: &ArtifactRef) -> Result<Vec<u8>>;
}
