//! Cardforge Pipeline - batch card set generation
//!
//! Drives the multi-stage pipeline: card synthesis via a text-completion
//! backend, art commissioning through an asynchronous image job queue
//! (submit/poll/fetch), conversion to the renderer's input format, and
//! rendering. Progress is checkpointed after every batch.

pub mod art;
pub mod backend;
pub mod backends;
pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod convert;
pub mod crop;
pub mod inspiration;
pub mod lands;
pub mod manifest;
pub mod orchestrator;
pub mod poller;
pub mod render;
pub mod stats;
pub mod synth;
pub mod theme;
mod timefmt;

pub use art::{ArtCommissioner, ArtOutcome, EscalationPolicy};
pub use backend::{ArtifactRef, CompletionBackend, ImageJobBackend, JobId, JobStatus};
pub use batch::{BatchOutcome, BatchStageRunner};
pub use checkpoint::{CheckpointWriter, SetDocument, SetInfo};
pub use config::{BackendSettings, ForgeConfig, RunConfig};
pub use lands::LandGenerator;
pub use manifest::{ArtManifest, ArtManifestEntry};
pub use orchestrator::{Orchestrator, RunSummary};
pub use poller::JobPoller;
pub use render::RenderBackend;
pub use stats::Statistics;
pub use synth::CardSynthesizer;
