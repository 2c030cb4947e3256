//! Mock backends for testing
//!
//! All three external services have scriptable stand-ins so pipeline
//! logic can be exercised without network calls.

use crate::backend::{ArtifactRef, CompletionBackend, ImageJobBackend, JobId, JobStatus};
use crate::render::RenderBackend;
use cardforge_core::{ForgeError, Result};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

/// Scriptable completion backend
pub struct MockCompletion {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    failing: bool,
}

impl MockCompletion {
    /// Always replies with a fixed placeholder completion
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            failing: false,
        }
    }

    /// Replies with the given strings in order, then the placeholder
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            failing: false,
        }
    }

    /// Fails every request
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// All prompts received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionBackend for MockCompletion {
    fn name(&self) -> &str {
        "mock"
    }

    fn complete(&self, _model: &str, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.failing {
            return Err(ForgeError::Backend("mock completion failure".to_string()));
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "Mock completion text.".to_string()))
    }
}

enum ImageMode {
    /// Complete with bytes after N status polls
    CompleteAfter(u32),
    /// Status stays pending forever
    NeverComplete,
    /// Submission returns no job id
    RejectSubmission,
    /// Completes immediately but the fetch fails
    FailFetch,
}

/// Scriptable image job backend
pub struct MockImageBackend {
    mode: ImageMode,
    bytes: Vec<u8>,
    polls: Mutex<u32>,
    submissions: Mutex<u32>,
}

impl MockImageBackend {
    /// Job completes on the first status poll
    pub fn instant(bytes: Vec<u8>) -> Self {
        Self::completing_after(0, bytes)
    }

    /// Job completes after the given number of pending polls
    pub fn completing_after(polls: u32, bytes: Vec<u8>) -> Self {
        Self {
            mode: ImageMode::CompleteAfter(polls),
            bytes,
            polls: Mutex::new(0),
            submissions: Mutex::new(0),
        }
    }

    /// Job never completes; the poller must time out
    pub fn never_completing() -> Self {
        Self {
            mode: ImageMode::NeverComplete,
            bytes: Vec::new(),
            polls: Mutex::new(0),
            submissions: Mutex::new(0),
        }
    }

    /// Submissions fail with `ForgeError::Submission`
    pub fn rejecting_submissions() -> Self {
        Self {
            mode: ImageMode::RejectSubmission,
            bytes: Vec::new(),
            polls: Mutex::new(0),
            submissions: Mutex::new(0),
        }
    }

    /// Jobs complete but the artifact cannot be fetched
    pub fn failing_fetch() -> Self {
        Self {
            mode: ImageMode::FailFetch,
            bytes: Vec::new(),
            polls: Mutex::new(0),
            submissions: Mutex::new(0),
        }
    }

    pub fn poll_count(&self) -> u32 {
        *self.polls.lock().unwrap()
    }

    pub fn submission_count(&self) -> u32 {
        *self.submissions.lock().unwrap()
    }
}

impl ImageJobBackend for MockImageBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn submit(&self, _prompt: &str, _width: u32, _height: u32) -> Result<JobId> {
        *self.submissions.lock().unwrap() += 1;
        if matches!(self.mode, ImageMode::RejectSubmission) {
            return Err(ForgeError::Submission(
                "mock backend returned no job id".to_string(),
            ));
        }
        Ok(JobId(uuid::Uuid::new_v4().to_string()))
    }

    fn status(&self, _job: &JobId) -> Result<JobStatus> {
        let mut polls = self.polls.lock().unwrap();
        *polls += 1;
        match self.mode {
            ImageMode::CompleteAfter(n) if *polls > n => Ok(JobStatus::Complete(ArtifactRef {
                filename: "mock.png".to_string(),
                subfolder: String::new(),
            })),
            ImageMode::FailFetch => Ok(JobStatus::Complete(ArtifactRef {
                filename: "mock.png".to_string(),
                subfolder: String::new(),
            })),
            _ => Ok(JobStatus::Pending),
        }
    }

    fn fetch(&self, _artifact: &ArtifactRef) -> Result<Vec<u8>> {
        if matches!(self.mode, ImageMode::FailFetch) {
            return Err(ForgeError::Fetch("mock fetch failure".to_string()));
        }
        Ok(self.bytes.clone())
    }
}

/// Render backend that records what it was asked to render
pub struct MockRenderBackend {
    rendered: Mutex<Vec<Vec<PathBuf>>>,
    failing: bool,
}

impl MockRenderBackend {
    pub fn new() -> Self {
        Self {
            rendered: Mutex::new(Vec::new()),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            rendered: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// The batches of description paths received, in call order
    pub fn rendered_batches(&self) -> Vec<Vec<PathBuf>> {
        self.rendered.lock().unwrap().clone()
    }
}

impl Default for MockRenderBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for MockRenderBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn render(&self, description_paths: &[PathBuf]) -> Result<()> {
        self.rendered
            .lock()
            .unwrap()
            .push(description_paths.to_vec());
        if self.failing {
            return Err(ForgeError::Backend("mock render failure".to_string()));
        }
        Ok(())
    }
}

/// Encode a tiny PNG of the given size in memory
pub fn test_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 80, 40, 255]));
    let mut bytes = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut bytes);
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .ok();
    bytes
}
