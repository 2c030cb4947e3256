//! Submit/poll/fetch driver for the image job backend
//!
//! Every art request is an independent cycle: one submission, a fixed
//! polling interval until the job reports a completed artifact, then one
//! retrieval call. No job identifier is ever reused across attempts.

use crate::backend::{ImageJobBackend, JobId, JobStatus};
use cardforge_core::{ForgeError, Result};
use std::time::{Duration, Instant};

/// Drives one image job from submission to artifact bytes
pub struct JobPoller<'a> {
    backend: &'a dyn ImageJobBackend,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a> JobPoller<'a> {
    pub fn new(backend: &'a dyn ImageJobBackend, poll_interval_secs: u64, timeout_secs: u64) -> Self {
        Self {
            backend,
            poll_interval: Duration::from_secs(poll_interval_secs),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Submit a generation request
    pub fn submit(&self, prompt: &str, width: u32, height: u32) -> Result<JobId> {
        self.backend.submit(prompt, width, height)
    }

    /// Poll until the job completes, then fetch the artifact bytes.
    ///
    /// Returns `ForgeError::Timeout` if no completion is observed within
    /// the configured budget and `ForgeError::Fetch` if the completed
    /// artifact cannot be retrieved.
    pub fn await_result(&self, job: &JobId) -> Result<Vec<u8>> {
        let start = Instant::now();

        loop {
            match self.backend.status(job)? {
                JobStatus::Complete(artifact) => {
                    return self.backend.fetch(&artifact);
                }
                JobStatus::Pending | JobStatus::NotFound => {}
            }

            if start.elapsed() >= self.timeout {
                return Err(ForgeError::Timeout(self.timeout.as_secs()));
            }

            std::thread::sleep(self.poll_interval);
        }
    }

    /// One full submit-poll-fetch cycle
    pub fn run(&self, prompt: &str, width: u32, height: u32) -> Result<Vec<u8>> {
        let job = self.submit(prompt, width, height)?;
        println!("  Image job queued with ID: {}", job);
        self.await_result(&job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::MockImageBackend;

    #[test]
    fn test_submit_poll_fetch_cycle() {
        let backend = MockImageBackend::completing_after(2, b"png-bytes".to_vec());
        let poller = JobPoller::new(&backend, 0, 10);

        let bytes = poller.run("a goblin wizard", 1024, 768).unwrap();
        assert_eq!(bytes, b"png-bytes");
        assert!(backend.poll_count() >= 2);
    }

    #[test]
    fn test_timeout_not_before_budget() {
        let backend = MockImageBackend::never_completing();
        let poller = JobPoller::new(&backend, 0, 1);

        let start = Instant::now();
        let job = poller.submit("slow art", 1024, 768).unwrap();
        let err = poller.await_result(&job).unwrap_err();

        assert!(matches!(err, ForgeError::Timeout(1)));
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn test_submission_failure_surfaces() {
        let backend = MockImageBackend::rejecting_submissions();
        let poller = JobPoller::new(&backend, 0, 10);

        let err = poller.run("anything", 1024, 768).unwrap_err();
        assert!(matches!(err, ForgeError::Submission(_)));
    }

    #[test]
    fn test_fetch_failure_surfaces() {
        let backend = MockImageBackend::failing_fetch();
        let poller = JobPoller::new(&backend, 0, 10);

        let err = poller.run("anything", 1024, 768).unwrap_err();
        assert!(matches!(err, ForgeError::Fetch(_)));
    }
}
