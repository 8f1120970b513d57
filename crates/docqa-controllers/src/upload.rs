use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use docqa_core::config::UploadSettings;
use docqa_core::types::{UploadFile, UploadMetadata, UploadRequest, UploadResponse};
use docqa_core::validate;
use docqa_core::{ApiError, Backend, ValidationError};

use crate::phase::{ControllerError, Interaction, Phase};
use crate::progress::SyntheticProgress;

/// Document ingestion with a synthetic progress estimate.
#[derive(Debug, Clone)]
pub struct UploadController {
    max_bytes: u64,
    tick: Duration,
    phase: Phase,
    error: Option<ControllerError>,
    response: Option<UploadResponse>,
    progress: SyntheticProgress,
}

impl UploadController {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            max_bytes: settings.max_bytes,
            tick: Duration::from_millis(settings.tick_ms.max(1)),
            phase: Phase::Idle,
            error: None,
            response: None,
            progress: SyntheticProgress::from_settings(settings),
        }
    }

    /// Validate the selection and move to `Pending`. Nothing is read from disk here.
    pub fn begin(
        &mut self,
        file: Option<&UploadFile>,
        metadata: Option<UploadMetadata>,
    ) -> Result<UploadRequest, ValidationError> {
        let file = match validate::upload_file(file, self.max_bytes) {
            Ok(f) => f.clone(),
            Err(e) => {
                self.phase = Phase::Failed;
                self.error = Some(e.clone().into());
                self.response = None;
                self.progress.abort();
                return Err(e);
            }
        };
        self.phase = Phase::Pending;
        self.progress.start();
        Ok(UploadRequest { file, metadata })
    }

    pub fn complete(&mut self, outcome: Result<UploadResponse, ApiError>, now: Instant) -> Phase {
        match outcome {
            Ok(response) => {
                info!(file_id = %response.file_id, file = %response.file_name, "upload completed");
                self.progress.finish(now);
                self.response = Some(response);
                self.error = None;
                self.phase = Phase::Succeeded;
            }
            Err(err) => {
                warn!(status = err.status_code, message = %err.message, "upload failed");
                self.progress.abort();
                self.response = None;
                self.error = Some(ControllerError::from_api(err, "Upload failed"));
                self.phase = Phase::Failed;
            }
        }
        self.phase
    }

    /// Upload `file`, reporting the progress estimate to `on_progress` on every tick
    /// and once more when the request resolves.
    pub async fn upload<B, F>(
        &mut self,
        backend: &B,
        file: Option<&UploadFile>,
        metadata: Option<UploadMetadata>,
        mut on_progress: F,
    ) -> Phase
    where
        B: Backend + ?Sized,
        F: FnMut(u8),
    {
        let Ok(request) = self.begin(file, metadata) else {
            return self.phase;
        };
        debug!(file = %request.file.file_name, size = request.file.size, "uploading");
        on_progress(self.progress.percent(Instant::now()));

        let call = backend.upload(&request);
        tokio::pin!(call);
        let mut ticker = tokio::time::interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            tokio::select! {
                outcome = &mut call => break outcome,
                _ = ticker.tick() => {
                    self.progress.tick();
                    on_progress(self.progress.percent(Instant::now()));
                }
            }
        };

        let now = Instant::now();
        let phase = self.complete(outcome, now);
        on_progress(self.progress.percent(now));
        phase
    }

    /// Current progress estimate in percent. Reads 0 again once the reset delay
    /// after completion has passed.
    pub fn progress(&self, now: Instant) -> u8 {
        self.progress.percent(now)
    }

    pub fn response(&self) -> Option<&UploadResponse> {
        self.response.as_ref()
    }

    pub fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.error = None;
        self.response = None;
        self.progress.abort();
    }
}

impl Interaction for UploadController {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn error(&self) -> Option<&ControllerError> {
        self.error.as_ref()
    }

    fn reset(&mut self) {
        self.clear();
    }
}
