//! Detector client

use std::sync::Arc;

use scan_protocol::DetectionOutcome;
use tracing::{debug, warn};

use capture::FrameBuffer;

use crate::{PixelAnalyzer, ScreenRegion};

/// Boundary client around the external pixel analyzer.
///
/// Marshals a frame buffer and its dimensions into the analyzer and
/// converts every failure into a `NotFound` outcome; no fault from the
/// analyzer propagates past this client. Retries are not performed
/// here; re-invocation is the scan controller's polling interval.
#[derive(Clone)]
pub struct DetectorClient {
    analyzer: Arc<dyn PixelAnalyzer>,
}

impl DetectorClient {
    pub fn new(analyzer: Arc<dyn PixelAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Analyze one snapshot for a readable device display
    pub async fn analyze(&self, frame: FrameBuffer) -> DetectionOutcome {
        let analyzer = self.analyzer.clone();
        let (width, height) = (frame.width(), frame.height());
        let pixels = frame.bytes();

        let result =
            tokio::task::spawn_blocking(move || analyzer.read_stats(&pixels, width, height)).await;

        match result {
            Ok(Ok(summary)) => {
                debug!(width, height, "Analyzer decoded display contents");
                DetectionOutcome::found(summary)
            }
            Ok(Err(err)) => {
                debug!(width, height, "Analyzer found nothing: {}", err);
                DetectionOutcome::not_found(err.to_string())
            }
            Err(err) => {
                warn!("Analyzer task failed: {}", err);
                DetectionOutcome::not_found("analyzer task failed")
            }
        }
    }

    /// Locate a device display without decoding it
    pub async fn locate(&self, frame: FrameBuffer) -> Option<ScreenRegion> {
        let analyzer = self.analyzer.clone();
        let (width, height) = (frame.width(), frame.height());
        let pixels = frame.bytes();

        let result =
            tokio::task::spawn_blocking(move || analyzer.locate_screen(&pixels, width, height))
                .await;

        match result {
            Ok(Ok(region)) => Some(region),
            Ok(Err(err)) => {
                debug!("Locate found nothing: {}", err);
                None
            }
            Err(err) => {
                warn!("Locate task failed: {}", err);
                None
            }
        }
    }
}
