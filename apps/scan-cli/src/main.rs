//! Framescan Demo Harness
//!
//! Drives the full scan pipeline against a synthetic 160x144 stream:
//! starts a capture session, scans once against a black frame, then
//! polls while the stream fill changes under it, and finally tears the
//! session down. Every published event is printed as a JSON line.
//!
//! Usage: framescan [interval_ms] [run_secs]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use capture::{FrameSampler, SessionManager, SyntheticProvider, SyntheticStream};
use detector::{AnalyzerError, AnalyzerResult, DetectorClient, PixelAnalyzer, ScreenRegion};
use scan_protocol::{DEFAULT_POLL_INTERVAL, ScanEvent};
use scanner::{ScanConfig, ScanController};

/// Demo analyzer: treats any solid non-black frame as a readable
/// summary screen. Stands in for the real Game Boy display reader.
struct DemoAnalyzer;

impl PixelAnalyzer for DemoAnalyzer {
    fn read_stats(&self, pixels: &[u8], _width: u32, _height: u32) -> AnalyzerResult<String> {
        match pixels.first_chunk::<4>() {
            Some([r, g, b, _]) if (*r as u16 + *g as u16 + *b as u16) > 0 => {
                Ok(format!("Level: 3, HP: 27 (fill {},{},{})", r, g, b))
            }
            _ => Err(AnalyzerError::DisplayNotFound),
        }
    }

    fn locate_screen(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> AnalyzerResult<ScreenRegion> {
        self.read_stats(pixels, width, height)?;
        Ok(ScreenRegion::new(0, 0, width, height))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framescan=info".parse()?)
                .add_directive("capture=info".parse()?)
                .add_directive("scanner=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let interval = args
        .next()
        .map(|ms| ms.parse().map(Duration::from_millis))
        .transpose()?
        .unwrap_or(DEFAULT_POLL_INTERVAL);
    let run_secs: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(5);

    info!(
        "Starting Framescan demo: interval {:?}, run time {}s",
        interval, run_secs
    );

    let stream = SyntheticStream::new(160, 144);
    let manager = SessionManager::new(Arc::new(SyntheticProvider::with_stream(stream.clone())));
    manager.start()?;

    let detector = DetectorClient::new(Arc::new(DemoAnalyzer));
    let controller = ScanController::new(
        manager.source(),
        FrameSampler::new(),
        detector.clone(),
        ScanConfig { interval },
        Arc::new(|event: ScanEvent| {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{}", line);
            }
        }),
    );

    // One-shot against the initial black frame: published as NotFound
    controller.scan_once().await;

    // Light the display up and poll for the configured run time
    stream.fill([120, 200, 80, 255]);
    controller.start_polling();
    tokio::time::sleep(Duration::from_secs(run_secs / 2)).await;

    // Show the locate boundary op on a fresh snapshot
    let snapshot = FrameSampler::new().capture_still(manager.source().as_ref())?;
    if let Some(region) = detector.locate(snapshot).await {
        info!("Display located at {:?}", region);
    }

    // Back to black: polling keeps publishing NotFound ticks
    stream.fill([0, 0, 0, 255]);
    tokio::time::sleep(Duration::from_secs(run_secs.div_ceil(2))).await;

    controller.stop_polling();
    manager.stop();

    // Post-stop scan: exactly one SourceUnavailable outcome, no fault
    controller.scan_once().await;

    Ok(())
}
