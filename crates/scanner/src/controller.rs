//! Scan controller - the polling state machine
//!
//! One controller instance owns its timer handle and scan state; UI
//! layers call the intents (`scan_once`, `start_polling`,
//! `stop_polling`) and observe published `ScanEvent`s, never the
//! internals.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use capture::{FrameSampler, FrameSource};
use detector::DetectorClient;
use scan_protocol::{DEFAULT_POLL_INTERVAL, DetectionOutcome, ScanEvent, ScanState};

/// Observer callback for published scan events
pub type EventCallback = Arc<dyn Fn(ScanEvent) + Send + Sync>;

/// Scan controller configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Polling interval for periodic scanning
    pub interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Orchestrates one-shot and periodic scans.
///
/// At most one scan is in flight at any time: `scan_once` and
/// `start_polling` are no-ops unless the controller is `Idle`, and poll
/// ticks are awaited one after another inside a single timer task. A
/// tick slower than the interval causes intervening timer fires to be
/// skipped, never queued.
pub struct ScanController {
    source: Arc<dyn FrameSource>,
    sampler: FrameSampler,
    detector: DetectorClient,
    interval: Duration,
    state: Mutex<ScanState>,
    /// Stop flag of the currently armed polling loop. A fresh flag per
    /// `start_polling`, so a stop/start pair cannot revive a stale loop.
    poll_stop: Mutex<Option<Arc<AtomicBool>>>,
    on_event: EventCallback,
}

impl ScanController {
    pub fn new(
        source: Arc<dyn FrameSource>,
        sampler: FrameSampler,
        detector: DetectorClient,
        config: ScanConfig,
        on_event: EventCallback,
    ) -> Arc<Self> {
        Arc::new(Self {
            source,
            sampler,
            detector,
            interval: config.interval,
            state: Mutex::new(ScanState::Idle),
            poll_stop: Mutex::new(None),
            on_event,
        })
    }

    /// Current state of the controller
    pub fn state(&self) -> ScanState {
        *self.state.lock()
    }

    /// Run a single scan and publish its outcome.
    ///
    /// No-op while another scan is in flight or polling is active; the
    /// request collapses into the ongoing work.
    pub async fn scan_once(&self) {
        {
            let mut state = self.state.lock();
            if *state != ScanState::Idle {
                debug!("Scan requested while {}, ignoring", *state);
                return;
            }
            *state = ScanState::ScanningOnce;
        }
        self.emit(ScanEvent::StateChanged(ScanState::ScanningOnce));

        self.run_scan().await;

        *self.state.lock() = ScanState::Idle;
        self.emit(ScanEvent::StateChanged(ScanState::Idle));
    }

    /// Arm the recurring scan timer.
    ///
    /// The first tick fires one interval after this call. No-op unless
    /// the controller is `Idle`, so repeated requests never arm a
    /// second timer.
    pub fn start_polling(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if *state != ScanState::Idle {
                debug!("Polling requested while {}, ignoring", *state);
                return;
            }
            *state = ScanState::PollingActive;
        }

        let stop = Arc::new(AtomicBool::new(false));
        *self.poll_stop.lock() = Some(stop.clone());

        info!("Polling started, interval {:?}", self.interval);
        self.emit(ScanEvent::StateChanged(ScanState::PollingActive));

        let controller = self.clone();
        tokio::spawn(async move {
            controller.poll_loop(stop).await;
        });
    }

    /// Disarm the scan timer.
    ///
    /// Takes effect before the next scheduled tick; a tick already in
    /// progress still completes and publishes its outcome. No-op when
    /// polling is not active.
    pub fn stop_polling(&self) {
        {
            let mut state = self.state.lock();
            if *state != ScanState::PollingActive {
                debug!("Stop requested while {}, ignoring", *state);
                return;
            }
            *state = ScanState::Idle;
        }

        if let Some(stop) = self.poll_stop.lock().take() {
            stop.store(true, Ordering::SeqCst);
        }

        info!("Polling stopped");
        self.emit(ScanEvent::StateChanged(ScanState::Idle));
    }

    async fn poll_loop(self: Arc<Self>, stop: Arc<AtomicBool>) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        // A tick slower than the interval skips the fires it missed
        // instead of bursting to catch up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if stop.load(Ordering::SeqCst) {
                break;
            }
            self.run_scan().await;
        }

        debug!("Polling loop ended");
    }

    /// One tick: sample, analyze, publish. Publishes exactly one
    /// outcome, also when sampling fails - a vanished session becomes a
    /// `NotFound` outcome and polling carries on; stopping the session
    /// is the consumer's decision.
    async fn run_scan(&self) {
        let outcome = match self.sampler.capture_still(self.source.as_ref()) {
            Ok(frame) => self.detector.analyze(frame).await,
            Err(err) => {
                warn!("Frame capture failed: {}", err);
                DetectionOutcome::not_found(err.to_string())
            }
        };

        self.emit(ScanEvent::Outcome(outcome));
    }

    fn emit(&self, event: ScanEvent) {
        (self.on_event)(event);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use capture::{SessionManager, SyntheticProvider, SyntheticStream};
    use detector::{AnalyzerError, AnalyzerResult, PixelAnalyzer, ScreenRegion};

    use super::*;

    /// Analyzer stub with a fixed verdict and optional simulated latency
    struct StubAnalyzer {
        stats: AnalyzerResult<String>,
        delay: Duration,
    }

    impl StubAnalyzer {
        fn finds(summary: &str) -> Self {
            Self {
                stats: Ok(summary.to_string()),
                delay: Duration::ZERO,
            }
        }

        fn misses() -> Self {
            Self {
                stats: Err(AnalyzerError::DisplayNotFound),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl PixelAnalyzer for StubAnalyzer {
        fn read_stats(&self, _pixels: &[u8], _width: u32, _height: u32) -> AnalyzerResult<String> {
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            self.stats.clone()
        }

        fn locate_screen(
            &self,
            _pixels: &[u8],
            _width: u32,
            _height: u32,
        ) -> AnalyzerResult<ScreenRegion> {
            Err(AnalyzerError::DisplayNotFound)
        }
    }

    struct Harness {
        manager: SessionManager,
        controller: Arc<ScanController>,
        events: Arc<Mutex<Vec<ScanEvent>>>,
    }

    impl Harness {
        fn new(analyzer: StubAnalyzer, interval: Duration) -> Self {
            let stream = SyntheticStream::new(160, 144);
            let manager = SessionManager::new(Arc::new(SyntheticProvider::with_stream(stream)));
            manager.start().unwrap();

            let events: Arc<Mutex<Vec<ScanEvent>>> = Arc::new(Mutex::new(Vec::new()));
            let sink = events.clone();
            let controller = ScanController::new(
                manager.source(),
                FrameSampler::new(),
                DetectorClient::new(Arc::new(analyzer)),
                ScanConfig { interval },
                Arc::new(move |event| sink.lock().push(event)),
            );

            Self {
                manager,
                controller,
                events,
            }
        }

        fn outcomes(&self) -> Vec<DetectionOutcome> {
            self.events
                .lock()
                .iter()
                .filter_map(|event| match event {
                    ScanEvent::Outcome(outcome) => Some(outcome.clone()),
                    ScanEvent::StateChanged(_) => None,
                })
                .collect()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scan_once_publishes_found_outcome() {
        let harness = Harness::new(
            StubAnalyzer::finds("Level: 3, HP: 27"),
            DEFAULT_POLL_INTERVAL,
        );

        harness.controller.scan_once().await;

        let outcomes = harness.outcomes();
        assert_eq!(outcomes, vec![DetectionOutcome::found("Level: 3, HP: 27")]);
        assert_eq!(harness.controller.state(), ScanState::Idle);

        // State machine passed through ScanningOnce and back
        let events = harness.events.lock().clone();
        assert_eq!(
            events.first(),
            Some(&ScanEvent::StateChanged(ScanState::ScanningOnce))
        );
        assert_eq!(
            events.last(),
            Some(&ScanEvent::StateChanged(ScanState::Idle))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scan_once_on_black_frame_publishes_not_found() {
        let harness = Harness::new(StubAnalyzer::misses(), DEFAULT_POLL_INTERVAL);

        harness.controller.scan_once().await;

        assert_eq!(
            harness.outcomes(),
            vec![DetectionOutcome::not_found("no device display detected")]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scan_once_after_session_stop_publishes_source_unavailable() {
        let harness = Harness::new(StubAnalyzer::finds("unreachable"), DEFAULT_POLL_INTERVAL);
        harness.manager.stop();

        harness.controller.scan_once().await;

        let outcomes = harness.outcomes();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].reason(), Some("Capture source unavailable"));
        assert_eq!(harness.controller.state(), ScanState::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_double_start_polling_arms_a_single_timer() {
        let harness = Harness::new(StubAnalyzer::misses(), Duration::from_millis(50));

        harness.controller.start_polling();
        harness.controller.start_polling();
        assert_eq!(harness.controller.state(), ScanState::PollingActive);

        tokio::time::sleep(Duration::from_millis(500)).await;
        harness.controller.stop_polling();

        // ~10 ticks at one timer; a doubled timer would be ~20
        let count = harness.outcomes().len();
        assert!((6..=14).contains(&count), "unexpected tick count {count}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_slow_tick_skips_missed_fires() {
        let harness = Harness::new(
            StubAnalyzer::finds("slow").with_delay(Duration::from_millis(500)),
            Duration::from_millis(200),
        );

        harness.controller.start_polling();

        // First tick at ~200ms finishes ~700ms; the fires missed while
        // it ran collapse into one follow-up scan (done ~1200ms) instead
        // of a queued burst, so only one outcome lands before 1000ms.
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(harness.outcomes().len(), 1, "missed fires were queued");

        harness.controller.stop_polling();

        // The in-flight tick still completes and publishes.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(harness.outcomes().len() <= 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_polling_halts_ticks() {
        let harness = Harness::new(StubAnalyzer::misses(), Duration::from_millis(50));

        harness.controller.start_polling();
        tokio::time::sleep(Duration::from_millis(230)).await;
        harness.controller.stop_polling();
        assert_eq!(harness.controller.state(), ScanState::Idle);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let count_at_stop = harness.outcomes().len();
        assert!(count_at_stop >= 1);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(harness.outcomes().len(), count_at_stop);

        // Stop is idempotent
        harness.controller.stop_polling();
        assert_eq!(harness.controller.state(), ScanState::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_scan_once_is_noop_while_polling() {
        let harness = Harness::new(StubAnalyzer::misses(), Duration::from_millis(500));

        harness.controller.start_polling();
        harness.controller.scan_once().await;

        // Well before the first tick: the one-shot must not have run
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(harness.outcomes().is_empty());
        assert_eq!(harness.controller.state(), ScanState::PollingActive);

        harness.controller.stop_polling();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_start_polling_is_noop_during_one_shot() {
        let harness = Harness::new(
            StubAnalyzer::finds("slow").with_delay(Duration::from_millis(300)),
            Duration::from_millis(50),
        );

        let controller = harness.controller.clone();
        let one_shot = tokio::spawn(async move { controller.scan_once().await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(harness.controller.state(), ScanState::ScanningOnce);
        harness.controller.start_polling();
        assert_eq!(harness.controller.state(), ScanState::ScanningOnce);

        one_shot.await.unwrap();
        assert_eq!(harness.controller.state(), ScanState::Idle);

        // No timer was armed; the one-shot outcome stands alone
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(harness.outcomes().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_polling_survives_session_stop() {
        let harness = Harness::new(StubAnalyzer::finds("Level: 3, HP: 27"), Duration::from_millis(50));

        harness.controller.start_polling();
        tokio::time::sleep(Duration::from_millis(130)).await;
        harness.manager.stop();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let outcomes = harness.outcomes();
        assert!(outcomes.iter().any(|o| o.is_found()));
        assert!(
            outcomes
                .iter()
                .any(|o| o.reason() == Some("Capture source unavailable"))
        );
        // Ticks keep publishing; the controller never auto-stops
        assert_eq!(harness.controller.state(), ScanState::PollingActive);

        harness.controller.stop_polling();
    }
}
