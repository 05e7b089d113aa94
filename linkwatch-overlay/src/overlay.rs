//! The Overlay engine: mode, threshold and the periodic highlight loop for
//! one client session.

use std::any::Any;
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Duration;

use linkwatch_types::{DirectionalLink, HighlightMessage, Highlights};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::OverlayError;
use crate::highlight::HighlightBuilder;
use crate::mode::Mode;
use crate::output::Output;
use crate::scheduler::Scheduler;
use crate::source::{LoadSource, TopologySource};
use crate::threshold::Threshold;

/// Default interval between scheduled highlight builds.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(200);

#[derive(Debug)]
struct Shared {
    topology: Arc<dyn TopologySource>,
    loads: Arc<dyn LoadSource>,
    output: Output,
    period: Duration,
    threshold: Threshold,
    mode: RwLock<Mode>,
    link_snapshot: RwLock<Vec<DirectionalLink>>,
    scheduler: Scheduler,
}

impl Shared {
    fn mode(&self) -> Mode {
        *self.mode.read()
    }

    fn set_mode(&self, mode: Mode) {
        *self.mode.write() = mode;
    }

    fn build_highlights(&self) -> Highlights {
        HighlightBuilder::new(&*self.topology, &*self.loads, self.threshold.get()).build()
    }

    async fn send(&self, highlights: Highlights) -> Result<(), OverlayError> {
        self.output.emit(&HighlightMessage::new(highlights)).await
    }

    /// Build a snapshot, reporting a panicking build as an error.
    fn try_build(&self) -> Result<Highlights, OverlayError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.build_highlights()))
            .map_err(|payload| OverlayError::BuildPanicked(panic_message(payload.as_ref())))
    }

    /// One scheduled cycle.
    async fn tick(&self) -> Result<(), OverlayError> {
        if !self.mode().is_monitoring() {
            return Ok(());
        }
        let highlights = self.try_build()?;
        self.send(highlights).await
    }
}

async fn run_tick(shared: Weak<Shared>) -> ControlFlow<()> {
    let Some(shared) = shared.upgrade() else {
        return ControlFlow::Break(());
    };
    if let Err(e) = shared.tick().await {
        warn!("Unable to process display tick: {}", e);
    }
    ControlFlow::Continue(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Live traffic overlay for a single client session.
///
/// The overlay starts idle. `start(Mode::Monitor)` arms a repeating build
/// every `period` and emits one build immediately; `stop()` disarms it and
/// clears the client's display. Every build re-queries the topology and load
/// sources, so no derived state is carried between cycles.
///
/// The tick task only holds a weak reference to the overlay; dropping the
/// overlay ends the task.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use linkwatch_overlay::{MemoryTopology, Mode, Output, Overlay};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let topology = Arc::new(MemoryTopology::new());
///     let (output, mut rx) = Output::channel(16);
///
///     let overlay = Overlay::builder()
///         .topology(topology.clone())
///         .loads(topology)
///         .output(output)
///         .build()?;
///
///     overlay.start(Mode::Monitor).await?;
///
///     while let Some(message) = rx.recv().await {
///         println!("{} links highlighted", message.payload.len());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Overlay {
    shared: Arc<Shared>,
}

impl Overlay {
    pub fn builder() -> OverlayBuilder {
        OverlayBuilder::new()
    }

    /// Reset state and enter `mode`, then clear the display.
    ///
    /// Entering `Monitor` arms the tick task, captures the active link
    /// snapshot and emits one build right away. Any other mode disarms it.
    /// The mode and tick task are settled before anything is emitted, so an
    /// output failure never leaves the overlay idle with the task armed.
    pub async fn start(&self, mode: Mode) -> Result<(), OverlayError> {
        debug!("Start display: mode [{}]", mode);
        self.clear_state();

        match mode {
            Mode::Monitor => {
                self.shared.set_mode(Mode::Monitor);
                self.schedule();
                self.init_link_snapshot();
                self.clear_highlights().await;
                self.send_all_traffic().await
            }
            Mode::Idle => {
                self.shared.scheduler.cancel();
                self.clear_highlights().await;
                Ok(())
            }
        }
    }

    /// Emit a fresh build when monitoring, otherwise clear the display.
    pub async fn update(&self) -> Result<(), OverlayError> {
        if self.mode().is_monitoring() {
            self.send_all_traffic().await
        } else {
            self.clear_highlights().await;
            Ok(())
        }
    }

    /// Disarm the tick task, go idle and clear the display.
    pub async fn stop(&self) -> Result<(), OverlayError> {
        debug!("Stop display");
        self.shared.scheduler.cancel();
        self.clear_state();
        self.clear_highlights().await;
        Ok(())
    }

    /// Replace the threshold, given in kilobytes/sec.
    pub fn set_threshold_kbps(&self, kilobytes: u64) {
        self.shared.threshold.set_kilobytes(kilobytes);
        debug!("Threshold set to {} B/s", self.shared.threshold.get());
    }

    /// Current threshold in bytes/sec.
    pub fn threshold(&self) -> u64 {
        self.shared.threshold.get()
    }

    pub fn mode(&self) -> Mode {
        self.shared.mode()
    }

    pub fn period(&self) -> Duration {
        self.shared.period
    }

    /// Active links captured when monitoring last started.
    pub fn link_snapshot(&self) -> Vec<DirectionalLink> {
        self.shared.link_snapshot.read().clone()
    }

    /// True while the tick task is armed.
    pub fn is_scheduled(&self) -> bool {
        self.shared.scheduler.is_armed()
    }

    /// Build a snapshot without emitting it.
    pub fn build_highlights(&self) -> Highlights {
        self.shared.build_highlights()
    }

    fn clear_state(&self) {
        self.shared.set_mode(Mode::Idle);
        self.shared.link_snapshot.write().clear();
    }

    /// Best effort; a failed clear is logged and otherwise ignored.
    async fn clear_highlights(&self) {
        if let Err(e) = self.shared.send(Highlights::clear()).await {
            warn!("Unable to clear highlights: {}", e);
        }
    }

    async fn send_all_traffic(&self) -> Result<(), OverlayError> {
        debug!("Sending all port traffic");
        let highlights = self.shared.try_build()?;
        self.shared.send(highlights).await
    }

    fn schedule(&self) {
        let weak = Arc::downgrade(&self.shared);
        self.shared
            .scheduler
            .schedule_repeating(self.shared.period, move || run_tick(weak.clone()));
    }

    fn init_link_snapshot(&self) {
        let links: HashSet<DirectionalLink> =
            self.shared.topology.active_links().into_iter().collect();
        debug!("Initialized link snapshot with {} links", links.len());
        *self.shared.link_snapshot.write() = links.into_iter().collect();
    }
}

/// Builder for configuring an Overlay.
#[derive(Debug, Default)]
pub struct OverlayBuilder {
    topology: Option<Arc<dyn TopologySource>>,
    loads: Option<Arc<dyn LoadSource>>,
    output: Option<Output>,
    period: Option<Duration>,
    threshold_kbps: u64,
}

impl OverlayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source of links and hosts. Required.
    pub fn topology(mut self, topology: Arc<dyn TopologySource>) -> Self {
        self.topology = Some(topology);
        self
    }

    /// Source of per-port load. Required.
    pub fn loads(mut self, loads: Arc<dyn LoadSource>) -> Self {
        self.loads = Some(loads);
        self
    }

    /// Where highlight messages go. Defaults to a channel nobody reads.
    pub fn output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    /// Interval between scheduled builds. Defaults to 200ms.
    pub fn period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    /// Initial threshold in kilobytes/sec. Defaults to 0.
    pub fn threshold_kbps(mut self, kilobytes: u64) -> Self {
        self.threshold_kbps = kilobytes;
        self
    }

    pub fn build(self) -> Result<Overlay, OverlayError> {
        let topology = self.topology.ok_or(OverlayError::MissingSource("topology"))?;
        let loads = self.loads.ok_or(OverlayError::MissingSource("load"))?;
        let output = self.output.unwrap_or_else(|| Output::channel(1).0);

        Ok(Overlay {
            shared: Arc::new(Shared {
                topology,
                loads,
                output,
                period: self.period.unwrap_or(DEFAULT_PERIOD),
                threshold: Threshold::from_kilobytes(self.threshold_kbps),
                mode: RwLock::new(Mode::Idle),
                link_snapshot: RwLock::new(Vec::new()),
                scheduler: Scheduler::new(),
            }),
        })
    }
}
