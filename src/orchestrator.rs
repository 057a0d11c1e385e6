//! Background render orchestration.
//!
//! The orchestrator owns the live [`Flame`] and a single named worker thread. The worker owns
//! the accumulator. Every submitted request cancels the job in flight, gets the next epoch and
//! is posted to the worker's mailbox; the worker drains the mailbox and only runs the newest
//! job. Results are moved to the [`RenderListener`], so no buffer is ever shared between the
//! worker and its consumer.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, error, info, trace, warn};

use crate::accumulator::Accumulator;
use crate::cancel::CancelToken;
use crate::config::RenderConfig;
use crate::engine::ChaosGame;
use crate::error::{FlameError, Result};
use crate::flame::Flame;
use crate::request::{RenderRequest, RenderResult};
use crate::tone::{ToneMapped, ToneMapper};
use crate::variation::variation_labels;

/// Receives everything the worker publishes. Called from the worker thread, except during
/// [`RenderOrchestrator::bootstrap`] where it runs on the caller's thread.
pub trait RenderListener: Send + 'static {
    fn on_progress(&mut self, fraction: f32, message: &str);
    fn on_complete(&mut self, result: RenderResult);
    fn on_bootstrap_done(&mut self) {}
}

/// Listener events forwarded over a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Progress { fraction: f32, message: String },
    Completed(RenderResult),
    BootstrapDone,
}

impl RenderListener for Sender<RenderEvent> {
    fn on_progress(&mut self, fraction: f32, message: &str) {
        let _ = self.send(RenderEvent::Progress {
            fraction,
            message: message.to_string(),
        });
    }

    fn on_complete(&mut self, result: RenderResult) {
        let _ = self.send(RenderEvent::Completed(result));
    }

    fn on_bootstrap_done(&mut self) {
        let _ = self.send(RenderEvent::BootstrapDone);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl RenderState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RenderState::Running,
            2 => RenderState::Completed,
            3 => RenderState::Cancelled,
            _ => RenderState::Idle,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SharedState(Arc<AtomicU8>);

impl SharedState {
    fn set(&self, state: RenderState) {
        self.0.store(state as u8, Ordering::Release);
    }

    fn get(&self) -> RenderState {
        RenderState::from_u8(self.0.load(Ordering::Acquire))
    }
}

/// What the accumulator currently holds a complete pass of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PassKey {
    revision: u64,
    zoom: u32,
    iterations: u64,
}

impl PassKey {
    fn of(request: &RenderRequest, revision: u64) -> Self {
        Self {
            revision,
            zoom: request.zoom(),
            iterations: request.iterations(),
        }
    }
}

struct Job {
    request: RenderRequest,
    flame: Arc<Flame>,
    revision: u64,
    cancel: CancelToken,
}

struct Worker {
    config: RenderConfig,
    accumulator: Accumulator,
    pass: Option<PassKey>,
    listener: Box<dyn RenderListener>,
    latest_epoch: Arc<AtomicU64>,
    state: SharedState,
}

impl Worker {
    fn run(mut self, jobs: Receiver<Job>) {
        debug!("Render worker: waiting for jobs");
        while let Ok(mut job) = jobs.recv() {
            loop {
                match jobs.try_recv() {
                    Ok(newer) => {
                        debug!(
                            "Render worker: dropping superseded render {}",
                            job.request.epoch()
                        );
                        job = newer;
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }

            if let Err(e) = self.execute(job) {
                error!("Render worker: {}", e);
                self.state.set(RenderState::Cancelled);
            }
        }
        self.state.set(RenderState::Idle);
        info!("Render worker: mailbox closed, shutting down");
    }

    fn execute(&mut self, job: Job) -> Result<()> {
        let Job {
            mut request,
            flame,
            revision,
            cancel,
        } = job;
        let epoch = request.epoch();
        if cancel.is_cancelled() {
            trace!("Render {} cancelled before it started", epoch);
            self.state.set(RenderState::Cancelled);
            return Ok(());
        }
        self.state.set(RenderState::Running);
        let started = Instant::now();

        let (width, height) = self.config.grid_size();
        if self.accumulator.ensure_size(width, height) {
            debug!("Accumulator resized to {}x{}", width, height);
            self.pass = None;
        }
        let key = PassKey::of(&request, revision);
        if !request.recalculate() && self.pass != Some(key) {
            debug!(
                "Render {}: accumulator does not hold this pass, recalculating",
                epoch
            );
            request = request.promote();
        }

        if request.recalculate() {
            self.pass = None;
            info!(
                "Render {}: {} iterations at zoom {}",
                epoch,
                request.iterations(),
                request.zoom()
            );
            let total = request.iterations();
            let listener = &mut self.listener;
            let outcome = ChaosGame::new(&flame, &self.config).run(
                &mut self.accumulator,
                &request,
                &cancel,
                &mut |done: u64| {
                    let fraction = done as f32 / total as f32;
                    let elapsed = started.elapsed().as_secs_f64();
                    let remaining = elapsed / done as f64 * (total - done) as f64;
                    listener.on_progress(
                        fraction,
                        &format!(
                            "{}/{} iterations, about {:.1}s remaining",
                            done, total, remaining
                        ),
                    );
                },
            );
            if outcome.is_cancelled() {
                info!(
                    "Render {} cancelled after {} iterations",
                    epoch,
                    outcome.iterations()
                );
                self.state.set(RenderState::Cancelled);
                return Ok(());
            }
            self.pass = Some(key);
        }

        let mapper = ToneMapper::new(self.config.supersample, self.config.gamma_convention);
        let Some(mapped) = mapper.render(&self.accumulator, request.gamma(), &cancel)? else {
            info!("Render {} cancelled during tone mapping", epoch);
            self.state.set(RenderState::Cancelled);
            return Ok(());
        };

        if cancel.is_cancelled() || self.latest_epoch.load(Ordering::Acquire) != epoch {
            debug!("Render {} finished after being superseded, discarding", epoch);
            self.state.set(RenderState::Cancelled);
            return Ok(());
        }

        info!(
            "Render {} painted {} pixels in {:.2?}",
            epoch,
            mapped.painted,
            started.elapsed()
        );
        self.state.set(RenderState::Completed);
        self.listener.on_complete(RenderResult {
            pixels: mapped.pixels,
            pixels_painted: mapped.painted,
            epoch,
        });
        Ok(())
    }
}

/// Runs one uninterruptible pass on the caller's thread.
fn render_now(
    flame: &Flame,
    config: &RenderConfig,
    accumulator: &mut Accumulator,
    request: &RenderRequest,
) -> Result<Option<ToneMapped>> {
    let never = CancelToken::new();
    ChaosGame::new(flame, config).run(accumulator, request, &never, &mut |_| {});
    ToneMapper::new(config.supersample, config.gamma_convention).render(
        accumulator,
        request.gamma(),
        &never,
    )
}

pub struct RenderOrchestrator {
    config: RenderConfig,
    flame: Arc<Flame>,
    revision: u64,
    epoch: u64,
    latest_epoch: Arc<AtomicU64>,
    state: SharedState,
    current: Option<CancelToken>,
    jobs: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl RenderOrchestrator {
    /// Generates a flame, renders it synchronously and starts the worker.
    ///
    /// Flames painting fewer than `config.min_painted_pixels` pixels are replaced by a flame
    /// from a derived seed until one is not degenerate. The accepted image is delivered to
    /// `listener` as epoch 0, followed by `on_bootstrap_done`.
    pub fn bootstrap<L: RenderListener>(
        config: RenderConfig,
        seed: Option<u64>,
        initial: RenderRequest,
        mut listener: L,
    ) -> Result<Self> {
        config.validate()?;
        check_zoom(&config, &initial)?;
        let initial = initial.promote().with_epoch(0);

        let mut seed = seed.unwrap_or_else(rand::random);
        let (width, height) = config.grid_size();
        let mut accumulator = Accumulator::new(width, height);
        info!("Bootstrapping with seed {}", seed);

        let (flame, mapped) = loop {
            let flame = Flame::generate(seed);
            let mapped = render_now(&flame, &config, &mut accumulator, &initial)?;
            match mapped {
                Some(mapped) if mapped.painted >= config.min_painted_pixels => break (flame, mapped),
                other => {
                    let painted = other.map_or(0, |m| m.painted);
                    let next = Flame::derive_seed(seed);
                    warn!(
                        "Seed {} painted only {} pixels, retrying with seed {}",
                        seed, painted, next
                    );
                    seed = next;
                }
            }
        };

        info!("Bootstrap accepted seed {} ({} pixels)", seed, mapped.painted);
        listener.on_complete(RenderResult {
            pixels: mapped.pixels,
            pixels_painted: mapped.painted,
            epoch: 0,
        });
        listener.on_bootstrap_done();

        let latest_epoch = Arc::new(AtomicU64::new(0));
        let state = SharedState::default();
        state.set(RenderState::Completed);
        let worker = Worker {
            config: config.clone(),
            accumulator,
            pass: Some(PassKey::of(&initial, 0)),
            listener: Box::new(listener),
            latest_epoch: Arc::clone(&latest_epoch),
            state: state.clone(),
        };

        let (jobs, mailbox) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("flame-render".to_string())
            .spawn(move || worker.run(mailbox))
            .map_err(|e| FlameError::WorkerSpawn(e.to_string()))?;

        Ok(Self {
            config,
            flame: Arc::new(flame),
            revision: 0,
            epoch: 0,
            latest_epoch,
            state,
            current: None,
            jobs: Some(jobs),
            worker: Some(handle),
        })
    }

    /// Cancels any render in flight and queues `request`. Returns the epoch assigned to it.
    pub fn submit_render(&mut self, request: RenderRequest) -> Result<u64> {
        check_zoom(&self.config, &request)?;
        let jobs = self.jobs.as_ref().ok_or(FlameError::WorkerGone)?;

        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
        self.epoch += 1;
        self.latest_epoch.store(self.epoch, Ordering::Release);

        let cancel = CancelToken::new();
        let job = Job {
            request: request.with_epoch(self.epoch),
            flame: Arc::clone(&self.flame),
            revision: self.revision,
            cancel: cancel.clone(),
        };
        jobs.send(job).map_err(|_| FlameError::WorkerGone)?;
        self.current = Some(cancel);
        debug!(
            "Submitted render {} (recalculate: {})",
            self.epoch,
            request.recalculate()
        );
        Ok(self.epoch)
    }

    /// Replaces the flame with a freshly generated one and returns its seed.
    ///
    /// Callers follow up with a recalculating request to see the new flame.
    pub fn reinitialize(&mut self, seed: Option<u64>) -> u64 {
        let seed = seed.unwrap_or_else(rand::random);
        self.flame = Arc::new(Flame::generate(seed));
        self.revision += 1;
        info!("Reinitialized flame with seed {}", seed);
        seed
    }

    /// Edits one variation weight of the live flame without touching its functions.
    pub fn set_variation_weight(&mut self, index: usize, value: f64) -> Result<()> {
        Arc::make_mut(&mut self.flame).set_variation_weight(index, value)?;
        self.revision += 1;
        Ok(())
    }

    pub fn variation_labels(&self) -> &'static [&'static str] {
        variation_labels()
    }

    pub fn flame(&self) -> &Flame {
        &self.flame
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn state(&self) -> RenderState {
        self.state.get()
    }

    /// Cancels the running job and waits for the worker to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel();
        }
        self.jobs.take();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Render worker panicked");
            }
        }
    }
}

impl Drop for RenderOrchestrator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn check_zoom(config: &RenderConfig, request: &RenderRequest) -> Result<()> {
    let range = config.zoom_range;
    if range.contains(request.zoom()) {
        Ok(())
    } else {
        Err(FlameError::ZoomOutOfRange {
            zoom: request.zoom(),
            min: range.min,
            max: range.max,
        })
    }
}
