//! The chaos game: iterate a point through randomly chosen flame functions and record
//! where it lands.

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::accumulator::Accumulator;
use crate::cancel::CancelToken;
use crate::config::RenderConfig;
use crate::flame::{Flame, FlameFunction};
use crate::request::RenderRequest;
use crate::variation::{Derived, Variation};

/// Added to the flame seed so the engine stream never aliases the generation stream.
pub const ENGINE_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOutcome {
    Completed { iterations: u64 },
    Cancelled { iterations: u64 },
}

impl EngineOutcome {
    pub fn iterations(&self) -> u64 {
        match *self {
            EngineOutcome::Completed { iterations } | EngineOutcome::Cancelled { iterations } => {
                iterations
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineOutcome::Cancelled { .. })
    }
}

/// Position and running color of the iterated point.
struct Walker<'a> {
    flame: &'a Flame,
    active: Vec<(&'a Variation, f64)>,
    rng: StdRng,
    point: (f64, f64),
    color: [f64; 3],
}

impl<'a> Walker<'a> {
    fn new(flame: &'a Flame) -> Self {
        let mut rng = StdRng::seed_from_u64(flame.seed().wrapping_add(ENGINE_SEED_OFFSET));
        let point = (rng.gen(), rng.gen());
        let color = [rng.gen(), rng.gen(), rng.gen()];
        Self {
            flame,
            active: flame.active_variations(),
            rng,
            point,
            color,
        }
    }

    /// One chaos-game step. Returns false if the point had to be re-seeded.
    fn step(&mut self) -> bool {
        let flame = self.flame;
        let functions = flame.functions();
        let index = self.rng.gen_range(0..functions.len());
        let mut landed = self.apply(&functions[index]);
        if let Some(last) = flame.final_function() {
            landed &= self.apply(last);
        }
        landed
    }

    fn apply(&mut self, function: &FlameFunction) -> bool {
        let (x, y) = function.pre().apply(self.point.0, self.point.1);
        let (x, y) = self.blend(x, y, function.coeffs());
        let (x, y) = function.post().apply(x, y);

        let color = function.color();
        for (c, f) in self.color.iter_mut().zip(color) {
            *c = (*c + f) / 2.0;
        }

        if x.is_finite() && y.is_finite() {
            self.point = (x, y);
            true
        } else {
            self.point = (self.rng.gen(), self.rng.gen());
            false
        }
    }

    /// Weighted sum of every active variation. Non-finite outputs contribute nothing.
    fn blend(&mut self, x: f64, y: f64, coeffs: &[f64; 6]) -> (f64, f64) {
        if self.active.is_empty() {
            return (x, y);
        }
        let derived = Derived::from_point(x, y);
        let mut total = (0.0, 0.0);
        for (variation, weight) in &self.active {
            let (vx, vy) = variation.apply((x, y), coeffs, &derived, &mut self.rng);
            if vx.is_finite() && vy.is_finite() {
                total.0 += weight * vx;
                total.1 += weight * vy;
            }
        }
        total
    }
}

/// Maps flame space onto accumulator cells for one zoom level.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    zoom: f64,
    width: usize,
    height: usize,
}

impl Viewport {
    fn cell(&self, (x, y): (f64, f64)) -> Option<(usize, usize)> {
        let z = self.zoom;
        if !(-z..=z).contains(&x) || !(-z..=z).contains(&y) {
            return None;
        }
        let w = self.width as f64;
        let h = self.height as f64;
        let gx = (x * w / (2.0 * z) + w / 2.0) as usize;
        let gy = (y * h / (2.0 * z) + h / 2.0) as usize;
        Some((gx, gy))
    }
}

pub struct ChaosGame<'a> {
    flame: &'a Flame,
    config: &'a RenderConfig,
}

impl<'a> ChaosGame<'a> {
    pub fn new(flame: &'a Flame, config: &'a RenderConfig) -> Self {
        Self { flame, config }
    }

    /// Clears `accumulator` and fills it with `request.iterations()` chaos-game steps.
    ///
    /// `progress` receives the number of completed iterations every
    /// `config.progress_interval` steps. The cancel token is polled every
    /// `config.cancel_poll_interval` steps; a cancelled run leaves a partial histogram
    /// that callers must not tone-map.
    pub fn run(
        &self,
        accumulator: &mut Accumulator,
        request: &RenderRequest,
        cancel: &CancelToken,
        progress: &mut dyn FnMut(u64),
    ) -> EngineOutcome {
        accumulator.clear();

        let viewport = Viewport {
            zoom: self.config.zoom_range.real_zoom(request.zoom()),
            width: accumulator.width(),
            height: accumulator.height(),
        };
        let mut walker = Walker::new(self.flame);
        debug!(
            "Chaos game: seed {}, {} functions, {} active variations, {} iterations, zoom {}",
            self.flame.seed(),
            self.flame.functions().len(),
            walker.active.len(),
            request.iterations(),
            viewport.zoom
        );

        for _ in 0..self.config.warmup_iterations {
            walker.step();
        }

        let poll = self.config.cancel_poll_interval;
        let report = self.config.progress_interval;
        let mut deposited = 0u64;
        for i in 0..request.iterations() {
            if i % poll == 0 && cancel.is_cancelled() {
                trace!("Chaos game cancelled after {} iterations", i);
                return EngineOutcome::Cancelled { iterations: i };
            }
            if i > 0 && i % report == 0 {
                progress(i);
            }

            if !walker.step() {
                continue;
            }
            if let Some((x, y)) = viewport.cell(walker.point) {
                if accumulator.deposit(x, y, walker.color) {
                    deposited += 1;
                }
            }
        }

        progress(request.iterations());
        debug!(
            "Chaos game finished: {} of {} points landed in view",
            deposited,
            request.iterations()
        );
        EngineOutcome::Completed {
            iterations: request.iterations(),
        }
    }
}
