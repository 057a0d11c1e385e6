//! Render configuration shared by the engine, tone mapper and orchestrator.

use crate::error::{FlameError, Result};

/// Which way the gamma slider bends the tone curve.
///
/// `Power` raises each channel to `gamma` (the reference behaviour, where larger gamma
/// darkens mid tones). `InversePower` raises to `1 / gamma`, the photographic convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GammaConvention {
    #[default]
    Power,
    InversePower,
}

impl GammaConvention {
    pub fn exponent(self, gamma: f64) -> f64 {
        match self {
            GammaConvention::Power => gamma,
            GammaConvention::InversePower => 1.0 / gamma,
        }
    }
}

/// Inclusive range of zoom slider values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    pub min: u32,
    pub max: u32,
}

impl ZoomRange {
    pub fn contains(&self, zoom: u32) -> bool {
        (self.min..=self.max).contains(&zoom)
    }

    /// Half-width of the visible square in flame space. The slider is inverted, so
    /// `min` gives the widest view.
    pub fn real_zoom(&self, zoom: u32) -> f64 {
        let zoom = zoom.clamp(self.min, self.max);
        f64::from(self.max + self.min - zoom)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub display_width: usize,
    pub display_height: usize,
    /// Accumulator cells per display pixel along each axis.
    pub supersample: usize,
    pub zoom_range: ZoomRange,
    pub gamma_convention: GammaConvention,
    /// Iterations run before accumulation starts on a fresh pass.
    pub warmup_iterations: u64,
    /// Images painting fewer pixels than this count as an empty attractor.
    pub min_painted_pixels: usize,
    pub cancel_poll_interval: u64,
    pub progress_interval: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            display_width: 1024,
            display_height: 768,
            supersample: 3,
            zoom_range: ZoomRange::default(),
            gamma_convention: GammaConvention::default(),
            warmup_iterations: 20,
            min_painted_pixels: 10,
            cancel_poll_interval: 1024,
            progress_interval: 100_000,
        }
    }
}

impl RenderConfig {
    pub fn with_display(mut self, width: usize, height: usize) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    pub fn with_supersample(mut self, supersample: usize) -> Self {
        self.supersample = supersample;
        self
    }

    pub fn with_zoom_range(mut self, min: u32, max: u32) -> Self {
        self.zoom_range = ZoomRange { min, max };
        self
    }

    pub fn with_gamma_convention(mut self, convention: GammaConvention) -> Self {
        self.gamma_convention = convention;
        self
    }

    pub fn with_warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Accumulator dimensions `(W, H)`.
    pub fn grid_size(&self) -> (usize, usize) {
        (
            self.display_width * self.supersample,
            self.display_height * self.supersample,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.display_width == 0 || self.display_height == 0 {
            return Err(FlameError::InvalidConfig(format!(
                "display size {}x{} has a zero dimension",
                self.display_width, self.display_height
            )));
        }
        if self.supersample == 0 {
            return Err(FlameError::InvalidConfig(
                "supersampling factor must be at least 1".to_string(),
            ));
        }
        if self.zoom_range.min == 0 || self.zoom_range.min > self.zoom_range.max {
            return Err(FlameError::InvalidConfig(format!(
                "zoom range {}..={} is empty or starts at zero",
                self.zoom_range.min, self.zoom_range.max
            )));
        }
        if self.cancel_poll_interval == 0 || self.progress_interval == 0 {
            return Err(FlameError::InvalidConfig(
                "poll and progress intervals must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
