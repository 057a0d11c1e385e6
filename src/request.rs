use crate::error::{FlameError, Result};
use crate::tone::PixelBuffer;

/// Parameters of one render.
///
/// The epoch is stamped by the orchestrator on submission; requests built by hand carry
/// epoch 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    recalculate: bool,
    iterations: u64,
    zoom: u32,
    gamma: f64,
    epoch: u64,
}

impl RenderRequest {
    pub fn new(recalculate: bool, iterations: u64, zoom: u32, gamma: f64) -> Result<Self> {
        if iterations == 0 {
            return Err(FlameError::ZeroIterations);
        }
        if zoom == 0 {
            return Err(FlameError::ZoomOutOfRange {
                zoom,
                min: 1,
                max: u32::MAX,
            });
        }
        if !gamma.is_finite() || gamma <= 0.0 {
            return Err(FlameError::InvalidGamma(gamma));
        }
        Ok(Self {
            recalculate,
            iterations,
            zoom,
            gamma,
            epoch: 0,
        })
    }

    /// Fresh chaos-game pass followed by tone mapping.
    pub fn full(iterations: u64, zoom: u32, gamma: f64) -> Result<Self> {
        Self::new(true, iterations, zoom, gamma)
    }

    /// Same parameters, tone mapping only (e.g. after a gamma change).
    pub fn tone_only(&self, gamma: f64) -> Result<Self> {
        Self::new(false, self.iterations, self.zoom, gamma)
    }

    pub fn recalculate(&self) -> bool {
        self.recalculate
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    pub(crate) fn promote(mut self) -> Self {
        self.recalculate = true;
        self
    }
}

/// A finished image, handed over by value to whoever receives it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub pixels: PixelBuffer,
    pub pixels_painted: usize,
    pub epoch: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn validates_at_construction() {
        assert_eq!(RenderRequest::full(0, 1, 4.0), Err(FlameError::ZeroIterations));
        assert!(matches!(
            RenderRequest::full(10, 0, 4.0),
            Err(FlameError::ZoomOutOfRange { zoom: 0, .. })
        ));
        assert_eq!(RenderRequest::full(10, 1, 0.0), Err(FlameError::InvalidGamma(0.0)));
        assert!(RenderRequest::full(10, 1, f64::INFINITY).is_err());
    }

    #[test]
    fn tone_only_keeps_pass_parameters() {
        let full = RenderRequest::full(5000, 3, 4.0).unwrap();
        let tone = full.tone_only(2.0).unwrap();
        assert!(!tone.recalculate());
        assert_eq!(tone.iterations(), 5000);
        assert_eq!(tone.zoom(), 3);
        assert_eq!(tone.gamma(), 2.0);
        assert!(tone.promote().recalculate());
    }
}
