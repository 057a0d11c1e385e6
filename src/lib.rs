//! Fractal flame rendering via the chaos game.
//!
//! A [`Flame`] is iterated by the [`ChaosGame`] into a supersampled [`Accumulator`], which the
//! [`ToneMapper`] turns into an RGB [`PixelBuffer`]. [`RenderOrchestrator`] runs that pipeline
//! on a background worker and cancels superseded renders.

pub mod accumulator;
pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod flame;
pub mod orchestrator;
pub mod request;
pub mod tone;
pub mod variation;

pub use accumulator::{Accumulator, Cell};
pub use cancel::CancelToken;
pub use config::{GammaConvention, RenderConfig, ZoomRange};
pub use engine::{ChaosGame, EngineOutcome};
pub use error::{FlameError, Result};
pub use flame::{Affine, Flame, FlameFunction, VariationWeights};
pub use orchestrator::{RenderEvent, RenderListener, RenderOrchestrator, RenderState};
pub use request::{RenderRequest, RenderResult};
pub use tone::{PixelBuffer, ToneMapped, ToneMapper};
pub use variation::{variation_labels, Derived, Variation, VARIATION_COUNT};
