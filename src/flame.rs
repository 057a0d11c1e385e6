//! Flame data model: affine functions, shared variation weights and the seed they came from.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_distr::StandardNormal;

use crate::error::{FlameError, Result};
use crate::variation::{Variation, VARIATION_COUNT};

/// Salt mixed into a seed when the bootstrap needs a fresh flame.
const RESEED_SALT: u64 = 0x5DEE_CE66_D1CE_F00D;

/// Six-coefficient map `x' = a·x + b·y + c`, `y' = d·x + e·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    pub fn from_coeffs([a, b, c, d, e, f]: [f64; 6]) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn coeffs(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }
}

/// One function of the iterated system. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FlameFunction {
    pre: Affine,
    post: Affine,
    coeffs: [f64; 6],
    color: [f64; 3],
}

impl FlameFunction {
    /// Color channels are clamped to `[0, 1]`.
    pub fn new(pre: Affine, post: Affine, color: [f64; 3]) -> Self {
        Self {
            pre,
            post,
            coeffs: pre.coeffs(),
            color: color.map(|c| c.clamp(0.0, 1.0)),
        }
    }

    /// Normally distributed coefficients and a uniform color, drawn interleaved.
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut pre = [0.0; 6];
        let mut post = [0.0; 6];
        let mut color = [0.0; 3];
        for j in 0..6 {
            pre[j] = rng.sample(StandardNormal);
            post[j] = rng.sample(StandardNormal);
            if j < color.len() {
                color[j] = rng.gen();
            }
        }
        Self::new(Affine::from_coeffs(pre), Affine::from_coeffs(post), color)
    }

    pub fn pre(&self) -> &Affine {
        &self.pre
    }

    pub fn post(&self) -> &Affine {
        &self.post
    }

    /// Pre-affine coefficients in the layout variations read them.
    pub fn coeffs(&self) -> &[f64; 6] {
        &self.coeffs
    }

    pub fn color(&self) -> [f64; 3] {
        self.color
    }
}

/// Raw per-variation weights, shared by every function of a flame.
///
/// Weights are stored as entered; [`VariationWeights::normalized`] is what the engine
/// blends with.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationWeights {
    raw: [f64; VARIATION_COUNT],
}

impl Default for VariationWeights {
    fn default() -> Self {
        Self {
            raw: [0.0; VARIATION_COUNT],
        }
    }
}

impl VariationWeights {
    pub fn from_raw(raw: [f64; VARIATION_COUNT]) -> Result<Self> {
        if let Some(bad) = raw.iter().copied().find(|w| !w.is_finite() || *w < 0.0) {
            return Err(FlameError::InvalidWeight(bad));
        }
        Ok(Self { raw })
    }

    /// A single variation at full strength.
    pub fn only(index: usize) -> Result<Self> {
        let mut weights = Self::default();
        weights.set(index, 1.0)?;
        Ok(weights)
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.raw.get(index).copied()
    }

    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(FlameError::InvalidWeight(value));
        }
        let slot = self.raw.get_mut(index).ok_or(FlameError::VariationIndex {
            index,
            len: VARIATION_COUNT,
        })?;
        *slot = value;
        Ok(())
    }

    /// Weights scaled so the nonzero ones sum to 1. All zeros stay all zeros.
    pub fn normalized(&self) -> [f64; VARIATION_COUNT] {
        let total: f64 = self.raw.iter().sum();
        if total == 0.0 {
            return self.raw;
        }
        self.raw.map(|w| w / total)
    }

    pub fn is_identity(&self) -> bool {
        self.raw.iter().all(|w| *w == 0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flame {
    functions: Vec<FlameFunction>,
    final_function: Option<FlameFunction>,
    variations: Vec<Variation>,
    weights: VariationWeights,
    seed: u64,
}

impl Flame {
    /// Builds a flame from explicit functions.
    ///
    /// Variation construction parameters are sampled from a stream seeded with `seed`.
    pub fn new(
        functions: Vec<FlameFunction>,
        final_function: Option<FlameFunction>,
        weights: VariationWeights,
        seed: u64,
    ) -> Result<Self> {
        if functions.len() < 2 {
            return Err(FlameError::TooFewFunctions(functions.len()));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let variations = Variation::catalog(&mut rng, &weights.normalized());
        Ok(Self {
            functions,
            final_function,
            variations,
            weights,
            seed,
        })
    }

    /// Random flame: 2 to 11 functions plus a final function, each variation enabled
    /// with probability 0.3.
    pub fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let count = rng.gen_range(2..12);
        let functions = (0..count).map(|_| FlameFunction::random(&mut rng)).collect();
        let final_function = Some(FlameFunction::random(&mut rng));

        let mut raw = [0.0; VARIATION_COUNT];
        for w in raw.iter_mut() {
            if rng.gen::<f64>() < 0.3 {
                *w = rng.gen::<f64>() + 0.1;
            }
        }
        let weights = VariationWeights { raw };
        let variations = Variation::catalog(&mut rng, &weights.normalized());

        Self {
            functions,
            final_function,
            variations,
            weights,
            seed,
        }
    }

    /// Seed for the next attempt when `seed` produced an empty attractor.
    pub fn derive_seed(seed: u64) -> u64 {
        StdRng::seed_from_u64(seed ^ RESEED_SALT).next_u64()
    }

    pub fn functions(&self) -> &[FlameFunction] {
        &self.functions
    }

    pub fn final_function(&self) -> Option<&FlameFunction> {
        self.final_function.as_ref()
    }

    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    pub fn weights(&self) -> &VariationWeights {
        &self.weights
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Edits one weight in place. Functions and variation parameters are untouched.
    ///
    /// RadialBlur, Arch, Rays, Blade, Secant and Twintrian take their `v` from the normalised
    /// weights at construction. Enabling one that started at weight 0 leaves it at `v = 0`, so
    /// it contributes nothing (or a non-finite value that is dropped) while still claiming its
    /// share of the normalised weight, which pulls the blend toward the origin. Regenerate the
    /// flame to resample those parameters.
    pub fn set_variation_weight(&mut self, index: usize, value: f64) -> Result<()> {
        self.weights.set(index, value)
    }

    /// Variations with a nonzero normalised weight, in catalog order.
    pub fn active_variations(&self) -> Vec<(&Variation, f64)> {
        self.variations
            .iter()
            .zip(self.weights.normalized())
            .filter(|(_, w)| *w != 0.0)
            .collect()
    }
}
