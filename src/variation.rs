//! The variation catalog: nonlinear point transforms blended after each pre-affine step.
//!
//! Every variation is a closed-form map of the plane. Parameterised variations carry
//! values sampled once when the flame is generated; stochastic variations pull a fixed
//! number of values from the engine's random stream on every call (see
//! [`Variation::draw_count`]), so a seeded run replays exactly.
//!
//! Nothing here guards against singular inputs. A point at the origin sent through
//! `Spherical` produces NaN, and callers are expected to discard non-finite output.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::StandardNormal;

pub const VARIATION_COUNT: usize = 49;

const LABELS: [&str; VARIATION_COUNT] = [
    "Linear",
    "Sinusoidal",
    "Spherical",
    "Swirl",
    "Horseshoe",
    "Polar",
    "Handkerchief",
    "Heart",
    "Disc",
    "Spiral",
    "Hyperbolic",
    "Diamond",
    "Ex",
    "Julia",
    "Bent",
    "Waves",
    "Fisheye",
    "Popcorn",
    "Exponential",
    "Power",
    "Cosine",
    "Rings",
    "Fan",
    "Blob",
    "PDJ",
    "Fan2",
    "Rings2",
    "Eyefish",
    "Bubble",
    "Cylinder",
    "Perspective",
    "Noise",
    "JuliaN",
    "JuliaScope",
    "Blur",
    "Gaussian",
    "RadialBlur",
    "Pie",
    "Ngon",
    "Curl",
    "Rectangles",
    "Arch",
    "Tangent",
    "Square",
    "Rays",
    "Blade",
    "Secant",
    "Twintrian",
    "Cross",
];

/// Variation names in catalog order, as shown next to the weight inputs.
pub fn variation_labels() -> &'static [&'static str] {
    &LABELS
}

/// Per-step values derived from the point after the pre-affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub r: f64,
    pub theta: f64,
    pub phi: f64,
}

impl Derived {
    pub fn from_point(x: f64, y: f64) -> Self {
        Self {
            r: (x * x + y * y).sqrt(),
            theta: (x / y).atan(),
            phi: (y / x).atan(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variation {
    Linear,
    Sinusoidal,
    Spherical,
    Swirl,
    Horseshoe,
    Polar,
    Handkerchief,
    Heart,
    Disc,
    Spiral,
    Hyperbolic,
    Diamond,
    Ex,
    Julia,
    Bent,
    Waves,
    Fisheye,
    Popcorn,
    Exponential,
    Power,
    Cosine,
    Rings,
    Fan,
    Blob { high: f64, low: f64, waves: f64 },
    Pdj { a: f64, b: f64, c: f64, d: f64 },
    /// `span` is already `π·x²` of the sampled `x`.
    Fan2 { span: f64, offset: f64 },
    /// `spacing` is the square of the sampled value.
    Rings2 { spacing: f64 },
    Eyefish,
    Bubble,
    Cylinder,
    Perspective { angle: f64, dist: f64 },
    Noise,
    JuliaN { power: f64, dist: f64 },
    JuliaScope { power: f64, dist: f64 },
    Blur,
    Gaussian,
    /// `angle` is already scaled by `π/2`.
    RadialBlur { angle: f64, v: f64 },
    Pie { slices: f64, rotation: f64, thickness: f64 },
    /// `sector` is `2π / sides`.
    Ngon { power: f64, sector: f64, corners: f64, circle: f64 },
    Curl { c1: f64, c2: f64 },
    Rectangles { x: f64, y: f64 },
    Arch { v: f64 },
    Tangent,
    Square,
    Rays { v: f64 },
    Blade { v: f64 },
    Secant { v: f64 },
    Twintrian { v: f64 },
    Cross,
}

fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

impl Variation {
    /// Builds the full catalog in index order.
    ///
    /// Construction parameters are drawn from `rng` in catalog order. Variations whose
    /// strength is their own weight (RadialBlur, Arch, Rays, Blade, Secant, Twintrian)
    /// read it from `weights`, which must already be normalised.
    pub fn catalog<R: Rng + ?Sized>(rng: &mut R, weights: &[f64; VARIATION_COUNT]) -> Vec<Variation> {
        use Variation::*;

        let mut catalog = vec![
            Linear,
            Sinusoidal,
            Spherical,
            Swirl,
            Horseshoe,
            Polar,
            Handkerchief,
            Heart,
            Disc,
            Spiral,
            Hyperbolic,
            Diamond,
            Ex,
            Julia,
            Bent,
            Waves,
            Fisheye,
            Popcorn,
            Exponential,
            Power,
            Cosine,
            Rings,
            Fan,
        ];
        catalog.push(Blob {
            high: rng.gen(),
            low: rng.gen(),
            waves: rng.gen(),
        });
        catalog.push(Pdj {
            a: rng.gen(),
            b: rng.gen(),
            c: rng.gen(),
            d: rng.gen(),
        });
        let fan_x: f64 = rng.gen();
        catalog.push(Fan2 {
            span: PI * fan_x * fan_x,
            offset: rng.gen(),
        });
        let ring: f64 = rng.gen();
        catalog.push(Rings2 { spacing: ring * ring });
        catalog.extend([Eyefish, Bubble, Cylinder]);
        catalog.push(Perspective {
            angle: rng.gen::<f64>() * PI * 2.0,
            dist: gaussian(rng),
        });
        catalog.push(Noise);
        catalog.push(JuliaN {
            power: gaussian(rng),
            dist: gaussian(rng),
        });
        catalog.push(JuliaScope {
            power: gaussian(rng),
            dist: gaussian(rng),
        });
        catalog.extend([Blur, Gaussian]);
        let blur_angle = rng.gen::<f64>() * PI * 2.0;
        catalog.push(RadialBlur {
            angle: blur_angle * PI / 2.0,
            v: weights[36],
        });
        catalog.push(Pie {
            slices: f64::from(rng.gen_range(0..10u32)),
            rotation: rng.gen::<f64>() * PI * 2.0,
            thickness: rng.gen(),
        });
        catalog.push(Ngon {
            power: rng.gen::<f64>() * 5.0,
            sector: 2.0 * PI / f64::from(rng.gen_range(0..10u32)),
            corners: f64::from(rng.gen_range(0..12u32)),
            circle: gaussian(rng),
        });
        catalog.push(Curl {
            c1: gaussian(rng),
            c2: gaussian(rng),
        });
        catalog.push(Rectangles {
            x: gaussian(rng),
            y: gaussian(rng),
        });
        catalog.push(Arch { v: weights[41] });
        catalog.extend([Tangent, Square]);
        catalog.push(Rays { v: weights[44] });
        catalog.push(Blade { v: weights[45] });
        catalog.push(Secant { v: weights[46] });
        catalog.push(Twintrian { v: weights[47] });
        catalog.push(Cross);

        debug_assert_eq!(catalog.len(), VARIATION_COUNT);
        catalog
    }

    /// Position of this variation in the catalog.
    pub fn index(&self) -> usize {
        use Variation::*;
        match self {
            Linear => 0,
            Sinusoidal => 1,
            Spherical => 2,
            Swirl => 3,
            Horseshoe => 4,
            Polar => 5,
            Handkerchief => 6,
            Heart => 7,
            Disc => 8,
            Spiral => 9,
            Hyperbolic => 10,
            Diamond => 11,
            Ex => 12,
            Julia => 13,
            Bent => 14,
            Waves => 15,
            Fisheye => 16,
            Popcorn => 17,
            Exponential => 18,
            Power => 19,
            Cosine => 20,
            Rings => 21,
            Fan => 22,
            Blob { .. } => 23,
            Pdj { .. } => 24,
            Fan2 { .. } => 25,
            Rings2 { .. } => 26,
            Eyefish => 27,
            Bubble => 28,
            Cylinder => 29,
            Perspective { .. } => 30,
            Noise => 31,
            JuliaN { .. } => 32,
            JuliaScope { .. } => 33,
            Blur => 34,
            Gaussian => 35,
            RadialBlur { .. } => 36,
            Pie { .. } => 37,
            Ngon { .. } => 38,
            Curl { .. } => 39,
            Rectangles { .. } => 40,
            Arch { .. } => 41,
            Tangent => 42,
            Square => 43,
            Rays { .. } => 44,
            Blade { .. } => 45,
            Secant { .. } => 46,
            Twintrian { .. } => 47,
            Cross => 48,
        }
    }

    pub fn name(&self) -> &'static str {
        LABELS[self.index()]
    }

    /// Number of values taken from the random stream by one call to [`Variation::apply`].
    pub fn draw_count(&self) -> usize {
        use Variation::*;
        match self {
            Julia | JuliaN { .. } | Arch { .. } | Rays { .. } | Blade { .. } | Twintrian { .. } => 1,
            Noise | JuliaScope { .. } | Blur | Square => 2,
            Pie { .. } => 3,
            RadialBlur { .. } => 4,
            Gaussian => 5,
            _ => 0,
        }
    }

    /// Maps `(x, y)` through this variation.
    ///
    /// `coeffs` are the pre-affine coefficients `[a, b, c, d, e, f]` of the function being
    /// applied; Waves, Popcorn, Rings and Fan read them.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        (x, y): (f64, f64),
        coeffs: &[f64; 6],
        derived: &Derived,
        rng: &mut R,
    ) -> (f64, f64) {
        let Derived { r, theta, phi } = *derived;
        let [_, cb, cc, _, ce, cf] = *coeffs;

        match *self {
            Variation::Linear => (x, y),
            Variation::Sinusoidal => (x.sin(), y.sin()),
            Variation::Spherical => {
                let r2 = r * r;
                (x / r2, y / r2)
            }
            Variation::Swirl => {
                let (s, c) = (r * r).sin_cos();
                (x * s - y * c, x * c + y * s)
            }
            Variation::Horseshoe => ((x - y) * (x + y) / r, 2.0 * x * y / r),
            Variation::Polar => (theta / PI, r - 1.0),
            Variation::Handkerchief => (r * (theta + r).sin(), r * (theta - r).cos()),
            Variation::Heart => (r * (theta * r).sin(), -r * (theta * r).cos()),
            Variation::Disc => {
                let t = theta / PI;
                (t * (PI * r).sin(), t * (PI * r).cos())
            }
            Variation::Spiral => ((theta.cos() + r.sin()) / r, (theta.sin() - r.cos()) / r),
            Variation::Hyperbolic => (theta.sin() / r, r * theta.cos()),
            Variation::Diamond => (theta.sin() * r.cos(), theta.cos() * r.sin()),
            Variation::Ex => {
                let p0 = (theta + r).sin().powi(3);
                let p1 = (theta - r).cos().powi(3);
                (r * (p0 + p1), r * (p0 - p1))
            }
            Variation::Julia => {
                let omega = if rng.gen::<bool>() { 0.0 } else { PI };
                let angle = theta / 2.0 + omega;
                let s = r.sqrt();
                (s * angle.cos(), s * angle.sin())
            }
            Variation::Bent => match (x >= 0.0, y >= 0.0) {
                (true, true) => (x, y),
                (false, true) => (2.0 * x, y),
                (true, false) => (x, y / 2.0),
                (false, false) => (2.0 * x, y / 2.0),
            },
            Variation::Waves => (
                x + cb * (y / (cc * cc)).sin(),
                y + ce * (x / (cf * cf)).sin(),
            ),
            Variation::Fisheye => {
                let k = 2.0 / (r + 1.0);
                (k * y, k * x)
            }
            Variation::Popcorn => (
                x + cc * (3.0 * y).tan().sin(),
                y + cf * (3.0 * x).tan().sin(),
            ),
            Variation::Exponential => {
                let k = (x - 1.0).exp();
                (k * (PI * y).cos(), k * (PI * y).sin())
            }
            Variation::Power => {
                let k = r.powf(theta.sin());
                (k * theta.cos(), k * theta.sin())
            }
            Variation::Cosine => ((PI * x).cos() * y.cosh(), -(PI * x).sin() * y.sinh()),
            Variation::Rings => {
                let c2 = cc * cc;
                let k = ((r + c2) % (2.0 * c2)) - c2 + r * (1.0 - c2);
                (k * theta.cos(), k * theta.sin())
            }
            Variation::Fan => {
                let t = PI * cc * cc;
                let half = t / 2.0;
                let angle = if (theta + cf) % t > half {
                    theta - half
                } else {
                    theta + half
                };
                (r * angle.cos(), r * angle.sin())
            }
            Variation::Blob { high, low, waves } => {
                let k = r * (low + (high - low) / 2.0 * ((waves * theta).sin() + 1.0));
                (k * theta.cos(), k * theta.sin())
            }
            Variation::Pdj { a, b, c, d } => (
                (a * y).sin() - (b * x).cos(),
                (c * x).sin() - (d * y).cos(),
            ),
            Variation::Fan2 { span, offset } => {
                let t = theta + offset - span * (2.0 * theta * offset / span).trunc();
                let half = span / 2.0;
                let angle = if t > half { theta - half } else { theta + half };
                (r * angle.sin(), r * angle.cos())
            }
            Variation::Rings2 { spacing } => {
                let p = spacing;
                let t = r - 2.0 * p * ((r + p) / (2.0 * p)).trunc() + r * (1.0 - p);
                (t * theta.sin(), t * theta.cos())
            }
            Variation::Eyefish => {
                let k = 2.0 / (r + 1.0);
                (k * x, k * y)
            }
            Variation::Bubble => {
                let k = 4.0 / (r * r + 4.0);
                (k * x, k * y)
            }
            Variation::Cylinder => (x.sin(), y),
            Variation::Perspective { angle, dist } => {
                let k = dist / (dist - y * angle.sin());
                (k * x, k * y * angle.cos())
            }
            Variation::Noise => {
                let psi1: f64 = rng.gen();
                let psi2: f64 = rng.gen();
                let (s, c) = (2.0 * PI * psi2).sin_cos();
                (psi1 * x * c, psi1 * y * s)
            }
            Variation::JuliaN { power, dist } => {
                let p3 = (power.abs() * rng.gen::<f64>()).trunc();
                let t = (phi + 2.0 * PI * p3) / power;
                let k = r.powf(dist / power);
                (k * t.cos(), k * t.sin())
            }
            Variation::JuliaScope { power, dist } => {
                let p3 = (power.abs() * rng.gen::<f64>()).trunc();
                let lambda = if rng.gen::<bool>() { 1.0 } else { -1.0 };
                let t = (lambda * phi + 2.0 * PI * p3) / power;
                let k = r.powf(dist / power);
                (k * t.cos(), k * t.sin())
            }
            Variation::Blur => {
                let psi1: f64 = rng.gen();
                let psi2: f64 = rng.gen();
                let (s, c) = (2.0 * PI * psi2).sin_cos();
                (psi1 * c, psi1 * s)
            }
            Variation::Gaussian => {
                let spread: f64 = (0..4).map(|_| rng.gen::<f64>()).sum::<f64>() - 2.0;
                let psi5: f64 = rng.gen();
                let (s, c) = (2.0 * PI * psi5).sin_cos();
                (spread * c, spread * s)
            }
            Variation::RadialBlur { angle, v } => {
                let t1 = v * ((0..4).map(|_| rng.gen::<f64>()).sum::<f64>() - 2.0);
                let t2 = phi + t1 * angle.sin();
                let t3 = t1 * angle.cos() - 1.0;
                let k = 1.0 / v;
                (k * (r * t2.cos() + t3 * x), k * (r * t2.sin() + t3 * y))
            }
            Variation::Pie {
                slices,
                rotation,
                thickness,
            } => {
                let t1 = (rng.gen::<f64>() * slices + 0.5).trunc();
                let t2 = rotation + (2.0 * PI / slices) * (t1 + rng.gen::<f64>() * thickness);
                let psi3: f64 = rng.gen();
                (psi3 * t2.cos(), psi3 * t2.sin())
            }
            Variation::Ngon {
                power,
                sector,
                corners,
                circle,
            } => {
                let t3 = phi - sector * (phi / sector).floor();
                let t4 = if t3 > sector / 2.0 { t3 } else { t3 - sector };
                let k = (corners * (1.0 / t4.cos() - 1.0) + circle) / r.powf(power);
                (k * x, k * y)
            }
            Variation::Curl { c1, c2 } => {
                let t1 = 1.0 + c1 * x + c2 * (x * x - y * y);
                let t2 = c1 * y + 2.0 * c2 * x * y;
                let k = 1.0 / (t1 * t1 + t2 * t2);
                (k * (x * t1 + y * t2), k * (y * t1 - x * t2))
            }
            Variation::Rectangles { x: rx, y: ry } => (
                (2.0 * (x / rx).floor() + 1.0) * rx - x,
                (2.0 * (y / ry).floor() + 1.0) * ry - y,
            ),
            Variation::Arch { v } => {
                let (s, c) = (rng.gen::<f64>() * PI * v).sin_cos();
                (s, s * s / c)
            }
            Variation::Tangent => (x.sin() / y.cos(), y.tan()),
            Variation::Square => (rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5),
            Variation::Rays { v } => {
                let k = v * (rng.gen::<f64>() * PI * v).tan() / (r * r);
                (k * x.cos(), k * y.sin())
            }
            Variation::Blade { v } => {
                let (s, c) = (rng.gen::<f64>() * r * v).sin_cos();
                (x * (c + s), x * (c - s))
            }
            Variation::Secant { v } => (x, 1.0 / (v * (v * r).cos())),
            Variation::Twintrian { v } => {
                let (s, c) = (rng.gen::<f64>() * r * v).sin_cos();
                let t = (s * s).log10() + c;
                (x * t, x * (t - PI * s))
            }
            Variation::Cross => {
                let d = x * x - y * y;
                let k = (1.0 / (d * d)).sqrt();
                (k * x, k * y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use test_log::test;

    const EPS: f64 = 1e-12;
    const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    /// Wraps a seeded stream and counts how many primitive draws were taken.
    struct CountingRng {
        inner: StdRng,
        draws: usize,
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }

        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            self.inner.next_u64()
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.draws += 1;
            self.inner.fill_bytes(dest)
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.draws += 1;
            self.inner.try_fill_bytes(dest)
        }
    }

    fn sample_catalog() -> Vec<Variation> {
        let mut weights = [0.0; VARIATION_COUNT];
        for (i, w) in weights.iter_mut().enumerate() {
            *w = (i as f64 + 1.0) / 1225.0;
        }
        Variation::catalog(&mut StdRng::seed_from_u64(99), &weights)
    }

    fn apply(v: &Variation, x: f64, y: f64) -> (f64, f64) {
        let derived = Derived::from_point(x, y);
        v.apply((x, y), &IDENTITY, &derived, &mut StdRng::seed_from_u64(1))
    }

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < EPS && (actual.1 - expected.1).abs() < EPS,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn catalog_is_complete_and_ordered() {
        let catalog = sample_catalog();
        assert_eq!(catalog.len(), VARIATION_COUNT);
        for (i, v) in catalog.iter().enumerate() {
            assert_eq!(v.index(), i);
            assert_eq!(v.name(), variation_labels()[i]);
        }
        assert_eq!(variation_labels()[0], "Linear");
        assert_eq!(variation_labels()[48], "Cross");
    }

    #[test]
    fn weight_scaled_parameters_come_from_weights() {
        let catalog = sample_catalog();
        assert_eq!(catalog[41], Variation::Arch { v: 42.0 / 1225.0 });
        assert_eq!(catalog[46], Variation::Secant { v: 47.0 / 1225.0 });
    }

    #[test]
    fn draw_counts_match_actual_consumption() {
        for v in sample_catalog() {
            let mut rng = CountingRng {
                inner: StdRng::seed_from_u64(3),
                draws: 0,
            };
            let derived = Derived::from_point(0.3, -0.7);
            v.apply((0.3, -0.7), &[0.4, 0.2, 0.9, -0.3, 0.8, 0.6], &derived, &mut rng);
            assert_eq!(rng.draws, v.draw_count(), "{} drew {} values", v.name(), rng.draws);
        }
    }

    #[test]
    fn same_inputs_same_draws_same_output() {
        for v in sample_catalog() {
            let derived = Derived::from_point(0.25, 0.5);
            let a = v.apply((0.25, 0.5), &IDENTITY, &derived, &mut StdRng::seed_from_u64(11));
            let b = v.apply((0.25, 0.5), &IDENTITY, &derived, &mut StdRng::seed_from_u64(11));
            assert_eq!(a.0.to_bits(), b.0.to_bits(), "{}", v.name());
            assert_eq!(a.1.to_bits(), b.1.to_bits(), "{}", v.name());
        }
    }

    #[test]
    fn derived_values() {
        let d = Derived::from_point(3.0, 4.0);
        assert!((d.r - 5.0).abs() < EPS);
        assert!((d.theta - (0.75f64).atan()).abs() < EPS);
        assert!((d.phi - (4.0f64 / 3.0).atan()).abs() < EPS);
    }

    #[test]
    fn simple_closed_forms() {
        assert_close(apply(&Variation::Linear, 0.3, -0.2), (0.3, -0.2));
        assert_close(apply(&Variation::Sinusoidal, PI / 2.0, 0.0), (1.0, 0.0));
        assert_close(apply(&Variation::Spherical, 1.0, 1.0), (0.5, 0.5));
        assert_close(apply(&Variation::Cylinder, PI / 2.0, 0.7), (1.0, 0.7));
        assert_close(apply(&Variation::Exponential, 1.0, 0.0), (1.0, 0.0));
        assert_close(apply(&Variation::Cosine, 0.0, 0.0), (1.0, 0.0));
        assert_close(apply(&Variation::Eyefish, 3.0, 4.0), (1.0, 4.0 / 3.0));
        assert_close(apply(&Variation::Fisheye, 3.0, 4.0), (4.0 / 3.0, 1.0));
        assert_close(apply(&Variation::Bubble, 0.0, 2.0), (0.0, 1.0));
        assert_close(apply(&Variation::Tangent, 0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn horseshoe_and_swirl() {
        let (x, y): (f64, f64) = (3.0, 4.0);
        assert_close(apply(&Variation::Horseshoe, x, y), ((9.0 - 16.0) / 5.0, 24.0 / 5.0));

        let r2 = x * x + y * y;
        let expected = (
            x * r2.sin() - y * r2.cos(),
            x * r2.cos() + y * r2.sin(),
        );
        assert_close(apply(&Variation::Swirl, x, y), expected);
    }

    #[test]
    fn polar_uses_theta_over_pi() {
        // theta = atan(x / y) = atan(1) = π/4
        assert_close(apply(&Variation::Polar, 1.0, 1.0), (0.25, 2f64.sqrt() - 1.0));
    }

    #[test]
    fn bent_scales_by_quadrant() {
        assert_close(apply(&Variation::Bent, 1.0, 1.0), (1.0, 1.0));
        assert_close(apply(&Variation::Bent, -1.0, 1.0), (-2.0, 1.0));
        assert_close(apply(&Variation::Bent, 1.0, -1.0), (1.0, -0.5));
        assert_close(apply(&Variation::Bent, -1.0, -1.0), (-2.0, -0.5));
    }

    #[test]
    fn popcorn_reads_affine_coefficients() {
        let coeffs = [0.0, 0.0, 0.5, 0.0, 0.0, -0.25];
        let derived = Derived::from_point(0.1, 0.2);
        let out = Variation::Popcorn.apply((0.1, 0.2), &coeffs, &derived, &mut StdRng::seed_from_u64(0));
        let expected = (
            0.1 + 0.5 * (0.6f64).tan().sin(),
            0.2 - 0.25 * (0.3f64).tan().sin(),
        );
        assert_close(out, expected);
    }

    #[test]
    fn square_stays_in_unit_box() {
        let mut rng = StdRng::seed_from_u64(5);
        let derived = Derived::from_point(10.0, 10.0);
        for _ in 0..1000 {
            let (x, y) = Variation::Square.apply((10.0, 10.0), &IDENTITY, &derived, &mut rng);
            assert!((-0.5..0.5).contains(&x));
            assert!((-0.5..0.5).contains(&y));
        }
    }

    #[test]
    fn julia_lands_on_one_of_two_branches() {
        let derived = Derived::from_point(0.0, 4.0);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            let (x, y) = Variation::Julia.apply((0.0, 4.0), &IDENTITY, &derived, &mut rng);
            assert!((x.abs() - 2.0).abs() < EPS);
            assert!(y.abs() < EPS);
        }
    }

    #[test]
    fn singular_points_are_not_special_cased() {
        let (x, y) = apply(&Variation::Spherical, 0.0, 0.0);
        assert!(x.is_nan() && y.is_nan());
        let (x, _) = apply(&Variation::Cross, 1.0, 1.0);
        assert!(!x.is_finite());
    }
}
