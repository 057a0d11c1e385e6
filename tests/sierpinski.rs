use chaosflames::{
    Accumulator, Affine, CancelToken, ChaosGame, Flame, FlameFunction, PixelBuffer, RenderConfig,
    RenderRequest, ToneMapper, VariationWeights,
};
use test_log::test;

const ITERATIONS: u64 = 100_000;

fn config() -> RenderConfig {
    RenderConfig::default().with_display(64, 64).with_zoom_range(1, 1)
}

fn gasket(weights: VariationWeights, seed: u64) -> Flame {
    let corner = |c: f64, f: f64, color: [f64; 3]| {
        FlameFunction::new(
            Affine::from_coeffs([0.5, 0.0, c, 0.0, 0.5, f]),
            Affine::IDENTITY,
            color,
        )
    };
    Flame::new(
        vec![
            corner(0.0, 0.0, [1.0, 0.0, 0.0]),
            corner(0.5, 0.0, [0.0, 1.0, 0.0]),
            corner(0.0, 0.5, [0.0, 0.0, 1.0]),
        ],
        None,
        weights,
        seed,
    )
    .unwrap()
}

fn accumulate(flame: &Flame, config: &RenderConfig) -> Accumulator {
    let (w, h) = config.grid_size();
    let mut acc = Accumulator::new(w, h);
    let request = RenderRequest::full(ITERATIONS, 1, 1.0).unwrap();
    let outcome = ChaosGame::new(flame, config).run(&mut acc, &request, &CancelToken::new(), &mut |_| {});
    assert!(!outcome.is_cancelled());
    acc
}

fn tone_map(acc: &Accumulator, config: &RenderConfig) -> (PixelBuffer, usize) {
    let mapped = ToneMapper::new(config.supersample, config.gamma_convention)
        .render(acc, 1.0, &CancelToken::new())
        .unwrap()
        .unwrap();
    (mapped.pixels, mapped.painted)
}

#[test]
fn gasket_stays_in_the_unit_quadrant() {
    let config = config();
    let acc = accumulate(&gasket(VariationWeights::only(0).unwrap(), 1), &config);
    let (w, h) = (acc.width(), acc.height());
    for y in 0..h {
        for x in 0..w {
            let cell = acc.cell(x, y).unwrap();
            if x < w / 2 || y < h / 2 {
                assert!(!cell.is_touched(), "cell ({}, {}) outside [0,1]² was hit", x, y);
            }
        }
    }

    let (pixels, painted) = tone_map(&acc, &config);
    assert!(painted > 0);
    for y in 0..pixels.height() / 2 {
        for x in 0..pixels.width() {
            assert_eq!(pixels.pixel(x, y), Some([0, 0, 0]));
        }
    }
    for y in pixels.height() / 2..pixels.height() {
        for x in 0..pixels.width() / 2 {
            assert_eq!(pixels.pixel(x, y), Some([0, 0, 0]));
        }
    }
}

#[test]
fn painted_count_is_stable_across_seeds() {
    let config = config();
    let counts: Vec<usize> = (0..5u64)
        .map(|seed| {
            let acc = accumulate(&gasket(VariationWeights::only(0).unwrap(), seed), &config);
            tone_map(&acc, &config).1
        })
        .collect();

    // The quadrant is 32x32 display pixels and the gasket leaves its upper-right half empty.
    for count in &counts {
        assert!(*count > 100 && *count < 32 * 32, "painted {}", count);
    }
    let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
    for count in &counts {
        let deviation = (*count as f64 - mean).abs() / mean;
        assert!(deviation < 0.1, "counts {:?} deviate from mean {}", counts, mean);
    }
}

#[test]
fn all_zero_weights_render_like_linear() {
    let config = config();
    let identity = accumulate(&gasket(VariationWeights::default(), 7), &config);
    let linear = accumulate(&gasket(VariationWeights::only(0).unwrap(), 7), &config);
    assert_eq!(tone_map(&identity, &config), tone_map(&linear, &config));
}

#[test]
fn generated_flames_render_deterministically() {
    let config = RenderConfig::default().with_display(40, 30);
    let flame = Flame::generate(2024);
    let first = tone_map(&accumulate(&flame, &config), &config);
    let second = tone_map(&accumulate(&Flame::generate(2024), &config), &config);
    assert_eq!(first, second);
}
