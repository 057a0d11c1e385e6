//! Renders the Sierpinski gasket on the calling thread and prints an ASCII preview.

use anyhow::{Context, Result};
use chaosflames::{
    Affine, Accumulator, CancelToken, ChaosGame, Flame, FlameFunction, PixelBuffer, RenderConfig,
    RenderRequest, ToneMapper, VariationWeights,
};
use clap::Parser;
use log::info;

const SHADES: &[u8] = b" .:-=+*#%@";

/// Serial chaos-game render of the Sierpinski gasket
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Preview width in characters
    #[arg(short, long, default_value = "96")]
    width: usize,

    /// Preview height in lines
    #[arg(long, default_value = "48")]
    height: usize,

    /// Chaos-game iterations
    #[arg(short, long, default_value = "200000")]
    iterations: u64,

    /// Tone-mapping gamma
    #[arg(short, long, default_value = "1.0")]
    gamma: f64,

    #[arg(long, default_value = "0")]
    seed: u64,
}

fn sierpinski(seed: u64) -> Result<Flame> {
    let corner = |c: f64, f: f64, color: [f64; 3]| {
        FlameFunction::new(
            Affine::from_coeffs([0.5, 0.0, c, 0.0, 0.5, f]),
            Affine::IDENTITY,
            color,
        )
    };
    let functions = vec![
        corner(0.0, 0.0, [1.0, 0.2, 0.2]),
        corner(0.5, 0.0, [0.2, 1.0, 0.2]),
        corner(0.0, 0.5, [0.2, 0.2, 1.0]),
    ];
    let linear = VariationWeights::only(0)?;
    Ok(Flame::new(functions, None, linear, seed)?)
}

/// Prints the quadrant `[0,1]²` of the image, origin at the bottom left.
fn print_preview(pixels: &PixelBuffer) {
    let (w, h) = (pixels.width(), pixels.height());
    for y in (h / 2..h).rev() {
        let line: String = (w / 2..w)
            .map(|x| {
                let [r, g, b] = pixels.pixel(x, y).unwrap_or_default();
                let level = (usize::from(r) + usize::from(g) + usize::from(b)) / 3;
                SHADES[level * (SHADES.len() - 1) / 255] as char
            })
            .collect();
        println!("{}", line.trim_end());
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // The gasket fills [0,1]², so the preview is a quarter of the rendered image.
    let config = RenderConfig::default()
        .with_display(args.width * 2, args.height * 2)
        .with_zoom_range(1, 1);
    config.validate().context("Invalid preview size")?;
    let flame = sierpinski(args.seed)?;
    let request = RenderRequest::full(args.iterations, 1, args.gamma).context("Invalid request")?;

    let (width, height) = config.grid_size();
    let mut accumulator = Accumulator::new(width, height);
    let never = CancelToken::new();
    let outcome = ChaosGame::new(&flame, &config).run(&mut accumulator, &request, &never, &mut |_| {});
    info!(
        "{} iterations, {} cells touched, {} hits",
        outcome.iterations(),
        accumulator.touched_cells(),
        accumulator.total_hits()
    );

    let mapped = ToneMapper::new(config.supersample, config.gamma_convention)
        .render(&accumulator, request.gamma(), &never)?
        .context("Tone mapping was cancelled")?;
    info!("{} pixels painted", mapped.painted);

    print_preview(&mapped.pixels);
    Ok(())
}
