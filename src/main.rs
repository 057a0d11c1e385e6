use std::sync::mpsc::{self, Receiver};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chaosflames::{
    GammaConvention, RenderConfig, RenderEvent, RenderOrchestrator, RenderRequest, RenderResult,
};
use clap::Parser;
use log::info;

/// Render a randomly generated fractal flame in the background and report the result
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Display width in pixels
    #[arg(short, long, default_value = "1024")]
    width: usize,

    /// Display height in pixels
    #[arg(long, default_value = "768")]
    height: usize,

    /// Accumulator cells per display pixel along each axis
    #[arg(short, long, default_value = "3")]
    supersample: usize,

    /// Chaos-game iterations per render
    #[arg(short, long, default_value = "1000000")]
    iterations: u64,

    /// Zoom level, higher values show a smaller region
    #[arg(short, long, default_value = "1")]
    zoom: u32,

    /// Tone-mapping gamma
    #[arg(short, long, default_value = "4.0")]
    gamma: f64,

    /// Re-tone the finished render with this gamma without recalculating
    #[arg(long)]
    regamma: Option<f64>,

    /// Use value^(1/gamma) instead of value^gamma
    #[arg(long)]
    inverse_gamma: bool,

    /// Flame seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Set a variation weight before rendering, as INDEX=VALUE (repeatable)
    #[arg(long = "weight", value_parser = parse_weight)]
    weights: Vec<(usize, f64)>,

    /// Print the variation catalog and exit
    #[arg(long)]
    list_variations: bool,
}

fn parse_weight(arg: &str) -> std::result::Result<(usize, f64), String> {
    let (index, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got '{}'", arg))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("bad variation index '{}': {}", index, e))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("bad weight '{}': {}", value, e))?;
    Ok((index, value))
}

/// Blocks until the render stamped `epoch` arrives, logging progress on the way.
fn wait_for(events: &Receiver<RenderEvent>, epoch: u64) -> Result<RenderResult> {
    let mut last_logged = -1.0f32;
    loop {
        let event = events
            .recv()
            .context("Render worker stopped before delivering a result")?;
        match event {
            RenderEvent::Progress { fraction, message } => {
                if fraction - last_logged >= 0.1 || fraction >= 1.0 {
                    info!("{:>3.0}% {}", fraction * 100.0, message);
                    last_logged = fraction;
                }
            }
            RenderEvent::Completed(result) if result.epoch == epoch => return Ok(result),
            RenderEvent::Completed(result) => {
                info!("Skipping stale render {}", result.epoch);
            }
            RenderEvent::BootstrapDone => {}
        }
    }
}

fn summarize(label: &str, result: &RenderResult) {
    let pixels = &result.pixels;
    let total = pixels.width() * pixels.height();
    let brightest = pixels
        .as_bytes()
        .chunks_exact(3)
        .map(|px| px.iter().map(|c| u32::from(*c)).sum::<u32>())
        .max()
        .unwrap_or(0);
    info!(
        "{}: epoch {}, {}x{}, {} of {} pixels painted ({:.1}%), brightest channel sum {}",
        label,
        result.epoch,
        pixels.width(),
        pixels.height(),
        result.pixels_painted,
        total,
        100.0 * result.pixels_painted as f64 / total.max(1) as f64,
        brightest
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if args.list_variations {
        for (index, label) in chaosflames::variation_labels().iter().enumerate() {
            println!("{:>2} {}", index, label);
        }
        return Ok(());
    }

    let convention = if args.inverse_gamma {
        GammaConvention::InversePower
    } else {
        GammaConvention::Power
    };
    let config = RenderConfig::default()
        .with_display(args.width, args.height)
        .with_supersample(args.supersample)
        .with_gamma_convention(convention);
    config.validate().context("Invalid render configuration")?;

    let request = RenderRequest::full(args.iterations, args.zoom, args.gamma)
        .context("Invalid render request")?;
    if !config.zoom_range.contains(args.zoom) {
        bail!(
            "Zoom {} is outside {}..={}",
            args.zoom,
            config.zoom_range.min,
            config.zoom_range.max
        );
    }

    let (events, receiver) = mpsc::channel();
    let started = Instant::now();
    info!("Bootstrapping flame...");
    let bootstrap = RenderRequest::full(args.iterations, config.zoom_range.min, args.gamma)
        .context("Invalid bootstrap request")?;
    let mut orchestrator = RenderOrchestrator::bootstrap(config, args.seed, bootstrap, events)
        .context("Failed to bootstrap flame")?;
    let first = wait_for(&receiver, 0)?;
    summarize("Bootstrap", &first);
    info!(
        "Flame seed {} with {} functions, bootstrapped in {:.2?}",
        orchestrator.flame().seed(),
        orchestrator.flame().functions().len(),
        started.elapsed()
    );

    for (index, value) in &args.weights {
        orchestrator
            .set_variation_weight(*index, *value)
            .with_context(|| format!("Failed to set weight {} on variation {}", value, index))?;
        info!(
            "Variation {} ({}) weight set to {}",
            index,
            orchestrator.variation_labels()[*index],
            value
        );
    }

    let epoch = orchestrator
        .submit_render(request)
        .context("Failed to submit render")?;
    let result = wait_for(&receiver, epoch)?;
    summarize("Render", &result);

    if let Some(gamma) = args.regamma {
        let retone = request
            .tone_only(gamma)
            .context("Invalid tone-mapping request")?;
        let epoch = orchestrator
            .submit_render(retone)
            .context("Failed to submit tone-only render")?;
        let result = wait_for(&receiver, epoch)?;
        summarize(&format!("Gamma {}", gamma), &result);
    }

    orchestrator.shutdown();
    info!("Done in {:.2?}", started.elapsed());
    Ok(())
}
