use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod cloud;
mod colors;
mod config;
mod detect;
mod error;
mod fonts;
mod heuristics;
mod logos;
mod mask;
mod sources;
mod warnings;

use colors::{Palette, Rgb};
use config::Config;
use mask::MaskBuilder;
use sources::SourceOptions;
use warnings::WarningSink;

/// Shellcloud - render a word cloud of your shell history, masked by your
/// distro logo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output PNG path (default: shellcloud-<timestamp>.png)
    output: Option<PathBuf>,

    /// Canvas width in pixels (default: detected display width, else 1920)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Canvas height in pixels (default: detected display height, else 1080)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Built-in logo name (default: detected distro, else tux)
    #[arg(long)]
    logo: Option<String>,

    /// Mask image path (SVG or raster), overrides --logo
    #[arg(long)]
    mask_file: Option<PathBuf>,

    /// Keep pure-white logo pixels white instead of marking them placeable
    #[arg(long)]
    mask_show_white: bool,

    /// Maximum number of words (default: derived from resolution)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_words: Option<u32>,

    /// Maximum font size in pixels (default: derived from resolution)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    font_size: Option<u32>,

    /// Background color as #RRGGBB
    #[arg(long)]
    bg_color: Option<String>,

    /// Word color as #RRGGBB, repeatable
    #[arg(long = "color")]
    colors: Vec<String>,

    /// Font file to render with (default: system sans-serif)
    #[arg(long)]
    font_file: Option<PathBuf>,

    /// Text file to read words from, repeatable
    #[arg(long = "file")]
    files: Vec<PathBuf>,

    /// Read shell history (the default when no source is selected)
    #[arg(long)]
    history: bool,

    /// Read shell init files (.bashrc, .zshrc, ...)
    #[arg(long)]
    init_files: bool,

    /// Read git commit subjects from a repository
    #[arg(long, num_args = 0..=1, default_missing_value = ".", value_name = "DIR")]
    git_log: Option<PathBuf>,

    /// Seed for deterministic layout
    #[arg(long)]
    seed: Option<u64>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    // Log to stderr so warnings never end up inside redirected output
    let log_level = if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("shellcloud: failed to initialize logging");
    }

    if let Err(e) = run(&args) {
        eprintln!("shellcloud: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_default()?,
    };
    let mut sink = WarningSink::new();

    let (width, height) = resolve_resolution(args, &config, &mut sink);
    info!("rendering at {width}x{height}");

    // Text collection: the empty buffer is the one fatal input condition
    let opts = SourceOptions {
        files: args.files.clone(),
        history: args.history,
        init_files: args.init_files,
        git_log: args.git_log.clone(),
    };
    let text = sources::collect(&opts, &mut sink);
    if text.trim().is_empty() {
        bail!("no usable source text; nothing to render");
    }

    let max_words = args.max_words.unwrap_or_else(|| heuristics::max_words(width, height));
    let font_size = args.font_size.unwrap_or_else(|| heuristics::font_size(height));
    let words = cloud::frequencies(&text, max_words as usize);

    let mask = build_mask(args, &config, width, height, &mut sink)?;
    let font = fonts::load(
        args.font_file
            .as_deref()
            .or(config.style.font_file.as_deref()),
    )?;

    let bg_color = match args.bg_color.as_deref() {
        Some(hex) => Rgb::from_hex(hex)?,
        None => Rgb::from_hex(&config.style.bg_color)?,
    };
    let user_colors = if args.colors.is_empty() {
        &config.style.colors
    } else {
        &args.colors
    };
    let palette = Palette::from_user_colors(user_colors)?;

    let mut builder = cloud::CloudBuilder::new(width, height)
        .mask(mask)
        .palette(palette)
        .bg_color(bg_color)
        .max_font_size(font_size as f32);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let canvas = builder.render(&words, &font)?;

    let output = output_path(args, &config);
    canvas
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("wrote {}", output.display());
    println!("{}", output.display());
    Ok(())
}

fn resolve_resolution(args: &Args, config: &Config, sink: &mut WarningSink) -> (u32, u32) {
    let configured = (
        args.width.or(config.output.width),
        args.height.or(config.output.height),
    );
    if let (Some(w), Some(h)) = configured {
        return (w, h);
    }

    let detected = detect::display_geometry().unwrap_or_else(|| {
        sink.warn_once(
            "display-detect",
            "could not detect display resolution, assuming 1920x1080",
        );
        (1920, 1080)
    });
    (
        configured.0.unwrap_or(detected.0),
        configured.1.unwrap_or(detected.1),
    )
}

fn build_mask(
    args: &Args,
    config: &Config,
    width: u32,
    height: u32,
    sink: &mut WarningSink,
) -> Result<image::RgbaImage> {
    let builder = MaskBuilder::new(width, height).show_white(args.mask_show_white);

    if let Some(path) = &args.mask_file {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read mask file {}", path.display()))?;
        return Ok(builder.build_from_bytes(&bytes)?);
    }

    let name = args
        .logo
        .clone()
        .or_else(|| config.style.logo.clone())
        .unwrap_or_else(|| match detect::distro() {
            Some(id) => logos::for_distro(&id).to_string(),
            None => {
                sink.warn_once(
                    "distro-detect",
                    &format!("could not detect distribution, using {}", logos::DEFAULT),
                );
                logos::DEFAULT.to_string()
            }
        });

    let Some(bytes) = logos::builtin(&name) else {
        bail!(
            "unknown logo '{name}', available: {}",
            logos::names().join(", ")
        );
    };
    info!("using logo '{name}'");
    Ok(builder.build_from_bytes(bytes)?)
}

fn output_path(args: &Args, config: &Config) -> PathBuf {
    if let Some(path) = &args.output {
        return path.clone();
    }
    let name = format!(
        "shellcloud-{}.png",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    match &config.output.directory {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
