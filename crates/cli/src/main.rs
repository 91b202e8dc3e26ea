#![deny(unsafe_code)]
//! CLI binary for the backdrop particle background.
//!
//! Subcommands:
//! - `render`: simulate N frames and write a PNG or SVG snapshot
//! - `stats`: simulate N frames and print particle, shape and link counts
//! - `list`: print shape kinds, glyphs, themes and formats

mod error;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use backdrop_core::shape::GLYPHS;
use backdrop_core::{
    BackdropError, FieldConfig, ParticleField, Shape, Srgb, Theme, Xorshift64, DEFAULT_ACCENT,
};
use backdrop_render::{Format, MAX_SIDE};
use clap::{Args, Parser, Subcommand};
use error::CliError;
use glam::DVec2;
use log::{debug, info};

#[derive(Parser)]
#[command(name = "backdrop", about = "Animated particle background, rendered headless")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by every subcommand that builds a field.
#[derive(Args)]
struct FieldArgs {
    /// Canvas width in pixels.
    #[arg(short = 'W', long, default_value_t = 800.0)]
    width: f64,

    /// Canvas height in pixels.
    #[arg(short = 'H', long, default_value_t = 600.0)]
    height: f64,

    /// Number of animation frames to simulate.
    #[arg(short, long, default_value_t = 120)]
    frames: usize,

    /// PRNG seed for deterministic output.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Accent color, any CSS color syntax; defaults to crimson.
    #[arg(long)]
    accent: Option<String>,

    /// Pointer position held for every frame, as "X,Y".
    #[arg(long)]
    pointer: Option<String>,

    /// Field configuration overrides as a JSON object.
    #[arg(long, default_value = "{}")]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate frames and write a snapshot.
    Render {
        #[command(flatten)]
        field: FieldArgs,

        /// Page theme used for the background.
        #[arg(long, default_value = "light")]
        theme: String,

        /// Snapshot format (png, svg); inferred from the output path if omitted.
        #[arg(long)]
        format: Option<String>,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// Simulate frames and print field statistics.
    Stats {
        #[command(flatten)]
        field: FieldArgs,
    },
    /// List shapes, glyphs, themes and snapshot formats.
    List,
}

/// Parses `"X,Y"` into a point.
fn parse_pointer(raw: &str) -> Result<DVec2, CliError> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| CliError::input("pointer", format!("expected X,Y, got {raw:?}")))?;
    let coord = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CliError::input("pointer", format!("bad coordinate {s:?}")))
    };
    Ok(DVec2::new(coord(x)?, coord(y)?))
}

/// Rejects sizes no snapshot surface can hold, before any particles are built.
fn check_size(width: f64, height: f64) -> Result<(), BackdropError> {
    let fits = |side: f64| side.is_finite() && side <= MAX_SIDE as f64;
    if fits(width) && fits(height) {
        Ok(())
    } else {
        Err(BackdropError::InvalidDimensions {
            width: width as usize,
            height: height as usize,
        })
    }
}

/// Builds the field and advances it by the requested number of frames.
fn simulate(args: &FieldArgs) -> Result<ParticleField, CliError> {
    check_size(args.width, args.height)?;
    let params: serde_json::Value =
        serde_json::from_str(&args.config).map_err(|e| CliError::input("config", e))?;
    let config = FieldConfig::from_json(&params).map_err(|e| CliError::input("config", e))?;
    let accent = match &args.accent {
        Some(raw) => Srgb::from_css(raw).map_err(|e| CliError::input("accent", e))?,
        None => DEFAULT_ACCENT,
    };
    let pointer = args.pointer.as_deref().map(parse_pointer).transpose()?;

    let mut field =
        ParticleField::new(args.width, args.height, accent, config, Xorshift64::new(args.seed))?;
    info!(
        "field {}x{} with {} particles, seed {}",
        field.width(),
        field.height(),
        field.len(),
        args.seed
    );
    if let Some(p) = pointer {
        field.pointer_moved(p);
    }
    for _ in 0..args.frames {
        field.step();
    }
    debug!("simulated {} frames", args.frames);
    Ok(field)
}

/// Count of particles per shape kind. Kinds with no particles count zero.
fn shape_histogram(field: &ParticleField) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> =
        Shape::kinds().into_iter().map(|k| (k, 0)).collect();
    for p in field.particles() {
        *counts.entry(p.shape().kind()).or_default() += 1;
    }
    counts
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let shapes = Shape::kinds();
            let glyphs: String = GLYPHS.iter().collect();
            let themes: Vec<&str> = Theme::all().iter().map(|t| t.as_str()).collect();
            let formats = Format::list_formats();
            if cli.json {
                let info = serde_json::json!({
                    "shapes": shapes,
                    "glyphs": glyphs,
                    "themes": themes,
                    "formats": formats,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Shapes:");
                for name in shapes {
                    println!("  {name}");
                }
                println!("Glyphs:");
                println!("  {glyphs}");
                println!("Themes:");
                println!("  {}", themes.join(", "));
                println!("Formats:");
                println!("  {}", formats.join(", "));
            }
        }
        Command::Stats { field: args } => {
            let field = simulate(&args)?;
            let shapes = shape_histogram(&field);
            let links = field.links().count();
            if cli.json {
                let info = serde_json::json!({
                    "width": field.width(),
                    "height": field.height(),
                    "frames": args.frames,
                    "seed": args.seed,
                    "particles": field.len(),
                    "shapes": shapes,
                    "links": links,
                    "link_threshold": field.link_threshold(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "{}x{} after {} frames: {} particles, {links} links",
                    field.width(),
                    field.height(),
                    args.frames,
                    field.len()
                );
                for (kind, count) in &shapes {
                    println!("  {kind:<9}{count}");
                }
            }
        }
        Command::Render {
            field: args,
            theme,
            format,
            output,
        } => {
            let theme: Theme = theme.parse().map_err(|e| CliError::input("theme", e))?;
            let format = match format {
                Some(name) => Format::from_name(&name).map_err(|e| CliError::input("format", e))?,
                None => Format::from_path(&output).unwrap_or(Format::Png),
            };
            let field = simulate(&args)?;

            backdrop_render::write_snapshot(&field, Some(theme.background()), format, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "width": field.width(),
                    "height": field.height(),
                    "frames": args.frames,
                    "seed": args.seed,
                    "theme": theme.as_str(),
                    "format": format.extension(),
                    "particles": field.len(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} particles ({}x{}, {} frames, seed {}, {theme}) -> {}",
                    field.len(),
                    field.width(),
                    field.height(),
                    args.frames,
                    args.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(width: f64, height: f64) -> FieldArgs {
        FieldArgs {
            width,
            height,
            frames: 3,
            seed: 42,
            accent: None,
            pointer: None,
            config: "{}".into(),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_pointer_accepts_pairs() {
        let p = parse_pointer(" 12.5 , 40").unwrap();
        assert_eq!(p, DVec2::new(12.5, 40.0));
    }

    #[test]
    fn parse_pointer_rejects_garbage() {
        for raw in ["12", "a,b", "1,inf", ""] {
            assert_eq!(parse_pointer(raw).err().map(|e| e.exit_code()), Some(12), "{raw}");
        }
    }

    #[test]
    fn simulate_sizes_field_from_area() {
        let field = simulate(&args(1000.0, 1000.0)).unwrap();
        assert_eq!(field.len(), 100);
    }

    #[test]
    fn simulate_rejects_bad_accent_and_config() {
        let mut a = args(100.0, 100.0);
        a.accent = Some("nope".into());
        assert_eq!(simulate(&a).err().map(|e| e.exit_code()), Some(12));

        let mut a = args(100.0, 100.0);
        a.config = r#"{"density_divisor": 0}"#.into();
        assert_eq!(simulate(&a).err().map(|e| e.exit_code()), Some(12));

        let mut a = args(100.0, 100.0);
        a.config = "{not json".into();
        assert_eq!(simulate(&a).err().map(|e| e.exit_code()), Some(12));
    }

    #[test]
    fn simulate_rejects_oversized_canvas_before_building() {
        let side = (MAX_SIDE * 4) as f64;
        for (w, h) in [(side, 600.0), (800.0, side), (f64::INFINITY, 600.0), (f64::NAN, 1.0)] {
            let err = simulate(&args(w, h)).err();
            assert_eq!(err.as_ref().map(|e| e.exit_code()), Some(10), "{w}x{h}");
            assert!(matches!(
                err,
                Some(CliError::Model(BackdropError::InvalidDimensions { .. }))
            ));
        }
        assert!(simulate(&args(MAX_SIDE as f64, 1.0)).is_ok());
    }

    #[test]
    fn histogram_counts_every_particle() {
        let field = simulate(&args(800.0, 600.0)).unwrap();
        let shapes = shape_histogram(&field);
        assert_eq!(shapes.len(), Shape::kinds().len());
        assert_eq!(shapes.values().sum::<usize>(), field.len());
        // Every fifth particle is a hexagon.
        assert!(shapes["hexagon"] >= 10);
    }
}
