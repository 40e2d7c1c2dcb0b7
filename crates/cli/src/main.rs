#![deny(unsafe_code)]
//! CLI binary for the Lichtenberg figure generator.
//!
//! Subcommands:
//! - `render` grows a figure to completion and writes a PNG, optionally
//!   also the drawn lines as JSON (`--segments`)
//! - `schema` prints the growth and style parameters

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use lichtenberg_core::{GridPos, RunSeed, Srgb};
use lichtenberg_growth::{GrowthConfig, RunState};
use lichtenberg_render::{RasterSurface, RecordingSurface, Renderer, StrokeStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lichtenberg", about = "Lichtenberg figure generator")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grow a figure to completion and write it as a PNG.
    Render {
        /// Domain width in cells.
        #[arg(short = 'W', long, default_value_t = 256)]
        width: usize,

        /// Domain height in cells.
        #[arg(short = 'H', long, default_value_t = 256)]
        height: usize,

        /// Seed column (defaults to the horizontal centre).
        #[arg(long)]
        seed_x: Option<usize>,

        /// Seed row.
        #[arg(long, default_value_t = 0)]
        seed_y: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pixels per grid cell.
        #[arg(long, default_value_t = 2)]
        scale: u32,

        /// Output file path.
        #[arg(short, long, default_value = "lichtenberg.png")]
        output: PathBuf,

        /// Growth parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Stroke style as a JSON string.
        #[arg(long, default_value = "{}")]
        style: String,

        /// Regrow a run saved with --save-run (ignores size, seed and JSON flags).
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Save the fully resolved run description as JSON.
        #[arg(long)]
        save_run: Option<PathBuf>,

        /// Also write every drawn line as JSON (`from`, `to`, `width`).
        #[arg(long)]
        segments: Option<PathBuf>,

        /// Underlay the potential field.
        #[arg(long)]
        show_field: bool,
    },
    /// Print every growth and style parameter with its default.
    Schema,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_json(raw: &str, flag: &'static str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::Params { flag, source })
}

fn write_file(path: &Path, contents: String) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

fn load_run(path: &Path) -> Result<RunSeed, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::RunFile {
        path: path.to_path_buf(),
        source,
    })
}

fn save_run(path: &Path, run: &RunSeed) -> Result<(), CliError> {
    write_file(path, serde_json::to_string_pretty(run)?)
}

/// Redraws the finished tree into a recording and writes its lines.
fn save_segments(path: &Path, growth: &RunState, style: &StrokeStyle) -> Result<usize, CliError> {
    let mut recording = RecordingSurface::default();
    let drawn = Renderer::new(*style).render(&mut recording, growth.segments());
    write_file(path, serde_json::to_string_pretty(&recording.to_json())?)?;
    Ok(drawn)
}

fn print_schema(json: bool) -> Result<(), CliError> {
    let schema = serde_json::json!({
        "growth": GrowthConfig::param_schema(),
        "style": StrokeStyle::param_schema(),
    });
    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }
    for section in ["growth", "style"] {
        println!("{section} (--{}):", if section == "growth" { "params" } else { "style" });
        if let Some(entries) = schema[section].as_object() {
            for (key, entry) in entries {
                println!(
                    "  {key:<22} {:<8} default {:<10} {}",
                    entry["type"].as_str().unwrap_or("?"),
                    entry["default"].to_string(),
                    entry["description"].as_str().unwrap_or(""),
                );
            }
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Schema => print_schema(cli.json)?,
        Command::Render {
            width,
            height,
            seed_x,
            seed_y,
            seed,
            scale,
            output,
            params,
            style,
            replay,
            save_run: save_path,
            segments: segments_path,
            show_field,
        } => {
            let run_seed = match &replay {
                Some(path) => load_run(path)?,
                None => {
                    let position = GridPos::new(seed_x.unwrap_or(width / 2), seed_y);
                    let mut run_seed = RunSeed::new(width, height, position, seed);
                    run_seed.params = parse_json(&params, "--params")?;
                    run_seed.style = parse_json(&style, "--style")?;
                    run_seed
                }
            };

            let domain = run_seed.domain()?;
            let config = GrowthConfig::from_json(run_seed.random_seed, &run_seed.params)?;
            let style = StrokeStyle::from_json(&run_seed.style)?;

            let mut growth = RunState::start(domain, run_seed.seed_position(), config)?;
            let mut surface = RasterSurface::new(domain, scale)?;
            if show_field {
                surface.paint_field(&growth.field(), Srgb::WHITE);
            }
            let mut renderer = Renderer::new(style);
            let mut frames = 0_usize;
            while !growth.is_terminated() {
                let batch = growth.step()?;
                renderer.render(&mut surface, batch);
                frames += 1;
            }
            let termination = growth.termination();
            tracing::info!(
                nodes = growth.node_count(),
                segments = renderer.drawn(),
                frames,
                "figure complete"
            );

            surface.write_png(&output)?;

            if let Some(path) = &segments_path {
                let lines = save_segments(path, &growth, renderer.style())?;
                tracing::debug!(lines, path = %path.display(), "segments written");
            }

            if let Some(path) = &save_path {
                let resolved = RunSeed {
                    params: config.params(),
                    style: style.params(),
                    random_seed: config.random_seed,
                    ..run_seed.clone()
                };
                save_run(path, &resolved)?;
            }

            let status = termination.map(|t| t.to_string()).unwrap_or_default();
            if cli.json {
                let info = serde_json::json!({
                    "width": run_seed.width,
                    "height": run_seed.height,
                    "seed_x": run_seed.seed_x,
                    "seed_y": run_seed.seed_y,
                    "random_seed": config.random_seed,
                    "nodes": growth.node_count(),
                    "segments": renderer.drawn(),
                    "frames": frames,
                    "termination": status,
                    "output": output.display().to_string(),
                    "run_file": save_path.as_ref().map(|p| p.display().to_string()),
                    "segments_file": segments_path.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "grew {} nodes ({status}) on {}x{} from ({}, {}), seed {} -> {}",
                    growth.node_count(),
                    run_seed.width,
                    run_seed.height,
                    run_seed.seed_x,
                    run_seed.seed_y,
                    config.random_seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
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

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn render_flags_parse() {
        let cli = Cli::try_parse_from([
            "lichtenberg",
            "render",
            "-W",
            "100",
            "-H",
            "80",
            "--seed-x",
            "50",
            "--seed",
            "43",
            "--show-field",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Render {
                width,
                height,
                seed_x,
                seed,
                show_field,
                ..
            } => {
                assert_eq!((width, height, seed_x, seed), (100, 80, Some(50), 43));
                assert!(show_field);
            }
            Command::Schema => panic!("parsed as schema"),
        }
    }

    #[test]
    fn bad_params_json_is_input_error() {
        let err = parse_json("{nope", "--params").unwrap_err();
        assert!(matches!(err, CliError::Params { flag: "--params", .. }));
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn render_writes_png_and_replayable_run() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("a.png");
        let run_file = dir.path().join("run.json");
        let cli = Cli::try_parse_from([
            "lichtenberg",
            "render",
            "-W",
            "40",
            "-H",
            "40",
            "--params",
            r#"{"max_nodes": 120}"#,
            "-o",
            png.to_str().unwrap(),
            "--save-run",
            run_file.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).unwrap();
        assert!(png.exists());

        let saved = load_run(&run_file).unwrap();
        assert_eq!(saved.params["max_nodes"], 120);
        assert_eq!((saved.seed_x, saved.seed_y), (20, 0));

        let replayed = dir.path().join("b.png");
        let cli = Cli::try_parse_from([
            "lichtenberg",
            "render",
            "--replay",
            run_file.to_str().unwrap(),
            "-o",
            replayed.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).unwrap();
        assert_eq!(std::fs::read(&png).unwrap(), std::fs::read(&replayed).unwrap());
    }

    #[test]
    fn seed_outside_domain_is_generation_error() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "lichtenberg",
            "render",
            "-W",
            "10",
            "-H",
            "10",
            "--seed-y",
            "10",
            "-o",
            dir.path().join("x.png").to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(run(cli).unwrap_err().exit_code(), 10);
    }

    #[test]
    fn missing_replay_file_is_io_error() {
        let cli = Cli::try_parse_from([
            "lichtenberg",
            "render",
            "--replay",
            "/nonexistent/run.json",
        ])
        .unwrap();
        assert_eq!(run(cli).unwrap_err().exit_code(), 11);
    }

    #[test]
    fn malformed_replay_file_is_run_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let run_file = dir.path().join("run.json");
        std::fs::write(&run_file, r#"{"width": "wide"}"#).unwrap();
        let cli = Cli::try_parse_from([
            "lichtenberg",
            "render",
            "--replay",
            run_file.to_str().unwrap(),
            "-o",
            dir.path().join("x.png").to_str().unwrap(),
        ])
        .unwrap();
        let err = run(cli).unwrap_err();
        assert!(matches!(&err, CliError::RunFile { path, .. } if path == &run_file));
        assert_eq!(err.exit_code(), 14);
        assert!(format!("{err:?}").starts_with("RunFile"));
    }

    #[test]
    fn segments_file_lists_every_drawn_line() {
        let dir = tempfile::tempdir().unwrap();
        let lines = dir.path().join("lines.json");
        let cli = Cli::try_parse_from([
            "lichtenberg",
            "render",
            "-W",
            "30",
            "-H",
            "30",
            "--params",
            r#"{"max_nodes": 50}"#,
            "-o",
            dir.path().join("a.png").to_str().unwrap(),
            "--segments",
            lines.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).unwrap();

        let raw = std::fs::read_to_string(&lines).unwrap();
        let json: Value = serde_json::from_str(&raw).unwrap();
        let lines = json.as_array().unwrap();
        assert_eq!(lines.len(), 49);
        // The first line leaves the seed cell at the top centre.
        assert_eq!(lines[0]["from"], serde_json::json!([15.5, 0.5]));
        assert!(lines.iter().all(|l| l["width"].as_f64().unwrap() > 0.0));
    }
}
