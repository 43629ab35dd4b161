use mazepath_core::{PackedGrid, EAST, SOUTH};
use mazepath_engine::{spawn_engine_thread, MazeEngine, Request, Response};
use serde::Serialize;
use std::env;
use std::fs;
use std::time::Instant;
use uuid::Uuid;

/// JSON artifact written by `generate`.
#[derive(Debug, Serialize)]
struct MazeArtifact {
    maze_id: Uuid,
    dim: [u32; 2],
    buffer: Vec<u8>,
    path: Vec<[u32; 2]>,
}

fn main() {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "generate" => {
            if args.len() < 4 {
                eprintln!("Usage: {} generate <width> <height> [--seed <n>] [--source x,y] [--trace x,y] [output_file]", args[0]);
                std::process::exit(1);
            }

            let width = parse_dimension(&args[2]);
            let height = parse_dimension(&args[3]);

            let mut seed: Option<u32> = None;
            let mut source = [0u32, 0u32];
            let mut trace = [width - 1, height - 1];
            let mut output_file: Option<&str> = None;

            let mut at = 4;
            while at < args.len() {
                match args[at].as_str() {
                    "--seed" => {
                        seed = Some(parse_flag_value(&args, at, "--seed", |v| v.parse().ok()));
                        at += 2;
                    }
                    "--source" => {
                        source = parse_flag_value(&args, at, "--source", parse_cell);
                        at += 2;
                    }
                    "--trace" => {
                        trace = parse_flag_value(&args, at, "--trace", parse_cell);
                        at += 2;
                    }
                    other => {
                        output_file = Some(other);
                        at += 1;
                    }
                }
            }

            for (flag, cell) in [("--source", source), ("--trace", trace)] {
                if cell[0] >= width || cell[1] >= height {
                    eprintln!(
                        "❌ Error: {} cell {},{} is outside the {}x{} grid",
                        flag, cell[0], cell[1], width, height
                    );
                    std::process::exit(1);
                }
            }

            generate_command(width, height, seed, source, trace, output_file);
        }

        command => {
            eprintln!("❌ Unknown command: {}", command);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate <width> <height> [--seed <n>] [--source x,y] [--trace x,y] [output_file]");
    eprintln!("      Generate a perfect maze and trace a route through it");
    eprintln!("      - width, height: Grid dimensions in cells (at least 1)");
    eprintln!("      - --seed: Optional seed for reproducible generation");
    eprintln!("      - --source: Route source cell (default 0,0)");
    eprintln!("      - --trace: Route target cell (default bottom-right)");
    eprintln!("      - output_file: Optional file to save the maze artifact (JSON)");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  {} generate 20 12 --seed 42 --trace 19,11 maze.json", program);
}

fn parse_dimension(value: &str) -> u32 {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("❌ Error: Invalid dimension '{}'. Must be a positive integer.", value);
            std::process::exit(1);
        }
    }
}

/// Parse "x,y" into a cell coordinate pair.
fn parse_cell(value: &str) -> Option<[u32; 2]> {
    let (x, y) = value.split_once(',')?;
    Some([x.trim().parse().ok()?, y.trim().parse().ok()?])
}

fn parse_flag_value<T>(args: &[String], at: usize, flag: &str, parse: impl Fn(&str) -> Option<T>) -> T {
    match args.get(at + 1).and_then(|v| parse(v)) {
        Some(value) => value,
        None => {
            eprintln!("❌ Error: {} requires a valid value", flag);
            std::process::exit(1);
        }
    }
}

fn generate_command(
    width: u32,
    height: u32,
    seed: Option<u32>,
    source: [u32; 2],
    trace: [u32; 2],
    output_file: Option<&str>,
) {
    println!("📋 Generating {}x{} maze", width, height);
    if let Some(seed) = seed {
        println!("  Seed: {}", seed);
    }
    println!("  Source: {},{}  Trace: {},{}", source[0], source[1], trace[0], trace[1]);
    println!();

    let engine = match seed {
        Some(seed) => MazeEngine::with_seed(seed),
        None => MazeEngine::new(),
    };

    let channels = match spawn_engine_thread(engine) {
        Ok(channels) => channels,
        Err(e) => {
            eprintln!("❌ Error spawning engine thread: {}", e);
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let request = Request::Init {
        dim: [width, height],
        source,
        trace,
    };
    if channels.request_tx.send(request).is_err() {
        eprintln!("❌ Error: engine thread is gone");
        std::process::exit(1);
    }

    // Init replies MazeBuffer then Path.
    let (maze_id, buffer) = match channels.response_rx.recv() {
        Ok(Response::MazeBuffer { maze_id, buffer, .. }) => (maze_id, buffer),
        _ => {
            eprintln!("❌ Error: engine produced no maze");
            std::process::exit(1);
        }
    };
    let path = match channels.response_rx.recv() {
        Ok(Response::Path { path, .. }) => path,
        _ => {
            eprintln!("❌ Error: no route reply from engine");
            std::process::exit(1);
        }
    };
    let duration = start.elapsed();

    match PackedGrid::from_bytes(width, height, buffer.clone()) {
        Ok(grid) => println!("{}", render_ascii(&grid)),
        Err(e) => {
            eprintln!("❌ Error: engine sent a malformed buffer: {}", e);
            std::process::exit(1);
        }
    }
    println!("✅ Maze generated in {:.3}s", duration.as_secs_f64());
    println!("  Maze id: {}", maze_id);
    println!("  Buffer: {} bytes packed", buffer.len());
    println!("  Route length: {} cells", path.len());

    if let Some(file) = output_file {
        let artifact = MazeArtifact {
            maze_id,
            dim: [width, height],
            buffer,
            path,
        };
        match save_artifact(&artifact, file) {
            Ok(_) => println!("💾 Maze artifact saved to: {}", file),
            Err(e) => {
                eprintln!("❌ Error saving maze artifact: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn save_artifact(artifact: &MazeArtifact, file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(file, json)?;
    Ok(())
}

/// Draw a maze as ASCII walls, two columns per cell.
fn render_ascii(grid: &PackedGrid) -> String {
    let (width, height) = (grid.width(), grid.height());
    // In-bounds loops below, so every read succeeds.
    let cell = |x: u32, y: u32| grid.cell(x, y).unwrap_or(0);

    let mut out = String::new();
    out.push('+');
    for _ in 0..width {
        out.push_str("--+");
    }
    out.push('\n');

    for y in 0..height {
        out.push('|');
        for x in 0..width {
            out.push_str("  ");
            out.push(if cell(x, y) & EAST != 0 { ' ' } else { '|' });
        }
        out.push('\n');
        out.push('+');
        for x in 0..width {
            out.push_str(if cell(x, y) & SOUTH != 0 { "  " } else { "--" });
            out.push('+');
        }
        out.push('\n');
    }
    out
}
