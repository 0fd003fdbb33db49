use crate::config::load_config;
use crate::ir::Topology;
use crate::layout::{RandomSource, SeededRandom, ThreadRandom};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::render::{render_fallback_svg, render_svg, write_output_png, write_output_svg};
use crate::scene::Scene;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const COMPACT_HIDDEN: &str = "webapp";

#[derive(Parser, Debug)]
#[command(name = "infraviz", version, about = "Infrastructure topology diagrams with collision-free layout")]
pub struct Args {
    /// Topology file (.json or .json5) or '-' for stdin. Defaults to the
    /// built-in dataset.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, interaction)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Seed for the random placement fallback
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Hide the web application node
    #[arg(long = "compact")]
    pub compact: bool,

    /// Drag a node before rendering: `id=x,y`. Repeatable.
    #[arg(long = "drag", value_name = "ID=X,Y")]
    pub drag: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;
    if args.compact && !config.layout.hidden_nodes.iter().any(|id| id == COMPACT_HIDDEN) {
        config.layout.hidden_nodes.push(COMPACT_HIDDEN.to_string());
    }

    let topology = read_topology(args.input.as_deref())?;
    let drags = args
        .drag
        .iter()
        .map(|raw| parse_drag(raw))
        .collect::<Result<Vec<_>>>()?;

    let rng: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };
    let theme = config.theme.clone();
    let render_cfg = config.render.clone();
    let mut scene = match Scene::with_random(topology, config, args.width, args.height, rng) {
        Ok(scene) => scene,
        Err(err) => {
            tracing::error!(%err, "failed to initialize scene");
            if args.output_format != OutputFormat::Json {
                let svg = render_fallback_svg(args.width, args.height, &theme);
                write_svg_or_png(&svg, &args, &render_cfg, &theme)?;
            }
            return Err(err.into());
        }
    };

    for (id, x, y) in &drags {
        scene.begin_drag(id);
        if scene.drag_to(id, *x, *y).is_empty() {
            tracing::warn!(node = %id, "drag target not found, skipping");
        }
        scene.end_drag(id);
    }

    match args.output_format {
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, scene.layout(), scene.topology())?,
            None => print!("{}", LayoutDump::from_layout(scene.layout(), scene.topology()).to_json()?),
        },
        OutputFormat::Svg | OutputFormat::Png => {
            let svg = render_svg(&scene, &theme);
            write_svg_or_png(&svg, &args, &render_cfg, &theme)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn write_svg_or_png(
    svg: &str,
    args: &Args,
    render_cfg: &crate::config::RenderConfig,
    theme: &crate::theme::Theme,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(svg, &output, render_cfg, theme)
        }
        _ => write_output_svg(svg, args.output.as_deref()),
    }
}

fn read_topology(path: Option<&Path>) -> Result<Topology> {
    match path {
        None => Ok(Topology::builtin()?),
        Some(path) if path == Path::new("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(Topology::from_json_str(&buf)?)
        }
        Some(path) => Ok(Topology::load(path)?),
    }
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

/// Parses `id=x,y`.
fn parse_drag(raw: &str) -> Result<(String, f32, f32)> {
    let (id, coords) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("invalid drag `{raw}`, expected id=x,y"))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("invalid drag `{raw}`, expected id=x,y"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(anyhow::anyhow!("invalid drag `{raw}`, node id is empty"));
    }
    Ok((id.to_string(), x.trim().parse()?, y.trim().parse()?))
}
