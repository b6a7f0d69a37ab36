use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowvis", version, about = "Flow-field visualization viewer")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON config; missing keys keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raw f32 flow data file (overrides the config).
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Noise image (overrides the config).
    #[arg(long, global = true)]
    noise: Option<PathBuf>,

    /// Fail on a missing or truncated data file instead of zero-filling.
    #[arg(long, global = true)]
    strict: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive viewer (T: next time step, Esc: quit).
    View,
    /// Render one time step offscreen as a PNG.
    Frame(FrameArgs),
    /// Print the dataset layout and load status.
    Info,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Time step index (0-based).
    #[arg(long, default_value_t = 0)]
    time: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli.common)?;
    match cli.cmd.unwrap_or(Command::View) {
        Command::View => cmd_view(config),
        Command::Frame(args) => cmd_frame(config, args),
        Command::Info => cmd_info(config),
    }
}

fn build_config(args: &CommonArgs) -> anyhow::Result<flowvis::FlowConfig> {
    let mut config = match &args.config {
        Some(path) => flowvis::FlowConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => flowvis::FlowConfig::default(),
    };
    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }
    if let Some(noise) = &args.noise {
        config.noise_path = noise.clone();
    }
    if args.strict {
        config.load_policy = flowvis::LoadPolicy::Strict;
    }
    Ok(config)
}

fn load_field(config: &flowvis::FlowConfig) -> anyhow::Result<flowvis::FlowField> {
    let field = flowvis::FlowField::load(&config.data_path, config.layout, config.load_policy)
        .with_context(|| format!("load flow data '{}'", config.data_path.display()))?;
    Ok(field)
}

fn cmd_view(config: flowvis::FlowConfig) -> anyhow::Result<()> {
    let field = load_field(&config)?;
    flowvis::run(config, field).context("run viewer")?;
    Ok(())
}

fn cmd_frame(config: flowvis::FlowConfig, args: FrameArgs) -> anyhow::Result<()> {
    let field = load_field(&config)?;
    let gpu = flowvis::GpuContext::headless()?;
    let viewport = flowvis::Viewport::new(args.width, args.height);
    let image = flowvis::render_frame(&gpu, &config, &field, args.time, viewport)
        .with_context(|| format!("render time step {}", args.time))?;
    image.write_png(&args.out)?;
    eprintln!(
        "wrote {} ({}x{}, t={})",
        args.out.display(),
        image.width,
        image.height,
        config.layout.time_at(args.time)
    );
    Ok(())
}

fn cmd_info(config: flowvis::FlowConfig) -> anyhow::Result<()> {
    let field = load_field(&config)?;
    let l = field.layout();
    let report = field.report();
    println!("data:      {}", config.data_path.display());
    println!("cells:     x={} y={} t={}", l.x_cells, l.y_cells, l.t_cells);
    println!(
        "domain:    x=[{}, {}] y=[{}, {}] t=[{}, {}]",
        l.x_start, l.x_end, l.y_start, l.y_end, l.t_start, l.t_end
    );
    println!(
        "steps:     dx={} dy={} dt={}",
        l.x_step(),
        l.y_step(),
        l.t_step()
    );
    println!(
        "loaded:    {}/{} floats ({:?})",
        report.read_floats, report.expected_floats, report.status
    );
    Ok(())
}
