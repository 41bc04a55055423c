use crate::config::{Config, load_config};
use crate::driver::AnimatedConnector;
use crate::frame_dump::{AnimationDump, write_animation_dump};
use crate::geometry::{CurveModel, Rect};
use crate::render::{write_output_png, write_output_svg};
use crate::scheduler::ManualScheduler;
use crate::surface::SvgSurface;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arcc", version, about = "Render animated connector arcs as SVG/PNG frame sequences")]
pub struct Args {
    /// Source anchor rect as x,y,width,height
    #[arg(long = "from", default_value = "0,100,50,20")]
    pub from: Rect,

    /// Destination anchor rect as x,y,width,height
    #[arg(long = "to", default_value = "200,0,50,20")]
    pub to: Rect,

    /// Output file or directory. A single SVG frame goes to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Surface width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Surface height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Number of frames to render
    #[arg(short = 'n', long = "frames", default_value_t = 60)]
    pub frames: usize,

    /// Simulated display refresh rate
    #[arg(long = "fps", default_value_t = 60.0)]
    pub fps: f64,

    /// Strands drawn between the anchors
    #[arg(short = 's', long = "strands")]
    pub strands: Option<usize>,

    /// Pin the noise seed for reproducible output
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Tangent model for the connector curve
    #[arg(long = "curve", value_enum)]
    pub curve: Option<CurveArg>,

    /// Write computed strand paths for every frame as JSON
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CurveArg {
    Blended,
    Analytic,
}

impl From<CurveArg> for CurveModel {
    fn from(value: CurveArg) -> Self {
        match value {
            CurveArg::Blended => CurveModel::Blended,
            CurveArg::Analytic => CurveModel::Analytic,
        }
    }
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = apply_args(load_config(args.config.as_deref())?, &args);
    config.connector.validate()?;

    if args.frames == 0 {
        return Err(anyhow::anyhow!("At least one frame is required"));
    }
    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(anyhow::anyhow!("fps must be a positive number"));
    }

    let outputs = resolve_frame_outputs(args.output.as_deref(), args.output_format, args.frames)?;
    let scheduler = Rc::new(ManualScheduler::new());
    let surface = SvgSurface::new(config.render.width, config.render.height)
        .with_background(&config.render.background);
    let connector = AnimatedConnector::new(config.connector.clone(), config.theme.clone());
    let handle = connector.try_start(surface, args.from, args.to, scheduler.clone())?;
    let mut dump = args.dump.as_ref().map(|_| AnimationDump::new(&handle.scene()));

    let interval = 1000.0 / args.fps;
    for idx in 0..args.frames {
        scheduler.tick(interval);
        if let (Some(dump), Some(report)) = (dump.as_mut(), handle.last_report()) {
            dump.push(&report);
        }
        let svg = handle.with_surface(|surface| surface.to_svg());
        let output = outputs.get(idx).map(PathBuf::as_path);
        match args.output_format {
            OutputFormat::Svg => write_output_svg(&svg, output)?,
            OutputFormat::Png => {
                let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
                write_output_png(&svg, output, &config.render)?;
            }
        }
    }
    handle.stop();
    tracing::info!(frames = handle.frames_rendered(), "rendered connector frames");

    if let (Some(path), Some(dump)) = (args.dump.as_deref(), dump) {
        write_animation_dump(path, &dump)?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn apply_args(mut config: Config, args: &Args) -> Config {
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(strands) = args.strands {
        config.connector.strand_count = strands;
    }
    if let Some(seed) = args.seed {
        config.connector.seed = Some(seed);
    }
    if let Some(curve) = args.curve {
        config.connector.curve_model = curve.into();
    }
    config
}

/// One path per frame. Empty only for a single SVG frame written to stdout.
fn resolve_frame_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let Some(base) = output else {
        if count == 1 && matches!(format, OutputFormat::Svg) {
            return Ok(Vec::new());
        }
        return Err(anyhow::anyhow!("Output path required for {} frames", ext));
    };
    if base.is_dir() {
        return Ok((0..count)
            .map(|idx| base.join(format!("frame-{:04}.{}", idx + 1, ext)))
            .collect());
    }
    if count == 1 {
        return Ok(vec![base.to_path_buf()]);
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok((0..count)
        .map(|idx| parent.join(format!("{}-{:04}.{}", stem, idx + 1, ext)))
        .collect())
}
