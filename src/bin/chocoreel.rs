use std::path::PathBuf;

use anyhow::Context as _;
use chocoreel::{
    Caption, CaptionFont, CpuRenderer, CpuRendererOpts, FrameIndex, FrameRenderer, FrameRequest,
    GenerateRequest, Generator, GeneratorConfig, Pacing, Progress, Style, VideoCodec,
};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "chocoreel", version)]
struct Cli {
    /// Log debug events.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one captioned clip and save it.
    Generate(GenerateArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// List the animation styles.
    Styles,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Animation style (melting, splash, pour, swirl).
    #[arg(long, default_value_t = Style::Melting)]
    style: Style,

    /// Caption text, 1 to 30 characters.
    #[arg(long)]
    text: String,

    /// Output container (webm, mp4, gif). Overrides the config file.
    #[arg(long)]
    codec: Option<VideoCodec>,

    /// Caption font (TTF/OTF). Overrides the config file.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory the clip is written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Generator config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pace frames at the capture rate instead of rendering as fast as possible.
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Animation style (melting, splash, pour, swirl).
    #[arg(long, default_value_t = Style::Melting)]
    style: Style,

    /// Animation progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Caption text. Omit for no caption.
    #[arg(long)]
    text: Option<String>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Caption font (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Styles => cmd_styles(),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    Caption::new(args.text.as_str())?;

    let mut cfg = match args.config.as_ref() {
        Some(path) => GeneratorConfig::from_path(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(codec) = args.codec {
        cfg.codec = codec;
    }
    if let Some(font) = args.font {
        cfg.font_path = Some(font);
    }
    if args.realtime {
        cfg.pacing = Pacing::Realtime;
    }

    let mut generator = Generator::from_config(cfg)?;
    generator.generate(&GenerateRequest::new(args.style, args.text))?;
    let path = generator
        .download(&args.out_dir)?
        .context("generation finished without an artifact")?;

    println!("{}", path.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let opts = CpuRendererOpts::default();
    let mut renderer = CpuRenderer::new(opts)?;

    let caption = match args.text.as_deref() {
        Some(text) => Some(Caption::new(text)?),
        None => None,
    };
    if caption.is_some() {
        let font_path = match args.font {
            Some(p) => p,
            None => chocoreel::find_system_font()
                .context("no caption font found; pass --font PATH")?,
        };
        renderer = renderer.with_caption_font(CaptionFont::from_path(&font_path)?);
    }

    let frame = renderer.render_frame(&FrameRequest {
        frame: FrameIndex(0),
        progress: Progress::from_fraction(args.progress),
        style: args.style,
        caption: caption.as_ref().map(Caption::as_str).unwrap_or(""),
    })?;
    let rgba = frame.to_opaque_rgba8(opts.background.to_array())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_styles() -> anyhow::Result<()> {
    for style in Style::ALL {
        println!("{:<8} {}", style.id(), style.label());
    }
    Ok(())
}
