use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use image::ImageFormat;
use newsbooth_core::prelude::*;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "newsbooth",
    about = "Compose two photos onto a retro newspaper front page",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a spinner while composing (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose a front page from two photos
    Compose(ComposeArgs),
    /// Run the upload policy over one or more files
    Check(CheckArgs),
}

#[derive(Parser, Debug, Clone)]
struct ComposeArgs {
    // Input/Output
    /// First photo (primary rectangle)
    #[arg(help_heading = "Input/Output")]
    photo1: PathBuf,
    /// Second photo (secondary rectangle)
    #[arg(help_heading = "Input/Output")]
    photo2: PathBuf,
    /// Output file [default: front-page.png or .jpg]; a .png/.jpg extension
    /// picks the format unless --format is given
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// Directory the template is resolved against
    #[arg(long, default_value = "assets", help_heading = "Input/Output")]
    assets: PathBuf,
    /// Template logical path inside --assets (overrides config)
    #[arg(long, help_heading = "Input/Output")]
    template: Option<String>,
    /// YAML or JSON config file; explicit flags override its values
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Write a base64 data: URL text file instead of raw image bytes
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    data_url: bool,

    /// Edition date passed to the compositor
    #[arg(long, default_value = "", help_heading = "Content")]
    date: String,

    // Output
    /// Output format: png | jpeg
    #[arg(long, help_heading = "Output")]
    format: Option<String>,

    // Effects
    /// Number of grain dots
    #[arg(long, help_heading = "Effects")]
    grain: Option<u32>,
    /// Grain seed for reproducible output
    #[arg(long, help_heading = "Effects")]
    seed: Option<u64>,
    /// Vignette opacity at the rim (0..=1)
    #[arg(long, help_heading = "Effects")]
    vignette_alpha: Option<f32>,
    /// Resample filter: nearest | triangle | catmullrom | gaussian | lanczos3
    #[arg(long, help_heading = "Effects")]
    resample: Option<String>,

    // Upload policy
    /// Reject photos larger than this many bytes
    #[arg(long, default_value_t = newsbooth_core::DEFAULT_MAX_UPLOAD_BYTES, help_heading = "Upload")]
    max_bytes: u64,

    /// Print the merged configuration (after config file + flags) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
}

#[derive(Parser, Debug, Clone)]
struct CheckArgs {
    /// Files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Size ceiling in bytes
    #[arg(long, default_value_t = newsbooth_core::DEFAULT_MAX_UPLOAD_BYTES)]
    max_bytes: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Compose(args) => run_compose(args, cli.progress && !cli.quiet),
        Commands::Check(args) => run_check(args),
    }
}

fn run_compose(args: &ComposeArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(args)?;

    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let policy = UploadPolicy::new(args.max_bytes);
    let photo1 = policy
        .accept_file(&args.photo1)
        .with_context(|| format!("photo1 {}", args.photo1.display()))?;
    let photo2 = policy
        .accept_file(&args.photo2)
        .with_context(|| format!("photo2 {}", args.photo2.display()))?;

    let loader = DirAssetLoader::new(&args.assets);
    let compositor = Compositor::new(cfg, loader)?;
    let request = ComposeRequest::new(photo1, photo2, args.date.clone());

    let spinner = if show_progress {
        use indicatif::{ProgressBar, ProgressStyle};
        let b = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} composing [{elapsed_precise}]") {
            b.set_style(style);
        }
        b.enable_steady_tick(Duration::from_millis(100));
        Some(b)
    } else {
        None
    };
    let start = Instant::now();
    let result = compositor.compose(&request);
    if let Some(b) = &spinner {
        b.finish_and_clear();
    }
    let artifact = match result {
        Ok(a) => a,
        Err(e) => {
            if let Some(asset) = e.failed_asset() {
                error!(%asset, "composition aborted");
            }
            return Err(e.into());
        }
    };
    info!(
        width = artifact.width,
        height = artifact.height,
        bytes = artifact.bytes.len(),
        time = fmt_dur(start.elapsed()),
        "composed"
    );

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_out_path(artifact.format));
    write_artifact(&artifact, &out, args.data_url)?;
    Ok(())
}

fn build_config(args: &ComposeArgs) -> anyhow::Result<CompositorConfig> {
    let mut cfg = match &args.config {
        Some(path) => load_config_file(path)?,
        None => CompositorConfig::default(),
    };

    if let Some(t) = &args.template {
        cfg.template = t.clone();
    }
    if let Some(v) = args.grain {
        cfg.grain.count = v;
    }
    if args.seed.is_some() {
        cfg.grain.seed = args.seed;
    }
    if let Some(v) = args.vignette_alpha {
        cfg.vignette.alpha = v;
    }
    if let Some(r) = &args.resample {
        cfg.resample = r
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown resample filter: {}", r))?;
    }
    // --format beats the -o extension, which beats the config file
    if let Some(f) = &args.format {
        cfg.output_format = f
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown output format: {}", f))?;
    } else if let Some(fmt) = args.out.as_deref().and_then(format_from_path) {
        cfg.output_format = fmt;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn load_config_file(path: &Path) -> anyhow::Result<CompositorConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    parse_config(&text, is_json).with_context(|| format!("parse {}", path.display()))
}

/// Parse a YAML or JSON config. Missing keys keep their defaults; unknown keys
/// and unknown enum names are errors.
fn parse_config(text: &str, is_json: bool) -> anyhow::Result<CompositorConfig> {
    let cfg: CompositorConfig = if is_json {
        serde_json::from_str(text)?
    } else {
        serde_yaml::from_str(text)?
    };
    Ok(cfg)
}

fn default_out_path(format: OutputFormat) -> PathBuf {
    match format {
        OutputFormat::Png => PathBuf::from("front-page.png"),
        OutputFormat::Jpeg => PathBuf::from("front-page.jpg"),
    }
}

fn format_from_path(p: &Path) -> Option<OutputFormat> {
    match ImageFormat::from_path(p).ok()? {
        ImageFormat::Png => Some(OutputFormat::Png),
        ImageFormat::Jpeg => Some(OutputFormat::Jpeg),
        _ => None,
    }
}

fn write_artifact(artifact: &Artifact, out: &Path, data_url: bool) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create out dir {}", parent.display()))?;
    }
    if data_url {
        fs::write(out, artifact.to_data_url()).with_context(|| format!("write {}", out.display()))?;
    } else {
        fs::write(out, &artifact.bytes).with_context(|| format!("write {}", out.display()))?;
    }
    info!(?out, mime = artifact.mime_type(), "front page written");
    Ok(())
}

fn run_check(args: &CheckArgs) -> anyhow::Result<()> {
    let policy = UploadPolicy::new(args.max_bytes);
    let mut rejected = 0usize;
    for path in &args.files {
        let verdict = fs::read(path)
            .map_err(NewsboothError::from)
            .and_then(|bytes| policy.check(&bytes));
        match verdict {
            Ok(format) => println!("ok       {} ({:?})", path.display(), format),
            Err(e) => {
                rejected += 1;
                println!("rejected {}: {}", path.display(), e);
            }
        }
    }
    if rejected > 0 {
        anyhow::bail!("{} of {} files rejected", rejected, args.files.len());
    }
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose_args(extra: &[&str]) -> ComposeArgs {
        let mut argv = vec!["compose", "left.jpg", "right.jpg"];
        argv.extend_from_slice(extra);
        ComposeArgs::try_parse_from(argv).expect("args")
    }

    fn write_temp(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("newsbooth-{}-{name}", std::process::id()));
        fs::write(&path, text).expect("write temp config");
        path
    }

    fn tuned_config() -> CompositorConfig {
        CompositorConfig::builder()
            .grain_count(0)
            .grain_seed(Some(42))
            .vignette_alpha(0.5)
            .resample(ResampleFilter::Lanczos3)
            .output_format(OutputFormat::Jpeg)
            .build()
    }

    #[test]
    fn printed_config_reads_back_unchanged() {
        let cfg = tuned_config();
        let json = serde_json::to_string_pretty(&cfg).expect("json");
        assert_eq!(parse_config(&json, true).expect("parse json"), cfg);
        let yaml = serde_yaml::to_string(&cfg).expect("yaml");
        assert_eq!(parse_config(&yaml, false).expect("parse yaml"), cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = parse_config("grain:\n  seed: 7\n", false).expect("parse");
        assert_eq!(cfg.grain.seed, Some(7));
        assert_eq!(cfg.grain.count, 1000);
        assert_eq!(cfg.canvas_width, 2550);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("grain_count: 5\n", false).is_err());
        assert!(parse_config("grain:\n  dots: 5\n", false).is_err());
        assert!(parse_config(r#"{"vignette": {"strength": 0.2}}"#, true).is_err());
    }

    #[test]
    fn unknown_enum_names_are_rejected() {
        assert!(parse_config("resample: sharpest\n", false).is_err());
        assert!(parse_config("output_format: webp\n", false).is_err());
        // aliases accepted by the flags also work in files
        let cfg = parse_config("resample: bilinear\noutput_format: jpg\n", false).expect("aliases");
        assert_eq!(cfg.resample, ResampleFilter::Triangle);
        assert_eq!(cfg.output_format, OutputFormat::Jpeg);
    }

    #[test]
    fn config_file_settings_survive_the_merge() {
        let yaml = serde_yaml::to_string(&tuned_config()).expect("yaml");
        let path = write_temp("merge.yaml", &yaml);
        let path_str = path.to_string_lossy().into_owned();

        let cfg = build_config(&compose_args(&["--config", path_str.as_str()])).expect("build");
        assert_eq!(cfg, tuned_config());

        // flags override the file
        let cfg = build_config(&compose_args(&["--config", path_str.as_str(), "--grain", "12", "--seed", "9"]))
            .expect("build");
        assert_eq!(cfg.grain.count, 12);
        assert_eq!(cfg.grain.seed, Some(9));
        assert!((cfg.vignette.alpha - 0.5).abs() < f32::EPSILON);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn output_format_precedence() {
        let path = write_temp("format.yaml", "output_format: jpeg\n");
        let path_str = path.to_string_lossy().into_owned();

        let cfg = build_config(&compose_args(&["--config", path_str.as_str()])).expect("build");
        assert_eq!(cfg.output_format, OutputFormat::Jpeg);
        assert_eq!(default_out_path(cfg.output_format), PathBuf::from("front-page.jpg"));

        let cfg = build_config(&compose_args(&["--config", path_str.as_str(), "-o", "page.png"]))
            .expect("build");
        assert_eq!(cfg.output_format, OutputFormat::Png);

        let cfg = build_config(&compose_args(&[
            "--config", path_str.as_str(), "-o", "page.png", "--format", "jpeg",
        ]))
        .expect("build");
        assert_eq!(cfg.output_format, OutputFormat::Jpeg);

        let cfg = build_config(&compose_args(&[])).expect("build");
        assert_eq!(cfg.output_format, OutputFormat::Png);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn bad_flag_values_are_errors() {
        assert!(build_config(&compose_args(&["--resample", "sharpest"])).is_err());
        assert!(build_config(&compose_args(&["--format", "webp"])).is_err());
    }
}
