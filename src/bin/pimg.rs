use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use pimg::{CompositionResult, FallbackPolicy, LoadMode, LoadOptions};

#[derive(Parser, Debug)]
#[command(name = "pimg", version, about = "Compose PIMG sprite layers into full images")]
struct Cli {
    /// Log debug details to stderr (overrides RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the images a container resolves to.
    List(ListArgs),
    /// Write one image as a PNG.
    Export(ExportArgs),
    /// Write every image into a directory as `<name>.png`.
    ExportAll(ExportAllArgs),
}

#[derive(Args, Debug)]
struct LoadArgs {
    /// Input `.pimg` container, or a decompiled `<stem>.json` manifest.
    input: PathBuf,

    /// Export tiles as stored instead of composing diffs onto bases.
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// What to do with a diff whose group has no base.
    #[arg(long, value_enum)]
    fallback: Option<FallbackArg>,

    /// Compose diff layers in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Decompiler executable used for `.pimg` inputs.
    #[arg(long, env = "PIMG_DECOMPILER")]
    decompiler: Option<PathBuf>,

    /// Root for the `pimg-staging` directory holding decompiler outputs (only that
    /// subdirectory is cleared).
    #[arg(long)]
    staging: Option<PathBuf>,

    /// JSON options file; command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FallbackArg {
    MostRecent,
    Strict,
}

impl From<FallbackArg> for FallbackPolicy {
    fn from(v: FallbackArg) -> Self {
        match v {
            FallbackArg::MostRecent => FallbackPolicy::MostRecent,
            FallbackArg::Strict => FallbackPolicy::Strict,
        }
    }
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    load: LoadArgs,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    load: LoadArgs,

    /// Display name of the image to write.
    #[arg(long)]
    name: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ExportAllArgs {
    #[command(flatten)]
    load: LoadArgs,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::List(args) => cmd_list(args),
        Command::Export(args) => cmd_export(args),
        Command::ExportAll(args) => cmd_export_all(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let result = load(&args.load)?;
    for image in result.iter() {
        println!("{}\t{}x{}", image.name, image.width, image.height);
    }
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let result = load(&args.load)?;
    pimg::export_one(&result, &args.name, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export_all(args: ExportAllArgs) -> anyhow::Result<()> {
    let result = load(&args.load)?;
    let written = pimg::export_all(&result, &args.out)?;
    eprintln!("wrote {} images to {}", written.len(), args.out.display());
    Ok(())
}

fn load(args: &LoadArgs) -> anyhow::Result<CompositionResult> {
    let opts = load_options(args)?;
    if !opts.compose.parallel {
        return Ok(pimg::load_path(&args.input, &opts)?);
    }
    let pool = build_thread_pool(args.threads)?;
    Ok(pool.install(|| pimg::load_path(&args.input, &opts))?)
}

fn load_options(args: &LoadArgs) -> anyhow::Result<LoadOptions> {
    let mut opts = match &args.config {
        Some(path) => LoadOptions::from_path(path)?,
        None => LoadOptions::default(),
    };
    if args.raw {
        opts.compose.mode = LoadMode::Raw;
    }
    if let Some(fallback) = args.fallback {
        opts.compose.fallback = fallback.into();
    }
    if args.parallel {
        opts.compose.parallel = true;
    }
    if let Some(exe) = &args.decompiler {
        opts.decompiler = exe.clone();
    }
    if let Some(dir) = &args.staging {
        opts.staging_root = Some(dir.clone());
    }
    Ok(opts)
}

fn build_thread_pool(threads: Option<usize>) -> anyhow::Result<rayon::ThreadPool> {
    if threads == Some(0) {
        anyhow::bail!("'--threads' must be >= 1 when set");
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().context("failed to build rayon thread pool")
}
