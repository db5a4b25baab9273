
mod cndy;
mod comp;
mod report;

use {
    anyhow::{Context, Result as Anyhow},
    camino::{Utf8Path as Path, Utf8PathBuf as PathBuf},
    clap::{Parser, Subcommand},
};

#[derive(Debug, Parser)]
#[command(version, about = "Unpack COMP containers and summarise CNDY command tables")]
struct Args {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decompress every .lzss container in a directory
    Comp(comp::Config),
    /// Summarise every .cndy command table in a directory
    Cndy(cndy::Config),
}

fn main() -> Anyhow<()> {
    let args = Args::parse();

    let level = if args.verbose {log::LevelFilter::Debug} else {log::LevelFilter::Info};
    log_init(level, args.log_file.as_deref())?;

    match &args.command {
        Command::Comp(config) => comp::run(config),
        Command::Cndy(config) => cndy::run(config),
    }
}

fn log_init(level: log::LevelFilter, log_file: Option<&Path>) -> Anyhow<()> {
    use simplelog::*;
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto),
    ];
    if let Some(path) = log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating log file {path}"))?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, Config::default(), file));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

/// Regular files directly under `dir` with extension `ext`, sorted by path.
fn list_files(dir: &Path, ext: &str) -> Anyhow<Vec<PathBuf>> {
    let mut files = dir.read_dir_utf8()
        .with_context(|| format!("listing {dir}"))?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {log::warn!("skipping entry in {dir}: {e}"); None}
        })
        .filter(|path| path.extension() == Some(ext) && path.is_file())
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}
