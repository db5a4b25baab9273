
use {
    crate::report::{self, Encoding},
    anyhow::{Context, Result as Anyhow},
    camino::{Utf8Path as Path, Utf8PathBuf as PathBuf},
    formats::cndy::CommandTable,
    rayon::prelude::*,
    serde::Serialize,
};

#[derive(Debug, clap::Args)]
pub struct Config {
    /// Directory holding the dumped .cndy tables
    #[arg(short, long, default_value = "allbindump")]
    pub input: PathBuf,

    #[arg(short, long, default_value = "cndy.json")]
    pub report: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Encoding::Utf16)]
    pub encoding: Encoding,
}

#[derive(Debug, Default, Serialize)]
pub struct Entry {
    pub filename: String,
    pub remaining_filesize: Option<usize>,
    pub command_names: Vec<String>,
    pub command_ids: Vec<String>,
    pub error: Option<String>,
}

impl Entry {
    fn from_table(filename: String, table: CommandTable) -> Self {
        let (command_names, command_ids) = table.commands.into_iter()
            .map(|command| (command.name, format!("{:#x}", command.id)))
            .unzip();
        Entry {
            filename,
            remaining_filesize: Some(table.remaining),
            command_names,
            command_ids,
            error: None,
        }
    }
}

pub fn run(config: &Config) -> Anyhow<()> {
    let files = crate::list_files(&config.input, "cndy")?;
    log::info!("{} command tables in {}", files.len(), config.input);

    let entries = files.par_iter()
        .map(|path| summarise(path))
        .collect::<Vec<_>>();

    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    if failed != 0 {
        log::warn!("{failed} command tables could not be parsed");
    }

    report::write(&config.report, &entries, config.encoding)
}

fn summarise(path: &Path) -> Entry {
    let parsed = std::fs::read(path)
        .with_context(|| format!("reading {path}"))
        .and_then(|bs| Ok(CommandTable::parse(&bs)?));

    match parsed {
        Ok(table) => {
            log::debug!("{path}: {} commands", table.commands.len());
            Entry::from_table(path.to_string(), table)
        }
        Err(e) => {
            log::error!("{path}: {e:#}");
            Entry{filename: path.to_string(), error: Some(format!("{e:#}")), ..Entry::default()}
        }
    }
}
