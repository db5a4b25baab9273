
use {
    crate::report::{self, Encoding},
    anyhow::{Context, Result as Anyhow, anyhow, bail},
    camino::{Utf8Path as Path, Utf8PathBuf as PathBuf},
    formats::{Expanded, Header},
    rayon::prelude::*,
    serde::Serialize,
};

#[derive(Debug, clap::Args)]
pub struct Config {
    /// Directory holding the dumped .lzss containers
    #[arg(short, long, default_value = "allbindump")]
    pub input: PathBuf,

    /// Where decompressed payloads are written
    #[arg(short, long, default_value = "dec")]
    pub output: PathBuf,

    #[arg(short, long, default_value = "comp.json")]
    pub report: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Encoding::Utf16)]
    pub encoding: Encoding,

    /// Skip containers declaring more than this many bytes
    #[arg(long, default_value_t = 256 << 20)]
    pub max_size: u32,
}

#[derive(Debug, Default, Serialize)]
pub struct Entry {
    pub filename: String,
    pub filesize: Option<usize>,
    /// Size declared in the header.
    pub decomp_buffer: Option<u32>,
    /// Bytes actually produced; `None` if nothing was written.
    pub decomp_size: Option<usize>,
    pub underflows: usize,
    pub sentinel: bool,
    pub error: Option<String>,
}

pub fn run(config: &Config) -> Anyhow<()> {
    let files = crate::list_files(&config.input, "lzss")?;
    log::info!("{} containers in {}", files.len(), config.input);

    std::fs::create_dir_all(&config.output)
        .with_context(|| format!("creating {}", config.output))?;

    let entries = files.par_iter()
        .map(|path| dump(config, path))
        .collect::<Vec<_>>();

    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    let suspect = entries.iter()
        .filter(|e| e.error.is_none())
        .filter(|e| e.underflows != 0 || e.sentinel)
        .count();
    log::info!("{} decompressed, {suspect} suspect, {failed} failed", entries.len() - failed);

    report::write(&config.report, &entries, config.encoding)
}

fn dump(config: &Config, path: &Path) -> Entry {
    let mut entry = Entry{filename: path.to_string(), ..Entry::default()};
    match try_dump(config, path, &mut entry) {
        Ok(out_path) => log::debug!("{path} -> {out_path}"),
        Err(e) => {
            log::error!("{path}: {e:#}");
            entry.error = Some(format!("{e:#}"));
        }
    }
    entry
}

fn try_dump(config: &Config, path: &Path, entry: &mut Entry) -> Anyhow<PathBuf> {
    let data = std::fs::read(path).with_context(|| format!("reading {path}"))?;
    entry.filesize = Some(data.len());

    let header = Header::parse(&data)?;
    entry.decomp_buffer = Some(header.decompressed_size);
    if !header.has_comp_tag() {
        log::warn!("{path}: unexpected tag {:?}", String::from_utf8_lossy(&header.tag));
    }
    if header.decompressed_size > config.max_size {
        bail!("declared size {} exceeds limit {}", header.decompressed_size, config.max_size);
    }

    let expanded = formats::decompress(&data)?;
    note_anomalies(path, &expanded);
    entry.underflows = expanded.underflows;
    entry.sentinel = expanded.sentinel;

    let out_path = output_path(&config.output, path)?;
    let bytes = expanded.into_bytes();
    std::fs::write(&out_path, &bytes).with_context(|| format!("writing {out_path}"))?;
    entry.decomp_size = Some(bytes.len());
    Ok(out_path)
}

fn note_anomalies(path: &Path, expanded: &Expanded) {
    if expanded.underflows != 0 {
        log::warn!("{path}: payload ran out {} times; output is zero-filled", expanded.underflows);
    }
    if expanded.is_short() {
        log::warn!("{path}: stream ended at {} of {} declared bytes",
            expanded.bytes.len(), expanded.declared);
    }
}

/// `dir/name.lzss` -> `out_dir/name.lzssraw`
fn output_path(out_dir: &Path, path: &Path) -> Anyhow<PathBuf> {
    let name = path.file_name().ok_or_else(|| anyhow!("{path} has no file name"))?;
    Ok(out_dir.join(format!("{name}raw")))
}
