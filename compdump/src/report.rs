
use {
    anyhow::{Context, Result as Anyhow},
    camino::Utf8Path as Path,
    serde::Serialize,
};

/// Text encoding of the written reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Encoding {
    /// UTF-16LE with a byte-order mark
    Utf16,
    Utf8,
}

pub fn to_json<T: Serialize>(entries: &[T]) -> Anyhow<String> {
    let mut json = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut json, formatter);
    entries.serialize(&mut ser)?;
    Ok(String::from_utf8(json)?)
}

pub fn encode(text: &str, encoding: Encoding) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Utf16 => std::iter::once(0xfeff)
            .chain(text.encode_utf16())
            .flat_map(u16::to_le_bytes)
            .collect(),
    }
}

pub fn write<T: Serialize>(path: &Path, entries: &[T], encoding: Encoding) -> Anyhow<()> {
    let json = to_json(entries)?;
    std::fs::write(path, encode(&json, encoding))
        .with_context(|| format!("writing report {path}"))?;
    log::info!("wrote {} entries to {path}", entries.len());
    Ok(())
}
