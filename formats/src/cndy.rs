
//! CNDY command tables.
//!
//! Big-endian header of magic, name count and name block size; then the
//! Shift-JIS name block (NUL separated), one id byte per name padded out to a
//! multiple of four, and whatever the game keeps after that.

use {
    bytemuck::pod_read_unaligned as read,
    encoding_rs::SHIFT_JIS,
};

const MAGIC: [u8; 4] = *b"CNDY";
const HEADER_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum CndyError {
    #[error("file header has wrong magic (not 'CNDY')")]
    WrongMagic,
    #[error("truncated command table (need {need} bytes, have {have})")]
    Truncated { need: usize, have: usize },
    #[error("name block holds {found} names, header declares {expected}")]
    MissingNames { expected: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    pub commands: Vec<Command>,
    /// Length of the unparsed tail.
    pub remaining: usize,
}

impl CommandTable {
    pub fn parse(bs: &[u8]) -> Result<Self, CndyError> {
        let take = |at: usize, len: usize| {
            bs.get(at .. at + len).ok_or(CndyError::Truncated{need: at + len, have: bs.len()})
        };

        if bs.get(0..4) != Some(&MAGIC[..]) {return Err(CndyError::WrongMagic)}
        let header = take(0, HEADER_LEN)?;
        let name_count = u32::from_be(read(&header[4..8])) as usize;
        let names_size = u32::from_be(read(&header[8..12])) as usize;

        let names = take(HEADER_LEN, names_size)?;
        let ids_at = HEADER_LEN + names_size;
        let ids = take(ids_at, name_count.next_multiple_of(4))?;
        let remaining = bs.len() - (ids_at + ids.len());

        let (names, malformed) = SHIFT_JIS.decode_without_bom_handling(names);
        if malformed {
            log::warn!("malformed shift-jis in command names");
        }

        let names = names.split('\0').take(name_count).collect::<Vec<_>>();
        if names.len() < name_count {
            return Err(CndyError::MissingNames{expected: name_count, found: names.len()});
        }

        let commands = names.into_iter()
            .zip(ids.iter().copied())
            .map(|(name, id)| Command{name: name.to_owned(), id})
            .collect();

        Ok(CommandTable{commands, remaining})
    }
}
