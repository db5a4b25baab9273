
//! COMP containers: an 8-byte header followed by an LZSS payload.

use {
    crate::lzss::{self, Expanded, LzssError},
    bytemuck::pod_read_unaligned as read,
};

pub const HEADER_LEN: usize = 8;
pub const COMP_TAG: [u8; 4] = *b"COMP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: [u8; 4],
    pub decompressed_size: u32,
}

impl Header {
    pub fn parse(bs: &[u8]) -> Result<Self, LzssError> {
        let Some(header) = bs.get(..HEADER_LEN) else {
            return Err(LzssError::MalformedHeader{len: bs.len()});
        };
        let tag = read::<[u8; 4]>(&header[0..4]);
        let decompressed_size = u32::from_be(read(&header[4..8]));
        Ok(Header{tag, decompressed_size})
    }

    /// The tag is not checked by [`decompress`]; this is for callers that care.
    pub fn has_comp_tag(&self) -> bool {
        self.tag == COMP_TAG
    }
}

pub fn decompress(stream: &[u8]) -> Result<Expanded, LzssError> {
    let header = Header::parse(stream)?;
    lzss::expand(&stream[HEADER_LEN..], header.decompressed_size as usize)
}
