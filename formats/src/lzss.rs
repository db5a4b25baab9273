
//! Bit-packed LZSS as found in COMP containers.
//!
//! Tokens are read LSB-first. A `0` flag bit is followed by an 8-bit literal; a
//! `1` flag bit by a 4-bit length (plus [`MIN_MATCH`]) and a 13-bit backwards
//! offset into an 8 KiB window. A length field of all ones ends the stream.

const IDX_BITS: u32 = 13;
const LEN_BITS: u32 =  4;
pub const WIN_LEN: usize = 1 << IDX_BITS;
pub const MIN_MATCH: usize = 3;
const EOSTREAM: usize = MIN_MATCH + (1 << LEN_BITS) - 1;
const MAX_READ: u32 = 16;

// declared sizes are untrusted; grow past this on demand
const MAX_RESERVE: usize = 16 << 20;

#[derive(Debug, thiserror::Error)]
pub enum LzssError {
    #[error("stream too short for a header ({len} bytes, need 8)")]
    MalformedHeader { len: usize },
    #[error("requested a {bits}-bit read (0-16 allowed)")]
    ProtocolViolation { bits: u32 },
    #[error("back-reference with zero offset after {at} output bytes")]
    ZeroOffset { at: usize },
}

/// LSB-first bit reader.
///
/// Running off the end of the input is not an error: the read yields zero and
/// is counted in [`BitReader::underflows`].
pub struct BitReader<'b> {
    bs: &'b [u8],
    pos: usize,
    rack: u32,
    racked: u32,
    underflows: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(bs: &'b [u8]) -> Self {
        Self{bs, pos: 0, rack: 0, racked: 0, underflows: 0}
    }

    pub fn read_bits(&mut self, n: u32) -> Result<u32, LzssError> {
        if n > MAX_READ {return Err(LzssError::ProtocolViolation{bits: n})}

        while self.racked < n {
            let Some(&byte) = self.bs.get(self.pos) else {
                // pending bits stay racked for later reads
                self.underflows += 1;
                if self.underflows == 1 {
                    log::warn!("compressed data underflow at byte {}", self.pos);
                }
                return Ok(0);
            };
            self.rack |= (byte as u32) << self.racked;
            self.racked += 8;
            self.pos += 1;
        }

        let value = self.rack & ((1 << n) - 1);
        self.rack >>= n;
        self.racked -= n;
        Ok(value)
    }

    /// Reads that ran past the end of the input.
    pub fn underflows(&self) -> usize {
        self.underflows
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }
}

struct Window {
    bytes: [u8; WIN_LEN],
    cur_pos: usize,
}

impl Window {
    fn new() -> Self {
        Self{bytes: [0; WIN_LEN], cur_pos: 0}
    }

    fn push(&mut self, byte: u8) {
        self.bytes[self.cur_pos] = byte;
        self.cur_pos = (self.cur_pos + 1) % WIN_LEN;
    }

    // byte at a time; source and destination may overlap
    fn copy_back(&mut self, offset: usize, len: usize, out: &mut Vec<u8>) {
        let mut src_pos = (self.cur_pos + WIN_LEN - offset) % WIN_LEN;
        for _ in 0 .. len {
            let byte = self.bytes[src_pos];
            out.push(byte);
            self.push(byte);
            src_pos = (src_pos + 1) % WIN_LEN;
        }
    }
}

/// Output of a decode, with what went wrong along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expanded {
    pub bytes: Vec<u8>,
    pub declared: usize,
    pub underflows: usize,
    pub sentinel: bool,
}

impl Expanded {
    /// The stream ended before the declared size was reached.
    pub fn is_short(&self) -> bool {
        self.bytes.len() < self.declared
    }

    pub fn is_suspect(&self) -> bool {
        self.underflows != 0 || self.is_short()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Decodes `payload` until `size` bytes have been produced or the end-of-stream
/// token is read, whichever comes first.
pub fn expand(payload: &[u8], size: usize) -> Result<Expanded, LzssError> {
    let mut bits = BitReader::new(payload);
    let mut window = Window::new();
    let mut out = Vec::with_capacity(size.min(MAX_RESERVE));
    let mut sentinel = false;

    while out.len() < size {
        let is_match = bits.read_bits(1)? != 0;
        if !is_match {
            let byte = bits.read_bits(8)? as u8;
            out.push(byte);
            window.push(byte);
        }
        else {
            let len = bits.read_bits(LEN_BITS)? as usize + MIN_MATCH;
            if len == EOSTREAM {sentinel = true; break}
            let offset = bits.read_bits(IDX_BITS)? as usize;
            if offset == 0 {return Err(LzssError::ZeroOffset{at: out.len()})}
            window.copy_back(offset, len, &mut out);
        }
    }

    out.truncate(size);

    if sentinel {
        log::warn!("end of stream after {} of {size} bytes", out.len());
    }
    log::debug!("expanded {} -> {} bytes ({} read, {} underflows)",
        payload.len(), out.len(), bits.position(), bits.underflows());

    Ok(Expanded {
        bytes: out,
        declared: size,
        underflows: bits.underflows(),
        sentinel,
    })
}
