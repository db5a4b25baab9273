//! Token-level stream builder and a greedy packer for round-trip tests.

#![allow(dead_code)]

pub const WIN_LEN: usize = 8192;
pub const MAX_MATCH: usize = 17;

/// LSB-first bit packer mirroring the decoder's reader.
#[derive(Default)]
pub struct Tokens {
    bytes: Vec<u8>,
    rack: u32,
    racked: u32,
}

impl Tokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, value: u32, n: u32) -> &mut Self {
        assert!(n <= 16 && value < 1 << n);
        self.rack |= value << self.racked;
        self.racked += n;
        while self.racked >= 8 {
            self.bytes.push(self.rack as u8);
            self.rack >>= 8;
            self.racked -= 8;
        }
        self
    }

    pub fn literal(&mut self, byte: u8) -> &mut Self {
        self.put(0, 1).put(byte as u32, 8)
    }

    pub fn literals(&mut self, bytes: &[u8]) -> &mut Self {
        for &byte in bytes {self.literal(byte);}
        self
    }

    pub fn back_ref(&mut self, offset: u32, len: usize) -> &mut Self {
        assert!((3 ..= MAX_MATCH).contains(&len));
        self.put(1, 1).put(len as u32 - 3, 4).put(offset, 13)
    }

    pub fn sentinel(&mut self) -> &mut Self {
        self.put(1, 1).put(0xf, 4)
    }

    pub fn finish(&mut self) -> Vec<u8> {
        if self.racked != 0 {
            self.bytes.push(self.rack as u8);
        }
        self.rack = 0;
        self.racked = 0;
        std::mem::take(&mut self.bytes)
    }
}

pub fn container(size: u32, payload: &[u8]) -> Vec<u8> {
    let mut stream = b"COMP".to_vec();
    stream.extend_from_slice(&size.to_be_bytes());
    stream.extend_from_slice(payload);
    stream
}

/// Greedy longest-match packing; only refers back into bytes already emitted.
pub fn pack(data: &[u8]) -> Vec<u8> {
    let mut tokens = Tokens::new();
    let mut i = 0;
    while i < data.len() {
        let (offset, len) = longest_match(data, i);
        if len >= 3 {
            tokens.back_ref(offset as u32, len);
            i += len;
        }
        else {
            tokens.literal(data[i]);
            i += 1;
        }
    }
    tokens.sentinel();
    container(data.len() as u32, &tokens.finish())
}

fn longest_match(data: &[u8], at: usize) -> (usize, usize) {
    let max_len = MAX_MATCH.min(data.len() - at);
    let mut best = (0, 0);
    for offset in 1 ..= at.min(WIN_LEN - 1) {
        let len = (0 .. max_len)
            .take_while(|&k| data[at - offset + k] == data[at + k])
            .count();
        if len > best.1 {
            best = (offset, len);
            if len == max_len {break}
        }
    }
    best
}

/// Reference expansion of a token list straight onto the output.
pub fn replay(ops: &[Op]) -> Vec<u8> {
    let mut out = Vec::new();
    for op in ops {
        match *op {
            Op::Lit(byte) => out.push(byte),
            Op::Ref(offset, len) => for _ in 0 .. len {
                out.push(out[out.len() - offset as usize]);
            },
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
pub enum Op {
    Lit(u8),
    Ref(u32, usize),
}

pub fn encode(ops: &[Op]) -> Vec<u8> {
    let mut tokens = Tokens::new();
    for op in ops {
        match *op {
            Op::Lit(byte) => tokens.literal(byte),
            Op::Ref(offset, len) => tokens.back_ref(offset, len),
        };
    }
    tokens.finish()
}
