
pub mod cndy;
pub mod comp;
pub mod lzss;

pub use {
    comp::{Header, decompress},
    lzss::{Expanded, LzssError},
};
