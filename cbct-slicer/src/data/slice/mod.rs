//! 重建体切片对象的操作.

mod core;
mod save;

pub use self::core::{extract, extract_all, Slice, SliceView};

#[cfg(feature = "rayon")]
pub use self::core::par_extract_all;

pub use save::ImgWriteVis;
