//! # 数据模型模块
//!
//! 定义晶体结构、高对称路径和 band.conf 数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`symmetry/` 和 `commands/` 使用
//! - 子模块: structure, kpath, band_conf

pub mod band_conf;
pub mod kpath;
pub mod structure;
#[cfg(test)]
mod testing;

pub use band_conf::{BandConfig, PriorMetadata};
pub use kpath::KPath;
pub use structure::{Atom, Crystal, Lattice};
