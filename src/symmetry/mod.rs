//! # 对称性路径模块
//!
//! 由晶体结构得到高对称 q 点路径。流水线只依赖 `KPathProvider` trait，
//! 默认实现 `StandardKPath` 在进程内完成晶格识别与标准路径生成。
//!
//! ## 依赖关系
//! - 被 `commands/band_conf.rs` 使用
//! - 使用 `models/`
//! - 子模块: bravais, paths

pub mod bravais;
pub mod paths;

use crate::error::Result;
use crate::models::{Crystal, KPath};
use bravais::{Classification, ANGLE_TOLERANCE};

/// 生成路径时使用的对称性容差 (Å)，比严格的晶体学容差宽松，
/// 用于合并近似对称的点
pub const KPATH_SYMPREC: f64 = 0.2;

/// 路径及其晶格描述
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPath {
    /// 未舍入的路径；所有路径标签都必须出现在 q 点表中
    pub kpath: KPath,

    /// 用于输出的晶格描述
    pub lattice: Option<String>,
}

/// 高对称路径来源
pub trait KPathProvider {
    fn derive(&self, crystal: &Crystal) -> Result<DerivedPath>;
}

/// 基于 Setyawan-Curtarolo 标准路径的默认实现
#[derive(Debug, Clone, Copy)]
pub struct StandardKPath {
    pub symprec: f64,
    pub angle_tolerance: f64,
}

impl Default for StandardKPath {
    fn default() -> Self {
        StandardKPath {
            symprec: KPATH_SYMPREC,
            angle_tolerance: ANGLE_TOLERANCE,
        }
    }
}

impl StandardKPath {
    pub fn classify(&self, crystal: &Crystal) -> Result<Classification> {
        bravais::classify(crystal, self.symprec, self.angle_tolerance)
    }
}

impl KPathProvider for StandardKPath {
    fn derive(&self, crystal: &Crystal) -> Result<DerivedPath> {
        let class = self.classify(crystal)?;
        let kpath = paths::standard_path(&class);
        kpath.validate()?;
        Ok(DerivedPath {
            kpath,
            lattice: Some(format!("{} lattice", class.kind)),
        })
    }
}
