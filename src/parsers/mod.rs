//! # 解析器模块
//!
//! 提供结构来源的选择与解析：phonopy_disp.yaml 优先，POSCAR 作为后备。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, phonopy_disp

pub mod phonopy_disp;
pub mod poscar;

use crate::error::{BandPathError, Result};
use crate::models::{Crystal, PriorMetadata};
use phonopy_disp::{PhonopyDisp, PHONOPY_DISP_FILE};
use std::fmt;
use std::path::{Path, PathBuf};

/// 结构来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureSource {
    /// 上一步 phonopy 计算记录的 unit_cell，保证与其完全一致
    FromPriorMetadata(PathBuf),

    /// 普通结构文件 (POSCAR)
    FromStructureFile(PathBuf),
}

/// 读取到的结构，以及来源文件中记录的 DIM / SYMMETRY_TOLERANCE
#[derive(Debug)]
pub struct Loaded {
    pub crystal: Crystal,
    pub metadata: Option<PriorMetadata>,
}

impl StructureSource {
    /// 在目录中选择结构来源
    pub fn select(dir: &Path, poscar_name: &str) -> Result<Self> {
        let disp = dir.join(PHONOPY_DISP_FILE);
        if disp.is_file() {
            return Ok(StructureSource::FromPriorMetadata(disp));
        }

        let poscar = dir.join(poscar_name);
        if poscar.is_file() {
            return Ok(StructureSource::FromStructureFile(poscar));
        }

        Err(BandPathError::FileNotFound {
            path: format!("{} or {}", disp.display(), poscar.display()),
        })
    }

    /// 读取结构；只有 phonopy_disp.yaml 带有元数据
    pub fn load(&self) -> Result<Loaded> {
        match self {
            StructureSource::FromPriorMetadata(path) => {
                let disp = PhonopyDisp::read(path)?;
                Ok(Loaded {
                    metadata: Some(disp.metadata()?),
                    crystal: disp.crystal()?,
                })
            }
            StructureSource::FromStructureFile(path) => Ok(Loaded {
                crystal: poscar::parse_poscar_file(path)?,
                metadata: None,
            }),
        }
    }
}

impl fmt::Display for StructureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureSource::FromPriorMetadata(p) => write!(f, "unit cell of {}", p.display()),
            StructureSource::FromStructureFile(p) => write!(f, "structure file {}", p.display()),
        }
    }
}
