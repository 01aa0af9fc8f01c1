//! # 高对称路径数据模型
//!
//! 表示倒空间中的高对称 q 点表 (label → 分数坐标) 以及按段划分的路径。
//! 该结构即 `qpoints.yaml` 的内容，可被后续绘图步骤重新读取。
//!
//! ## 依赖关系
//! - 被 `symmetry/`、`models/band_conf.rs` 和 `commands/` 使用
//! - 使用 `serde_yaml` 读写

use crate::error::{BandPathError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 坐标保留的小数位数
pub const COORD_DECIMALS: i32 = 3;

/// 保留 3 位小数（与 numpy.round 一致，.5 向偶数舍入）
///
/// 所有输出坐标都必须经过这一个函数，保证同一 q 点在不同位置输出的文本一致。
pub fn round_coord(x: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS);
    // + 0.0 把 -0.0 规整为 0.0
    (x * scale).round_ties_even() / scale + 0.0
}

/// 坐标的文本形式：最短可还原的十进制，至少带一位小数 ("0.0", "0.5", "-0.25")
pub fn format_coord(x: f64) -> String {
    format!("{:?}", x)
}

/// 高对称路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KPath {
    /// q 点标签 → 倒格子分数坐标
    pub kpoints: BTreeMap<String, [f64; 3]>,

    /// 路径：若干段，每段是有序的标签序列
    pub path: Vec<Vec<String>>,
}

impl KPath {
    pub fn new(kpoints: BTreeMap<String, [f64; 3]>, path: Vec<Vec<String>>) -> Self {
        KPath { kpoints, path }
    }

    /// 所有坐标保留 3 位小数后的副本
    pub fn rounded(&self) -> Self {
        let kpoints = self
            .kpoints
            .iter()
            .map(|(label, q)| {
                (
                    label.clone(),
                    [round_coord(q[0]), round_coord(q[1]), round_coord(q[2])],
                )
            })
            .collect();

        KPath {
            kpoints,
            path: self.path.clone(),
        }
    }

    /// 查找标签对应的坐标
    pub fn resolve(&self, label: &str) -> Result<[f64; 3]> {
        self.kpoints.get(label).copied().ok_or_else(|| {
            BandPathError::SymmetryDetectionFailure(format!(
                "path references label '{}' missing from the q-point table",
                label
            ))
        })
    }

    /// 检查路径非空，且每个标签都在 q 点表中
    pub fn validate(&self) -> Result<()> {
        if self.path.iter().all(|segment| segment.is_empty()) {
            return Err(BandPathError::SymmetryDetectionFailure(
                "empty q-point path".to_string(),
            ));
        }
        for label in self.path.iter().flatten() {
            self.resolve(label)?;
        }
        Ok(())
    }

    /// 序列化为 YAML 文本
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// 从 YAML 文本解析
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self> {
        let kpath: KPath = serde_yaml::from_str(content)
            .map_err(|e| BandPathError::malformed(origin, e.to_string()))?;
        kpath.validate()?;
        Ok(kpath)
    }

    /// 读取 qpoints.yaml
    pub fn read_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BandPathError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| BandPathError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_yaml_str(&content, &path.display().to_string())
    }
}
