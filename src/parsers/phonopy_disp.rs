//! # phonopy_disp.yaml 解析器
//!
//! 只读取本工具需要的字段：
//! ```text
//! phonopy:
//!   configuration:
//!     dim: "2 2 2"
//!     symmetry_tolerance: "1e-05"
//! unit_cell:
//!   lattice:
//!   - [ 5.43, 0.00, 0.00 ] # a
//!   ...
//!   points:
//!   - symbol: Si # 1
//!     coordinates: [ 0.875, 0.875, 0.875 ]
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 和 `commands/band_conf.rs` 使用
//! - 使用 `models/`

use crate::error::{BandPathError, Result};
use crate::models::structure::is_valid_symbol;
use crate::models::{Atom, Crystal, Lattice, PriorMetadata};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// phonopy 写出的位移文件名
pub const PHONOPY_DISP_FILE: &str = "phonopy_disp.yaml";

mod raw {
    use super::*;

    #[derive(Deserialize)]
    pub(super) struct DispYaml {
        pub phonopy: Option<Phonopy>,
        pub unit_cell: Option<Cell>,
    }

    #[derive(Deserialize)]
    pub(super) struct Phonopy {
        #[serde(default)]
        pub configuration: BTreeMap<String, Value>,
    }

    #[derive(Deserialize)]
    pub(super) struct Cell {
        pub lattice: [[f64; 3]; 3],
        pub points: Vec<Point>,
    }

    #[derive(Deserialize)]
    pub(super) struct Point {
        pub symbol: String,
        pub coordinates: [f64; 3],
    }
}

/// 解析后的 phonopy_disp.yaml
pub struct PhonopyDisp {
    origin: String,
    configuration: BTreeMap<String, Value>,
    unit_cell: Option<raw::Cell>,
}

impl PhonopyDisp {
    /// 读取 phonopy_disp.yaml
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BandPathError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::parse(&content, &path.display().to_string())
    }

    /// 从字符串内容解析
    pub fn parse(content: &str, origin: &str) -> Result<Self> {
        let raw::DispYaml { phonopy, unit_cell } = serde_yaml::from_str(content)
            .map_err(|e| BandPathError::malformed(origin, e.to_string()))?;

        Ok(PhonopyDisp {
            origin: origin.to_string(),
            configuration: phonopy.map(|p| p.configuration).unwrap_or_default(),
            unit_cell,
        })
    }

    /// `phonopy.configuration` 中的 dim 与 symmetry_tolerance
    pub fn metadata(&self) -> Result<PriorMetadata> {
        Ok(PriorMetadata {
            dim: self.configuration_value("dim")?,
            symmetry_tolerance: self.configuration_value("symmetry_tolerance")?,
        })
    }

    /// 由 `unit_cell` 重建晶体结构
    pub fn crystal(&self) -> Result<Crystal> {
        let cell = self
            .unit_cell
            .as_ref()
            .ok_or_else(|| BandPathError::malformed(&self.origin, "missing 'unit_cell'"))?;

        let mut atoms = Vec::with_capacity(cell.points.len());
        for (i, point) in cell.points.iter().enumerate() {
            if !is_valid_symbol(&point.symbol) {
                return Err(BandPathError::malformed(
                    &self.origin,
                    format!("invalid symbol '{}' at unit_cell point {}", point.symbol, i + 1),
                ));
            }
            if point.coordinates.iter().any(|x| !x.is_finite()) {
                return Err(BandPathError::malformed(
                    &self.origin,
                    format!("non-finite coordinates at unit_cell point {}", i + 1),
                ));
            }
            atoms.push(Atom::new(point.symbol.clone(), point.coordinates));
        }

        Ok(Crystal::new(
            PHONOPY_DISP_FILE,
            Lattice::from_vectors(cell.lattice),
            atoms,
        ))
    }

    /// 将配置项原样转成文本
    fn configuration_value(&self, key: &str) -> Result<String> {
        let missing = || {
            BandPathError::malformed(
                &self.origin,
                format!("missing 'phonopy.configuration.{}'", key),
            )
        };

        match self.configuration.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(match n.as_f64() {
                Some(x) if n.is_f64() => format_float(x),
                _ => n.to_string(),
            }),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(Value::Null) | None => Err(missing()),
            Some(_) => Err(BandPathError::malformed(
                &self.origin,
                format!("'phonopy.configuration.{}' is not a scalar", key),
            )),
        }
    }
}

/// 浮点数的最短文本表示，与 phonopy 自身写出的一致：
/// 十进制指数小于 -4 或不小于 16 时用科学计数法 (`1e-05`, `2.5e+16`)，
/// 否则用小数 (`0.001`, `2.0`)
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sci = format!("{:e}", x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if x != 0.0 && !(-4..16).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exp.abs());
    }

    let plain = x.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}
