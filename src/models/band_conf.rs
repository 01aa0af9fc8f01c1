//! # phonopy band.conf 数据模型
//!
//! 将高对称路径展平为 phonopy 的 `BAND` / `BAND_LABELS` 字符串，
//! 并与上一步计算的 `DIM`、`SYMMETRY_TOLERANCE` 合并。
//!
//! ## 依赖关系
//! - 使用 `models/kpath.rs`, `models/structure.rs`
//! - 被 `commands/band_conf.rs` 使用

use super::kpath::{format_coord, KPath};
use super::structure::Crystal;
use crate::error::Result;

/// 从上一步计算 (phonopy_disp.yaml) 原样继承的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorMetadata {
    /// 超胞维度，如 "2 2 2"
    pub dim: String,

    /// 对称性容差，原样输出
    pub symmetry_tolerance: String,
}

/// 构建完成后不可变的 band.conf 内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandConfig {
    dim: String,
    atom_names: Vec<String>,
    band_segments: Vec<String>,
    label_segments: Vec<String>,
    symmetry_tolerance: String,
}

impl BandConfig {
    /// 由 (已保留 3 位小数的) 路径、结构和元数据构建
    pub fn build(kpath: &KPath, crystal: &Crystal, metadata: &PriorMetadata) -> Result<Self> {
        let mut band_segments = Vec::with_capacity(kpath.path.len());
        let mut label_segments = Vec::with_capacity(kpath.path.len());

        for segment in &kpath.path {
            let mut coords = Vec::with_capacity(segment.len());
            for label in segment {
                let q = kpath.resolve(label)?;
                coords.push(
                    q.iter()
                        .map(|&x| format_coord(x))
                        .collect::<Vec<_>>()
                        .join(" "),
                );
            }
            band_segments.push(coords.join(" "));
            label_segments.push(segment.join(" "));
        }

        Ok(BandConfig {
            dim: metadata.dim.clone(),
            atom_names: crystal
                .unique_species()
                .into_iter()
                .map(String::from)
                .collect(),
            band_segments,
            label_segments,
            symmetry_tolerance: metadata.symmetry_tolerance.clone(),
        })
    }

    pub fn atom_names(&self) -> &[String] {
        &self.atom_names
    }

    pub fn segment_count(&self) -> usize {
        self.band_segments.len()
    }

    /// `BAND = ...` 行（不含换行）
    pub fn band_line(&self) -> String {
        format!("BAND = {}", self.band_segments.join(", "))
    }

    /// `BAND_LABELS = ...` 行（不含换行）
    pub fn band_labels_line(&self) -> String {
        format!("BAND_LABELS = {}", self.label_segments.join(" "))
    }

    /// 完整的 band.conf 文本
    pub fn render(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("DIM = {}\n", self.dim));
        result.push_str(&format!("ATOM_NAME = {}\n", self.atom_names.join(" ")));
        result.push_str(&self.band_line());
        result.push('\n');
        result.push_str(&self.band_labels_line());
        result.push('\n');
        result.push_str(&format!(
            "SYMMETRY_TOLERANCE = {}\n",
            self.symmetry_tolerance
        ));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};
    use std::collections::BTreeMap;

    fn si() -> Crystal {
        let lattice = Lattice::from_parameters(5.43, 5.43, 5.43, 90.0, 90.0, 90.0);
        Crystal::new(
            "Si",
            lattice,
            vec![
                Atom::new("Si", [0.0, 0.0, 0.0]),
                Atom::new("Si", [0.25, 0.25, 0.25]),
            ],
        )
    }

    fn gamma_x() -> KPath {
        let mut kpoints = BTreeMap::new();
        kpoints.insert("GAMMA".to_string(), [0.0, 0.0, 0.0]);
        kpoints.insert("X".to_string(), [0.5, 0.0, 0.5]);
        KPath::new(
            kpoints,
            vec![
                vec!["GAMMA".to_string(), "X".to_string()],
                vec!["X".to_string(), "GAMMA".to_string()],
            ],
        )
    }

    fn metadata() -> PriorMetadata {
        PriorMetadata {
            dim: "2 2 2".to_string(),
            symmetry_tolerance: "1e-05".to_string(),
        }
    }

    #[test]
    fn test_band_lines_for_silicon() {
        let conf = BandConfig::build(&gamma_x(), &si(), &metadata()).unwrap();

        assert_eq!(
            conf.band_line(),
            "BAND = 0.0 0.0 0.0 0.5 0.0 0.5, 0.5 0.0 0.5 0.0 0.0 0.0"
        );
        assert_eq!(conf.band_labels_line(), "BAND_LABELS = GAMMA X X GAMMA");
        assert_eq!(conf.atom_names(), ["Si".to_string()]);
        assert_eq!(conf.segment_count(), 2);
    }

    #[test]
    fn test_render_line_order() {
        let conf = BandConfig::build(&gamma_x(), &si(), &metadata()).unwrap();
        let text = conf.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "DIM = 2 2 2");
        assert_eq!(lines[1], "ATOM_NAME = Si");
        assert_eq!(lines[2], conf.band_line());
        assert_eq!(lines[3], conf.band_labels_line());
        assert_eq!(lines[4], "SYMMETRY_TOLERANCE = 1e-05");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_labels_line_up_with_coordinates() {
        let mut kpath = gamma_x();
        kpath.kpoints.insert("L".to_string(), [0.5, 0.5, 0.5]);
        kpath.path[1].push("L".to_string());
        let kpath = kpath.rounded();

        let conf = BandConfig::build(&kpath, &si(), &metadata()).unwrap();
        let band = conf.band_line();
        let labels = conf.band_labels_line();

        let band_segments: Vec<&str> = band.trim_start_matches("BAND = ").split(", ").collect();
        for (segment, labels) in band_segments.iter().zip(&kpath.path) {
            let values: Vec<f64> = segment
                .split_whitespace()
                .map(|s| s.parse().unwrap())
                .collect();
            assert_eq!(values.len(), labels.len() * 3);
            for (triplet, label) in values.chunks(3).zip(labels) {
                assert_eq!(triplet, kpath.kpoints[label].as_slice());
            }
        }
        assert_eq!(labels, "BAND_LABELS = GAMMA X X GAMMA L");
    }

    #[test]
    fn test_atom_names_unique() {
        let mut crystal = si();
        crystal.atoms.insert(0, Atom::new("O", [0.5, 0.5, 0.5]));
        crystal.atoms.push(Atom::new("O", [0.75, 0.75, 0.75]));

        let conf = BandConfig::build(&gamma_x(), &crystal, &metadata()).unwrap();
        assert_eq!(conf.atom_names(), ["O".to_string(), "Si".to_string()]);
        assert!(conf.render().contains("ATOM_NAME = O Si\n"));
    }

    #[test]
    fn test_unresolved_label_fails() {
        let mut kpath = gamma_x();
        kpath.path[0].push("W".to_string());
        assert!(BandConfig::build(&kpath, &si(), &metadata()).is_err());
    }
}
