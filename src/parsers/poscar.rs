//! # VASP POSCAR 格式解析器
//!
//! 解析 VASP POSCAR/CONTCAR 文件格式，作为没有 phonopy_disp.yaml 时的结构来源。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor (negative = target volume)
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{BandPathError, Result};
use crate::models::structure::is_valid_symbol;
use crate::models::{Atom, Crystal, Lattice};
use std::fs;
use std::path::Path;

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| BandPathError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 POSCAR 格式
///
/// `origin` 仅用于错误信息。
pub fn parse_poscar_content(content: &str, origin: &str) -> Result<Crystal> {
    let malformed = |reason: String| BandPathError::malformed(origin, reason);
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(malformed("File too short".to_string()));
    }

    // Line 0: Comment/name
    let name = lines[0].trim().to_string();

    // Line 1: Scaling factor
    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| malformed(format!("Invalid scaling factor: '{}'", lines[1].trim())))?;

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for i in 0..3 {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .take(3)
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(malformed(format!("Invalid lattice vector at line {}", 3 + i)));
        }
        matrix[i] = [parts[0], parts[1], parts[2]];
    }
    let raw_lattice = Lattice::from_vectors(matrix);
    let scale = if scale < 0.0 {
        // 负的缩放因子表示目标体积
        let volume = raw_lattice.volume().abs();
        if volume < 1e-12 {
            return Err(malformed("Cannot rescale a zero-volume lattice".to_string()));
        }
        (-scale / volume).cbrt()
    } else {
        scale
    };
    let lattice = raw_lattice.scaled(scale);

    // Line 5: Element symbols (VASP 5+) or atom counts (VASP 4)
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    if line5_parts.is_empty() {
        return Err(malformed("Missing element/count line".to_string()));
    }
    let (elements, counts, atom_line_start) = if line5_parts[0].parse::<usize>().is_ok() {
        // VASP 4 format: no element line, only counts
        // 元素只能从注释行获取
        let counts = parse_counts(lines[5], &malformed)?;
        let elements: Vec<String> = name.split_whitespace().map(clean_symbol).collect();
        if elements.len() != counts.len() {
            return Err(malformed(
                "VASP 4 file without element symbols on the comment line".to_string(),
            ));
        }
        (elements, counts, 6)
    } else {
        // VASP 5+ format: element symbols on line 5, counts on line 6
        let elements: Vec<String> = line5_parts.iter().map(|s| clean_symbol(s)).collect();
        let counts = parse_counts(lines[6], &malformed)?;
        (elements, counts, 7)
    };

    if elements.len() != counts.len() {
        return Err(malformed(format!(
            "{} element symbols but {} atom counts",
            elements.len(),
            counts.len()
        )));
    }
    if let Some(bad) = elements.iter().find(|e| !is_valid_symbol(e)) {
        return Err(malformed(format!("Invalid element symbol '{}'", bad)));
    }

    // Check for "Selective dynamics" line
    let mut coord_line = atom_line_start;
    if lines.len() > coord_line
        && lines[coord_line]
            .trim()
            .to_lowercase()
            .starts_with('s')
    {
        coord_line += 1;
    }

    // Coordinate type line
    if lines.len() <= coord_line {
        return Err(malformed("Missing coordinate type line".to_string()));
    }

    let coord_type = lines[coord_line].trim().to_lowercase();
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');

    // Parse atom positions
    let total: usize = counts.iter().sum();
    let mut atoms: Vec<Atom> = Vec::with_capacity(total);
    let mut line_idx = coord_line + 1;

    for (elem, &count) in elements.iter().zip(counts.iter()) {
        for _ in 0..count {
            let parts: Vec<f64> = lines
                .get(line_idx)
                .map(|l| {
                    l.split_whitespace()
                        .take(3)
                        .filter_map(|s| s.parse().ok())
                        .collect()
                })
                .unwrap_or_default();

            if parts.len() < 3 {
                return Err(malformed(format!(
                    "Expected {} atom positions, position {} is missing or invalid",
                    total,
                    atoms.len() + 1
                )));
            }

            let position = if is_cartesian {
                // Cartesian 坐标同样乘以缩放因子
                cart_to_frac(
                    [parts[0] * scale, parts[1] * scale, parts[2] * scale],
                    &lattice,
                )
            } else {
                [parts[0], parts[1], parts[2]]
            };
            atoms.push(Atom::new(elem.clone(), position));
            line_idx += 1;
        }
    }

    let name = if name.is_empty() {
        origin.to_string()
    } else {
        name
    };
    Ok(Crystal::new(name, lattice, atoms))
}

fn parse_counts(line: &str, malformed: &dyn Fn(String) -> BandPathError) -> Result<Vec<usize>> {
    line.split_whitespace()
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| malformed(format!("Invalid atom count '{}'", s)))
        })
        .collect()
}

/// 去掉 POTCAR 后缀: "Si_pv" -> "Si", "Fe/1a2b3c" -> "Fe"
fn clean_symbol(raw: &str) -> String {
    raw.split(['_', '/']).next().unwrap_or(raw).to_string()
}

/// 笛卡尔坐标转分数坐标
fn cart_to_frac(cart: [f64; 3], lattice: &Lattice) -> [f64; 3] {
    let m = lattice.matrix;
    let det = lattice.volume();

    if det.abs() < 1e-10 {
        return cart;
    }

    let inv = [
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
        ],
    ];

    // 行向量约定: cart = frac · M, 因此 frac = cart · M⁻¹
    [
        cart[0] * inv[0][0] + cart[1] * inv[1][0] + cart[2] * inv[2][0],
        cart[0] * inv[0][1] + cart[1] * inv[1][1] + cart[2] * inv[2][1],
        cart[0] * inv[0][2] + cart[1] * inv[1][2] + cart[2] * inv[2][2],
    ]
}
