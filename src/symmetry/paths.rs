//! # 标准高对称路径
//!
//! Setyawan & Curtarolo, Comput. Mater. Sci. 49, 299 (2010) 中各 Bravais
//! 晶格的高对称点与推荐路径。坐标先在标准设置下给出，
//! 再经 `Frame` 变换到输入晶胞的倒格子基。
//!
//! ## 依赖关系
//! - 被 `symmetry/mod.rs` 使用
//! - 使用 `symmetry/bravais.rs`, `models/kpath.rs`

use super::bravais::{Classification, LatticeKind};
use crate::models::KPath;
use std::collections::BTreeMap;

pub const GAMMA: &str = "GAMMA";

/// 由识别结果生成路径（未舍入）
pub fn standard_path(class: &Classification) -> KPath {
    let (points, path) = match class.kind {
        LatticeKind::Cubic => cubic(),
        LatticeKind::FaceCenteredCubic => face_centered_cubic(),
        LatticeKind::BodyCenteredCubic => body_centered_cubic(),
        LatticeKind::Tetragonal => tetragonal(),
        LatticeKind::Orthorhombic => orthorhombic(),
        LatticeKind::Hexagonal { wide } => hexagonal(wide),
        LatticeKind::Rhombohedral { alpha } if alpha < 90.0 => rhombohedral_acute(alpha),
        LatticeKind::Rhombohedral { alpha } => rhombohedral_obtuse(alpha),
        LatticeKind::Monoclinic { b, c, alpha } => monoclinic(b, c, alpha),
        LatticeKind::Triclinic => triclinic(),
    };

    let mut kpoints = BTreeMap::new();
    kpoints.insert(GAMMA.to_string(), [0.0, 0.0, 0.0]);
    for (label, q) in points {
        kpoints.insert(label.to_string(), class.frame.apply(q));
    }

    let path = path
        .iter()
        .map(|segment| segment.iter().map(|s| s.to_string()).collect())
        .collect();

    KPath::new(kpoints, path)
}

type Points = Vec<(&'static str, [f64; 3])>;
type Segments = Vec<Vec<&'static str>>;

fn cubic() -> (Points, Segments) {
    (
        vec![
            ("M", [0.5, 0.5, 0.0]),
            ("R", [0.5, 0.5, 0.5]),
            ("X", [0.0, 0.5, 0.0]),
        ],
        vec![vec![GAMMA, "X", "M", GAMMA, "R", "X"], vec!["M", "R"]],
    )
}

fn face_centered_cubic() -> (Points, Segments) {
    (
        vec![
            ("K", [3.0 / 8.0, 3.0 / 8.0, 3.0 / 4.0]),
            ("L", [0.5, 0.5, 0.5]),
            ("U", [5.0 / 8.0, 1.0 / 4.0, 5.0 / 8.0]),
            ("W", [0.5, 1.0 / 4.0, 3.0 / 4.0]),
            ("X", [0.5, 0.0, 0.5]),
        ],
        vec![
            vec![GAMMA, "X", "W", "K", GAMMA, "L", "U", "W", "L", "K"],
            vec!["U", "X"],
        ],
    )
}

fn body_centered_cubic() -> (Points, Segments) {
    (
        vec![
            ("H", [0.5, -0.5, 0.5]),
            ("N", [0.0, 0.0, 0.5]),
            ("P", [0.25, 0.25, 0.25]),
        ],
        vec![vec![GAMMA, "H", "N", GAMMA, "P", "H"], vec!["P", "N"]],
    )
}

fn tetragonal() -> (Points, Segments) {
    (
        vec![
            ("A", [0.5, 0.5, 0.5]),
            ("M", [0.5, 0.5, 0.0]),
            ("R", [0.0, 0.5, 0.5]),
            ("X", [0.0, 0.5, 0.0]),
            ("Z", [0.0, 0.0, 0.5]),
        ],
        vec![
            vec![GAMMA, "X", "M", GAMMA, "Z", "R", "A", "Z"],
            vec!["X", "R"],
            vec!["M", "A"],
        ],
    )
}

fn orthorhombic() -> (Points, Segments) {
    (
        vec![
            ("R", [0.5, 0.5, 0.5]),
            ("S", [0.5, 0.5, 0.0]),
            ("T", [0.0, 0.5, 0.5]),
            ("U", [0.5, 0.0, 0.5]),
            ("X", [0.5, 0.0, 0.0]),
            ("Y", [0.0, 0.5, 0.0]),
            ("Z", [0.0, 0.0, 0.5]),
        ],
        vec![
            vec![GAMMA, "X", "S", "Y", GAMMA, "Z", "U", "R", "T", "Z"],
            vec!["Y", "T"],
            vec!["U", "X"],
            vec!["S", "R"],
        ],
    )
}

/// `wide`: a、b 夹角 60° 时，六角形布里渊区顶点位于 (2/3, 1/3)
fn hexagonal(wide: bool) -> (Points, Segments) {
    let (k1, k2) = if wide {
        (2.0 / 3.0, 1.0 / 3.0)
    } else {
        (1.0 / 3.0, 1.0 / 3.0)
    };
    (
        vec![
            ("A", [0.0, 0.0, 0.5]),
            ("H", [k1, k2, 0.5]),
            ("K", [k1, k2, 0.0]),
            ("L", [0.5, 0.0, 0.5]),
            ("M", [0.5, 0.0, 0.0]),
        ],
        vec![
            vec![GAMMA, "M", "K", GAMMA, "A", "L", "H", "A"],
            vec!["L", "M"],
            vec!["K", "H"],
        ],
    )
}

/// RHL1 (alpha < 90°)
fn rhombohedral_acute(alpha: f64) -> (Points, Segments) {
    let cos = alpha.to_radians().cos();
    let eta = (1.0 + 4.0 * cos) / (2.0 + 4.0 * cos);
    let nu = 0.75 - eta / 2.0;
    (
        vec![
            ("B", [eta, 0.5, 1.0 - eta]),
            ("B_1", [0.5, 1.0 - eta, eta - 1.0]),
            ("F", [0.5, 0.5, 0.0]),
            ("L", [0.5, 0.0, 0.0]),
            ("L_1", [0.0, 0.0, -0.5]),
            ("P", [eta, nu, nu]),
            ("P_1", [1.0 - nu, 1.0 - nu, 1.0 - eta]),
            ("P_2", [nu, nu, eta - 1.0]),
            ("Q", [1.0 - nu, nu, 0.0]),
            ("X", [nu, 0.0, -nu]),
            ("Z", [0.5, 0.5, 0.5]),
        ],
        vec![
            vec![GAMMA, "L", "B_1"],
            vec!["B", "Z", GAMMA, "X"],
            vec!["Q", "F", "P_1", "Z"],
            vec!["L", "P"],
        ],
    )
}

/// RHL2 (alpha > 90°)
fn rhombohedral_obtuse(alpha: f64) -> (Points, Segments) {
    let half_tan = (alpha.to_radians() / 2.0).tan();
    let eta = 1.0 / (2.0 * half_tan * half_tan);
    let nu = 0.75 - eta / 2.0;
    (
        vec![
            ("F", [0.5, -0.5, 0.0]),
            ("L", [0.5, 0.0, 0.0]),
            ("P", [1.0 - nu, -nu, 1.0 - nu]),
            ("P_1", [nu, nu - 1.0, nu - 1.0]),
            ("Q", [eta, eta, eta]),
            ("Q_1", [1.0 - eta, -eta, -eta]),
            ("Z", [0.5, -0.5, 0.5]),
        ],
        vec![vec![
            GAMMA, "P", "Z", "Q", GAMMA, "F", "P_1", "Q_1", "L", "Z",
        ]],
    )
}

/// MCL，唯一轴为标准 a 轴，alpha 为 b、c 夹角
fn monoclinic(b: f64, c: f64, alpha: f64) -> (Points, Segments) {
    let (sin, cos) = alpha.to_radians().sin_cos();
    let eta = (1.0 - b * cos / c) / (2.0 * sin * sin);
    let nu = 0.5 - eta * c * cos / b;
    (
        vec![
            ("A", [0.5, 0.5, 0.0]),
            ("C", [0.0, 0.5, 0.5]),
            ("D", [0.5, 0.0, 0.5]),
            ("D_1", [0.5, 0.0, -0.5]),
            ("E", [0.5, 0.5, 0.5]),
            ("H", [0.0, eta, 1.0 - nu]),
            ("H_1", [0.0, 1.0 - eta, nu]),
            ("H_2", [0.0, eta, -nu]),
            ("M", [0.5, eta, 1.0 - nu]),
            ("M_1", [0.5, 1.0 - eta, nu]),
            ("M_2", [0.5, eta, -nu]),
            ("X", [0.0, 0.5, 0.0]),
            ("Y", [0.0, 0.0, 0.5]),
            ("Y_1", [0.0, 0.0, -0.5]),
            ("Z", [0.5, 0.0, 0.0]),
        ],
        vec![
            vec![GAMMA, "Y", "H", "C", "E", "M_1", "A", "X", "H_1"],
            vec!["M", "D", "Z"],
            vec!["Y", "D"],
        ],
    )
}

fn triclinic() -> (Points, Segments) {
    (
        vec![
            ("L", [0.5, 0.5, 0.0]),
            ("M", [0.0, 0.5, 0.5]),
            ("N", [0.5, 0.0, 0.5]),
            ("R", [0.5, 0.5, 0.5]),
            ("X", [0.5, 0.0, 0.0]),
            ("Y", [0.0, 0.5, 0.0]),
            ("Z", [0.0, 0.0, 0.5]),
        ],
        vec![
            vec!["X", GAMMA, "Y"],
            vec!["L", GAMMA, "Z"],
            vec!["N", GAMMA, "M"],
            vec!["R", GAMMA],
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetry::bravais::Frame;

    fn all_kinds() -> Vec<LatticeKind> {
        vec![
            LatticeKind::Cubic,
            LatticeKind::FaceCenteredCubic,
            LatticeKind::BodyCenteredCubic,
            LatticeKind::Tetragonal,
            LatticeKind::Orthorhombic,
            LatticeKind::Hexagonal { wide: false },
            LatticeKind::Hexagonal { wide: true },
            LatticeKind::Rhombohedral { alpha: 70.0 },
            LatticeKind::Rhombohedral { alpha: 110.0 },
            LatticeKind::Monoclinic {
                b: 4.0,
                c: 6.0,
                alpha: 75.0,
            },
            LatticeKind::Triclinic,
        ]
    }

    #[test]
    fn test_every_path_label_is_defined() {
        for kind in all_kinds() {
            let kpath = standard_path(&Classification {
                kind,
                frame: Frame::identity(),
            });
            assert!(kpath.validate().is_ok(), "{kind} has dangling labels");
            assert_eq!(kpath.kpoints[GAMMA], [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_fcc_points() {
        let kpath = standard_path(&Classification {
            kind: LatticeKind::FaceCenteredCubic,
            frame: Frame::identity(),
        });
        assert_eq!(kpath.kpoints["X"], [0.5, 0.0, 0.5]);
        assert_eq!(kpath.kpoints["K"], [0.375, 0.375, 0.75]);
        assert_eq!(kpath.path.len(), 2);
        assert_eq!(kpath.path[1], vec!["U".to_string(), "X".to_string()]);
    }

    #[test]
    fn test_hexagonal_wide_corner() {
        let kpath = standard_path(&Classification {
            kind: LatticeKind::Hexagonal { wide: true },
            frame: Frame::identity(),
        })
        .rounded();
        assert_eq!(kpath.kpoints["K"], [0.667, 0.333, 0.0]);
        assert_eq!(kpath.kpoints["H"], [0.667, 0.333, 0.5]);
    }

    #[test]
    fn test_rhl1_at_60_degrees_matches_fcc_l() {
        // alpha = 60° 时 eta = 3/4，nu = 3/8
        let kpath = standard_path(&Classification {
            kind: LatticeKind::Rhombohedral { alpha: 60.0 },
            frame: Frame::identity(),
        })
        .rounded();
        assert_eq!(kpath.kpoints["P"], [0.75, 0.375, 0.375]);
        assert_eq!(kpath.kpoints["Z"], [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_frame_is_applied() {
        let kpath = standard_path(&Classification {
            kind: LatticeKind::Tetragonal,
            frame: Frame::signed_permutation([1, 2, 0], [1.0; 3]),
        });
        assert_eq!(kpath.kpoints["Z"], [0.5, 0.0, 0.0]);
        assert_eq!(kpath.kpoints["X"], [0.0, 0.0, 0.5]);
    }
}
