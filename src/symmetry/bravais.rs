//! # 晶格类型识别
//!
//! 根据晶格度规（边长、夹角）在给定容差下识别 Bravais 晶格类型，
//! 立方晶胞再根据原子位置判断 F/I 心。
//!
//! 识别结果附带一个 `Frame`：标准设置下的倒格子分数坐标经它变换后，
//! 即为输入晶胞倒格子基下的分数坐标。
//!
//! ## 依赖关系
//! - 被 `symmetry/mod.rs`、`symmetry/paths.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{BandPathError, Result};
use crate::models::Crystal;
use std::fmt;

/// 夹角容差（度）
pub const ANGLE_TOLERANCE: f64 = 5.0;

/// 109.47°，体心立方原胞基矢夹角
const BCC_PRIMITIVE_ANGLE: f64 = 109.471_220_634_490_69;

/// Bravais 晶格类型（Setyawan-Curtarolo 记号）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatticeKind {
    /// 简单立方
    Cubic,
    /// 面心立方
    FaceCenteredCubic,
    /// 体心立方
    BodyCenteredCubic,
    Tetragonal,
    Orthorhombic,
    /// `wide` 表示 a、b 夹角为 60°（而不是 120°）的设置
    Hexagonal { wide: bool },
    /// 菱方，alpha 为基矢夹角（度）
    Rhombohedral { alpha: f64 },
    /// 单斜，标准设置下 b <= c，alpha < 90°
    Monoclinic { b: f64, c: f64, alpha: f64 },
    Triclinic,
}

impl fmt::Display for LatticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeKind::Cubic => write!(f, "CUB"),
            LatticeKind::FaceCenteredCubic => write!(f, "FCC"),
            LatticeKind::BodyCenteredCubic => write!(f, "BCC"),
            LatticeKind::Tetragonal => write!(f, "TET"),
            LatticeKind::Orthorhombic => write!(f, "ORC"),
            LatticeKind::Hexagonal { .. } => write!(f, "HEX"),
            LatticeKind::Rhombohedral { alpha } if *alpha < 90.0 => write!(f, "RHL1"),
            LatticeKind::Rhombohedral { .. } => write!(f, "RHL2"),
            LatticeKind::Monoclinic { .. } => write!(f, "MCL"),
            LatticeKind::Triclinic => write!(f, "TRI"),
        }
    }
}

/// 标准设置 → 输入晶胞 的倒格子分数坐标变换: k_cell = M · k_std
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub matrix: [[f64; 3]; 3],
}

impl Frame {
    pub fn identity() -> Self {
        Frame {
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// 标准轴 i 对应晶胞轴 `axes[i]`，并乘以符号 `signs[i]`
    pub fn signed_permutation(axes: [usize; 3], signs: [f64; 3]) -> Self {
        let mut matrix = [[0.0; 3]; 3];
        for i in 0..3 {
            matrix[axes[i]][i] = signs[i];
        }
        Frame { matrix }
    }

    pub fn apply(&self, k: [f64; 3]) -> [f64; 3] {
        let m = &self.matrix;
        [
            m[0][0] * k[0] + m[0][1] * k[1] + m[0][2] * k[2],
            m[1][0] * k[0] + m[1][1] * k[1] + m[1][2] * k[2],
            m[2][0] * k[0] + m[2][1] * k[1] + m[2][2] * k[2],
        ]
    }
}

/// 识别结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub kind: LatticeKind,
    pub frame: Frame,
}

impl Classification {
    fn standard(kind: LatticeKind) -> Self {
        Classification {
            kind,
            frame: Frame::identity(),
        }
    }
}

/// 识别晶格类型
///
/// 边长以 `symprec` (Å) 比较，夹角以 `angle_tolerance` (度) 比较。
pub fn classify(crystal: &Crystal, symprec: f64, angle_tolerance: f64) -> Result<Classification> {
    if crystal.atoms.is_empty() {
        return Err(BandPathError::SymmetryDetectionFailure(
            "structure contains no sites".to_string(),
        ));
    }

    let lattice = &crystal.lattice;
    let lengths = lattice.lengths();
    let angles = lattice.angles();
    let volume = lattice.volume();

    if !volume.is_finite() || lengths.iter().chain(angles.iter()).any(|x| !x.is_finite()) {
        return Err(BandPathError::SymmetryDetectionFailure(
            "lattice contains non-finite values".to_string(),
        ));
    }
    if lengths.iter().any(|&l| l < 1e-6) || volume.abs() < 1e-8 {
        return Err(BandPathError::SymmetryDetectionFailure(format!(
            "degenerate lattice (volume {:.3e} Å³)",
            volume
        )));
    }

    let same_len = |i: usize, j: usize| (lengths[i] - lengths[j]).abs() < symprec;
    let near = |angle: f64, target: f64| (angle - target).abs() < angle_tolerance;
    let right = |i: usize| near(angles[i], 90.0);

    let all_equal = same_len(0, 1) && same_len(1, 2) && same_len(0, 2);
    let all_right = (0..3).all(right);
    let same_angles = near(angles[0], angles[1]) && near(angles[1], angles[2]);

    // ─────────────────────────────────────────────────────────────
    // 立方与菱方
    // ─────────────────────────────────────────────────────────────
    if all_equal && all_right {
        return Ok(classify_cubic_centering(crystal, symprec));
    }
    if all_equal && same_angles {
        let alpha = (angles[0] + angles[1] + angles[2]) / 3.0;
        let kind = if near(alpha, 60.0) {
            LatticeKind::FaceCenteredCubic
        } else if near(alpha, BCC_PRIMITIVE_ANGLE) {
            LatticeKind::BodyCenteredCubic
        } else {
            LatticeKind::Rhombohedral { alpha }
        };
        return Ok(Classification::standard(kind));
    }

    // ─────────────────────────────────────────────────────────────
    // 四方与六方：找出与另外两轴垂直、且另外两轴等长的唯一轴
    // ─────────────────────────────────────────────────────────────
    for u in 0..3 {
        let (v, w) = ((u + 1) % 3, (u + 2) % 3);
        if !(right(v) && right(w) && same_len(v, w)) {
            continue;
        }
        let frame = Frame::signed_permutation([v, w, u], [1.0; 3]);
        if right(u) {
            return Ok(Classification {
                kind: LatticeKind::Tetragonal,
                frame,
            });
        }
        if near(angles[u], 120.0) || near(angles[u], 60.0) {
            return Ok(Classification {
                kind: LatticeKind::Hexagonal {
                    wide: near(angles[u], 60.0),
                },
                frame,
            });
        }
    }

    if all_right {
        return Ok(Classification::standard(LatticeKind::Orthorhombic));
    }

    // ─────────────────────────────────────────────────────────────
    // 单斜：唯一轴与另外两轴垂直
    // ─────────────────────────────────────────────────────────────
    for u in 0..3 {
        let (mut v, mut w) = ((u + 1) % 3, (u + 2) % 3);
        if !(right(v) && right(w)) || right(u) {
            continue;
        }
        if lengths[v] > lengths[w] {
            std::mem::swap(&mut v, &mut w);
        }
        // alpha > 90° 时翻转 c 轴
        let alpha = angles[u];
        let (alpha, c_sign) = if alpha > 90.0 {
            (180.0 - alpha, -1.0)
        } else {
            (alpha, 1.0)
        };
        return Ok(Classification {
            kind: LatticeKind::Monoclinic {
                b: lengths[v],
                c: lengths[w],
                alpha,
            },
            frame: Frame::signed_permutation([u, v, w], [1.0, 1.0, c_sign]),
        });
    }

    Ok(Classification::standard(LatticeKind::Triclinic))
}

/// 立方晶胞：检查 F 心和 I 心平移是否把每个原子映射到同种原子上
fn classify_cubic_centering(crystal: &Crystal, symprec: f64) -> Classification {
    const FACE: [[f64; 3]; 3] = [[0.0, 0.5, 0.5], [0.5, 0.0, 0.5], [0.5, 0.5, 0.0]];
    const BODY: [f64; 3] = [0.5, 0.5, 0.5];

    if FACE.iter().all(|t| is_translation_symmetric(crystal, *t, symprec)) {
        // FCC 原胞 (0,½,½),(½,0,½),(½,½,0) 的逆变换
        return Classification {
            kind: LatticeKind::FaceCenteredCubic,
            frame: Frame {
                matrix: [[-1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, -1.0]],
            },
        };
    }
    if is_translation_symmetric(crystal, BODY, symprec) {
        // BCC 原胞 (-½,½,½),(½,-½,½),(½,½,-½) 的逆变换
        return Classification {
            kind: LatticeKind::BodyCenteredCubic,
            frame: Frame {
                matrix: [[0.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]],
            },
        };
    }
    Classification::standard(LatticeKind::Cubic)
}

fn is_translation_symmetric(crystal: &Crystal, t: [f64; 3], symprec: f64) -> bool {
    crystal.atoms.iter().all(|atom| {
        crystal
            .atoms
            .iter()
            .filter(|other| other.element == atom.element)
            .any(|other| {
                let mut d = [0.0; 3];
                for k in 0..3 {
                    let x = other.position[k] - atom.position[k] - t[k];
                    d[k] = x - x.round();
                }
                let cart = crystal.lattice.frac_to_cart(d);
                (cart[0] * cart[0] + cart[1] * cart[1] + cart[2] * cart[2]).sqrt() < symprec
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    fn crystal(lattice: Lattice, atoms: &[(&str, [f64; 3])]) -> Crystal {
        Crystal::new(
            "test",
            lattice,
            atoms.iter().map(|(e, p)| Atom::new(*e, *p)).collect(),
        )
    }

    fn kind_of(lattice: Lattice) -> LatticeKind {
        let c = crystal(lattice, &[("Si", [0.0, 0.0, 0.0])]);
        classify(&c, 0.2, ANGLE_TOLERANCE).unwrap().kind
    }

    #[test]
    fn test_simple_cubic() {
        let kind = kind_of(Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0));
        assert_eq!(kind, LatticeKind::Cubic);
    }

    #[test]
    fn test_fcc_primitive_metric() {
        let a = 5.43;
        let lattice = Lattice::from_vectors([
            [0.0, a / 2.0, a / 2.0],
            [a / 2.0, 0.0, a / 2.0],
            [a / 2.0, a / 2.0, 0.0],
        ]);
        assert_eq!(kind_of(lattice), LatticeKind::FaceCenteredCubic);
    }

    #[test]
    fn test_bcc_primitive_metric() {
        let a = 2.87;
        let lattice = Lattice::from_vectors([
            [-a / 2.0, a / 2.0, a / 2.0],
            [a / 2.0, -a / 2.0, a / 2.0],
            [a / 2.0, a / 2.0, -a / 2.0],
        ]);
        assert_eq!(kind_of(lattice), LatticeKind::BodyCenteredCubic);
    }

    #[test]
    fn test_conventional_diamond_is_fcc() {
        let c = crystal(
            Lattice::from_parameters(5.43, 5.43, 5.43, 90.0, 90.0, 90.0),
            &[
                ("Si", [0.0, 0.0, 0.0]),
                ("Si", [0.0, 0.5, 0.5]),
                ("Si", [0.5, 0.0, 0.5]),
                ("Si", [0.5, 0.5, 0.0]),
                ("Si", [0.25, 0.25, 0.25]),
                ("Si", [0.25, 0.75, 0.75]),
                ("Si", [0.75, 0.25, 0.75]),
                ("Si", [0.75, 0.75, 0.25]),
            ],
        );
        let class = classify(&c, 0.2, ANGLE_TOLERANCE).unwrap();
        assert_eq!(class.kind, LatticeKind::FaceCenteredCubic);
        // X = (½,0,½) 在惯用晶胞中为 (0,1,0)
        assert_eq!(class.frame.apply([0.5, 0.0, 0.5]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_conventional_bcc_iron() {
        let c = crystal(
            Lattice::from_parameters(2.87, 2.87, 2.87, 90.0, 90.0, 90.0),
            &[("Fe", [0.0, 0.0, 0.0]), ("Fe", [0.5, 0.5, 0.5])],
        );
        let class = classify(&c, 0.2, ANGLE_TOLERANCE).unwrap();
        assert_eq!(class.kind, LatticeKind::BodyCenteredCubic);
        assert_eq!(class.frame.apply([0.5, -0.5, 0.5]), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_cscl_is_simple_cubic() {
        let c = crystal(
            Lattice::from_parameters(4.11, 4.11, 4.11, 90.0, 90.0, 90.0),
            &[("Cs", [0.0, 0.0, 0.0]), ("Cl", [0.5, 0.5, 0.5])],
        );
        assert_eq!(
            classify(&c, 0.2, ANGLE_TOLERANCE).unwrap().kind,
            LatticeKind::Cubic
        );
    }

    #[test]
    fn test_tetragonal_unique_axis_a() {
        let c = crystal(
            Lattice::from_parameters(6.0, 4.0, 4.0, 90.0, 90.0, 90.0),
            &[("Ti", [0.0, 0.0, 0.0])],
        );
        let class = classify(&c, 0.2, ANGLE_TOLERANCE).unwrap();
        assert_eq!(class.kind, LatticeKind::Tetragonal);
        // 标准 Z 点落在晶胞的 a* 方向
        assert_eq!(class.frame.apply([0.0, 0.0, 0.5]), [0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_hexagonal_settings() {
        let narrow = kind_of(Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 120.0));
        assert_eq!(narrow, LatticeKind::Hexagonal { wide: false });

        let wide = kind_of(Lattice::from_parameters(3.0, 3.0, 5.0, 90.0, 90.0, 60.0));
        assert_eq!(wide, LatticeKind::Hexagonal { wide: true });
    }

    #[test]
    fn test_hexagonal_with_c_close_to_a() {
        // WC: c 与 a 相差不到 0.2 Å
        let c = crystal(
            Lattice::from_parameters(2.906, 2.906, 2.837, 90.0, 90.0, 120.0),
            &[("W", [0.0, 0.0, 0.0]), ("C", [1.0 / 3.0, 2.0 / 3.0, 0.5])],
        );
        let class = classify(&c, 0.2, ANGLE_TOLERANCE).unwrap();
        assert_eq!(class.kind, LatticeKind::Hexagonal { wide: false });
        assert_eq!(class.frame.apply([0.0, 0.0, 0.5]), [0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_orthorhombic() {
        let kind = kind_of(Lattice::from_parameters(3.0, 4.0, 5.0, 90.0, 90.0, 90.0));
        assert_eq!(kind, LatticeKind::Orthorhombic);
    }

    #[test]
    fn test_rhombohedral() {
        let kind = kind_of(Lattice::from_parameters(5.0, 5.0, 5.0, 80.0, 80.0, 80.0));
        assert!(matches!(kind, LatticeKind::Rhombohedral { alpha } if (alpha - 80.0).abs() < 1e-6));
        assert_eq!(kind.to_string(), "RHL1");
    }

    #[test]
    fn test_monoclinic_obtuse_flips_axis() {
        let c = crystal(
            Lattice::from_parameters(5.0, 7.0, 6.0, 90.0, 110.0, 90.0),
            &[("Zr", [0.0, 0.0, 0.0])],
        );
        let class = classify(&c, 0.2, ANGLE_TOLERANCE).unwrap();
        match class.kind {
            LatticeKind::Monoclinic { b, c, alpha } => {
                assert!((b - 5.0).abs() < 1e-9);
                assert!((c - 6.0).abs() < 1e-9);
                assert!((alpha - 70.0).abs() < 1e-6);
            }
            other => panic!("unexpected kind {other}"),
        }
        // 标准 a 轴对应晶胞 b 轴 (唯一轴)
        assert_eq!(class.frame.apply([0.5, 0.0, 0.0]), [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_triclinic() {
        let kind = kind_of(Lattice::from_parameters(3.0, 4.0, 5.0, 70.0, 80.0, 100.0));
        assert_eq!(kind, LatticeKind::Triclinic);
    }

    #[test]
    fn test_degenerate_lattice_fails() {
        let c = crystal(
            Lattice::from_vectors([[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]),
            &[("Si", [0.0, 0.0, 0.0])],
        );
        let err = classify(&c, 0.2, ANGLE_TOLERANCE).unwrap_err();
        assert!(matches!(err, BandPathError::SymmetryDetectionFailure(_)));
    }

    #[test]
    fn test_empty_structure_fails() {
        let c = crystal(
            Lattice::from_parameters(4.0, 4.0, 4.0, 90.0, 90.0, 90.0),
            &[],
        );
        assert!(classify(&c, 0.2, ANGLE_TOLERANCE).is_err());
    }
}
