//! # 晶体结构数据模型
//!
//! 定义统一的晶体结构表示，可以从 POSCAR 或 phonopy_disp.yaml 构建。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `symmetry/` 使用
//! - 无外部模块依赖

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 晶格向量长度 (a, b, c)
    pub fn lengths(&self) -> [f64; 3] {
        let m = &self.matrix;
        [norm(m[0]), norm(m[1]), norm(m[2])]
    }

    /// 晶格夹角 (alpha, beta, gamma)，单位：度
    ///
    /// alpha 是 b 与 c 的夹角，beta 是 a 与 c，gamma 是 a 与 b。
    pub fn angles(&self) -> [f64; 3] {
        let m = &self.matrix;
        [
            angle_between(m[1], m[2]),
            angle_between(m[0], m[2]),
            angle_between(m[0], m[1]),
        ]
    }

    /// 计算晶格体积（带符号，左手系为负）
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 分数坐标转笛卡尔坐标
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = &self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 整体缩放晶格向量
    pub fn scaled(&self, factor: f64) -> Self {
        let mut matrix = self.matrix;
        for row in matrix.iter_mut() {
            for x in row.iter_mut() {
                *x *= factor;
            }
        }
        Lattice { matrix }
    }
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

fn angle_between(u: [f64; 3], v: [f64; 3]) -> f64 {
    let cos = dot(u, v) / (norm(u) * norm(v));
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// 原子信息
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq)]
pub struct Crystal {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
        }
    }

    /// 结构中出现的元素（去重，按首次出现的顺序）
    pub fn unique_species(&self) -> Vec<&str> {
        let mut species: Vec<&str> = Vec::new();
        for atom in &self.atoms {
            if !species.contains(&atom.element.as_str()) {
                species.push(atom.element.as_str());
            }
        }
        species
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// 检查元素符号是否合法 (如 "Si", "O", "Uuo")
pub fn is_valid_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            symbol.len() <= 3 && chars.all(|c| c.is_ascii_lowercase())
        }
        _ => false,
    }
}
