//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。只有一个命令，没有子命令。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/band_conf.rs`

use clap::Parser;
use std::path::PathBuf;

/// bandpath - 生成 phonopy 声子能带计算所需的 band.conf
#[derive(Parser, Debug)]
#[command(name = "bandpath")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Derive a high-symmetry q-path and write band.conf / qpoints.yaml for phonopy",
    long_about = None
)]
pub struct Cli {
    /// Directory containing inputs and receiving outputs
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Fallback structure file, used only if phonopy_disp.yaml is absent
    #[arg(long, default_value = "POSCAR")]
    pub poscar: String,

    /// Supercell dimension to write when phonopy_disp.yaml is absent (e.g. "2 2 2")
    #[arg(long)]
    pub dim: Option<String>,

    /// Symmetry tolerance to write when phonopy_disp.yaml is absent
    #[arg(long)]
    pub symmetry_tolerance: Option<String>,
}
