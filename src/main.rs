//! # bandpath - phonopy 声子能带路径生成工具
//!
//! 为晶体结构推导高对称 q 点路径，写出 phonopy 的 `band.conf`
//! 以及供绘图步骤使用的 `qpoints.yaml`。
//!
//! ## 流程
//! 1. 结构来源：`phonopy_disp.yaml` 的 unit_cell 优先，否则读取 POSCAR
//! 2. 识别晶格类型，生成标准高对称路径 (symprec = 0.2)
//! 3. 坐标保留 3 位小数，展平为 `BAND` / `BAND_LABELS`
//! 4. 合并 `DIM` / `SYMMETRY_TOLERANCE`，写出两个文件
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (POSCAR / phonopy_disp.yaml 解析)
//!   │     ├── symmetry/  (晶格识别与标准路径)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod symmetry;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
