//! # 命令执行模块
//!
//! 实现 band.conf 生成的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `symmetry/`, `utils/`
//! - 子模块: band_conf

pub mod band_conf;

use crate::cli::Cli;
use crate::error::Result;

/// 执行命令
pub fn run(cli: Cli) -> Result<()> {
    band_conf::execute(cli)
}
