//! # 统一错误处理模块
//!
//! 定义 bandpath 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// bandpath 统一错误类型
#[derive(Error, Debug)]
pub enum BandPathError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 输入格式错误
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed input in {path}\nReason: {reason}")]
    MalformedInput { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 对称性错误
    // ─────────────────────────────────────────────────────────────
    #[error("Symmetry detection failed: {0}")]
    SymmetryDetectionFailure(String),

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl BandPathError {
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        BandPathError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, BandPathError>;
