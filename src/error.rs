//! # 统一错误处理模块
//!
//! 定义 nlscan 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 解析错误 (`ParseError`, `UnsupportedFormat`)：记录并跳过对应行/文件
//! - 形状不匹配 (`ShapeMismatch`)：记录并丢弃该文件的贡献
//! - 退化路径段 (`DegenerateSegment`, `InvalidPath`)：配置错误，直接返回调用方
//! - 外部命令失败 (`CommandFailed`, `CommandNotFound`)：向上传播到顶层循环
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// nlscan 统一错误类型
#[derive(Error, Debug)]
pub enum NlscanError {
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

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Shape mismatch in {path}: expected {expected}, found {found}")]
    ShapeMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // k 路径错误
    // ─────────────────────────────────────────────────────────────
    #[error("Segment {segment} has no nonzero coordinate delta; an explicit density is required")]
    DegenerateSegment { segment: usize },

    #[error("Invalid k-path: {0}")]
    InvalidPath(String),

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数与配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid config file {path}\nReason: {reason}")]
    ConfigError { path: String, reason: String },

    #[error("{key} = \"{spin}\" is not an output spin of this session (outputs: {outputs:?})")]
    SpinNotProduced {
        key: String,
        spin: String,
        outputs: Vec<String>,
    },

    // ─────────────────────────────────────────────────────────────
    // 数组持久化与导出错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read npy file: {path}\nReason: {source}")]
    NpyReadError {
        path: String,
        #[source]
        source: ndarray_npy::ReadNpyError,
    },

    #[error("Failed to write npy file: {path}\nReason: {source}")]
    NpyWriteError {
        path: String,
        #[source]
        source: ndarray_npy::WriteNpyError,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, NlscanError>;
