//! # .npy 数组持久化
//!
//! 封装 `ndarray-npy`，把读写错误映射为带路径的 `NlscanError`。
//!
//! ## 依赖关系
//! - 被 `volume/assembler.rs`, `nodal/` 使用
//! - 使用 `ndarray-npy`

use crate::error::{NlscanError, Result};

use ndarray::{Array, Dimension};
use ndarray_npy::{ReadableElement, WritableElement};
use std::path::Path;

/// 保存数组为 .npy
pub fn save_array<A, D>(path: &Path, array: &Array<A, D>) -> Result<()>
where
    A: WritableElement,
    D: Dimension,
{
    ndarray_npy::write_npy(path, array).map_err(|e| NlscanError::NpyWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 读取 .npy 数组，维度不符时报错
pub fn load_array<A, D>(path: &Path) -> Result<Array<A, D>>
where
    A: ReadableElement,
    D: Dimension,
{
    if !path.exists() {
        return Err(NlscanError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    ndarray_npy::read_npy(path).map_err(|e| NlscanError::NpyReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 文件存在时读取，否则返回 `None`
pub fn load_optional<A, D>(path: &Path) -> Result<Option<Array<A, D>>>
where
    A: ReadableElement,
    D: Dimension,
{
    if path.exists() {
        load_array(path).map(Some)
    } else {
        Ok(None)
    }
}
