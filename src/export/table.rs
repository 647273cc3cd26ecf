//! # 对称化数据 CSV 导出
//!
//! 每行一个 k 点：`kx, ky, kz, energy, gap`。
//!
//! ## 依赖关系
//! - 被 `nodal/aggregate.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{NlscanError, Result};
use crate::models::SymmetrizedDataset;

use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct DatasetRow {
    kx: f64,
    ky: f64,
    kz: f64,
    energy: f64,
    gap: f64,
}

/// 导出对称化数据集为 CSV
pub fn dataset_to_csv(dataset: &SymmetrizedDataset, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for ((k, e), g) in dataset
        .k
        .rows()
        .into_iter()
        .zip(dataset.energy.iter())
        .zip(dataset.gap.iter())
    {
        wtr.serialize(DatasetRow {
            kx: k[0],
            ky: k[1],
            kz: k[2],
            energy: *e,
            gap: *g,
        })?;
    }

    wtr.flush().map_err(|e| NlscanError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
