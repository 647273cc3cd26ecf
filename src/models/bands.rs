//! # 能带数据模型
//!
//! 单条 k 路径上的能带 (`BandTrace`) 以及拼接后的多维能量体 (`EnergyVolume`)。
//!
//! ## 依赖关系
//! - 被 `parsers/agr.rs` 生成
//! - 被 `volume/` 模块使用

use crate::error::{NlscanError, Result};

use ndarray::{Array2, ArrayD, ArrayViewD, Axis};

/// 单个 `.agr` 文件解析出的能带
#[derive(Debug, Clone, PartialEq)]
pub struct BandTrace {
    /// (band, k)
    pub energy: Array2<f64>,
    /// (band, k)，与 energy 同形
    pub weight: Array2<f64>,
}

impl BandTrace {
    pub fn num_bands(&self) -> usize {
        self.energy.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }
}

/// 能量体，band 轴在前：(band, kx[, ky[, kz]])
///
/// NaN 表示该 k 点不存在此能带。
#[derive(Debug, Clone)]
pub struct EnergyVolume {
    data: ArrayD<f64>,
}

impl EnergyVolume {
    /// 包装数组，要求 1 至 3 个 k 轴
    pub fn new(data: ArrayD<f64>) -> Result<Self> {
        if !(2..=4).contains(&data.ndim()) {
            return Err(NlscanError::InvalidArgument(format!(
                "energy volume must have 1 to 3 k-axes, got shape {:?}",
                data.shape()
            )));
        }
        Ok(EnergyVolume { data })
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn num_bands(&self) -> usize {
        self.data.shape()[0]
    }

    /// k 轴维度数 (1, 2 或 3)
    pub fn k_dims(&self) -> usize {
        self.data.ndim() - 1
    }

    /// 各 k 轴长度
    pub fn k_shape(&self) -> &[usize] {
        &self.data.shape()[1..]
    }

    /// 第 `band` 条能带（0 起）在整个 k 网格上的取值
    pub fn band(&self, band: usize) -> ArrayViewD<'_, f64> {
        self.data.index_axis(Axis(0), band)
    }
}
