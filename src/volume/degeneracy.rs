//! # 简并点提取
//!
//! 在能量体中寻找相邻两条能带能隙小于阈值的网格点。
//!
//! ## 规则
//! - 能带号 `b` 从 1 起，比较第 `b-1` 与第 `b` 条能带（0 起）
//! - 条件为 `E[b] - E[b-1] < cutoff`，含 NaN 的比较恒为假，缺失能带自然排除
//! - 坐标按行主序输出
//!
//! ## 依赖关系
//! - 被 `nodal/` 与 `commands/nodal.rs` 调用
//! - 使用 `models/bands.rs`, `models/nodal.rs`

use crate::error::{NlscanError, Result};
use crate::models::{DegeneracyCloud, EnergyVolume};

use ndarray::Dimension;

/// 提取能带 `band-1` 与 `band` 之间能隙小于 `cutoff` 的网格点
pub fn extract(volume: &EnergyVolume, band: usize, cutoff: f64) -> Result<DegeneracyCloud> {
    let nbands = volume.num_bands();
    if band == 0 || band >= nbands {
        return Err(NlscanError::InvalidArgument(format!(
            "band index {} out of range: the volume has {} bands, valid indices are 1..{}",
            band,
            nbands,
            nbands.saturating_sub(1)
        )));
    }

    let lower = volume.band(band - 1);
    let upper = volume.band(band);

    let mut mesh = [1usize; 3];
    for (m, &n) in mesh.iter_mut().zip(volume.k_shape()) {
        *m = n;
    }

    let mut points = Vec::new();
    for ((idx, &hi), &lo) in upper.indexed_iter().zip(lower.iter()) {
        if hi - lo < cutoff {
            let mut p = [0usize; 3];
            for (slot, &i) in p.iter_mut().zip(idx.slice()) {
                *slot = i;
            }
            points.push(p);
        }
    }

    Ok(DegeneracyCloud { band, points, mesh })
}

/// 仅保留 `x >= y >= z` 的点（坐标置换对称下的代表元）
pub fn reduce_by_permutation(cloud: &DegeneracyCloud) -> DegeneracyCloud {
    DegeneracyCloud {
        band: cloud.band,
        points: cloud
            .points
            .iter()
            .copied()
            .filter(|p| p[0] >= p[1] && p[1] >= p[2])
            .collect(),
        mesh: cloud.mesh,
    }
}
