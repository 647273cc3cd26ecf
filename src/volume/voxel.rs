//! # 能量分箱占据体
//!
//! 由二维扫描 (kx, ky) 的能带生成 `(energy, kx, ky)` 的 0/1 占据体：
//! 落入能量窗口的能带值按 `round((E - e_start) / e_step)` 分箱，对应体素置 1。
//! 每个自旋分量生成一个体。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `parsers/agr.rs`, `volume/assembler.rs` 的命名模板

use crate::error::{NlscanError, Result};
use crate::parsers::agr::load_agr;
use crate::utils::{output, progress};
use crate::volume::assembler::MeshNaming;

use ndarray::{Array2, Array3};
use std::path::Path;

/// 能量轴刻度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyScale {
    pub offset: f64,
    pub delta: f64,
    pub size: usize,
}

impl EnergyScale {
    /// 由窗口 `[start, end]` 与步长构造
    pub fn new(start: f64, end: f64, step: f64) -> Result<Self> {
        if !(step > 0.0) || !(end >= start) {
            return Err(NlscanError::InvalidArgument(format!(
                "invalid energy window {}..{} with step {}",
                start, end, step
            )));
        }
        let size = ((end - start) / step).round_ties_even() as usize + 1;
        Ok(EnergyScale {
            offset: start,
            delta: step,
            size,
        })
    }

    pub fn end(&self) -> f64 {
        self.offset + self.delta * (self.size - 1) as f64
    }

    /// 能量值所在的箱号，窗口外返回 `None`
    pub fn bin(&self, e: f64) -> Option<usize> {
        if e >= self.offset && e <= self.end() {
            let i = ((e - self.offset) / self.delta).round_ties_even() as usize;
            Some(i.min(self.size - 1))
        } else {
            None
        }
    }
}

/// 由已解析的能带 (每个 ky 一条) 填充占据体
pub fn fill_voxels(traces: &[Array2<f64>], nx: usize, scale: &EnergyScale) -> Array3<f64> {
    let mut vol = Array3::zeros((scale.size, nx, traces.len()));
    for (ky, energy) in traces.iter().enumerate() {
        for ((_, kx), &e) in energy.indexed_iter() {
            if kx >= nx {
                continue;
            }
            if let Some(ie) = scale.bin(e) {
                vol[[ie, kx, ky]] = 1.0;
            }
        }
    }
    vol
}

/// 读取 `dir` 下 `ny` 个文件并生成指定自旋的占据体
pub fn voxel_volume(
    dir: &Path,
    ny: usize,
    naming: &MeshNaming,
    scale: &EnergyScale,
    max_band: usize,
) -> Result<Array3<f64>> {
    if !dir.is_dir() {
        return Err(NlscanError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }

    let pb = progress::create_progress_bar(ny as u64, &format!("Voxelizing {}", naming.spin));
    let mut traces = Vec::with_capacity(ny);
    for ky in 0..ny {
        let path = dir.join(naming.file_name(ky, 0));
        match load_agr(&path, max_band) {
            Ok(trace) => traces.push(trace.energy),
            Err(e) => {
                pb.suspend(|| output::print_warning(&format!("{} (left empty)", e)));
                traces.push(Array2::zeros((0, 0)));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let nx = traces.iter().map(|t| t.ncols()).max().unwrap_or(0);
    Ok(fill_voxels(&traces, nx, scale))
}
