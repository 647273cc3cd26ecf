//! # 能量体拼接
//!
//! 把一次扫描得到的大量 `.bands.agr` 文件拼成单个能量体。
//!
//! ## 算法
//! 1. kz 外层、ky 内层遍历网格，按命名模板定位文件并解析
//! 2. 同一 kz 的各 ky 能带沿新轴堆叠，随后各 kz 层再沿新轴堆叠
//! 3. 堆叠前各块的能带数（或 k 点数）不同则用 NaN 补齐到最大形状
//! 4. 解析失败的文件贡献一整片 NaN
//! 5. 仅为拼接而引入的单点轴在最后折叠
//!
//! 输出布局为 band 轴在前：`(band, kx, ky[, kz])`。
//!
//! ## 依赖关系
//! - 被 `commands/assemble.rs`, `commands/pipeline.rs` 调用
//! - 使用 `parsers/agr.rs`, `utils/progress.rs`

use crate::error::{NlscanError, Result};
use crate::models::EnergyVolume;
use crate::parsers::agr::load_agr;
use crate::utils::{output, progress};

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Slice};
use std::path::{Path, PathBuf};

/// 网格形状：ky 方向文件数与可选的 kz 方向文件数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshShape {
    pub ny: usize,
    pub nz: Option<usize>,
}

impl MeshShape {
    pub fn plane(ny: usize) -> Self {
        MeshShape { ny, nz: None }
    }

    pub fn volume(ny: usize, nz: usize) -> Self {
        MeshShape { ny, nz: Some(nz) }
    }

    /// 总文件数
    pub fn len(&self) -> usize {
        self.ny * self.nz.unwrap_or(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 网格坐标到文件名的命名模板，支持 `{ky}`, `{kz}`, `{spin}` 占位符
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshNaming {
    pub template: String,
    pub spin: String,
}

/// 默认命名模板
pub const DEFAULT_TEMPLATE: &str = "map_kz{kz}_ky{ky}{spin}.bands.agr";

impl MeshNaming {
    pub fn new(template: &str, spin: &str) -> Self {
        MeshNaming {
            template: template.to_string(),
            spin: spin.to_string(),
        }
    }

    /// 生成 (ky, kz) 处的文件名
    pub fn file_name(&self, ky: usize, kz: usize) -> String {
        self.template
            .replace("{ky}", &ky.to_string())
            .replace("{kz}", &kz.to_string())
            .replace("{spin}", &self.spin)
    }
}

impl Default for MeshNaming {
    fn default() -> Self {
        MeshNaming::new(DEFAULT_TEMPLATE, "up")
    }
}

/// 拼接结果
#[derive(Debug)]
pub struct Assembled {
    pub volume: EnergyVolume,
    /// 以 NaN 代替的文件
    pub failed: Vec<PathBuf>,
}

/// 读取 `dir` 下整个网格的能带并拼接为能量体
pub fn assemble_volume(
    dir: &Path,
    shape: MeshShape,
    naming: &MeshNaming,
    max_band: usize,
) -> Result<Assembled> {
    if !dir.is_dir() {
        return Err(NlscanError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }
    if shape.is_empty() {
        return Err(NlscanError::InvalidArgument(
            "mesh must contain at least one file".to_string(),
        ));
    }

    let nz = shape.nz.unwrap_or(1);
    let pb = progress::create_progress_bar(shape.len() as u64, "Assembling");
    let mut failed = Vec::new();
    let mut layers: Vec<ArrayD<f64>> = Vec::with_capacity(nz);

    for kz in 0..nz {
        let mut traces: Vec<ArrayD<f64>> = Vec::with_capacity(shape.ny);
        for ky in 0..shape.ny {
            let path = dir.join(naming.file_name(ky, kz));
            match load_agr(&path, max_band) {
                Ok(trace) => traces.push(trace.energy.into_dyn()),
                Err(e) => {
                    pb.suspend(|| {
                        output::print_warning(&format!("{} (filled with NaN)", e));
                    });
                    traces.push(ArrayD::zeros(IxDyn(&[0, 0])));
                    failed.push(path);
                }
            }
            pb.inc(1);
        }

        let views: Vec<ArrayViewD<'_, f64>> = traces.iter().map(|t| t.view()).collect();
        layers.push(stack_padded(&views, Axis(2))?);
    }

    pb.finish_and_clear();

    let mut data = if shape.nz.is_some() {
        let views: Vec<ArrayViewD<'_, f64>> = layers.iter().map(|l| l.view()).collect();
        stack_padded(&views, Axis(3))?
    } else {
        layers.pop().unwrap_or_else(|| ArrayD::zeros(IxDyn(&[0, 0, 0])))
    };

    // 折叠拼接引入的单点 k 轴（kz 在前，保证 ky 的轴号不变）
    if shape.nz == Some(1) {
        data = data.index_axis_move(Axis(3), 0);
    }
    if shape.ny == 1 {
        data = data.index_axis_move(Axis(2), 0);
    }

    Ok(Assembled {
        volume: EnergyVolume::new(data)?,
        failed,
    })
}

/// 沿新轴 `axis` 堆叠各块；其余各轴取最大长度，不足处填 NaN
pub fn stack_padded(chunks: &[ArrayViewD<'_, f64>], axis: Axis) -> Result<ArrayD<f64>> {
    let first = chunks.first().ok_or_else(|| {
        NlscanError::InvalidArgument("cannot stack an empty list of arrays".to_string())
    })?;
    let ndim = first.ndim();
    if axis.index() > ndim {
        return Err(NlscanError::InvalidArgument(format!(
            "stack axis {} out of range for {}-D chunks",
            axis.index(),
            ndim
        )));
    }

    let mut max_shape = vec![0usize; ndim];
    for chunk in chunks {
        if chunk.ndim() != ndim {
            return Err(NlscanError::InvalidArgument(format!(
                "cannot stack {}-D chunk with {}-D chunks",
                chunk.ndim(),
                ndim
            )));
        }
        for (m, &n) in max_shape.iter_mut().zip(chunk.shape()) {
            *m = (*m).max(n);
        }
    }

    let mut out_shape = max_shape;
    out_shape.insert(axis.index(), chunks.len());
    let mut out = ArrayD::from_elem(IxDyn(&out_shape), f64::NAN);

    for (i, chunk) in chunks.iter().enumerate() {
        let mut slot = out.index_axis_mut(axis, i);
        let mut region =
            slot.slice_each_axis_mut(|ax| Slice::from(0..chunk.shape()[ax.axis.index()]));
        region.assign(chunk);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BandTrace;
    use crate::parsers::agr::{to_agr_string, DEFAULT_MAX_BAND};
    use ndarray::{array, Array2};
    use std::fs;
    use tempdir::TempDir;

    fn trace(nbands: usize, nk: usize, offset: f64) -> BandTrace {
        let energy = Array2::from_shape_fn((nbands, nk), |(b, k)| offset + b as f64 + 0.01 * k as f64);
        BandTrace {
            weight: Array2::zeros(energy.raw_dim()),
            energy,
        }
    }

    fn write_trace(dir: &Path, name: &str, t: &BandTrace) {
        fs::write(dir.join(name), to_agr_string(t)).unwrap();
    }

    #[test]
    fn test_stack_padded_fills_nan() {
        let a = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]].into_dyn();
        let b = array![[7.0, 8.0]].into_dyn();
        let out = stack_padded(&[a.view(), b.view()], Axis(2)).unwrap();
        assert_eq!(out.shape(), &[3, 2, 2]);
        assert_eq!(out[[0, 1, 0]], 2.0);
        assert_eq!(out[[0, 1, 1]], 8.0);
        assert!(out[[1, 0, 1]].is_nan());
        assert!(out[[2, 1, 1]].is_nan());
        assert_eq!(out[[2, 1, 0]], 6.0);
    }

    #[test]
    fn test_ragged_band_counts_padded() {
        let dir = TempDir::new("assemble").unwrap();
        let naming = MeshNaming::default();
        write_trace(dir.path(), &naming.file_name(0, 0), &trace(3, 4, 0.0));
        write_trace(dir.path(), &naming.file_name(1, 0), &trace(5, 4, 10.0));

        let out = assemble_volume(dir.path(), MeshShape::plane(2), &naming, DEFAULT_MAX_BAND).unwrap();
        let vol = out.volume;
        assert!(out.failed.is_empty());
        assert_eq!(vol.data().shape(), &[5, 4, 2]);

        for b in 0..5 {
            for kx in 0..4 {
                let v0 = vol.data()[[b, kx, 0]];
                if b < 3 {
                    assert_eq!(v0, b as f64 + 0.01 * kx as f64);
                } else {
                    assert!(v0.is_nan());
                }
                assert_eq!(vol.data()[[b, kx, 1]], 10.0 + b as f64 + 0.01 * kx as f64);
            }
        }
    }

    #[test]
    fn test_3d_mesh_and_missing_file() {
        let dir = TempDir::new("assemble").unwrap();
        let naming = MeshNaming::new("map_kz{kz}_ky{ky}{spin}.bands.agr", "dn");
        for kz in 0..2 {
            for ky in 0..3 {
                if (ky, kz) == (2, 1) {
                    continue;
                }
                let t = trace(2, 5, (10 * kz + ky) as f64);
                write_trace(dir.path(), &naming.file_name(ky, kz), &t);
            }
        }

        let out =
            assemble_volume(dir.path(), MeshShape::volume(3, 2), &naming, DEFAULT_MAX_BAND).unwrap();
        assert_eq!(out.failed.len(), 1);
        assert!(out.failed[0].ends_with("map_kz1_ky2dn.bands.agr"));

        let data = out.volume.data();
        assert_eq!(data.shape(), &[2, 5, 3, 2]);
        assert_eq!(data[[1, 4, 1, 1]], 11.0 + 1.0 + 0.04);
        assert!(data.index_axis(Axis(3), 1).index_axis(Axis(2), 2).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_path_collapses_bookkeeping_axis() {
        let dir = TempDir::new("assemble").unwrap();
        let naming = MeshNaming::new("line{ky}.bands.agr", "");
        write_trace(dir.path(), "line0.bands.agr", &trace(4, 6, 0.0));

        let out = assemble_volume(dir.path(), MeshShape::plane(1), &naming, DEFAULT_MAX_BAND).unwrap();
        assert_eq!(out.volume.data().shape(), &[4, 6]);
        assert_eq!(out.volume.k_dims(), 1);
    }

    #[test]
    fn test_single_band_not_collapsed() {
        let dir = TempDir::new("assemble").unwrap();
        let naming = MeshNaming::default();
        write_trace(dir.path(), &naming.file_name(0, 0), &trace(1, 1, 0.0));
        write_trace(dir.path(), &naming.file_name(1, 0), &trace(1, 1, 1.0));

        let out = assemble_volume(dir.path(), MeshShape::plane(2), &naming, DEFAULT_MAX_BAND).unwrap();
        assert_eq!(out.volume.data().shape(), &[1, 1, 2]);
    }

    #[test]
    fn test_naming_template() {
        let naming = MeshNaming::default();
        assert_eq!(naming.file_name(7, 3), "map_kz3_ky7up.bands.agr");
    }
}
