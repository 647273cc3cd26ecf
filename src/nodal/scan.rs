//! # 粗网格扫描
//!
//! 对每个 (kz, ky) 切片生成一条沿 kx 的路径 `(0, y, z) → (1, y, z)`，
//! 共 `nx + 1` 个采样点，调用求解器把结果写入 `data/`。
//! 结果已存在的切片直接跳过，因此中断后重跑会从断点继续。
//!
//! ## 依赖关系
//! - 被 `commands/map.rs`, `commands/pipeline.rs` 调用
//! - 使用 `kpath/`, `solver/`, `batch/runner.rs`

use super::{ensure_dir, NodalLayout};
use crate::batch::{BatchRunner, ProcessResult, RunSummary, StopMarker};
use crate::error::{NlscanError, Result};
use crate::kpath::{sample_path, write_klist, DEFAULT_TAIL};
use crate::models::{Density, KPath, MapConfig};
use crate::solver::BandSolver;

use std::fs;

/// 一个扫描切片
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSlice {
    pub ky: usize,
    pub kz: usize,
}

impl ScanSlice {
    /// 文件名主干，与拼接模板 `map_kz{kz}_ky{ky}` 一致
    pub fn name(&self) -> String {
        format!("map_kz{}_ky{}", self.kz, self.ky)
    }

    /// 该切片沿 kx 的路径
    pub fn path(&self, map: &MapConfig) -> Result<KPath> {
        let frac = |i: usize, n: usize| if n > 0 { i as f64 / n as f64 } else { 0.0 };
        let y = frac(self.ky, map.ny);
        let z = frac(self.kz, map.nz);
        KPath::line([0.0, y, z], [1.0, y, z])
    }
}

/// 按 kz 外层、ky 内层列出全部切片
pub fn scan_slices(map: &MapConfig) -> Vec<ScanSlice> {
    let nz = if map.is_3d() { map.nz } else { 0 };
    (0..=nz)
        .flat_map(|kz| (0..=map.ny).map(move |ky| ScanSlice { ky, kz }))
        .collect()
}

/// 执行粗网格扫描
pub fn coarse_scan<S: BandSolver>(
    layout: &NodalLayout,
    map: &MapConfig,
    solver: &mut S,
    marker: StopMarker,
) -> Result<RunSummary> {
    if map.nx == 0 {
        return Err(NlscanError::InvalidArgument(
            "map.nx must be at least 1".to_string(),
        ));
    }

    let klist_dir = layout.map_klist_dir();
    let data_dir = layout.map_data_dir();
    ensure_dir(&klist_dir)?;
    ensure_dir(&data_dir)?;

    let slices = scan_slices(map);
    let spins = solver.output_spins();
    let runner = BatchRunner::new(marker, "Mapping");

    runner.run(&slices, |s| s.name(), |slice| {
        let name = slice.name();
        let done = spins
            .iter()
            .all(|spin| data_dir.join(format!("{}{}.bands.agr", name, spin)).exists());
        if done {
            return Ok(ProcessResult::Skipped(name));
        }

        let points = sample_path(&slice.path(map)?, map.nx + 1, Density::from_value(map.density))?;
        let staged = solver.klist_path();
        write_klist(&staged, &points, DEFAULT_TAIL)?;

        let keep = klist_dir.join(format!("{}.klist_band", name));
        fs::copy(&staged, &keep).map_err(|e| NlscanError::FileWriteError {
            path: keep.display().to_string(),
            source: e,
        })?;

        solver.run_band(&data_dir, &name)?;
        Ok(ProcessResult::Success(name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::LoopOutcome;
    use crate::nodal::testing::FakeSolver;
    use crate::parsers::agr::DEFAULT_MAX_BAND;
    use crate::volume::{assemble_volume, extract, MeshNaming, MeshShape};
    use tempdir::TempDir;

    fn small_map() -> MapConfig {
        MapConfig {
            nx: 4,
            ny: 2,
            nz: 0,
            ..MapConfig::default()
        }
    }

    #[test]
    fn test_slices_order() {
        let map = MapConfig {
            nx: 4,
            ny: 1,
            nz: 1,
            ..MapConfig::default()
        };
        let names: Vec<String> = scan_slices(&map).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["map_kz0_ky0", "map_kz0_ky1", "map_kz1_ky0", "map_kz1_ky1"]);
        assert_eq!(scan_slices(&small_map()).len(), 3);
    }

    #[test]
    fn test_slice_path() {
        let map = MapConfig {
            ny: 4,
            nz: 2,
            ..MapConfig::default()
        };
        let path = ScanSlice { ky: 1, kz: 2 }.path(&map).unwrap();
        assert_eq!(path.vertices, vec![[0.0, 0.25, 1.0], [1.0, 0.25, 1.0]]);
    }

    #[test]
    fn test_scan_then_assemble_finds_touching_bands() {
        let dir = TempDir::new("scan").unwrap();
        let layout = NodalLayout::new(dir.path().join("mapall"), dir.path().join("NLs"));
        let map = small_map();
        let mut solver = FakeSolver::new(&dir.path().join("case"));
        let marker = StopMarker::new(dir.path().join("stop.txt"));

        let summary = coarse_scan(&layout, &map, &mut solver, marker.clone()).unwrap();
        assert_eq!(summary.outcome, LoopOutcome::Completed);
        assert_eq!(solver.calls.len(), 3);
        assert!(layout.map_klist_dir().join("map_kz0_ky2.klist_band").exists());

        let assembled = assemble_volume(
            &layout.map_data_dir(),
            MeshShape::plane(map.ny + 1),
            &MeshNaming::new("map_kz{kz}_ky{ky}{spin}.bands.agr", "up"),
            DEFAULT_MAX_BAND,
        )
        .unwrap();
        assert_eq!(assembled.volume.data().shape(), &[3, 5, 3]);

        let cloud = extract(&assembled.volume, 1, 0.015).unwrap();
        assert_eq!(cloud.points, vec![[0, 0, 0], [2, 1, 0], [4, 2, 0]]);

        // 重跑时全部跳过
        let again = coarse_scan(&layout, &map, &mut solver, marker).unwrap();
        assert_eq!(again.result.skipped, 3);
        assert_eq!(solver.calls.len(), 3);
    }
}
