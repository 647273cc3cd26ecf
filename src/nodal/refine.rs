//! # 候选点与细网格 k 点列表
//!
//! 粗筛候选点与细网格批次构建两级。
//!
//! ## 算法
//! 1. 在能量体上以宽松阈值提取简并点，仅保留 `x >= y >= z` 的代表元，
//!    按 `i / (n-1)` 换算为分数坐标后保存为 `NL_{b}.npy`
//! 2. 对每个候选点 `c`，在 `round(c·d)` 周围按三个偏移窗口枚举整数点
//! 3. 保留各分量在 `[0, d]` 内且 `kx+ky+kz <= bound_factor·d` 的点，按打包键去重
//! 4. 扣除已汇总的点（`NL{b}_k_data.npy`）与已在批次文件中排队的点（`klist_*.npy`），
//!    中断后重建不会重复写出待求解或未汇总的点
//! 5. 按 `max_per_file` 分批，每批写出 `klist_{n}.klist_band` 与 `klist_{n}.npy`；
//!    批次号接在已有最大批次号之后
//!
//! ## 依赖关系
//! - 被 `commands/nodal.rs`, `commands/pipeline.rs` 调用
//! - 使用 `volume/degeneracy.rs`, `volume/packing.rs`, `kpath/writer.rs`, `export/npy.rs`

use super::{ensure_dir, NodalLayout};
use crate::batch::collector::batch_index;
use crate::batch::FileCollector;
use crate::error::{NlscanError, Result};
use crate::export::{load_array, load_optional, save_array};
use crate::kpath::{write_direct, DEFAULT_TAIL};
use crate::models::{DegeneracyCloud, EnergyVolume, NodalConfig};
use crate::utils::progress;
use crate::volume::{extract, reduce_by_permutation, KeyPacker};

use ndarray::{Array2, ArrayView2, Ix2};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// 粗筛：提取并按坐标置换约化
pub fn coarse_candidates(volume: &EnergyVolume, band: usize, cutoff: f64) -> Result<DegeneracyCloud> {
    let cloud = extract(volume, band, cutoff)?;
    Ok(reduce_by_permutation(&cloud))
}

/// 保存候选点的分数坐标，返回写出的路径
pub fn save_candidates(layout: &NodalLayout, cloud: &DegeneracyCloud) -> Result<PathBuf> {
    ensure_dir(&layout.map_root)?;
    let path = layout.candidates_path(cloud.band);
    save_array(&path, &cloud.fractional())?;
    Ok(path)
}

/// 读取 (N, 3) 坐标数组
pub fn load_points(path: &Path) -> Result<Array2<f64>> {
    let points: Array2<f64> = load_array::<f64, Ix2>(path)?;
    check_columns(path, &points)?;
    Ok(points)
}

fn check_columns(path: &Path, points: &Array2<f64>) -> Result<()> {
    if points.ncols() != 3 {
        return Err(NlscanError::ShapeMismatch {
            path: path.display().to_string(),
            expected: 3,
            found: points.ncols(),
        });
    }
    Ok(())
}

/// 枚举全部候选点周围的细网格点，返回去重后的打包键（升序）
pub fn enumerate_fine_points(
    candidates: ArrayView2<'_, f64>,
    cfg: &NodalConfig,
    packer: &KeyPacker,
) -> Result<BTreeSet<i64>> {
    let d = cfg.density;
    if d <= 0 || d >= packer.base() {
        return Err(NlscanError::InvalidArgument(format!(
            "fine density must be in 1..{}, got {}",
            packer.base(),
            d
        )));
    }

    let bound = cfg.bound_factor * d as f64;
    let (wx, wy, wz) = (cfg.window_x.values(), cfg.window_y.values(), cfg.window_z.values());
    let pb = progress::create_simple_bar(candidates.nrows() as u64, "Enumerating fine points");
    let mut keys = BTreeSet::new();

    for c in candidates.rows() {
        let center = [
            (c[0] * d as f64).round_ties_even() as i64,
            (c[1] * d as f64).round_ties_even() as i64,
            (c[2] * d as f64).round_ties_even() as i64,
        ];
        for &dz in &wz {
            for &dy in &wy {
                for &dx in &wx {
                    let k = [center[0] + dx, center[1] + dy, center[2] + dz];
                    if k.iter().any(|&v| v < 0 || v > d) {
                        continue;
                    }
                    if (k[0] + k[1] + k[2]) as f64 > bound {
                        continue;
                    }
                    keys.insert(packer.pack(&k)?);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(keys)
}

/// 已求解点的打包键
pub fn solved_keys(k_data: ArrayView2<'_, f64>, density: i64, packer: &KeyPacker) -> Result<BTreeSet<i64>> {
    k_data
        .rows()
        .into_iter()
        .map(|r| packer.pack_fractional(&[r[0], r[1], r[2]], density))
        .collect()
}

/// 已有批次文件（`klist_*.npy`）中全部点的打包键
pub fn queued_keys(klist_dir: &Path, density: i64, packer: &KeyPacker) -> Result<BTreeSet<i64>> {
    let mut keys = BTreeSet::new();
    if !klist_dir.is_dir() {
        return Ok(keys);
    }
    let files = FileCollector::new(klist_dir)
        .with_pattern("klist_*.npy")?
        .collect()?;
    for path in files {
        let points = load_points(&path)?;
        keys.extend(solved_keys(points.view(), density, packer)?);
    }
    Ok(keys)
}

/// 按 `max_per_file` 切分，最后一批可以不满
pub fn split_batches(keys: &BTreeSet<i64>, max_per_file: usize) -> Result<Vec<Vec<i64>>> {
    if max_per_file == 0 {
        return Err(NlscanError::InvalidArgument(
            "max_per_file must be at least 1".to_string(),
        ));
    }
    let all: Vec<i64> = keys.iter().copied().collect();
    Ok(all.chunks(max_per_file).map(|c| c.to_vec()).collect())
}

/// 已有批次文件的最大序号加一；目录不存在或为空时为 1
pub fn next_batch_index(klist_dir: &Path) -> Result<u64> {
    if !klist_dir.is_dir() {
        return Ok(1);
    }
    let files = FileCollector::new(klist_dir)
        .with_pattern("klist_*.klist_band")?
        .collect()?;
    Ok(files.iter().filter_map(|f| batch_index(f)).max().map_or(1, |n| n + 1))
}

/// 写出各批次，返回 `.klist_band` 路径列表
pub fn write_batches(
    klist_dir: &Path,
    batches: &[Vec<i64>],
    first_index: u64,
    density: i64,
    packer: &KeyPacker,
) -> Result<Vec<PathBuf>> {
    ensure_dir(klist_dir)?;
    let mut written = Vec::with_capacity(batches.len());

    for (i, batch) in batches.iter().enumerate() {
        let n = first_index + i as u64;
        let points: Vec<[i64; 3]> = batch.iter().map(|&key| packer.unpack(key)).collect();

        let klist = klist_dir.join(format!("klist_{}.klist_band", n));
        write_direct(&klist, &points, density, DEFAULT_TAIL)?;

        let frac = Array2::from_shape_fn((points.len(), 3), |(r, ax)| {
            points[r][ax] as f64 / density as f64
        });
        save_array(&klist_dir.join(format!("klist_{}.npy", n)), &frac)?;

        written.push(klist);
    }

    Ok(written)
}

/// 一次细网格列表构建的统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FineKlistReport {
    pub candidates: usize,
    /// 去重后、扣除已求解点之前
    pub enumerated: usize,
    pub already_solved: usize,
    /// 已在现有批次文件中
    pub already_queued: usize,
    pub files: Vec<PathBuf>,
}

impl FineKlistReport {
    /// 新写出的 k 点数
    pub fn new_points(&self) -> usize {
        self.enumerated - self.already_solved - self.already_queued
    }
}

/// 读候选点，生成并写出新的细网格批次
pub fn build_fine_klists(layout: &NodalLayout, band: usize, cfg: &NodalConfig) -> Result<FineKlistReport> {
    let candidates = load_points(&layout.candidates_path(band))?;
    let packer = KeyPacker::default();

    let mut keys = enumerate_fine_points(candidates.view(), cfg, &packer)?;
    let enumerated = keys.len();

    let k_data_path = layout.data_path(band, "k");
    let mut already_solved = 0;
    if let Some(k_data) = load_optional::<f64, Ix2>(&k_data_path)? {
        check_columns(&k_data_path, &k_data)?;
        let solved = solved_keys(k_data.view(), cfg.density, &packer)?;
        let before = keys.len();
        keys.retain(|k| !solved.contains(k));
        already_solved = before - keys.len();
    }

    let klist_dir = layout.klist_dir(band);
    let queued = queued_keys(&klist_dir, cfg.density, &packer)?;
    let before = keys.len();
    keys.retain(|k| !queued.contains(k));
    let already_queued = before - keys.len();

    let batches = split_batches(&keys, cfg.max_per_file)?;
    let first = next_batch_index(&klist_dir)?;
    let files = write_batches(&klist_dir, &batches, first, cfg.density, &packer)?;

    Ok(FineKlistReport {
        candidates: candidates.nrows(),
        enumerated,
        already_solved,
        already_queued,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{LoopOutcome, StopMarker};
    use crate::kpath::read_klist;
    use crate::models::config::WindowRange;
    use crate::nodal::solve::{pending_batches, solve_batches};
    use crate::nodal::testing::FakeSolver;
    use crate::solver::BandSolver;
    use ndarray::{array, Array4};
    use std::fs;
    use tempdir::TempDir;

    fn layout(dir: &Path) -> NodalLayout {
        NodalLayout::new(dir.join("mapall"), dir.join("NLs"))
    }

    #[test]
    fn test_origin_candidate_window() {
        let cfg = NodalConfig::default();
        let keys = enumerate_fine_points(array![[0.0, 0.0, 0.0]].view(), &cfg, &KeyPacker::default())
            .unwrap();
        // dkx 0..=30, dky/dkz 0..=25 步长 5
        assert_eq!(keys.len(), 31 * 6 * 6);
        assert!(keys.contains(&0));
    }

    #[test]
    fn test_interior_candidate_and_dedup() {
        let cfg = NodalConfig::default();
        let packer = KeyPacker::default();
        let one = enumerate_fine_points(array![[0.1, 0.1, 0.1]].view(), &cfg, &packer).unwrap();
        assert_eq!(one.len(), 61 * 11 * 11);

        let twice =
            enumerate_fine_points(array![[0.1, 0.1, 0.1], [0.1, 0.1, 0.1]].view(), &cfg, &packer)
                .unwrap();
        assert_eq!(twice, one);
    }

    #[test]
    fn test_bound_excludes_far_corner() {
        let cfg = NodalConfig::default();
        let packer = KeyPacker::default();
        let keys = enumerate_fine_points(array![[1.0, 1.0, 1.0]].view(), &cfg, &packer).unwrap();
        assert!(keys.is_empty());

        let keys = enumerate_fine_points(array![[1.0, 0.5, 0.0]].view(), &cfg, &packer).unwrap();
        for key in &keys {
            let k = packer.unpack(*key);
            assert!(k[0] <= 5000 && k.iter().sum::<i64>() <= 7500);
        }
        assert!(!keys.is_empty());
    }

    #[test]
    fn test_batches_capped() {
        let cfg = NodalConfig::default();
        let keys = enumerate_fine_points(array![[0.1, 0.1, 0.1]].view(), &cfg, &KeyPacker::default())
            .unwrap();
        let batches = split_batches(&keys, 900).unwrap();
        assert_eq!(batches.len(), 9);
        assert!(batches[..8].iter().all(|b| b.len() == 900));
        assert_eq!(batches[8].len(), 181);
        assert!(split_batches(&keys, 0).is_err());
    }

    #[test]
    fn test_candidates_from_volume() {
        let mut data = Array4::from_shape_fn((2, 5, 5, 5), |(b, _, _, _)| b as f64);
        data[[1, 4, 2, 0]] = 0.01;
        data[[1, 0, 2, 4]] = 0.01;
        let vol = EnergyVolume::new(data.into_dyn()).unwrap();

        let cloud = coarse_candidates(&vol, 1, 0.015).unwrap();
        assert_eq!(cloud.points, vec![[4, 2, 0]]);
        assert_eq!(cloud.fractional(), array![[1.0, 0.5, 0.0]]);
    }

    #[test]
    fn test_build_excludes_solved_and_continues_numbering() {
        let dir = TempDir::new("refine").unwrap();
        let layout = layout(dir.path());
        ensure_dir(&layout.map_root).unwrap();
        ensure_dir(&layout.band_root(2)).unwrap();
        save_array(&layout.candidates_path(2), &array![[0.0, 0.0, 0.0]]).unwrap();

        let cfg = NodalConfig {
            max_per_file: 500,
            ..NodalConfig::default()
        };

        // 已求解两个点
        save_array(
            &layout.data_path(2, "k"),
            &array![[0.0, 0.0, 0.0], [0.0002, 0.0, 0.0]],
        )
        .unwrap();

        let report = build_fine_klists(&layout, 2, &cfg).unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.enumerated, 1116);
        assert_eq!(report.already_solved, 2);
        assert_eq!(report.new_points(), 1114);
        assert_eq!(report.files.len(), 3);
        assert!(report.files[0].ends_with("klist_1.klist_band"));

        let first = read_klist(&report.files[0]).unwrap();
        assert_eq!(first.len(), 500);
        assert!(first.iter().all(|p| p.density == 5000 && p.k != [0, 0, 0] && p.k != [1, 0, 0]));

        let frac = load_points(&layout.klist_dir(2).join("klist_3.npy")).unwrap();
        assert_eq!(frac.nrows(), 114);

        // 已排队的点不再写出
        let again = build_fine_klists(&layout, 2, &cfg).unwrap();
        assert!(again.files.is_empty());
        assert_eq!(again.already_solved, 2);
        assert_eq!(again.already_queued, 1114);
        assert_eq!(again.new_points(), 0);

        // 新增候选点时编号接续
        save_array(
            &layout.candidates_path(2),
            &array![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]],
        )
        .unwrap();
        let grown = build_fine_klists(&layout, 2, &cfg).unwrap();
        assert_eq!(grown.new_points(), 61 * 6 * 6);
        assert_eq!(grown.files.len(), 5);
        assert!(grown.files[0].ends_with("klist_4.klist_band"));
    }

    #[test]
    fn test_resume_after_stop_solves_each_point_once() {
        let dir = TempDir::new("refine").unwrap();
        let layout = layout(dir.path());
        ensure_dir(&layout.map_root).unwrap();
        save_array(&layout.candidates_path(1), &array![[0.5, 0.5, 0.0]]).unwrap();

        let cfg = NodalConfig {
            density: 100,
            max_per_file: 3,
            window_x: WindowRange::new(-2, 2, 1),
            window_y: WindowRange::new(0, 0, 1),
            window_z: WindowRange::new(0, 0, 1),
            ..NodalConfig::default()
        };
        let mut solver = FakeSolver::new(&dir.path().join("case"));
        let stop = dir.path().join("stop.txt");

        let first = build_fine_klists(&layout, 1, &cfg).unwrap();
        assert_eq!(first.files.len(), 2);

        fs::write(&stop, "").unwrap();
        let summary = solve_batches(&layout, 1, &mut solver, StopMarker::new(stop.clone())).unwrap();
        assert_eq!(summary.outcome, LoopOutcome::Stopped);
        assert!(solver.calls.is_empty());

        // 中断后重跑：不产生重复批次
        let rebuilt = build_fine_klists(&layout, 1, &cfg).unwrap();
        assert!(rebuilt.files.is_empty());
        assert_eq!(rebuilt.already_queued, 5);

        let summary = solve_batches(&layout, 1, &mut solver, StopMarker::new(stop.clone())).unwrap();
        assert_eq!(summary.outcome, LoopOutcome::Completed);
        assert_eq!(solver.calls, vec!["klist_1", "klist_2"]);

        // 已求解但尚未汇总的批次同样不重复
        let after_solve = build_fine_klists(&layout, 1, &cfg).unwrap();
        assert!(after_solve.files.is_empty());
        assert_eq!(
            pending_batches(&layout, 1, &solver.output_spins()).unwrap().len(),
            0
        );
    }

    #[test]
    fn test_next_index_missing_dir() {
        let dir = TempDir::new("refine").unwrap();
        assert_eq!(next_batch_index(&dir.path().join("nope")).unwrap(), 1);
    }
}
