//! # 细网格结果汇总
//!
//! ## 算法
//! 1. 读取已累积的 `NL{b}_{k,e,g}_data.npy`（不存在则从空开始）
//! 2. 按批次号遍历 `klist_{n}.npy`，跳过尚未求解的批次
//! 3. 读取批次能带，计算 `gap = E[b] - E[b-1]` 与中点能量
//! 4. 能隙长度与批次 k 点数不一致时记录 `ShapeMismatch` 并丢弃该批次
//! 5. 仅追加打包键尚未出现的点，重复汇总不会重复计数
//! 6. 保存累积数据，按细阈值筛选后做 64 倍对称展开并导出
//!
//! ## 依赖关系
//! - 被 `commands/nodal.rs`, `commands/pipeline.rs` 调用
//! - 使用 `parsers/agr.rs`, `volume/symmetry.rs`, `volume/packing.rs`, `export/`

use super::refine::load_points;
use super::solve::{batch_stem, result_path};
use super::{ensure_dir, NodalLayout};
use crate::batch::FileCollector;
use crate::error::{NlscanError, Result};
use crate::export::{dataset_to_csv, load_optional, save_array, ItxWave};
use crate::models::{NodalConfig, SymmetrizedDataset};
use crate::parsers::agr::load_agr;
use crate::utils::{output, progress};
use crate::volume::{filter_gap, symmetrize, KeyPacker};

use ndarray::{Array1, Array2, Axis, Ix1, Ix2};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 汇总统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    pub batches: usize,
    pub appended_batches: usize,
    pub appended_points: usize,
    pub unsolved: usize,
    /// 因解析错误或形状不符被丢弃的批次
    pub rejected: Vec<String>,
    /// 累积总点数
    pub total_points: usize,
    /// 通过细阈值的点数
    pub kept: usize,
    /// 对称展开后的点数
    pub symmetrized: usize,
}

/// 累积数据，三组平行数组
fn load_accumulated(layout: &NodalLayout, band: usize) -> Result<SymmetrizedDataset> {
    let k_path = layout.data_path(band, "k");
    let k = load_optional::<f64, Ix2>(&k_path)?;
    let e = load_optional::<f64, Ix1>(&layout.data_path(band, "e"))?;
    let g = load_optional::<f64, Ix1>(&layout.data_path(band, "g"))?;

    match (k, e, g) {
        (Some(k), Some(energy), Some(gap)) => {
            if k.ncols() != 3 || energy.len() != k.nrows() || gap.len() != k.nrows() {
                return Err(NlscanError::ShapeMismatch {
                    path: k_path.display().to_string(),
                    expected: k.nrows(),
                    found: energy.len().min(gap.len()),
                });
            }
            Ok(SymmetrizedDataset { k, energy, gap })
        }
        (None, None, None) => Ok(SymmetrizedDataset::empty()),
        _ => Err(NlscanError::Other(format!(
            "incomplete accumulated data in {}",
            layout.band_root(band).display()
        ))),
    }
}

fn save_accumulated(layout: &NodalLayout, band: usize, data: &SymmetrizedDataset) -> Result<()> {
    save_array(&layout.data_path(band, "k"), &data.k)?;
    save_array(&layout.data_path(band, "e"), &data.energy)?;
    save_array(&layout.data_path(band, "g"), &data.gap)
}

/// 单个批次的能隙与中点能量
fn batch_values(agr: &Path, band: usize, max_band: usize, npoints: usize) -> Result<(Array1<f64>, Array1<f64>)> {
    let trace = load_agr(agr, max_band)?;
    if band >= trace.num_bands() {
        return Err(NlscanError::InvalidArgument(format!(
            "{} has {} bands, band {} requested",
            agr.display(),
            trace.num_bands(),
            band
        )));
    }

    let upper = trace.energy.row(band);
    let lower = trace.energy.row(band - 1);
    let gap = &upper - &lower;
    if gap.len() != npoints {
        return Err(NlscanError::ShapeMismatch {
            path: agr.display().to_string(),
            expected: npoints,
            found: gap.len(),
        });
    }
    let mid = (&upper + &lower) / 2.0;
    Ok((gap, mid))
}

/// 把新批次中尚未出现的点追加到累积数据，返回追加数
fn append_new(
    acc: &mut SymmetrizedDataset,
    seen: &mut HashSet<i64>,
    k: &Array2<f64>,
    energy: &Array1<f64>,
    gap: &Array1<f64>,
    density: i64,
    packer: &KeyPacker,
) -> Result<usize> {
    let mut rows = Vec::new();
    for (i, r) in k.rows().into_iter().enumerate() {
        if seen.insert(packer.pack_fractional(&[r[0], r[1], r[2]], density)?) {
            rows.push(i);
        }
    }
    if rows.is_empty() {
        return Ok(0);
    }

    let concat_err = |e: ndarray::ShapeError| NlscanError::Other(e.to_string());
    acc.k = ndarray::concatenate(Axis(0), &[acc.k.view(), k.select(Axis(0), &rows).view()])
        .map_err(concat_err)?;
    acc.energy =
        ndarray::concatenate(Axis(0), &[acc.energy.view(), energy.select(Axis(0), &rows).view()])
            .map_err(concat_err)?;
    acc.gap = ndarray::concatenate(Axis(0), &[acc.gap.view(), gap.select(Axis(0), &rows).view()])
        .map_err(concat_err)?;
    Ok(rows.len())
}

/// 保存对称化结果：`NL{b}_{k,e,g}.npy/.itx` 与 `NL{b}_sym.csv`
pub fn export_dataset(layout: &NodalLayout, band: usize, data: &SymmetrizedDataset) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let k_npy = layout.export_path(band, "k", "npy");
    save_array(&k_npy, &data.k)?;
    written.push(k_npy);
    for (kind, values) in [("e", &data.energy), ("g", &data.gap)] {
        let path = layout.export_path(band, kind, "npy");
        save_array(&path, values)?;
        written.push(path);
    }

    let waves = [
        ("k", data.k.clone().into_dyn()),
        ("e", data.energy.clone().into_dyn()),
        ("g", data.gap.clone().into_dyn()),
    ];
    for (kind, values) in waves {
        // Igor 不接受长度为 0 的波形
        if values.is_empty() {
            continue;
        }
        let path = layout.export_path(band, kind, "itx");
        ItxWave::new(&format!("NL{}_{}", band, kind), values)?.save(&path)?;
        written.push(path);
    }

    let csv = layout.export_path(band, "sym", "csv");
    dataset_to_csv(data, &csv)?;
    written.push(csv);

    Ok(written)
}

/// 汇总新批次，筛选、对称化并导出
pub fn aggregate_band(layout: &NodalLayout, band: usize, cfg: &NodalConfig) -> Result<AggregateReport> {
    if band == 0 {
        return Err(NlscanError::InvalidArgument(
            "band index must be at least 1".to_string(),
        ));
    }
    ensure_dir(&layout.band_root(band))?;

    let packer = KeyPacker::default();
    let mut acc = load_accumulated(layout, band)?;
    let mut seen: HashSet<i64> = acc
        .k
        .rows()
        .into_iter()
        .map(|r| packer.pack_fractional(&[r[0], r[1], r[2]], cfg.density))
        .collect::<Result<_>>()?;

    let klist_dir = layout.klist_dir(band);
    let batches = if klist_dir.is_dir() {
        FileCollector::new(&klist_dir)
            .with_pattern("klist_*.npy")?
            .collect()?
    } else {
        Vec::new()
    };

    let mut report = AggregateReport {
        batches: batches.len(),
        ..AggregateReport::default()
    };
    let pb = progress::create_progress_bar(batches.len() as u64, &format!("Aggregating NL_{}", band));

    for npy in &batches {
        pb.inc(1);
        let stem = batch_stem(&npy.with_extension("klist_band"));
        let agr = result_path(layout, band, &stem, &cfg.spin);
        if !agr.exists() {
            report.unsolved += 1;
            continue;
        }

        let k = load_points(npy)?;
        let (gap, mid) = match batch_values(&agr, band, cfg.max_band_index, k.nrows()) {
            Ok(v) => v,
            Err(e) => {
                pb.suspend(|| output::print_warning(&format!("{}: {}", stem, e)));
                report.rejected.push(stem);
                continue;
            }
        };

        let n = append_new(&mut acc, &mut seen, &k, &mid, &gap, cfg.density, &packer)?;
        if n > 0 {
            report.appended_batches += 1;
            report.appended_points += n;
        }
    }
    pb.finish_and_clear();

    save_accumulated(layout, band, &acc)?;
    report.total_points = acc.len();

    let kept = filter_gap(&acc, cfg.fine_cutoff);
    report.kept = kept.len();
    let sym = symmetrize(&kept);
    report.symmetrized = sym.len();
    export_dataset(layout, band, &sym)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::StopMarker;
    use crate::export::load_array;
    use crate::models::config::WindowRange;
    use crate::models::BandTrace;
    use crate::nodal::refine::build_fine_klists;
    use crate::nodal::solve::solve_batches;
    use crate::nodal::testing::FakeSolver;
    use crate::parsers::agr::to_agr_string;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::fs;
    use tempdir::TempDir;

    fn small_cfg() -> NodalConfig {
        NodalConfig {
            density: 100,
            max_per_file: 3,
            fine_cutoff: 0.005,
            window_x: WindowRange::new(-2, 2, 1),
            window_y: WindowRange::new(0, 0, 1),
            window_z: WindowRange::new(0, 0, 1),
            ..NodalConfig::default()
        }
    }

    fn prepared(dir: &Path) -> (NodalLayout, FakeSolver) {
        let layout = NodalLayout::new(dir.join("mapall"), dir.join("NLs"));
        ensure_dir(&layout.map_root).unwrap();
        save_array(&layout.candidates_path(1), &array![[0.5, 0.5, 0.0]]).unwrap();
        let solver = FakeSolver::new(&dir.join("case"));
        (layout, solver)
    }

    #[test]
    fn test_end_to_end_and_idempotent() {
        let dir = TempDir::new("aggregate").unwrap();
        let (layout, mut solver) = prepared(dir.path());
        let cfg = small_cfg();

        let built = build_fine_klists(&layout, 1, &cfg).unwrap();
        assert_eq!(built.files.len(), 2);
        solve_batches(&layout, 1, &mut solver, StopMarker::new(dir.path().join("stop"))).unwrap();

        let report = aggregate_band(&layout, 1, &cfg).unwrap();
        assert_eq!(report.batches, 2);
        assert_eq!(report.appended_points, 5);
        assert_eq!(report.total_points, 5);
        assert_eq!(report.kept, 1);
        assert_eq!(report.symmetrized, 64);

        let k: Array2<f64> = load_array(&layout.export_path(1, "k", "npy")).unwrap();
        assert_eq!(k.nrows(), 64);
        assert_eq!(k.row(0).to_vec(), vec![0.5, 0.5, 0.0]);
        let e: Array1<f64> = load_array(&layout.export_path(1, "e", "npy")).unwrap();
        assert_abs_diff_eq!(e[0], -0.5, epsilon = 1e-12);
        assert!(layout.export_path(1, "g", "itx").exists());
        assert!(layout.export_path(1, "sym", "csv").exists());

        let again = aggregate_band(&layout, 1, &cfg).unwrap();
        assert_eq!(again.appended_points, 0);
        assert_eq!(again.total_points, 5);
        assert_eq!(again.symmetrized, 64);
    }

    #[test]
    fn test_unsolved_and_mismatched_batches() {
        let dir = TempDir::new("aggregate").unwrap();
        let (layout, _) = prepared(dir.path());
        let cfg = small_cfg();
        build_fine_klists(&layout, 1, &cfg).unwrap();

        // klist_1 有 3 个点，写入只有 2 个 k 点的结果
        ensure_dir(&layout.result_dir(1)).unwrap();
        let trace = BandTrace {
            energy: array![[0.0, 0.0], [0.0, 0.0]],
            weight: array![[0.0, 0.0], [0.0, 0.0]],
        };
        fs::write(result_path(&layout, 1, "klist_1", "up"), to_agr_string(&trace)).unwrap();

        let report = aggregate_band(&layout, 1, &cfg).unwrap();
        assert_eq!(report.unsolved, 1);
        assert_eq!(report.rejected, vec!["klist_1".to_string()]);
        assert_eq!(report.total_points, 0);
        assert_eq!(report.symmetrized, 0);
        assert!(layout.data_path(1, "k").exists());
        assert!(!layout.export_path(1, "k", "itx").exists());
    }

    #[test]
    fn test_band_zero_rejected() {
        let dir = TempDir::new("aggregate").unwrap();
        let (layout, _) = prepared(dir.path());
        assert!(aggregate_band(&layout, 0, &small_cfg()).is_err());
    }
}
