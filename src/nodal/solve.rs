//! # 细网格求解循环
//!
//! 依次对尚未求解的批次文件调用求解器。`band/` 下已有全部自旋输出的批次视为已求解。
//! 每个批次开始前检查取消标记；求解器失败立即返回，失败批次不会被记为已求解。
//!
//! ## 依赖关系
//! - 被 `commands/nodal.rs`, `commands/pipeline.rs` 调用
//! - 使用 `batch/`, `solver/`

use super::{ensure_dir, NodalLayout};
use crate::batch::{BatchRunner, FileCollector, ProcessResult, RunSummary, StopMarker};
use crate::error::{NlscanError, Result};
use crate::solver::BandSolver;

use std::fs;
use std::path::{Path, PathBuf};

/// 批次文件主干，如 `klist_12`
pub fn batch_stem(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.trim_end_matches(".klist_band").to_string())
        .unwrap_or_default()
}

/// 按批次号排序的全部批次文件
pub fn batch_files(layout: &NodalLayout, band: usize) -> Result<Vec<PathBuf>> {
    let dir = layout.klist_dir(band);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    FileCollector::new(&dir)
        .with_pattern("klist_*.klist_band")?
        .collect()
}

/// 批次在 `spin` 下的能带输出
pub fn result_path(layout: &NodalLayout, band: usize, stem: &str, spin: &str) -> PathBuf {
    layout
        .result_dir(band)
        .join(format!("{}{}.bands.agr", stem, spin))
}

/// 缺少任一自旋输出的批次
pub fn pending_batches(layout: &NodalLayout, band: usize, spins: &[String]) -> Result<Vec<PathBuf>> {
    Ok(batch_files(layout, band)?
        .into_iter()
        .filter(|f| {
            let stem = batch_stem(f);
            !spins
                .iter()
                .all(|s| result_path(layout, band, &stem, s).exists())
        })
        .collect())
}

/// 顺序求解所有待求解批次
pub fn solve_batches<S: BandSolver>(
    layout: &NodalLayout,
    band: usize,
    solver: &mut S,
    marker: StopMarker,
) -> Result<RunSummary> {
    let result_dir = layout.result_dir(band);
    ensure_dir(&result_dir)?;

    let pending = pending_batches(layout, band, &solver.output_spins())?;
    let runner = BatchRunner::new(marker, &format!("Solving NL_{}", band));

    runner.run(&pending, |p| batch_stem(p), |klist| {
        let stem = batch_stem(klist);
        let staged = solver.klist_path();
        fs::copy(klist, &staged).map_err(|e| NlscanError::FileWriteError {
            path: staged.display().to_string(),
            source: e,
        })?;
        solver.run_band(&result_dir, &stem)?;
        Ok(ProcessResult::Success(stem))
    })
}
