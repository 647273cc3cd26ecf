//! # nodal 命令实现
//!
//! 节线细化各级命令，每一级对多个能带号依次执行。
//!
//! ## 功能
//! - coarse: 能量体 → 候选点 `NL_{b}.npy`
//! - klist: 候选点 → 细网格批次
//! - solve: 顺序求解批次，可由标记文件中断
//! - fine: 汇总 → 筛选 → 对称化 → 导出
//! - run: klist → solve → fine
//!
//! ## 依赖关系
//! - 使用 `cli/nodal.rs` 定义的参数
//! - 使用 `nodal/`, `solver/`, `export/npy.rs`
//! - 使用 `tabled` 打印汇总表

use crate::cli::nodal::{NodalArgs, NodalCommands};
use crate::error::Result;
use crate::export::load_array;
use crate::models::{EnergyVolume, NlscanConfig, NodalConfig};
use crate::nodal::aggregate::{aggregate_band, AggregateReport};
use crate::nodal::refine::{build_fine_klists, coarse_candidates, save_candidates};
use crate::nodal::solve::solve_batches;
use crate::nodal::NodalLayout;
use crate::solver::{check_output_spin, BandSolver, SolverSession};
use crate::utils::output;

use ndarray::IxDyn;
use std::path::Path;
use tabled::{Table, Tabled};

/// 候选点汇总行
#[derive(Debug, Tabled)]
struct CandidateRow {
    #[tabled(rename = "Band")]
    band: usize,
    #[tabled(rename = "Candidates")]
    candidates: usize,
    #[tabled(rename = "File")]
    file: String,
}

/// 细网格汇总行
#[derive(Debug, Tabled)]
struct FineRow {
    #[tabled(rename = "Band")]
    band: usize,
    #[tabled(rename = "Batches")]
    batches: usize,
    #[tabled(rename = "New")]
    appended: usize,
    #[tabled(rename = "Unsolved")]
    unsolved: usize,
    #[tabled(rename = "Rejected")]
    rejected: usize,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Gap < cutoff")]
    kept: usize,
    #[tabled(rename = "Symmetrized")]
    symmetrized: usize,
}

impl FineRow {
    fn new(band: usize, r: &AggregateReport) -> Self {
        FineRow {
            band,
            batches: r.batches,
            appended: r.appended_points,
            unsolved: r.unsolved,
            rejected: r.rejected.len(),
            total: r.total_points,
            kept: r.kept,
            symmetrized: r.symmetrized,
        }
    }
}

/// 执行 nodal 命令
pub fn execute(args: NodalArgs, config: &NlscanConfig) -> Result<()> {
    let layout = NodalLayout::from_config(config);

    match args.command {
        NodalCommands::Coarse(a) => {
            output::print_header("Extracting coarse candidates");
            let cutoff = a.cutoff.unwrap_or(config.nodal.coarse_cutoff);
            let path = a.volume.unwrap_or_else(|| layout.volume_path());
            let volume = load_volume(&path)?;
            coarse_stage(&layout, &volume, &a.bands.bands, cutoff)
        }
        NodalCommands::Klist(a) => {
            output::print_header("Building fine k-lists");
            for &band in &a.bands {
                klist_stage(&layout, band, &config.nodal)?;
            }
            Ok(())
        }
        NodalCommands::Solve(a) => {
            output::print_header("Solving fine batches");
            let mut solver = SolverSession::new(config.session.clone());
            for &band in &a.bands {
                if solve_stage(&layout, band, &mut solver, config)? {
                    break;
                }
            }
            Ok(())
        }
        NodalCommands::Fine(a) => {
            output::print_header("Aggregating fine results");
            check_output_spin(
                &SolverSession::new(config.session.clone()),
                "nodal.spin",
                &config.nodal.spin,
            )?;
            let mut nodal = config.nodal.clone();
            if let Some(c) = a.cutoff {
                nodal.fine_cutoff = c;
            }
            fine_stage(&layout, &a.bands.bands, &nodal)
        }
        NodalCommands::Run(a) => {
            output::print_header("Nodal line refinement");
            refine_bands(&layout, &a.bands, config)
        }
    }
}

/// 读取 .npy 能量体
pub(crate) fn load_volume(path: &Path) -> Result<EnergyVolume> {
    let data = load_array::<f64, IxDyn>(path)?;
    let volume = EnergyVolume::new(data)?;
    output::print_info(&format!(
        "Loaded volume {:?} from {}",
        volume.data().shape(),
        path.display()
    ));
    Ok(volume)
}

/// 粗网格候选点提取并保存
pub(crate) fn coarse_stage(
    layout: &NodalLayout,
    volume: &EnergyVolume,
    bands: &[usize],
    cutoff: f64,
) -> Result<()> {
    output::print_info(&format!("Gap cutoff {} eV", cutoff));

    let mut rows = Vec::with_capacity(bands.len());
    for &band in bands {
        let cloud = coarse_candidates(volume, band, cutoff)?;
        let file = save_candidates(layout, &cloud)?;
        rows.push(CandidateRow {
            band,
            candidates: cloud.len(),
            file: file.display().to_string(),
        });
    }

    println!("{}", Table::new(rows));
    Ok(())
}

/// 生成细网格批次
pub(crate) fn klist_stage(layout: &NodalLayout, band: usize, nodal: &NodalConfig) -> Result<()> {
    let report = build_fine_klists(layout, band, nodal)?;
    if report.files.is_empty() {
        output::print_skip(&format!(
            "NL_{}: all {} points already solved or queued",
            band, report.enumerated
        ));
    } else {
        output::print_success(&format!(
            "NL_{}: {} candidates -> {} new points ({} solved, {} queued) in {} files",
            band,
            report.candidates,
            report.new_points(),
            report.already_solved,
            report.already_queued,
            report.files.len()
        ));
    }
    Ok(())
}

/// 求解待处理批次，返回是否被取消
pub(crate) fn solve_stage<S: BandSolver>(
    layout: &NodalLayout,
    band: usize,
    solver: &mut S,
    config: &NlscanConfig,
) -> Result<bool> {
    check_output_spin(&*solver, "nodal.spin", &config.nodal.spin)?;
    let summary = solve_batches(layout, band, solver, super::stop_marker(config))?;
    Ok(super::report_run(&format!("NL_{}", band), &summary))
}

/// 汇总 → 对称化 → 导出
pub(crate) fn fine_stage(layout: &NodalLayout, bands: &[usize], nodal: &NodalConfig) -> Result<()> {
    let mut rows = Vec::with_capacity(bands.len());
    for &band in bands {
        let report = aggregate_band(layout, band, nodal)?;
        for stem in &report.rejected {
            output::print_warning(&format!("NL_{}: {} discarded", band, stem));
        }
        rows.push(FineRow::new(band, &report));
    }
    println!("{}", Table::new(rows));
    output::print_done(&format!("Exported to {}", layout.nodal_root.display()));
    Ok(())
}

/// 每个能带依次 klist → solve → fine；取消时停止后续能带
pub(crate) fn refine_bands(layout: &NodalLayout, bands: &[usize], config: &NlscanConfig) -> Result<()> {
    let mut solver = SolverSession::new(config.session.clone());
    check_output_spin(&solver, "nodal.spin", &config.nodal.spin)?;
    for &band in bands {
        output::print_separator();
        klist_stage(layout, band, &config.nodal)?;
        if solve_stage(layout, band, &mut solver, config)? {
            return Ok(());
        }
        fine_stage(layout, &[band], &config.nodal)?;
    }
    Ok(())
}
