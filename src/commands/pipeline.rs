//! # pipeline 命令实现
//!
//! map → assemble → coarse → (klist → solve → fine) × 能带。
//! 任一级检测到取消标记即停止；已落盘的结果在重跑时复用。
//!
//! ## 依赖关系
//! - 使用 `cli/pipeline.rs` 定义的参数
//! - 使用 `commands/map.rs`, `commands/nodal.rs`

use super::map::{assemble_map, run_scan};
use super::nodal::{coarse_stage, load_volume, refine_bands};
use crate::cli::pipeline::PipelineArgs;
use crate::error::Result;
use crate::models::NlscanConfig;
use crate::nodal::NodalLayout;
use crate::utils::output;

/// 执行 pipeline 命令
pub fn execute(args: PipelineArgs, config: &NlscanConfig) -> Result<()> {
    output::print_header("Nodal line search pipeline");
    println!("{}", config);

    let layout = NodalLayout::from_config(config);

    if !args.skip_map {
        output::print_separator();
        let summary = run_scan(config, &config.map)?;
        if super::report_run("Scan", &summary) {
            return Ok(());
        }
        assemble_map(config, &config.map)?;
    }

    output::print_separator();
    let volume = load_volume(&layout.volume_path())?;
    coarse_stage(&layout, &volume, &args.bands.bands, config.nodal.coarse_cutoff)?;

    refine_bands(&layout, &args.bands.bands, config)?;
    output::print_done("Pipeline finished");
    Ok(())
}
