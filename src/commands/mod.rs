//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。配置在分发前加载一次，各命令只读取。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `nodal/`, `volume/`, `export/`, `utils/`
//! - 子模块: klist, map, assemble, nodal, pipeline, export, config

pub mod assemble;
pub mod config;
pub mod export;
pub mod klist;
pub mod map;
pub mod nodal;
pub mod pipeline;

use crate::batch::{LoopOutcome, RunSummary, StopMarker};
use crate::cli::Commands;
use crate::error::Result;
use crate::models::NlscanConfig;
use crate::utils::output;

use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands, config_path: &Path) -> Result<()> {
    let config = NlscanConfig::load_or_default(config_path)?;

    match cmd {
        Commands::Klist(args) => klist::execute(args, &config),
        Commands::Map(args) => map::execute(args, &config),
        Commands::Assemble(args) => assemble::execute(args, &config),
        Commands::Nodal(args) => nodal::execute(args, &config),
        Commands::Pipeline(args) => pipeline::execute(args, &config),
        Commands::Export(args) => export::execute(args, &config),
        Commands::Config(args) => config::execute(args, &config, config_path),
    }
}

/// case 目录下的取消标记
pub(crate) fn stop_marker(config: &NlscanConfig) -> StopMarker {
    StopMarker::new(config.session.case_dir.join(&config.session.stop_marker))
}

/// 打印循环结果，返回是否被取消
pub(crate) fn report_run(what: &str, summary: &RunSummary) -> bool {
    let r = &summary.result;
    let counts = format!(
        "{}: {} run, {} skipped, {} failed",
        what, r.success, r.skipped, r.failed
    );
    for (name, err) in &r.failures {
        output::print_error(&format!("{}: {}", name, err));
    }

    match summary.outcome {
        LoopOutcome::Completed => {
            output::print_done(&counts);
            false
        }
        LoopOutcome::Stopped => {
            output::print_warning(&format!("{} (stopped by marker)", counts));
            true
        }
    }
}
