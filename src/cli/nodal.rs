//! # nodal 子命令 CLI 定义
//!
//! 节线细化各级的入口：
//! - `coarse`: 从能量体提取候选点
//! - `klist`: 生成细网格批次
//! - `solve`: 顺序求解批次
//! - `fine`: 汇总、筛选、对称化并导出
//! - `run`: 依次执行 klist → solve → fine
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/nodal.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// nodal 主命令参数
#[derive(Args, Debug)]
pub struct NodalArgs {
    #[command(subcommand)]
    pub command: NodalCommands,
}

/// nodal 子命令
#[derive(Subcommand, Debug)]
pub enum NodalCommands {
    /// Extract coarse candidates from the energy volume
    Coarse(CoarseArgs),

    /// Build fine .klist_band batches around the candidates
    Klist(BandsArgs),

    /// Run the solver on every unsolved batch
    Solve(BandsArgs),

    /// Aggregate solved batches, symmetrize and export
    Fine(FineArgs),

    /// klist, solve and fine in sequence
    Run(BandsArgs),
}

/// 能带号列表
#[derive(Args, Debug)]
pub struct BandsArgs {
    /// Band indices b (the pair b-1, b is compared), e.g. '30 31' or '30,31'
    #[arg(required = true, num_args = 1.., value_delimiter = ',')]
    pub bands: Vec<usize>,
}

/// coarse 子命令参数
#[derive(Args, Debug)]
pub struct CoarseArgs {
    #[command(flatten)]
    pub bands: BandsArgs,

    /// Gap cutoff in eV (default: nodal.coarse_cutoff)
    #[arg(long)]
    pub cutoff: Option<f64>,

    /// Energy volume (default: {map_root}/data.npy)
    #[arg(long)]
    pub volume: Option<PathBuf>,
}

/// fine 子命令参数
#[derive(Args, Debug)]
pub struct FineArgs {
    #[command(flatten)]
    pub bands: BandsArgs,

    /// Gap cutoff in eV (default: nodal.fine_cutoff)
    #[arg(long)]
    pub cutoff: Option<f64>,
}
