//! # pipeline 子命令 CLI 定义
//!
//! map → assemble → coarse → klist → solve → fine
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/pipeline.rs`

use super::nodal::BandsArgs;

use clap::Args;

/// pipeline 子命令参数
#[derive(Args, Debug)]
pub struct PipelineArgs {
    #[command(flatten)]
    pub bands: BandsArgs,

    /// Skip the coarse scan and reuse the existing energy volume
    #[arg(long, default_value_t = false)]
    pub skip_map: bool,
}
