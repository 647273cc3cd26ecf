//! # assemble 子命令 CLI 定义
//!
//! 将扫描得到的 .bands.agr 拼接为能量体
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/assemble.rs`

use crate::volume::assembler::DEFAULT_TEMPLATE;

use clap::Args;
use std::path::PathBuf;

/// assemble 子命令参数
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Directory holding the .bands.agr files (default: {map_root}/data)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Number of files along ky (default: map.ny + 1)
    #[arg(long)]
    pub ny: Option<usize>,

    /// Number of files along kz (default: map.nz + 1 for a 3-D map)
    #[arg(long)]
    pub nz: Option<usize>,

    /// File name template with {ky}, {kz} and {spin} placeholders
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Spin suffix substituted for {spin} (default: map.spin)
    #[arg(long)]
    pub spin: Option<String>,

    /// Output .npy file (default: {map_root}/data.npy)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
