//! # map 子命令 CLI 定义
//!
//! 粗网格扫描，未给出的参数取配置文件 `[map]` 中的值
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/map.rs`

use clap::Args;

/// map 子命令参数
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Intervals along kx (nx + 1 samples per slice)
    #[arg(long)]
    pub nx: Option<usize>,

    /// Intervals along ky
    #[arg(long)]
    pub ny: Option<usize>,

    /// Intervals along kz (0 = a single kz = 0 plane)
    #[arg(long)]
    pub nz: Option<usize>,

    /// Quantisation density for the slice paths (0 = auto)
    #[arg(short, long)]
    pub density: Option<f64>,

    /// Assemble the energy volume after the scan completes
    #[arg(long, default_value_t = false)]
    pub assemble: bool,
}
