//! # export 子命令 CLI 定义
//!
//! 可视化导出统一入口：
//! - `waves`: 能量体按能带展开为 Igor 波形
//! - `voxel`: 二维扫描的能量分箱占据体
//! - `dos`: 态密度文件转换为 Igor 波形
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/export.rs`

use crate::volume::assembler::DEFAULT_TEMPLATE;

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// export 主命令参数
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub command: ExportCommands,
}

/// export 子命令
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Unfold an energy volume and write one wave per band in the window
    Waves(WavesArgs),

    /// Build energy-binned occupancy volumes from a 2-D scan
    Voxel(VoxelArgs),

    /// Convert .dos files into Igor waves, one file per case prefix
    Dos(DosArgs),
}

// ─────────────────────────────────────────────────────────────
// 能带波形
// ─────────────────────────────────────────────────────────────

/// waves 子命令参数
#[derive(Args, Debug)]
pub struct WavesArgs {
    /// Energy volume (default: {map_root}/data.npy)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Wave name prefix
    #[arg(long, default_value = "map")]
    pub name: String,

    /// Lower edge of the energy window (eV)
    #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
    pub e_start: f64,

    /// Upper edge of the energy window (eV)
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub e_end: f64,

    /// Output directory (default: {map_root}/waves)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// 占据体
// ─────────────────────────────────────────────────────────────

/// voxel 子命令参数
#[derive(Args, Debug)]
pub struct VoxelArgs {
    /// Directory holding the .bands.agr files (default: {map_root}/data)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Number of files along ky (default: map.ny + 1)
    #[arg(long)]
    pub ny: Option<usize>,

    /// File name template with {ky}, {kz} and {spin} placeholders
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Spin suffixes, one volume each
    #[arg(long, value_delimiter = ',', default_value = "up,dn")]
    pub spins: Vec<String>,

    /// Lower edge of the energy window (eV)
    #[arg(long, default_value_t = -3.0, allow_hyphen_values = true)]
    pub e_start: f64,

    /// Upper edge of the energy window (eV)
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub e_end: f64,

    /// Energy bin width (eV)
    #[arg(long, default_value_t = 0.01)]
    pub e_step: f64,

    /// Output directory (default: {map_root})
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ─────────────────────────────────────────────────────────────
// 态密度
// ─────────────────────────────────────────────────────────────

/// dos 子命令参数
#[derive(Args, Debug)]
pub struct DosArgs {
    /// Directories containing .dos files
    #[arg(required = true)]
    pub dirs: Vec<PathBuf>,
}
