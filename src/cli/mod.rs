//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `klist`: 由高对称点生成 .klist_band
//! - `map`: 粗网格扫描
//! - `assemble`: 拼接能量体
//! - `nodal`: 节线细化（嵌套子命令 coarse / klist / solve / fine / run）
//! - `pipeline`: 从扫描到导出的完整流程
//! - `export`: 可视化导出（嵌套子命令 waves / voxel / dos）
//! - `config`: 显示或生成配置文件
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: klist, map, assemble, nodal, pipeline, export, config

pub mod assemble;
pub mod config;
pub mod export;
pub mod klist;
pub mod map;
pub mod nodal;
pub mod pipeline;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nlscan - WIEN2k 节线搜索自动化工具
#[derive(Parser)]
#[command(name = "nlscan")]
#[command(version)]
#[command(about = "Nodal-line search automation for LAPW band-structure calculations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults are used when it does not exist)
    #[arg(long, global = true, default_value = "nlscan.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Sample a k-path into a .klist_band file
    Klist(klist::KlistArgs),

    /// Run the coarse band scan over the (kx, ky[, kz]) mesh
    Map(map::MapArgs),

    /// Stitch scanned .bands.agr files into an energy volume (.npy)
    Assemble(assemble::AssembleArgs),

    /// Coarse-to-fine nodal line refinement
    Nodal(nodal::NodalArgs),

    /// Run map, assemble and the nodal stages in sequence
    Pipeline(pipeline::PipelineArgs),

    /// Export volumes and DOS as Igor text waves
    Export(export::ExportArgs),

    /// Show or initialise the configuration file
    Config(config::ConfigArgs),
}
