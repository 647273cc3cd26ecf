//! # klist 子命令 CLI 定义
//!
//! 由高对称点序列生成 .klist_band 文件
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/klist.rs`

use crate::kpath::DEFAULT_TAIL;
use crate::models::kpath::parse_vertex_arg;
use crate::models::ReciprocalVertex;

use clap::Args;
use std::path::PathBuf;

/// 顶点参数：坐标与标签
pub type VertexArg = (ReciprocalVertex, String);

/// klist 子命令参数
#[derive(Args, Debug)]
pub struct KlistArgs {
    /// Path vertices as 'kx,ky,kz[:LABEL]', fractions allowed (e.g. '0,0,0:G' '1/2,0,0:X')
    #[arg(required = true, num_args = 2.., value_parser = parse_vertex_arg)]
    pub vertices: Vec<VertexArg>,

    /// Total number of sample points along the path
    #[arg(short = 'n', long, default_value_t = 101)]
    pub points: usize,

    /// Quantisation density (0 = derive per segment from the smallest coordinate step)
    #[arg(short, long, default_value_t = 0.0)]
    pub density: f64,

    /// Output file (default: {case_dir}/{case}.klist_band)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Energy window marker written on the first line
    #[arg(long, default_value = DEFAULT_TAIL, allow_hyphen_values = true)]
    pub tail: String,

    /// Print the vertex table
    #[arg(long, default_value_t = false)]
    pub echo: bool,

    /// Plot the quantised coordinates (PNG, or SVG by extension)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Figure width in pixels
    #[arg(long, default_value_t = 1000)]
    pub width: u32,

    /// Figure height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}
