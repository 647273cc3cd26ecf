//! # klist 命令实现
//!
//! ## 功能
//! - 按弧长采样高对称路径并写出 .klist_band
//! - 可选打印顶点序号表
//! - 可选绘制分量图 (PNG/SVG)
//!
//! ## 依赖关系
//! - 使用 `cli/klist.rs` 定义的参数
//! - 使用 `kpath/`, `solver/session.rs`（默认输出路径）

use crate::cli::klist::KlistArgs;
use crate::error::Result;
use crate::kpath::{plot::generate_kpath_plot, sample_path, vertex_table, write_klist};
use crate::models::{Density, KPath, NlscanConfig};
use crate::solver::{BandSolver, SolverSession};
use crate::utils::output;

/// 执行 klist 命令
pub fn execute(args: KlistArgs, config: &NlscanConfig) -> Result<()> {
    output::print_header("Generating k-path");

    let (vertices, labels): (Vec<_>, Vec<_>) = args.vertices.into_iter().unzip();
    let path = KPath::new(vertices, labels)?;

    if args.echo {
        println!("{}", vertex_table(&path, args.points));
    }

    let points = sample_path(&path, args.points, Density::from_value(args.density))?;
    let out = args
        .output
        .unwrap_or_else(|| SolverSession::new(config.session.clone()).klist_path());
    write_klist(&out, &points, &args.tail)?;
    output::print_success(&format!(
        "Wrote {} k-points ({} segments) to {}",
        points.len(),
        path.num_segments(),
        out.display()
    ));

    if let Some(plot) = args.plot {
        let use_svg = plot
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);
        generate_kpath_plot(&points, &plot, "k-path", args.width, args.height, use_svg)?;
        output::print_success(&format!("Plot saved to {}", plot.display()));
    }

    Ok(())
}
