//! # k 路径分量图
//!
//! 使用 `plotters` 绘制采样点 kx/ky/kz（分数坐标）随采样序号的变化，
//! 用于生成 .klist_band 前目视检查路径。
//!
//! ## 依赖关系
//! - 被 `commands/klist.rs` 调用
//! - 使用 `plotters` 渲染图表

use crate::error::{NlscanError, Result};
use crate::models::SampledKPoint;

use plotters::prelude::*;
use std::path::Path;

/// 生成路径分量图，`use_svg` 为 false 时输出 PNG
pub fn generate_kpath_plot(
    points: &[SampledKPoint],
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_components(&root, points, title)?;
        root.present()
            .map_err(|e| NlscanError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_components(&root, points, title)?;
        root.present()
            .map_err(|e| NlscanError::Other(e.to_string()))?;
    }
    Ok(())
}

fn draw_components<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    points: &[SampledKPoint],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| NlscanError::Other(format!("{:?}", e)))?;

    let frac: Vec<[f64; 3]> = points.iter().map(|p| p.fractional()).collect();
    let (lo, hi) = frac
        .iter()
        .flat_map(|k| k.iter().copied())
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.05).max(0.05);
    let x_max = points.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..x_max, (lo - pad)..(hi + pad))
        .map_err(|e| NlscanError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Sample index")
        .y_desc("k (2π/a)")
        .draw()
        .map_err(|e| NlscanError::Other(format!("{:?}", e)))?;

    let series = [("x", RED), ("y", GREEN), ("z", BLUE)];
    for (ax, (name, color)) in series.iter().enumerate() {
        let color = *color;
        chart
            .draw_series(LineSeries::new(
                frac.iter().enumerate().map(|(i, k)| (i as f64, k[ax])),
                color.stroke_width(2),
            ))
            .map_err(|e| NlscanError::Other(format!("{:?}", e)))?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| NlscanError::Other(format!("{:?}", e)))?;

    Ok(())
}
