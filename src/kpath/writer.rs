//! # .klist_band 文件写出
//!
//! ## 格式说明
//! ```text
//! G             0    0    0 5000  2.0-8.00 8.00
//!             500    0    0 5000  2.0
//! ...
//! X          5000    0    0 5000  2.0
//! END
//! ```
//! 标签占 10 列左对齐，kx/ky/kz/密度各 5 列右对齐，随后是固定权重 `  2.0`；
//! 能量窗口尾标只出现在第一行。
//!
//! ## 依赖关系
//! - 被 `commands/klist.rs`, `commands/map.rs`, `nodal/refine.rs` 调用
//! - 使用 `models/kpath.rs`

use crate::error::{NlscanError, Result};
use crate::models::SampledKPoint;

use std::fs;
use std::path::Path;

/// 默认能量窗口尾标
pub const DEFAULT_TAIL: &str = "-8.00 8.00";

/// 固定权重字段
const WEIGHT_FIELD: &str = "  2.0";

/// 格式化单行记录
fn format_line(label: &str, k: &[i64; 3], density: i64, tail: &str) -> String {
    format!(
        "{:<10}{:>5}{:>5}{:>5}{:>5}{}{}",
        label, k[0], k[1], k[2], density, WEIGHT_FIELD, tail
    )
}

/// 将采样点格式化为 .klist_band 文本
pub fn format_klist(points: &[SampledKPoint], tail: &str) -> String {
    let mut out = String::with_capacity(points.len() * 48 + 4);
    for (i, p) in points.iter().enumerate() {
        let t = if i == 0 { tail } else { "" };
        out.push_str(&format_line(&p.label, &p.k, p.density, t));
        out.push('\n');
    }
    out.push_str("END\n");
    out
}

/// 直接写出已量化的整数坐标（不插值、无标签），用于重新输出筛选后的点集
pub fn format_direct(points: &[[i64; 3]], density: i64, tail: &str) -> String {
    let mut out = String::with_capacity(points.len() * 48 + 4);
    for (i, k) in points.iter().enumerate() {
        let t = if i == 0 { tail } else { "" };
        out.push_str(&format_line("", k, density, t));
        out.push('\n');
    }
    out.push_str("END\n");
    out
}

/// 写出 .klist_band 文件
pub fn write_klist(path: &Path, points: &[SampledKPoint], tail: &str) -> Result<()> {
    write_text(path, &format_klist(points, tail))
}

/// 写出整数坐标 .klist_band 文件
pub fn write_direct(path: &Path, points: &[[i64; 3]], density: i64, tail: &str) -> Result<()> {
    write_text(path, &format_direct(points, density, tail))
}

/// 按固定列宽解析 .klist_band 文本，读到 `END` 为止
#[cfg(test)]
pub(crate) fn parse_klist(content: &str, name: &str) -> Result<Vec<SampledKPoint>> {
    let mut points = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("END") {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let field = |lo: usize| -> Result<i64> {
            line.get(lo..lo + 5)
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| NlscanError::ParseError {
                    format: "klist_band".to_string(),
                    path: name.to_string(),
                    reason: format!("line {}: bad field at column {}", lineno + 1, lo + 1),
                })
        };
        let label = line.get(..10).unwrap_or_default().trim().to_string();
        points.push(SampledKPoint {
            index: points.len(),
            label,
            k: [field(10)?, field(15)?, field(20)?],
            density: field(25)?,
        });
    }
    Ok(points)
}

/// 读取 .klist_band 文件
#[cfg(test)]
pub(crate) fn read_klist(path: &Path) -> Result<Vec<SampledKPoint>> {
    let content = fs::read_to_string(path).map_err(|e| NlscanError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_klist(&content, &path.display().to_string())
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| NlscanError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpath::sampler::sample_path;
    use crate::models::{Density, KPath};

    #[test]
    fn test_fixed_width_lines() {
        let path = KPath::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec!["G".into(), "X".into()],
        )
        .unwrap();
        let pts = sample_path(&path, 11, Density::Explicit(5000.0)).unwrap();
        let text = format_klist(&pts, DEFAULT_TAIL);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "G             0    0    0 5000  2.0-8.00 8.00");
        assert_eq!(lines[1], "            500    0    0 5000  2.0");
        assert_eq!(lines[10], "X          5000    0    0 5000  2.0");
        assert_eq!(lines[11], "END");
    }

    #[test]
    fn test_direct_lines() {
        let text = format_direct(&[[10, 20, 30], [4999, 0, 1]], 5000, DEFAULT_TAIL);
        assert_eq!(
            text,
            "             10   20   30 5000  2.0-8.00 8.00\n           4999    0    1 5000  2.0\nEND\n"
        );
    }

    #[test]
    fn test_parse_written_klist() {
        let path = KPath::new(
            vec![[0.0, 0.0, 0.0], [0.5, 0.25, 1.0]],
            vec!["G".into(), "Z".into()],
        )
        .unwrap();
        let pts = sample_path(&path, 5, Density::Explicit(5000.0)).unwrap();
        let back = parse_klist(&format_klist(&pts, DEFAULT_TAIL), "inline").unwrap();
        assert_eq!(back, pts);

        let direct = parse_klist(&format_direct(&[[-25, 0, -5000]], 5000, ""), "inline").unwrap();
        assert_eq!(direct[0].k, [-25, 0, -5000]);
        assert!(parse_klist("G    x\n", "bad").is_err());
    }

    #[test]
    fn test_negative_coordinates_keep_width() {
        let text = format_direct(&[[-25, 0, -5000]], 5000, "");
        assert_eq!(text.lines().next().unwrap(), "            -25    0-5000 5000  2.0");
    }
}
