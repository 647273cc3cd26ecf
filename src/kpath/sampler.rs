//! # k 路径采样器
//!
//! 将高对称点序列离散化为等间距、整数量化的采样点列表。
//!
//! ## 算法
//! 1. 按累积欧氏弧长把每个顶点映射到采样序号 `0..=M-1`（舍入取偶）
//! 2. 每段采样 `[start, end)`，末段额外包含 `end`
//! 3. 段内线性插值，坐标乘以密度后取整
//! 4. 段首采样点带该段起点标签，末点带终点标签
//!
//! ## 依赖关系
//! - 被 `commands/klist.rs`, `commands/map.rs` 调用
//! - 使用 `models/kpath.rs`

use crate::error::{NlscanError, Result};
use crate::models::{Density, KPath, SampledKPoint};

/// 每个顶点对应的采样序号，末顶点固定为 `num_points - 1`
pub fn vertex_indices(path: &KPath, num_points: usize) -> Vec<usize> {
    let lengths = path.cumulative_lengths();
    let total = path.total_length();
    let span = num_points.saturating_sub(1) as f64;

    lengths
        .iter()
        .map(|len| (len / total * span).round_ties_even() as usize)
        .collect()
}

/// 对路径进行采样，返回恰好 `num_points` 个采样点
pub fn sample_path(path: &KPath, num_points: usize, density: Density) -> Result<Vec<SampledKPoint>> {
    if num_points == 0 {
        return Err(NlscanError::InvalidPath(
            "number of sample points must be positive".to_string(),
        ));
    }

    let indices = vertex_indices(path, num_points);
    let nseg = path.num_segments();
    let mut points = Vec::with_capacity(num_points);

    for seg in 0..nseg {
        let ks = path.vertices[seg];
        let ke = path.vertices[seg + 1];
        let i_s = indices[seg];
        let i_ee = indices[seg + 1];
        let is_last = seg == nseg - 1;
        let i_e = if is_last { i_ee + 1 } else { i_ee };

        if i_s == i_e {
            continue;
        }

        let dnum = segment_density(seg, &ks, &ke, i_ee - i_s, density)?;

        let mut head = path.label(seg).to_string();
        for i in i_s..i_e {
            if i == i_ee && seg + 1 < path.labels.len() {
                head = path.labels[seg + 1].clone();
            }

            let sc = if i_ee == i_s {
                1.0
            } else {
                (i - i_s) as f64 / (i_ee - i_s) as f64
            };

            let mut k = [0i64; 3];
            for ax in 0..3 {
                let v = ks[ax] * (1.0 - sc) + ke[ax] * sc;
                k[ax] = (v * dnum as f64).round_ties_even() as i64;
            }

            points.push(SampledKPoint {
                index: i,
                label: std::mem::take(&mut head),
                k,
                density: dnum,
            });
        }
    }

    Ok(points)
}

/// 计算段密度：显式值取整，或由段内最小非零坐标增量推导
fn segment_density(
    seg: usize,
    ks: &[f64; 3],
    ke: &[f64; 3],
    nsamples: usize,
    density: Density,
) -> Result<i64> {
    match density {
        Density::Explicit(d) => Ok(d.round_ties_even() as i64),
        Density::Auto => {
            let minwid = ks
                .iter()
                .zip(ke.iter())
                .map(|(a, b)| (a - b).abs())
                .filter(|d| *d > 0.0)
                .fold(f64::INFINITY, f64::min);

            if !minwid.is_finite() {
                return Err(NlscanError::DegenerateSegment { segment: seg });
            }

            Ok((nsamples as f64 / minwid).round_ties_even() as i64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gx_path() -> KPath {
        KPath::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec!["G".to_string(), "X".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_gx_path_endpoints_and_labels() {
        let pts = sample_path(&gx_path(), 11, Density::Explicit(5000.0)).unwrap();
        assert_eq!(pts.len(), 11);

        assert_eq!(pts[0].label, "G");
        assert_eq!(pts[0].k, [0, 0, 0]);
        assert_eq!(pts[10].label, "X");
        assert_eq!(pts[10].k, [5000, 0, 0]);

        for p in &pts[1..10] {
            assert!(p.label.is_empty());
        }
        for w in pts.windows(2) {
            assert!(w[1].k[0] > w[0].k[0]);
        }
        assert_eq!(pts[5].k, [2500, 0, 0]);
        assert!(pts.iter().all(|p| p.density == 5000));
    }

    #[test]
    fn test_indices_contiguous_over_many_segments() {
        let path = KPath::new(
            vec![
                [0.5, 0.0, 1.0],
                [0.5, 0.5, 0.5],
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.5, 0.0, 0.5],
                [0.75, 0.0, 0.75],
                [0.0, 0.0, 0.0],
            ],
            ["W", "L", "G", "X", "W", "K", "G"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap();

        for m in [7usize, 11, 50, 101] {
            let pts = sample_path(&path, m, Density::Explicit(1000.0)).unwrap();
            let idx: Vec<usize> = pts.iter().map(|p| p.index).collect();
            assert_eq!(idx, (0..m).collect::<Vec<_>>(), "m = {}", m);
            assert_eq!(pts.first().unwrap().k, [500, 0, 1000]);
            assert_eq!(pts.last().unwrap().k, [0, 0, 0]);
            assert_eq!(pts.last().unwrap().label, "G");
        }
    }

    #[test]
    fn test_segment_labels_at_boundaries() {
        let path = KPath::new(
            vec![[0.5, 0.0, 0.0], [0.0, 0.0, 0.0], [0.5, 0.5, 0.0]],
            vec!["L".into(), "G".into(), "X".into()],
        )
        .unwrap();
        let pts = sample_path(&path, 11, Density::Explicit(100.0)).unwrap();
        let labelled: Vec<(usize, &str)> = pts
            .iter()
            .filter(|p| !p.label.is_empty())
            .map(|p| (p.index, p.label.as_str()))
            .collect();
        let g_index = vertex_indices(&path, 11)[1];
        assert_eq!(labelled, vec![(0, "L"), (g_index, "G"), (10, "X")]);
    }

    #[test]
    fn test_auto_density() {
        // 10 个采样区间，最小非零增量 0.5 -> 密度 20
        let path = KPath::line([0.0, 0.0, 0.0], [0.5, 1.0, 0.0]).unwrap();
        let pts = sample_path(&path, 11, Density::Auto).unwrap();
        assert!(pts.iter().all(|p| p.density == 20));
        assert_eq!(pts.last().unwrap().k, [10, 20, 0]);
    }

    #[test]
    fn test_auto_density_rejects_degenerate_segment() {
        let path = KPath::new(
            vec![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec![],
        )
        .unwrap();
        // 长度为零的首段没有分配采样点，会被跳过
        assert!(sample_path(&path, 11, Density::Auto).is_ok());

        let path = KPath::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            vec![],
        )
        .unwrap();
        let err = sample_path(&path, 11, Density::Auto).unwrap_err();
        assert!(matches!(err, NlscanError::DegenerateSegment { segment: 1 }));

        // 显式密度下同一路径合法
        let pts = sample_path(&path, 11, Density::Explicit(10.0)).unwrap();
        assert_eq!(pts.len(), 11);
        assert_eq!(pts.last().unwrap().k, [10, 0, 0]);
    }

    #[test]
    fn test_zero_points_rejected() {
        assert!(sample_path(&gx_path(), 0, Density::Explicit(10.0)).is_err());
        let single = sample_path(&gx_path(), 1, Density::Explicit(10.0)).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].k, [10, 0, 0]);
    }
}
