//! # k 路径数据模型
//!
//! 倒空间高对称点路径及其离散化采样点。
//!
//! ## 依赖关系
//! - 被 `kpath/` 模块使用
//! - 被 `commands/klist.rs`, `commands/map.rs` 使用

use crate::error::{NlscanError, Result};

/// 倒空间顶点（倒格子分数坐标）
pub type ReciprocalVertex = [f64; 3];

/// 有序的倒空间顶点序列，可选文本标签
#[derive(Debug, Clone, PartialEq)]
pub struct KPath {
    pub vertices: Vec<ReciprocalVertex>,
    /// 标签数量可少于顶点数量，缺失的标签为空
    pub labels: Vec<String>,
}

impl KPath {
    /// 创建路径，至少需要两个顶点且总长度非零
    pub fn new(vertices: Vec<ReciprocalVertex>, labels: Vec<String>) -> Result<Self> {
        if vertices.len() < 2 {
            return Err(NlscanError::InvalidPath(format!(
                "at least 2 vertices are required, got {}",
                vertices.len()
            )));
        }

        let path = KPath { vertices, labels };
        if path.total_length() <= 0.0 {
            return Err(NlscanError::InvalidPath(
                "total path length is zero".to_string(),
            ));
        }

        Ok(path)
    }

    /// 不带标签的两点直线路径
    pub fn line(start: ReciprocalVertex, end: ReciprocalVertex) -> Result<Self> {
        Self::new(vec![start, end], Vec::new())
    }

    /// 顶点 i 的标签（无则为空字符串）
    pub fn label(&self, i: usize) -> &str {
        self.labels.get(i).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn num_segments(&self) -> usize {
        self.vertices.len() - 1
    }

    /// 每个顶点处的累积弧长，首个顶点为 0
    pub fn cumulative_lengths(&self) -> Vec<f64> {
        let mut acc = 0.0;
        let mut out = Vec::with_capacity(self.vertices.len());
        out.push(0.0);
        for w in self.vertices.windows(2) {
            acc += distance(&w[0], &w[1]);
            out.push(acc);
        }
        out
    }

    pub fn total_length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| distance(&w[0], &w[1]))
            .sum()
    }
}

fn distance(a: &ReciprocalVertex, b: &ReciprocalVertex) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// 采样密度：显式值或按段自动推导
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Density {
    /// 固定密度（四舍五入为整数）
    Explicit(f64),
    /// 由段内最小非零坐标增量推导
    Auto,
}

impl Density {
    /// 命令行约定：`0` 表示自动
    pub fn from_value(d: f64) -> Self {
        if d > 0.0 {
            Density::Explicit(d)
        } else {
            Density::Auto
        }
    }
}

/// 整数量化后的采样点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledKPoint {
    /// 沿路径的采样序号
    pub index: usize,
    pub label: String,
    /// 以 1/density 为单位的坐标
    pub k: [i64; 3],
    pub density: i64,
}

impl SampledKPoint {
    /// 还原为分数坐标
    pub fn fractional(&self) -> [f64; 3] {
        let d = self.density as f64;
        [
            self.k[0] as f64 / d,
            self.k[1] as f64 / d,
            self.k[2] as f64 / d,
        ]
    }
}

/// 解析命令行顶点参数，格式 `kx,ky,kz[:LABEL]`，分量可写为分数 `5/8`
pub fn parse_vertex_arg(input: &str) -> std::result::Result<(ReciprocalVertex, String), String> {
    let (coords, label) = match input.split_once(':') {
        Some((c, l)) => (c, l.trim().to_string()),
        None => (input, String::new()),
    };

    let parts: Vec<&str> = coords.split(',').map(|s| s.trim()).collect();
    if parts.len() != 3 {
        return Err(format!(
            "Invalid vertex '{}': expected 'kx,ky,kz[:LABEL]'",
            input
        ));
    }

    let mut v = [0.0; 3];
    for (slot, part) in v.iter_mut().zip(parts.iter()) {
        *slot = parse_component(part)
            .ok_or_else(|| format!("Invalid coordinate '{}' in vertex '{}'", part, input))?;
    }

    Ok((v, label))
}

fn parse_component(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        s.parse().ok()
    }
}
