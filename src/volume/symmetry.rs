//! # 对称化展开
//!
//! 对筛选后的 (k, 能量, 能隙) 数据依次施加六步复制：
//! 交换 (0,1)、交换 (1,2)、交换 (2,0)，然后翻转轴 0、轴 1、轴 2。
//! 每步把变换后的副本追加到当前数据之后，不去重，最终恰为输入的 64 倍。
//! 步骤顺序决定输出行序，不可调整。
//!
//! ## 依赖关系
//! - 被 `nodal/aggregate.rs` 调用
//! - 使用 `models/nodal.rs`

use crate::models::SymmetrizedDataset;

use ndarray::{s, Array1, Array2};

/// 单步对称操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymOp {
    /// 交换第 `ax` 与第 `(ax+1)%3` 列
    Swap(usize),
    /// 第 `ax` 列取反
    Flip(usize),
}

/// 固定的六步序列
pub const SYM_SEQUENCE: [SymOp; 6] = [
    SymOp::Swap(0),
    SymOp::Swap(1),
    SymOp::Swap(2),
    SymOp::Flip(0),
    SymOp::Flip(1),
    SymOp::Flip(2),
];

impl SymOp {
    pub fn apply(&self, k: &Array2<f64>) -> Array2<f64> {
        let mut out = k.clone();
        match *self {
            SymOp::Swap(ax) => {
                let a = ax % 3;
                let b = (ax + 1) % 3;
                out.column_mut(a).assign(&k.column(b));
                out.column_mut(b).assign(&k.column(a));
            }
            SymOp::Flip(ax) => {
                out.column_mut(ax).mapv_inplace(|v| -v);
            }
        }
        out
    }
}

fn double_rows(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let n = a.nrows();
    let mut out = Array2::zeros((2 * n, a.ncols()));
    out.slice_mut(s![..n, ..]).assign(a);
    out.slice_mut(s![n.., ..]).assign(b);
    out
}

fn double_values(v: &Array1<f64>) -> Array1<f64> {
    let n = v.len();
    let mut out = Array1::zeros(2 * n);
    out.slice_mut(s![..n]).assign(v);
    out.slice_mut(s![n..]).assign(v);
    out
}

/// 施加六步复制，返回 64 倍数据
pub fn symmetrize(data: &SymmetrizedDataset) -> SymmetrizedDataset {
    let mut k = data.k.clone();
    let mut energy = data.energy.clone();
    let mut gap = data.gap.clone();

    for op in SYM_SEQUENCE.iter() {
        k = double_rows(&k, &op.apply(&k));
        energy = double_values(&energy);
        gap = double_values(&gap);
    }

    SymmetrizedDataset { k, energy, gap }
}

/// 保留能隙严格小于 `cutoff` 的行
pub fn filter_gap(data: &SymmetrizedDataset, cutoff: f64) -> SymmetrizedDataset {
    let keep: Vec<usize> = data
        .gap
        .iter()
        .enumerate()
        .filter(|(_, g)| **g < cutoff)
        .map(|(i, _)| i)
        .collect();

    SymmetrizedDataset {
        k: data.k.select(ndarray::Axis(0), &keep),
        energy: data.energy.select(ndarray::Axis(0), &keep),
        gap: data.gap.select(ndarray::Axis(0), &keep),
    }
}
