//! # 节线搜索数据模型
//!
//! 简并点云 (`DegeneracyCloud`) 与对称化后的导出数据集 (`SymmetrizedDataset`)。
//!
//! ## 依赖关系
//! - 被 `volume/degeneracy.rs`, `volume/symmetry.rs` 使用
//! - 被 `nodal/` 流水线使用

use ndarray::{Array1, Array2};

/// 两条相邻能带能隙小于阈值的网格坐标集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegeneracyCloud {
    /// 所比较的能带号（1 起，比较 b-1 与 b）
    pub band: usize,
    /// 网格坐标，不足三维的轴补 0
    pub points: Vec<[usize; 3]>,
    /// 坐标所在网格的形状（补足三维，缺失轴为 1）
    pub mesh: [usize; 3],
}

impl DegeneracyCloud {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 网格序号换算为分数坐标：i / (n - 1)
    pub fn fractional(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.points.len(), 3));
        for (mut row, p) in out.rows_mut().into_iter().zip(self.points.iter()) {
            for ax in 0..3 {
                let n = self.mesh[ax];
                row[ax] = if n > 1 {
                    p[ax] as f64 / (n - 1) as f64
                } else {
                    0.0
                };
            }
        }
        out
    }
}

/// 对称化后的导出数据：k 点、中点能量、能隙三组平行数组
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetrizedDataset {
    /// (N, 3) 分数坐标
    pub k: Array2<f64>,
    pub energy: Array1<f64>,
    pub gap: Array1<f64>,
}

impl SymmetrizedDataset {
    pub fn empty() -> Self {
        SymmetrizedDataset {
            k: Array2::zeros((0, 3)),
            energy: Array1::zeros(0),
            gap: Array1::zeros(0),
        }
    }

    pub fn len(&self) -> usize {
        self.k.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.k.nrows() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_coordinates() {
        let cloud = DegeneracyCloud {
            band: 2,
            points: vec![[100, 50, 0], [0, 0, 25]],
            mesh: [101, 101, 101],
        };
        let frac = cloud.fractional();
        assert_eq!(frac.row(0).to_vec(), vec![1.0, 0.5, 0.0]);
        assert_eq!(frac.row(1).to_vec(), vec![0.0, 0.0, 0.25]);
    }

    #[test]
    fn test_fractional_flat_axis() {
        let cloud = DegeneracyCloud {
            band: 1,
            points: vec![[2, 4, 0]],
            mesh: [5, 9, 1],
        };
        assert_eq!(cloud.fractional().row(0).to_vec(), vec![0.5, 0.5, 0.0]);
    }
}
