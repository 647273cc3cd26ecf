//! # 整数 k 点键
//!
//! 把量化后的整数坐标压缩为单个整数：`x + y·B + z·B²`，`B = 10000`。
//! 用于细网格点集的去重与差集运算。各分量的有效范围为 `[0, B-1]`。
//!
//! ## 依赖关系
//! - 被 `nodal/refine.rs` 使用

use crate::error::{NlscanError, Result};

/// 默认基数
pub const PACK_BASE: i64 = 10000;

/// 整数坐标与键之间的双射
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPacker {
    base: i64,
}

impl Default for KeyPacker {
    fn default() -> Self {
        KeyPacker { base: PACK_BASE }
    }
}

impl KeyPacker {
    pub fn new(base: i64) -> Result<Self> {
        if base < 2 {
            return Err(NlscanError::InvalidArgument(format!(
                "packing base must be at least 2, got {}",
                base
            )));
        }
        Ok(KeyPacker { base })
    }

    pub fn base(&self) -> i64 {
        self.base
    }

    pub fn in_range(&self, k: &[i64; 3]) -> bool {
        k.iter().all(|&v| (0..self.base).contains(&v))
    }

    pub fn pack(&self, k: &[i64; 3]) -> Result<i64> {
        if !self.in_range(k) {
            return Err(NlscanError::InvalidArgument(format!(
                "k-point {:?} outside packing range [0, {}]",
                k,
                self.base - 1
            )));
        }
        Ok(k[0] + k[1] * self.base + k[2] * self.base * self.base)
    }

    pub fn unpack(&self, key: i64) -> [i64; 3] {
        let b = self.base;
        [key % b, (key / b) % b, key / (b * b)]
    }

    /// 分数坐标乘以密度取整后打包
    pub fn pack_fractional(&self, k: &[f64; 3], density: i64) -> Result<i64> {
        let d = density as f64;
        let q = [
            (k[0] * d).round_ties_even() as i64,
            (k[1] * d).round_ties_even() as i64,
            (k[2] * d).round_ties_even() as i64,
        ];
        self.pack(&q)
    }
}
