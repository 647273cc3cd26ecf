//! # 节线搜索流水线
//!
//! 粗网格到细网格的逐级细化：
//! 粗扫描 → 候选点 → 细网格批次 → 求解 → 汇总 → 对称化 → 导出。
//! 每一级的结果都落盘，任何一级都可以单独重跑。
//!
//! ## 目录布局
//! ```text
//! {case_dir}/mapall/klist/map_kz{kz}_ky{ky}.klist_band
//! {case_dir}/mapall/data/map_kz{kz}_ky{ky}{spin}.bands.agr
//! {case_dir}/mapall/data.npy            <- 能量体
//! {case_dir}/mapall/NL_{b}.npy          <- 粗筛候选点（分数坐标）
//! {case_dir}/NLs/NL_{b}/klist/klist_{n}.klist_band, klist_{n}.npy
//! {case_dir}/NLs/NL_{b}/band/klist_{n}{spin}.bands.agr
//! {case_dir}/NLs/NL_{b}/NL{b}_{k,e,g}_data.npy   <- 累积的细网格结果
//! {case_dir}/NLs/NL_{b}/NL{b}_{k,e,g}.npy/.itx   <- 对称化后的导出
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/map.rs`, `commands/nodal.rs`, `commands/pipeline.rs` 调用
//! - 使用 `volume/`, `kpath/`, `solver/`, `batch/`, `export/`
//! - 子模块: scan, refine, solve, aggregate

pub mod aggregate;
pub mod refine;
pub mod scan;
pub mod solve;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::{NlscanError, Result};
use crate::models::NlscanConfig;

use std::fs;
use std::path::{Path, PathBuf};

/// 流水线各级文件的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodalLayout {
    pub map_root: PathBuf,
    pub nodal_root: PathBuf,
}

impl NodalLayout {
    pub fn new(map_root: PathBuf, nodal_root: PathBuf) -> Self {
        NodalLayout { map_root, nodal_root }
    }

    /// 输出目录相对 case 目录
    pub fn from_config(config: &NlscanConfig) -> Self {
        let case_dir = &config.session.case_dir;
        NodalLayout {
            map_root: case_dir.join(&config.map.output_dir),
            nodal_root: case_dir.join(&config.nodal.output_dir),
        }
    }

    pub fn map_klist_dir(&self) -> PathBuf {
        self.map_root.join("klist")
    }

    pub fn map_data_dir(&self) -> PathBuf {
        self.map_root.join("data")
    }

    pub fn volume_path(&self) -> PathBuf {
        self.map_root.join("data.npy")
    }

    pub fn candidates_path(&self, band: usize) -> PathBuf {
        self.map_root.join(format!("NL_{}.npy", band))
    }

    pub fn band_root(&self, band: usize) -> PathBuf {
        self.nodal_root.join(format!("NL_{}", band))
    }

    pub fn klist_dir(&self, band: usize) -> PathBuf {
        self.band_root(band).join("klist")
    }

    pub fn result_dir(&self, band: usize) -> PathBuf {
        self.band_root(band).join("band")
    }

    /// 累积数据 `NL{b}_{kind}_data.npy`
    pub fn data_path(&self, band: usize, kind: &str) -> PathBuf {
        self.band_root(band)
            .join(format!("NL{}_{}_data.npy", band, kind))
    }

    /// 导出文件 `NL{b}_{kind}.{ext}`
    pub fn export_path(&self, band: usize, kind: &str, ext: &str) -> PathBuf {
        self.band_root(band)
            .join(format!("NL{}_{}.{}", band, kind, ext))
    }
}

/// 创建目录（含父目录）
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| NlscanError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
