//! # 数据模型模块
//!
//! 定义 k 路径、能带、节线点云与配置记录的数据模型。
//!
//! ## 依赖关系
//! - 被 `kpath/`, `parsers/`, `volume/`, `nodal/` 和 `commands/` 使用
//! - 子模块: kpath, bands, nodal, config

pub mod bands;
pub mod config;
pub mod kpath;
pub mod nodal;

pub use bands::{BandTrace, EnergyVolume};
pub use config::{MapConfig, NlscanConfig, NodalConfig, SessionConfig};
pub use kpath::{Density, KPath, ReciprocalVertex, SampledKPoint};
pub use nodal::{DegeneracyCloud, SymmetrizedDataset};
