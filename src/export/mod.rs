//! # 导出模块
//!
//! 数组持久化与可视化格式导出。
//!
//! ## 功能
//! - `.npy` 数组读写
//! - Igor 文本波形 (.itx)
//! - CSV 数据表
//! - 态密度分组波形
//!
//! ## 依赖关系
//! - 被 `volume/`, `nodal/`, `commands/` 使用
//! - 子模块: dos, npy, wave, table

pub mod dos;
pub mod npy;
pub mod table;
pub mod wave;

pub use npy::{load_array, load_optional, save_array};
pub use table::dataset_to_csv;
pub use wave::{save_waves, ItxWave};
