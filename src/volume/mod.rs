//! # 能量体模块
//!
//! 能带拼接、简并点提取、对称化展开以及导出前的体数据变换。
//!
//! ## 依赖关系
//! - 被 `nodal/`, `commands/` 使用
//! - 使用 `parsers/agr.rs`, `models/`
//! - 子模块: assembler, degeneracy, packing, symmetry, unfold, voxel

pub mod assembler;
pub mod degeneracy;
pub mod packing;
pub mod symmetry;
pub mod unfold;
pub mod voxel;

pub use assembler::{assemble_volume, MeshNaming, MeshShape};
pub use degeneracy::{extract, reduce_by_permutation};
pub use packing::KeyPacker;
pub use symmetry::{filter_gap, symmetrize};
