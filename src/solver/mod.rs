//! # 求解器模块
//!
//! 外部能带求解器的调用边界。
//!
//! ## 依赖关系
//! - 被 `batch/`, `commands/` 使用
//! - 子模块: session

pub mod session;

pub use session::{check_output_spin, BandSolver, SolverSession};
