//! # 批量处理模块
//!
//! 提供批次文件收集与可中断的顺序执行。
//!
//! ## 功能
//! - 收集匹配文件列表并按批次序号排序
//! - 顺序执行，支持取消标记
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `nodal/` 与 `commands/` 使用
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchRunner, LoopOutcome, ProcessResult, RunSummary, StopMarker};
