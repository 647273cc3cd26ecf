//! # 进度条工具
//!
//! 封装 `indicatif` 提供统一的进度条样式。
//!
//! - 文件循环（拼接、汇总）用 `create_progress_bar`
//! - 求解器循环单步耗时长，用 `create_solver_bar`，spinner 持续转动
//! - 纯计算的枚举用 `create_simple_bar`
//!
//! ## 依赖关系
//! - 被 `batch/`, `volume/`, `nodal/` 模块使用
//! - 使用 `indicatif` crate

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// 创建标准进度条
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {msg}",
        )
        .unwrap()
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// 求解器调用进度条：每步一次外部计算
pub fn create_solver_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.yellow} [{elapsed_precise}] {pos}/{len} solver runs, ~{eta} left | {msg}",
        )
        .unwrap()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(250));
    pb
}

/// 创建简单的计数进度条
pub fn create_simple_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{msg} {bar:40.green/white} {pos}/{len}")
            .unwrap()
            .progress_chars("█▓░"),
    );
    pb.set_message(message.to_string());
    pb
}
