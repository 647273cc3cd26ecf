//! # 顺序批处理执行器
//!
//! 逐个执行耗时任务（每次调用外部求解器），支持通过标记文件中断。
//!
//! ## 功能
//! - 每个任务开始前检查取消标记文件，发现后删除并停止
//! - 任务内部的终端输出在进度条挂起期间打印
//! - 每个任务结束后报告进度与预计剩余时间
//! - 错误收集与汇总报告
//!
//! 求解器失败 (`Err`) 立即向上传播；可恢复的问题由任务返回 `ProcessResult::Failed`。
//!
//! ## 依赖关系
//! - 被 `commands/map.rs`, `nodal/` 调用
//! - 使用 `utils/progress.rs` 创建进度条

use crate::error::{NlscanError, Result};
use crate::utils::{output, progress};

use indicatif::HumanDuration;
use std::fs;
use std::path::{Path, PathBuf};

/// 单个任务处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// 处理成功
    Success(String),
    /// 跳过（如结果已存在）
    Skipped(String),
    /// 处理失败但可以继续
    Failed(String, String), // (任务名, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Skipped(_) => self.skipped += 1,
            ProcessResult::Failed(name, err) => {
                self.failed += 1;
                self.failures.push((name, err));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

/// 循环结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// 全部任务执行完毕
    Completed,
    /// 检测到取消标记后停止
    Stopped,
}

/// 一次循环的结果
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: LoopOutcome,
    pub result: BatchResult,
}

/// 取消标记文件
#[derive(Debug, Clone)]
pub struct StopMarker {
    path: PathBuf,
}

impl StopMarker {
    pub fn new(path: PathBuf) -> Self {
        StopMarker { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 标记存在时删除并返回 true
    pub fn consume(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).map_err(|e| NlscanError::FileWriteError {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(true)
    }
}

/// 顺序批处理执行器
pub struct BatchRunner {
    marker: StopMarker,
    message: String,
}

impl BatchRunner {
    /// 创建新的批量执行器
    pub fn new(marker: StopMarker, message: &str) -> Self {
        Self {
            marker,
            message: message.to_string(),
        }
    }

    /// 依次处理任务列表
    pub fn run<T, N, F>(&self, items: &[T], name: N, mut processor: F) -> Result<RunSummary>
    where
        N: Fn(&T) -> String,
        F: FnMut(&T) -> Result<ProcessResult>,
    {
        let total = items.len();
        let pb = progress::create_solver_bar(total as u64, &self.message);
        let mut result = BatchResult::default();

        output::print_info(&format!(
            "To stop after the current step, create {}",
            self.marker.path().display()
        ));

        for item in items {
            if self.marker.consume()? {
                pb.suspend(|| {
                    output::print_warning(&format!(
                        "{} detected, stopping ({} of {} done)",
                        self.marker.path().display(),
                        result.total(),
                        total
                    ));
                });
                pb.abandon();
                return Ok(RunSummary {
                    outcome: LoopOutcome::Stopped,
                    result,
                });
            }

            let label = name(item);
            pb.set_message(format!("{} {}", self.message, label));
            let outcome = pb.suspend(|| processor(item))?;

            if let ProcessResult::Failed(_, err) = &outcome {
                pb.suspend(|| output::print_warning(&format!("{}: {}", label, err)));
            }
            let ran = matches!(outcome, ProcessResult::Success(_));
            result.merge(outcome);
            pb.inc(1);

            if ran {
                // suspend 持有进度条状态锁，先读出再打印
                let done = pb.position();
                let eta = pb.eta();
                pb.suspend(|| {
                    output::print_info(&format!(
                        "{}/{} finished, about {} remaining",
                        done,
                        total,
                        HumanDuration(eta)
                    ));
                });
            }
        }

        pb.finish_and_clear();
        Ok(RunSummary {
            outcome: LoopOutcome::Completed,
            result,
        })
    }
}
