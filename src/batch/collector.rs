//! # 文件收集器
//!
//! 根据目录和模式收集待处理文件列表。
//!
//! ## 功能
//! - glob 模式匹配（逗号分隔多模式）
//! - 可选递归目录搜索
//! - 按文件名中的批次序号排序（`klist_2` 在 `klist_10` 之前）
//!
//! ## 依赖关系
//! - 被 `nodal/`, `commands/export.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配文件名, `regex` 提取序号

use crate::error::{NlscanError, Result};

use glob::Pattern;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入目录
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    NlscanError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件，按批次序号排序
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if !self.input.is_dir() {
            return Err(NlscanError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches_patterns(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        sort_by_index(&mut files);
        Ok(files)
    }

    /// 检查文件是否匹配任一模式
    fn matches_patterns(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(filename))
    }
}

fn index_regex() -> &'static Regex {
    static INDEX_RE: OnceLock<Regex> = OnceLock::new();
    INDEX_RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// 文件名主干中最后一个整数
pub fn batch_index(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next()?;
    index_regex()
        .find_iter(stem)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

/// 按 (父目录, 序号, 文件名) 排序，无序号的文件排在前面
pub fn sort_by_index(files: &mut [PathBuf]) {
    files.sort_by(|a, b| {
        (a.parent(), batch_index(a), a.file_name()).cmp(&(b.parent(), batch_index(b), b.file_name()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    #[test]
    fn test_batch_index() {
        assert_eq!(batch_index(Path::new("klist_12.klist_band")), Some(12));
        assert_eq!(batch_index(Path::new("dir/klist_3.npy")), Some(3));
        assert_eq!(batch_index(Path::new("map_kz4_ky17up.bands.agr")), Some(17));
        assert_eq!(batch_index(Path::new("case.insp")), None);
    }

    #[test]
    fn test_collect_sorted_numerically() {
        let dir = TempDir::new("collect").unwrap();
        for name in ["klist_10.klist_band", "klist_2.klist_band", "klist_1.klist_band", "klist_2.npy"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let files = FileCollector::new(dir.path())
            .with_pattern("*.klist_band")
            .unwrap()
            .collect()
            .unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["klist_1.klist_band", "klist_2.klist_band", "klist_10.klist_band"]);
    }

    #[test]
    fn test_multiple_patterns_and_errors() {
        let dir = TempDir::new("collect").unwrap();
        for name in ["a.dos1evup", "a.dos1evdn", "a.scf"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let files = FileCollector::new(dir.path())
            .with_pattern("*evup, *evdn")
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(files.len(), 2);

        assert!(FileCollector::new(dir.path()).with_pattern("[").is_err());
        assert!(FileCollector::new(&dir.path().join("missing")).collect().is_err());
    }
}
