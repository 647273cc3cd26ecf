//! # 态密度 (.dos*eV*) 文件解析器
//!
//! ## 格式说明
//! ```text
//! # Co2MnGa                                  <- 标题
//! #EF=  0.63101   NDOS= 3   NENRG= 2001       <- 费米能等
//! #   ENERGY    total-DOS    Co1-tot   ...    <- 列名（首个记号丢弃）
//!   -10.00000   0.000000     0.000000  ...
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用

use crate::error::{NlscanError, Result};

use ndarray::Array1;
use std::fs;
use std::path::Path;

/// 能量列名
pub const ENERGY_COLUMN: &str = "ENERGY";

/// 按列存储的态密度表，保持文件中的列顺序
#[derive(Debug, Clone, PartialEq)]
pub struct DosTable {
    pub columns: Vec<(String, Array1<f64>)>,
}

impl DosTable {
    pub fn column(&self, name: &str) -> Option<&Array1<f64>> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn energy(&self) -> Option<&Array1<f64>> {
        self.column(ENERGY_COLUMN)
    }
}

/// 读取并解析态密度文件
pub fn load_dos(path: &Path) -> Result<DosTable> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !name.contains(".dos") {
        return Err(NlscanError::UnsupportedFormat(format!(
            "expected a .dos file: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|e| NlscanError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_dos_content(&content, &path.display().to_string())
}

/// 从字符串内容解析态密度表
pub fn parse_dos_content(content: &str, name: &str) -> Result<DosTable> {
    let parse_err = |reason: String| NlscanError::ParseError {
        format: "dos".to_string(),
        path: name.to_string(),
        reason,
    };

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 3 {
        return Err(parse_err("missing header lines".to_string()));
    }

    let names: Vec<String> = lines[2]
        .split_whitespace()
        .skip(1)
        .map(|s| s.to_string())
        .collect();
    if names.is_empty() {
        return Err(parse_err("no column names in header".to_string()));
    }

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (i, line) in lines.iter().enumerate().skip(3) {
        if line.trim().is_empty() {
            continue;
        }
        let row: Vec<f64> = line
            .split_whitespace()
            .map(|f| f.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| parse_err(format!("line {}: {}", i + 1, e)))?;
        if row.len() < names.len() {
            return Err(parse_err(format!(
                "line {}: expected {} columns, found {}",
                i + 1,
                names.len(),
                row.len()
            )));
        }
        for (col, v) in values.iter_mut().zip(row) {
            col.push(v);
        }
    }

    Ok(DosTable {
        columns: names
            .into_iter()
            .zip(values)
            .map(|(n, v)| (n, Array1::from(v)))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Co2MnGa
#EF=  0.63101   NDOS= 3   NENRG= 3
#   ENERGY    total-DOS    Mn1-tot
  -1.00000   0.100000     0.010000
   0.00000   0.200000     0.020000
   1.00000   0.300000     0.030000
";

    #[test]
    fn test_parse_columns() {
        let table = parse_dos_content(SAMPLE, "case.dos1evup").unwrap();
        let names: Vec<&str> = table.columns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["ENERGY", "total-DOS", "Mn1-tot"]);
        assert_eq!(table.energy().unwrap().len(), 3);
        assert_eq!(table.energy().unwrap().to_vec(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(table.column("Mn1-tot").unwrap()[2], 0.03);
    }

    #[test]
    fn test_bad_row() {
        let content = format!("{} 2.0 x 0.1\n", SAMPLE);
        assert!(matches!(
            parse_dos_content(&content, "bad"),
            Err(NlscanError::ParseError { .. })
        ));
        assert!(parse_dos_content("# a\n", "short").is_err());
    }

    #[test]
    fn test_extension_checked() {
        assert!(matches!(
            load_dos(Path::new("case.bands.agr")),
            Err(NlscanError::UnsupportedFormat(_))
        ));
    }
}
