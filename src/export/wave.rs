//! # Igor 文本波形 (.itx) 导出
//!
//! ## 格式说明
//! ```text
//! IGOR
//! WAVES/D/N=(3,2) 'NL30_k'
//! BEGIN
//!     0.1     0.2
//!     ...
//! END
//! X SetScale/P x -1,0.02,"2pi/a", 'NL30_k'
//! ```
//! 多维数组按行写出，每行为一列方向的数据；三维以上按层 (layer) 依次排列。
//! 一个文件可以包含多条波形，`IGOR` 头只出现一次。
//!
//! ## 依赖关系
//! - 被 `nodal/aggregate.rs`, `commands/export.rs` 使用

use crate::error::{NlscanError, Result};

use ndarray::{ArrayD, ArrayViewD, Axis};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const DIM_LETTERS: [char; 4] = ['x', 'y', 'z', 't'];

/// 单轴刻度 (SetScale/P)
#[derive(Debug, Clone, PartialEq)]
pub struct DimScale {
    pub offset: f64,
    pub delta: f64,
    pub unit: String,
}

/// 一条 Igor 波形
#[derive(Debug, Clone)]
pub struct ItxWave {
    name: String,
    data: ArrayD<f64>,
    scales: Vec<Option<DimScale>>,
}

impl ItxWave {
    /// 创建波形，名称中 Igor 不接受的字符替换为下划线
    pub fn new(name: &str, data: ArrayD<f64>) -> Result<Self> {
        if data.ndim() == 0 || data.ndim() > 4 {
            return Err(NlscanError::InvalidArgument(format!(
                "Igor waves have 1 to 4 dimensions, got {}",
                data.ndim()
            )));
        }
        let ndim = data.ndim();
        Ok(ItxWave {
            name: sanitize_name(name),
            data,
            scales: vec![None; ndim],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置第 `axis` 维的刻度
    pub fn set_dimscale(&mut self, axis: usize, offset: f64, delta: f64, unit: &str) -> Result<()> {
        let slot = self.scales.get_mut(axis).ok_or_else(|| {
            NlscanError::InvalidArgument(format!("wave '{}' has no axis {}", self.name, axis))
        })?;
        *slot = Some(DimScale {
            offset,
            delta,
            unit: unit.to_string(),
        });
        Ok(())
    }

    /// 写出 WAVES 块与 SetScale 命令（不含 `IGOR` 头）
    pub fn write_block<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        let dims: Vec<String> = self.data.shape().iter().map(|n| n.to_string()).collect();
        writeln!(w, "WAVES/D/N=({}) '{}'", dims.join(","), self.name)?;
        writeln!(w, "BEGIN")?;
        write_rows(w, self.data.view())?;
        writeln!(w, "END")?;

        for (ax, scale) in self.scales.iter().enumerate() {
            if let Some(s) = scale {
                writeln!(
                    w,
                    "X SetScale/P {} {},{},\"{}\", '{}'",
                    DIM_LETTERS[ax],
                    format_value(s.offset),
                    format_value(s.delta),
                    s.unit,
                    self.name
                )?;
            }
        }
        Ok(())
    }

    /// 保存为单波形 .itx 文件
    pub fn save(&self, path: &Path) -> Result<()> {
        save_waves(path, std::slice::from_ref(self))
    }
}

/// 将多条波形写入同一个 .itx 文件
pub fn save_waves(path: &Path, waves: &[ItxWave]) -> Result<()> {
    let to_err = |e: std::io::Error| NlscanError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    };

    let file = File::create(path).map_err(to_err)?;
    let mut w = BufWriter::new(file);
    writeln!(w, "IGOR").map_err(to_err)?;
    for wave in waves {
        wave.write_block(&mut w).map_err(to_err)?;
    }
    w.flush().map_err(to_err)
}

/// 按 (chunk, layer, row) 顺序逐行写出，每行为 column 方向
fn write_rows<W: Write>(w: &mut W, data: ArrayViewD<'_, f64>) -> std::io::Result<()> {
    match data.ndim() {
        1 => {
            for v in data.iter() {
                writeln!(w, "\t{}", format_value(*v))?;
            }
        }
        2 => {
            for row in data.axis_iter(Axis(0)) {
                let cells: Vec<String> = row.iter().map(|v| format_value(*v)).collect();
                writeln!(w, "\t{}", cells.join("\t"))?;
            }
        }
        n => {
            // 最外层为最后一维
            for sub in data.axis_iter(Axis(n - 1)) {
                write_rows(w, sub)?;
            }
        }
    }
    Ok(())
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "INF" } else { "-INF" };
        s.to_string()
    } else {
        format!("{}", v)
    }
}

/// Igor 波形名只允许字母、数字与下划线
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
