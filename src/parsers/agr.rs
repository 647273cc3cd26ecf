//! # .bands.agr 能带输出解析器
//!
//! 解析求解器 (spaghetti) 输出的 xmgrace 格式能带文件。
//!
//! ## .agr 格式说明
//! ```text
//! @ title "..."              <- 注释，忽略
//! # bandindex:  1            <- 开始新能带
//!   0.00000   -5.12345   0.31000
//!   0.01000   -5.12001   0.30900
//! &                          <- 当前能带结束，能带计数加一
//! ```
//! 数据行为 `k 能量 权重` 三列。格式错误的数据行记录后跳过，不终止解析。
//!
//! ## 依赖关系
//! - 被 `volume/assembler.rs`, `nodal/aggregate.rs`, `volume/voxel.rs` 使用
//! - 使用 `models/bands.rs`

use crate::error::{NlscanError, Result};
use crate::models::BandTrace;
use crate::utils::output;

use ndarray::Array2;
use std::fs;
use std::path::Path;

/// 默认能带号上限（含）
pub const DEFAULT_MAX_BAND: usize = 599;

/// 单个格式错误的数据行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 文件中的行号（1 起）
    pub line: usize,
    /// 出错时的能带计数
    pub band: usize,
    pub content: String,
}

/// 解析结果：能带数据与被跳过的行
#[derive(Debug, Clone)]
pub struct AgrParse {
    pub trace: BandTrace,
    pub malformed: Vec<MalformedLine>,
}

/// 读取并解析 .agr 文件，格式错误的行打印警告后跳过
pub fn load_agr(path: &Path, max_band: usize) -> Result<BandTrace> {
    let is_agr = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("agr"))
        .unwrap_or(false);
    if !is_agr {
        return Err(NlscanError::UnsupportedFormat(format!(
            "expected a .agr file: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path).map_err(|e| NlscanError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path.display().to_string();
    let parsed = parse_agr_content(&content, &name, max_band)?;
    for bad in &parsed.malformed {
        output::print_warning(&format!(
            "Wrong data in {} # bandindex: {} (line {}): '{}'",
            name, bad.band, bad.line, bad.content
        ));
    }

    Ok(parsed.trace)
}

/// 从字符串内容解析 .agr 格式
pub fn parse_agr_content(content: &str, name: &str, max_band: usize) -> Result<AgrParse> {
    let mut energy: Vec<Vec<f64>> = Vec::new();
    let mut weight: Vec<Vec<f64>> = Vec::new();
    let mut malformed = Vec::new();

    // 能带计数从 1 开始，遇到 '&' 递增
    let mut band = 1usize;
    let mut open = false;

    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.trim_start();
        let in_range = band <= max_band;

        if line.starts_with('@') {
            continue;
        } else if line.starts_with('#') {
            if line.starts_with("# bandindex:") && in_range {
                energy.push(Vec::new());
                weight.push(Vec::new());
                open = true;
            }
        } else if line.starts_with('&') {
            open = false;
            band += 1;
        } else if !line.trim().is_empty() {
            if !in_range {
                continue;
            }

            match (open, parse_data_line(line)) {
                (true, Some([_, e, w])) => {
                    // open 为真时 energy 非空
                    if let (Some(eb), Some(wb)) = (energy.last_mut(), weight.last_mut()) {
                        eb.push(e);
                        wb.push(w);
                    }
                }
                _ => malformed.push(MalformedLine {
                    line: lineno + 1,
                    band,
                    content: line.trim_end().to_string(),
                }),
            }
        }
    }

    let trace = assemble_trace(energy, weight, name)?;
    Ok(AgrParse { trace, malformed })
}

/// 解析三列数值数据行
fn parse_data_line(line: &str) -> Option<[f64; 3]> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return None;
    }
    let mut out = [0.0; 3];
    for (slot, f) in out.iter_mut().zip(fields.iter()) {
        *slot = f.parse().ok()?;
    }
    Some(out)
}

/// 将逐带累积的数据组装为矩形数组；各能带 k 点数不一致视为解析错误
fn assemble_trace(energy: Vec<Vec<f64>>, weight: Vec<Vec<f64>>, name: &str) -> Result<BandTrace> {
    let nbands = energy.len();
    let nk = energy.first().map(|b| b.len()).unwrap_or(0);

    if let Some((i, b)) = energy.iter().enumerate().find(|(_, b)| b.len() != nk) {
        return Err(NlscanError::ParseError {
            format: "agr".to_string(),
            path: name.to_string(),
            reason: format!(
                "band {} has {} k-points, band 1 has {}",
                i + 1,
                b.len(),
                nk
            ),
        });
    }

    let flat_e: Vec<f64> = energy.into_iter().flatten().collect();
    let flat_w: Vec<f64> = weight.into_iter().flatten().collect();

    let to_err = |e: ndarray::ShapeError| NlscanError::ParseError {
        format: "agr".to_string(),
        path: name.to_string(),
        reason: e.to_string(),
    };

    Ok(BandTrace {
        energy: Array2::from_shape_vec((nbands, nk), flat_e).map_err(to_err)?,
        weight: Array2::from_shape_vec((nbands, nk), flat_w).map_err(to_err)?,
    })
}

/// 将能带数据渲染为 .agr 文本（k 列为采样序号）
#[cfg(test)]
pub(crate) fn to_agr_string(trace: &BandTrace) -> String {
    let mut out = String::new();
    out.push_str("@ with g0\n");
    out.push_str("@ g0 on\n");
    for (ib, (erow, wrow)) in trace
        .energy
        .rows()
        .into_iter()
        .zip(trace.weight.rows())
        .enumerate()
    {
        out.push_str(&format!("# bandindex: {:>4}\n", ib + 1));
        for (ik, (e, w)) in erow.iter().zip(wrow.iter()).enumerate() {
            out.push_str(&format!("  {:>10.5}  {:e}  {:e}\n", ik as f64, e, w));
        }
        out.push_str("&\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;
    use tempdir::TempDir;

    const SAMPLE: &str = r#"@ with g0
@ g0 on
@ title "case"
# bandindex:    1
    0.00000    -5.10000     0.50000
    0.05000    -5.00000     0.40000
    0.10000    -4.90000     0.30000
&
# bandindex:    2
    0.00000     1.20000     0.10000
    0.05000     1.10000     0.20000
    0.10000     1.00000     0.30000
&
"#;

    #[test]
    fn test_parse_sample() {
        let parsed = parse_agr_content(SAMPLE, "sample.agr", DEFAULT_MAX_BAND).unwrap();
        assert!(parsed.malformed.is_empty());
        assert_eq!(
            parsed.trace.energy,
            array![[-5.1, -5.0, -4.9], [1.2, 1.1, 1.0]]
        );
        assert_eq!(parsed.trace.weight, array![[0.5, 0.4, 0.3], [0.1, 0.2, 0.3]]);
    }

    #[test]
    fn test_round_trip_synthetic() {
        let trace = BandTrace {
            energy: array![
                [-7.25, -7.125, -6.0625, -5.5],
                [0.1, 0.2, 0.30000000000000004, 1e-7],
                [3.3333333333333335, 4.0, 4.5, 5.0]
            ],
            weight: array![
                [0.0, 1.0, 0.5, 0.25],
                [0.75, 0.125, 0.0, 0.0],
                [1.0, 1.0, 1.0, 0.9999]
            ],
        };
        let text = to_agr_string(&trace);
        let parsed = parse_agr_content(&text, "synthetic.agr", DEFAULT_MAX_BAND).unwrap();
        assert!(parsed.malformed.is_empty());
        assert_eq!(parsed.trace, trace);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let content = "\
# bandindex: 1
 0.0 -1.0 0.5
 0.1 -0.9
 0.2 abc 0.5
 0.3 -0.7 0.5
&
";
        let parsed = parse_agr_content(content, "bad.agr", DEFAULT_MAX_BAND).unwrap();
        assert_eq!(parsed.trace.energy, array![[-1.0, -0.7]]);
        assert_eq!(parsed.malformed.len(), 2);
        assert_eq!(parsed.malformed[0].line, 3);
        assert_eq!(parsed.malformed[1].band, 1);
    }

    #[test]
    fn test_data_before_band_marker_is_malformed() {
        let content = " 0.0 1.0 1.0\n# bandindex: 1\n 0.0 2.0 1.0\n&\n";
        let parsed = parse_agr_content(content, "x.agr", DEFAULT_MAX_BAND).unwrap();
        assert_eq!(parsed.malformed.len(), 1);
        assert_eq!(parsed.trace.energy, array![[2.0]]);
    }

    #[test]
    fn test_band_ceiling() {
        let parsed = parse_agr_content(SAMPLE, "sample.agr", 1).unwrap();
        assert_eq!(parsed.trace.num_bands(), 1);
        assert!(parsed.malformed.is_empty());
        assert_eq!(parsed.trace.energy, array![[-5.1, -5.0, -4.9]]);
    }

    #[test]
    fn test_ragged_bands_is_parse_error() {
        let content = "# bandindex: 1\n0 1 1\n1 2 1\n&\n# bandindex: 2\n0 3 1\n&\n";
        let err = parse_agr_content(content, "ragged.agr", DEFAULT_MAX_BAND).unwrap_err();
        assert!(matches!(err, NlscanError::ParseError { .. }));
    }

    #[test]
    fn test_empty_file() {
        let parsed = parse_agr_content("@ nothing\n", "empty.agr", DEFAULT_MAX_BAND).unwrap();
        assert!(parsed.trace.is_empty());
        assert_eq!(parsed.trace.energy.shape(), &[0, 0]);
    }

    #[test]
    fn test_load_agr_checks_extension() {
        let dir = TempDir::new("agr").unwrap();
        let good = dir.path().join("caseup.bands.agr");
        let bad = dir.path().join("case.bands.txt");
        for p in [&good, &bad] {
            let mut f = fs::File::create(p).unwrap();
            f.write_all(SAMPLE.as_bytes()).unwrap();
        }

        assert_eq!(load_agr(&good, DEFAULT_MAX_BAND).unwrap().num_bands(), 2);
        assert!(matches!(
            load_agr(&bad, DEFAULT_MAX_BAND),
            Err(NlscanError::UnsupportedFormat(_))
        ));
    }
}
