//! # 态密度波形
//!
//! 目录中的 `{head}.dos{n}eV{spin}` 文件按 `head` 分组，每组写出一个 `{head}_dos.itx`。
//! `dn` 自旋的列取负值，波形名为 `{head}_{列名}{spin}`，
//! x 轴刻度取自该组第一个文件的 `ENERGY` 列。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `parsers/dos.rs`, `export/wave.rs`

use super::wave::ItxWave;
use crate::batch::FileCollector;
use crate::error::{NlscanError, Result};
use crate::parsers::dos::{load_dos, ENERGY_COLUMN};

use ndarray::Array1;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 文件名中第一个 `.` 之前的部分
fn head_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default()
        .to_string()
}

/// `eV` 之后的自旋后缀
fn spin_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.rsplit_once("eV"))
        .map(|(_, s)| s.to_string())
        .unwrap_or_default()
}

/// 按前缀分组目录中的 .dos 文件，组内按文件名排序
pub fn dos_groups(dir: &Path) -> Result<BTreeMap<String, Vec<PathBuf>>> {
    let files = FileCollector::new(dir).with_pattern("*.dos*")?.collect()?;

    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in files {
        groups.entry(head_of(&path)).or_default().push(path);
    }
    for files in groups.values_mut() {
        files.sort();
    }
    Ok(groups)
}

/// 一组 .dos 文件对应的波形
pub fn dos_waves(head: &str, files: &[PathBuf]) -> Result<Vec<ItxWave>> {
    let mut columns: Vec<(String, Array1<f64>)> = Vec::new();
    let mut energy: Option<Array1<f64>> = None;

    for path in files {
        let table = load_dos(path)?;
        let spin = spin_of(path);
        let sign = if spin == "dn" { -1.0 } else { 1.0 };

        if energy.is_none() {
            energy = table.energy().cloned();
        }
        for (name, values) in table.columns {
            if name == ENERGY_COLUMN {
                continue;
            }
            let key = format!("{}{}", name, spin);
            let values = values * sign;
            match columns.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = values,
                None => columns.push((key, values)),
            }
        }
    }

    let energy = energy.ok_or_else(|| {
        NlscanError::Other(format!("no {} column in the {} .dos files", ENERGY_COLUMN, head))
    })?;
    let n = energy.len();
    let (e_start, e_step) = match n {
        0 => (0.0, 0.0),
        1 => (energy[0], 0.0),
        _ => (energy[0], (energy[n - 1] - energy[0]) / (n - 1) as f64),
    };

    columns
        .into_iter()
        .map(|(key, values)| {
            let mut wave = ItxWave::new(&format!("{}_{}", head, key), values.into_dyn())?;
            wave.set_dimscale(0, e_start, e_step, "eV")?;
            Ok(wave)
        })
        .collect()
}
