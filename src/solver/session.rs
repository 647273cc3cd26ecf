//! # 能带求解器会话
//!
//! 以阻塞子进程方式驱动 LAPW 能带计算链：
//! `lapw1 -band` → (`lapwso`) → (`lapw2 -band -qtl`) → `spaghetti`，
//! 然后把 case 目录中的 `.bands*.agr` 输出复制到指定目录。
//!
//! 所有命令都显式指定工作目录为 case 目录，不修改进程当前目录。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs`, `commands/map.rs`, `commands/nodal.rs` 使用
//! - 使用 `models/config.rs`, `utils/output.rs`

use crate::error::{NlscanError, Result};
use crate::models::SessionConfig;
use crate::utils::output;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 求解器抽象：流水线只依赖该接口
pub trait BandSolver {
    /// 求解器读取的 .klist_band 路径
    fn klist_path(&self) -> PathBuf;

    /// 计算当前 .klist_band 的能带，输出复制为 `out_dir/{name}{spin}.bands.agr`
    fn run_band(&mut self, out_dir: &Path, name: &str) -> Result<()>;

    /// 输出文件名中的自旋后缀
    fn output_spins(&self) -> Vec<String>;
}

/// 配置中 `key` 指定的自旋必须是求解器实际输出的后缀之一
pub fn check_output_spin<S: BandSolver + ?Sized>(solver: &S, key: &str, spin: &str) -> Result<()> {
    let outputs = solver.output_spins();
    if outputs.iter().any(|s| s == spin) {
        return Ok(());
    }
    Err(NlscanError::SpinNotProduced {
        key: key.to_string(),
        spin: spin.to_string(),
        outputs,
    })
}

/// spaghetti 模板中的费米能占位符
const EF_PLACEHOLDER: &str = "0.xxxx";

/// .insp 中权重设置行的标记
const INSP_WEIGHT_MARKER: &str = "jatom, jcol, size";

/// 一次能带计算的命令序列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandPlan {
    pub lapw1: Vec<Vec<String>>,
    pub lapwso: Option<Vec<String>>,
    pub lapw2: Option<Vec<String>>,
    pub spaghetti: Vec<Vec<String>>,
}

/// 基于外部程序的求解器会话
#[derive(Debug, Clone)]
pub struct SolverSession {
    config: SessionConfig,
    prepared: bool,
}

impl SolverSession {
    pub fn new(config: SessionConfig) -> Self {
        SolverSession {
            config,
            prepared: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn case_dir(&self) -> &Path {
        &self.config.case_dir
    }

    /// case 目录下的 `{case}{ext}` 文件
    pub fn filepath(&self, ext: &str) -> PathBuf {
        self.config
            .case_dir
            .join(format!("{}{}", self.config.case, ext))
    }

    /// `.scf` 中最后一条 `:FER` 记录的费米能
    pub fn fermi_energy(&self) -> Result<f64> {
        let path = self.filepath(".scf");
        let content = read_text(&path)?;
        parse_fermi_energy(&content).ok_or_else(|| NlscanError::ParseError {
            format: "scf".to_string(),
            path: path.display().to_string(),
            reason: "no :FER line found".to_string(),
        })
    }

    /// 若 `.insp` 不存在，由模板生成并填入费米能
    pub fn ensure_insp(&self) -> Result<bool> {
        let insp = self.filepath(".insp");
        if insp.exists() {
            return Ok(false);
        }

        let template = self.config.template_dir.join("case.insp");
        let content = read_text(&template)?;
        let ef = self.fermi_energy()?;
        write_text(&insp, &content.replace(EF_PLACEHOLDER, &ef.to_string()))?;
        output::print_info(&format!("Created {} (EF = {})", insp.display(), ef));
        Ok(true)
    }

    /// 并行时由模板生成 `.machines`，每个 `1:localhost` 行对应一个进程
    pub fn prepare_machines(&self) -> Result<()> {
        let p = self.config.parallel;
        if p <= 1 {
            return Ok(());
        }
        let template = self.config.template_dir.join(".machines");
        let content = read_text(&template)?;
        let line = "1:localhost\n";
        let content = if p > 2 {
            content.replace(&line.repeat(2), &line.repeat(p as usize))
        } else {
            content
        };
        write_text(&self.config.case_dir.join(".machines"), &content)
    }

    /// 修改 `.insp` 中的投影原子与轨道
    pub fn set_insp_weight(&self, atom: u32, orbital: u32) -> Result<()> {
        let path = self.filepath(".insp");
        let content = read_text(&path)?;
        write_text(&path, &rewrite_insp_weight(&content, atom, orbital))
    }

    /// 按配置生成命令序列
    pub fn band_plan(&self) -> BandPlan {
        let c = &self.config;
        let prog = c.program.clone();
        let base = |sub: &str, extra: &[&str]| -> Vec<String> {
            let mut v = vec![prog.clone(), sub.to_string()];
            v.extend(extra.iter().map(|s| s.to_string()));
            v
        };

        let mut lapw1 = base("lapw1", &["-band"]);
        let mut lapwso = base("lapwso", &[]);
        let mut lapw2 = base("lapw2", &["-band", "-qtl"]);
        let mut spag = base("spaghetti", &[]);

        if c.parallel > 1 {
            for cmd in [&mut lapw1, &mut lapwso, &mut lapw2, &mut spag] {
                cmd.insert(2, "-p".to_string());
            }
        }
        if c.orbital_u {
            for cmd in [&mut lapw1, &mut lapwso, &mut lapw2, &mut spag] {
                cmd.push("-orb".to_string());
            }
        }
        if c.spin_orbit {
            lapw2.push("-so".to_string());
            spag.push("-so".to_string());
        }
        if c.qtl && !c.orbital_u {
            lapwso.push("-orb".to_string());
        }
        if c.spin_polarized && c.spin_orbit {
            lapwso.push("-up".to_string());
        }

        let with_spin = |cmd: &[String], spin: &str| -> Vec<String> {
            let mut v = cmd.to_vec();
            v.push(format!("-{}", spin));
            v
        };

        let lapw1 = if c.spin_polarized {
            c.spins.iter().map(|s| with_spin(&lapw1, s)).collect()
        } else {
            vec![lapw1]
        };

        let spaghetti = if c.spin_polarized && c.spin_orbit {
            vec![with_spin(&spag, "up")]
        } else if c.spin_polarized {
            c.spins.iter().map(|s| with_spin(&spag, s)).collect()
        } else {
            vec![spag]
        };

        BandPlan {
            lapw1,
            lapwso: c.spin_orbit.then_some(lapwso),
            lapw2: c.qtl.then_some(lapw2),
            spaghetti,
        }
    }

    /// 输出文件的 (源, 目标) 对
    pub fn output_copies(&self, out_dir: &Path, name: &str) -> Vec<(PathBuf, PathBuf)> {
        self.output_spins()
            .into_iter()
            .map(|spin| {
                let src = if self.config.spin_polarized {
                    let s = if self.config.spin_orbit { "up" } else { spin.as_str() };
                    self.filepath(&format!(".bands{}.agr", s))
                } else {
                    self.filepath(".bands.agr")
                };
                (src, out_dir.join(format!("{}{}.bands.agr", name, spin)))
            })
            .collect()
    }

    fn run_command(&self, args: &[String]) -> Result<()> {
        let Some((program, rest)) = args.split_first() else {
            return Ok(());
        };
        let line = args.join(" ");
        output::print_info(&format!("run {}", line));

        let result = Command::new(program)
            .args(rest)
            .current_dir(&self.config.case_dir)
            .output();

        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(NlscanError::CommandFailed {
                command: line,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(NlscanError::CommandNotFound {
                command: program.clone(),
            }),
            Err(e) => Err(NlscanError::CommandFailed {
                command: line,
                stderr: e.to_string(),
            }),
        }
    }
}

impl BandSolver for SolverSession {
    fn klist_path(&self) -> PathBuf {
        self.filepath(".klist_band")
    }

    fn run_band(&mut self, out_dir: &Path, name: &str) -> Result<()> {
        if !self.config.case_dir.is_dir() {
            return Err(NlscanError::DirectoryNotFound {
                path: self.config.case_dir.display().to_string(),
            });
        }
        if !self.prepared {
            self.ensure_insp()?;
            self.prepare_machines()?;
            self.prepared = true;
        }

        let plan = self.band_plan();
        for cmd in &plan.lapw1 {
            self.run_command(cmd)?;
        }
        if let Some(cmd) = &plan.lapwso {
            self.run_command(cmd)?;
        }
        if let Some(cmd) = &plan.lapw2 {
            self.run_command(cmd)?;
        }

        fs::create_dir_all(out_dir).map_err(|e| NlscanError::FileWriteError {
            path: out_dir.display().to_string(),
            source: e,
        })?;

        // 不输出分波权重时只做一次 spaghetti，权重行指向 (0, 1)
        let projections: Vec<[u32; 2]> = if self.config.qtl {
            self.config.qtl_list.clone()
        } else {
            vec![[0, 1]]
        };

        for (i, [atom, orbital]) in projections.into_iter().enumerate() {
            self.set_insp_weight(atom, orbital)?;
            for cmd in &plan.spaghetti {
                self.run_command(cmd)?;
            }

            let mut names = Vec::new();
            if self.config.qtl {
                names.push(format!("Atom{}Orb{}_{}", atom, orbital, name));
            }
            // 各投影的能量相同，首个投影同时以原名保存供后续流水线读取
            if i == 0 {
                names.push(name.to_string());
            }
            for out_name in &names {
                for (src, dst) in self.output_copies(out_dir, out_name) {
                    copy_file(&src, &dst)?;
                }
            }
        }

        Ok(())
    }

    fn output_spins(&self) -> Vec<String> {
        if self.config.spin_polarized && !self.config.spin_orbit {
            self.config.spins.clone()
        } else {
            vec![String::new()]
        }
    }
}

/// 取最后一条 `:FER` 行的末尾数值
pub fn parse_fermi_energy(scf: &str) -> Option<f64> {
    scf.lines()
        .filter(|l| l.starts_with(":FER"))
        .last()
        .and_then(|l| l.split_whitespace().last())
        .and_then(|v| v.parse().ok())
}

/// 替换权重设置行的前两个字段，其余内容不变
pub fn rewrite_insp_weight(content: &str, atom: u32, orbital: u32) -> String {
    let mut out = String::with_capacity(content.len());
    for line in content.lines() {
        if line.contains(INSP_WEIGHT_MARKER) {
            let mut fields: Vec<String> = line.split_whitespace().map(|s| s.to_string()).collect();
            if fields.len() >= 2 {
                fields[0] = atom.to_string();
                fields[1] = orbital.to_string();
            }
            out.push_str(&fields.join(" "));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| NlscanError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| NlscanError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if !src.exists() {
        return Err(NlscanError::FileNotFound {
            path: src.display().to_string(),
        });
    }
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| NlscanError::FileWriteError {
            path: dst.display().to_string(),
            source: e,
        })
}
