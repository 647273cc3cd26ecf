//! # k 路径模块
//!
//! 生成供能带求解器使用的 .klist_band 文件。
//!
//! ## 功能
//! - 高对称路径按弧长离散化并整数量化
//! - 固定宽度 .klist_band 写出
//! - 顶点序号表与分量图
//!
//! ## 依赖关系
//! - 被 `commands/klist.rs`, `commands/map.rs`, `nodal/refine.rs` 调用
//! - 子模块: sampler, writer, plot

pub mod plot;
pub mod sampler;
pub mod writer;

pub use sampler::{sample_path, vertex_indices};
pub use writer::{write_direct, write_klist, DEFAULT_TAIL};
#[cfg(test)]
pub(crate) use writer::read_klist;

use crate::models::KPath;
use tabled::{Table, Tabled};

/// 顶点表行
#[derive(Debug, Clone, Tabled)]
struct VertexRow {
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "k-vector")]
    kvec: String,
}

/// 渲染顶点序号表：每个顶点对应的采样序号、标签与坐标
pub fn vertex_table(path: &KPath, num_points: usize) -> String {
    let indices = vertex_indices(path, num_points);
    let rows: Vec<VertexRow> = path
        .vertices
        .iter()
        .enumerate()
        .map(|(i, v)| VertexRow {
            index: indices[i],
            label: path.label(i).to_string(),
            kvec: format!("[{:.4}, {:.4}, {:.4}]", v[0], v[1], v[2]),
        })
        .collect();

    Table::new(rows).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_table_lists_all_vertices() {
        let path = KPath::new(
            vec![[0.5, 0.0, 0.0], [0.0, 0.0, 0.0], [0.5, 0.5, 0.0]],
            vec!["L".into(), "G".into()],
        )
        .unwrap();
        let table = vertex_table(&path, 11);
        assert!(table.contains("Label"));
        assert!(table.contains("[0.5000, 0.0000, 0.0000]"));
        assert!(table.contains("[0.5000, 0.5000, 0.0000]"));
        assert!(table.contains("| G"));
    }
}
