pub use clap::Args;
pub use log::info;

pub use tree_util::{Edge, TreeStructure};

pub use crate::common_io::*;

/// Recover the number of vertices from the length of a complete-graph
/// potential vector.
pub fn num_vertices_from_potentials(num_potentials: usize) -> anyhow::Result<usize> {
    let (v1, nv) = tree_util::complete_edge_vertices(num_potentials);
    if v1 != 0 {
        anyhow::bail!(
            "{} potentials do not fill a complete graph (expected V(V-1)/2)",
            num_potentials
        );
    }
    Ok(nv)
}

/// Read edge potentials: whitespace or comma separated numbers, any
/// number per line.
pub fn read_potentials(file_path: &str) -> anyhow::Result<Vec<f64>> {
    let mut ret = vec![];
    for line in read_lines(file_path)? {
        if is_comment_line(&line) {
            continue;
        }
        for word in split_words(&line) {
            let x: f64 = word
                .parse()
                .map_err(|e| anyhow::anyhow!("{}: bad potential `{}`: {}", file_path, word, e))?;
            ret.push(x);
        }
    }
    Ok(ret)
}

/// Read a tree as two integer columns per line.
pub fn read_edges(file_path: &str) -> anyhow::Result<Vec<Edge>> {
    let mut ret = vec![];
    for line in read_lines(file_path)? {
        if is_comment_line(&line) {
            continue;
        }
        let words: Vec<&str> = split_words(&line).collect();
        if words.is_empty() {
            continue;
        }
        if words.len() != 2 {
            anyhow::bail!("{}: expected two vertices per line: `{}`", file_path, line);
        }
        let v1: usize = words[0].parse()?;
        let v2: usize = words[1].parse()?;
        ret.push((v1, v2));
    }
    Ok(ret)
}

/// Read a tree file into a tree structure, inferring the vertex count.
pub fn read_tree(file_path: &str) -> anyhow::Result<TreeStructure> {
    let edges = read_edges(file_path)?;
    let tree = TreeStructure::from_edges(edges.len() + 1, &edges)?;
    info!(
        "read a tree with {} vertices from {}",
        tree.num_vertices(),
        file_path
    );
    Ok(tree)
}

/// Write edges as tab-separated vertex pairs.
pub fn write_edges(edges: &[Edge], file_path: &str) -> anyhow::Result<()> {
    let lines: Vec<Box<str>> = edges
        .iter()
        .map(|(v1, v2)| format!("{}\t{}", v1, v2).into_boxed_str())
        .collect();
    write_lines(&lines, file_path)
}

fn split_words(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('%')
}
