use crate::common::*;

use tree_util::{find_center_of_tree, make_propagation_schedule, PropagationOp};

#[derive(Args, Debug, Clone)]
pub struct CenterArgs {
    /// Tree as two vertex columns per line (`.gz` ok)
    #[arg(long, short = 'e', required = true)]
    pub edges: Box<str>,
}

#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    /// Tree as two vertex columns per line (`.gz` ok)
    #[arg(long, short = 'e', required = true)]
    pub edges: Box<str>,

    /// Root vertex; default: the most central vertex
    #[arg(long, short = 'r')]
    pub root: Option<usize>,

    /// Output file (`stdout` by default)
    #[arg(long, short = 'o', default_value = "stdout")]
    pub out: Box<str>,
}

pub fn print_center(args: &CenterArgs) -> anyhow::Result<()> {
    let tree = read_tree(&args.edges)?;
    println!("{}", find_center_of_tree(tree.tree_grid()));
    Ok(())
}

fn schedule_line(op: &PropagationOp) -> Box<str> {
    let [_, vertex, relative, edge] = op.as_row();
    format!("{}\t{}\t{}\t{}", op.opcode(), vertex, relative, edge).into_boxed_str()
}

pub fn compile_schedule(args: &ScheduleArgs) -> anyhow::Result<()> {
    let tree = read_tree(&args.edges)?;
    let schedule = make_propagation_schedule(tree.tree_grid(), args.root)?;
    info!(
        "{} operations for {} vertices",
        schedule.len(),
        tree.num_vertices()
    );

    let mut lines: Vec<Box<str>> = vec!["#opcode\tvertex\trelative\tedge".into()];
    lines.extend(schedule.iter().map(schedule_line));
    write_lines(&lines, &args.out)
}
