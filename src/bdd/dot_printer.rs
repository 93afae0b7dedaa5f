use super::{Bdd, BddManager};
use std::collections::HashSet;
use std::io::Write;

/// Writes the subgraph reachable from `root` as a `.dot` graph, labeling
/// each internal node with its declared variable name. When `zero_pruned` is
/// set, edges into the `false` terminal are omitted, as is the terminal
/// itself.
pub fn print_bdd_as_dot(
    output: &mut dyn Write,
    manager: &BddManager,
    root: Bdd,
    zero_pruned: bool,
) -> Result<(), std::io::Error> {
    output.write_all(b"digraph G {\n")?;
    output.write_all(b"init__ [label=\"\", style=invis, height=0, width=0];\n")?;
    output.write_all(format!("init__ -> n{};\n", node_id(root)).as_bytes())?;

    let mut seen: HashSet<Bdd> = HashSet::new();
    let mut stack: Vec<Bdd> = vec![root];
    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        if manager.is_true(node) || manager.is_false(node) {
            continue;
        }
        let var = manager.node_var(node);
        output.write_all(
            format!("n{}[label=\"{}\"];\n", node_id(node), manager.var_name(var)).as_bytes(),
        )?;
        let high = manager.node_high(node);
        if !zero_pruned || !manager.is_false(high) {
            output.write_all(
                format!("n{} -> n{} [style=filled];\n", node_id(node), node_id(high)).as_bytes(),
            )?;
        }
        let low = manager.node_low(node);
        if !zero_pruned || !manager.is_false(low) {
            output.write_all(
                format!("n{} -> n{} [style=dotted];\n", node_id(node), node_id(low)).as_bytes(),
            )?;
        }
        stack.push(high);
        stack.push(low);
    }

    if !zero_pruned {
        output.write_all(b"n0 [shape=box, label=\"0\", style=filled, height=0.3, width=0.3];\n")?;
    }
    output.write_all(b"n1 [shape=box, label=\"1\", style=filled, height=0.3, width=0.3];\n")?;
    output.write_all(b"}\n")?;
    Ok(())
}

fn node_id(node: Bdd) -> u32 {
    node.raw_index()
}
