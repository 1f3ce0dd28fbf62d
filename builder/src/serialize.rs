//! Leaf-path serialization.

use std::io::{self, Write};

use crate::node::RepertoireNode;

/// Write the repertoire as one line per leaf: the move tokens on the
/// path from the root, space-separated and newline-terminated. Interior
/// nodes emit nothing, and neither does a childless root (the root's
/// empty move contributes nothing to any path).
pub fn write_leaf_lines<W: Write>(root: &RepertoireNode, out: &mut W) -> io::Result<()> {
    let mut path = Vec::new();
    visit(root, &mut path, out)
}

fn visit<'n, W: Write>(
    node: &'n RepertoireNode,
    path: &mut Vec<&'n str>,
    out: &mut W,
) -> io::Result<()> {
    if !node.token.is_empty() {
        path.push(&node.token);
    }

    if node.is_leaf() && !path.is_empty() {
        writeln!(out, "{}", path.join(" "))?;
    }
    for child in &node.children {
        visit(child, path, out)?;
    }

    if !node.token.is_empty() {
        path.pop();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats::MoveStats;

    fn node(token: &str, children: Vec<RepertoireNode>) -> RepertoireNode {
        let mut node = RepertoireNode::for_move(&MoveStats::new(token, 0, 0, 0));
        node.children = children;
        node
    }

    fn serialize(root: &RepertoireNode) -> String {
        let mut out = Vec::new();
        write_leaf_lines(root, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_one_line_per_leaf_none_for_interior_nodes() {
        let mut root = RepertoireNode::root();
        root.children.push(node(
            "e2e4",
            vec![node("c7c5", vec![]), node("e7e5", vec![])],
        ));

        let text = serialize(&root);
        assert_eq!(text, "e2e4 c7c5\ne2e4 e7e5\n");
    }

    #[test]
    fn test_single_chain_emits_full_path_once() {
        let mut root = RepertoireNode::root();
        root.children
            .push(node("e2e4", vec![node("c7c5", vec![node("g1f3", vec![])])]));

        assert_eq!(serialize(&root), "e2e4 c7c5 g1f3\n");
    }

    #[test]
    fn test_childless_root_emits_nothing() {
        assert_eq!(serialize(&RepertoireNode::root()), "");
    }

    #[test]
    fn test_every_line_is_newline_terminated() {
        let mut root = RepertoireNode::root();
        root.children.push(node("d2d4", vec![]));
        root.children.push(node("c2c4", vec![]));

        let text = serialize(&root);
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 2);
    }
}
