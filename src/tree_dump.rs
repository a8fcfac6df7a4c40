//! Indented text dumps for the syntax trees.

pub trait TreeNode: Sized {
    fn label(&self) -> String;
    fn children(&self) -> Vec<Self>;
}

/// Render `root` and its descendants, one node per line:
///
/// ```text
/// Program
/// ├───Function main [1:5]
/// │   └───Compound [1:16]
/// └───...
/// ```
pub fn render<N: TreeNode>(root: &N) -> String {
    let mut out = root.label();
    out.push('\n');

    // (node, prefix, last child of its parent), popped in document order
    let mut pending = Vec::new();
    push_children(root, "", &mut pending);
    while let Some((node, prefix, last)) = pending.pop() {
        out.push_str(&prefix);
        out.push_str(if last { "└───" } else { "├───" });
        out.push_str(&node.label());
        out.push('\n');

        let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
        push_children(&node, &nested, &mut pending);
    }
    out
}

fn push_children<N: TreeNode>(node: &N, prefix: &str, pending: &mut Vec<(N, String, bool)>) {
    let children = node.children();
    let count = children.len();
    for (idx, child) in children.into_iter().enumerate().rev() {
        pending.push((child, prefix.to_owned(), idx + 1 == count));
    }
}
