use std::fmt::Write;

use owo_colors::OwoColorize;

use crate::node::Node;
use crate::parser::{BRANCH, LAST_BRANCH, PIPE, SPACER};

pub const EMPTY_NOTICE: &str = "(Structure is empty)";

/// Render the tree one line per node, each prefixed with its `[id]`.
pub fn render(root: Option<&Node>) -> String {
    TreeRenderer { color: false }.render(root)
}

/// Same layout as [`render`], with ANSI colors for ids and directories.
pub fn render_colored(root: Option<&Node>) -> String {
    TreeRenderer { color: true }.render(root)
}

struct TreeRenderer {
    color: bool,
}

impl TreeRenderer {
    fn render(&self, root: Option<&Node>) -> String {
        let Some(root) = root else {
            return if self.color {
                format!("{}\n", EMPTY_NOTICE.yellow())
            } else {
                format!("{EMPTY_NOTICE}\n")
            };
        };
        let mut out = String::new();
        self.write_node(&mut out, root, "", None);
        out
    }

    /// `is_last` is `None` for the root, which gets no connector.
    fn write_node(&self, out: &mut String, node: &Node, prefix: &str, is_last: Option<bool>) {
        let id = format!("[{}]", node.id);
        if self.color {
            let _ = write!(out, "{}", format!("{id:<5}").magenta());
        } else {
            let _ = write!(out, "{id:<5}");
        }

        let child_prefix = match is_last {
            None => String::new(),
            Some(true) => {
                let _ = write!(out, "{prefix}{LAST_BRANCH}");
                format!("{prefix}{SPACER}")
            }
            Some(false) => {
                let _ = write!(out, "{prefix}{BRANCH}");
                format!("{prefix}{PIPE}")
            }
        };

        match (node.is_dir, self.color) {
            (true, true) => {
                let _ = writeln!(out, "{}", format!("{}/", node.name).blue().bold());
            }
            (true, false) => {
                let _ = writeln!(out, "{}/", node.name);
            }
            (false, _) => {
                let _ = writeln!(out, "{}", node.name);
            }
        }

        let count = node.children.len();
        for (i, child) in node.children.iter().enumerate() {
            self.write_node(out, child, &child_prefix, Some(i == count - 1));
        }
    }
}
