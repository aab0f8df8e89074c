//! Parser for ASCII tree drawings such as:
//!
//! ```text
//! app/
//! ├── src/
//! │   └── main.rs
//! └── README.md
//! ```
//!
//! Depth comes from the width of the indentation run before a connector
//! (four columns per level) plus one for the connector itself. Each new node
//! attaches to the nearest open directory with a smaller depth, so depth
//! jumps are tolerated but an item with no open directory above it is rejected.

use tracing::{debug, warn};

use crate::error::LayoutError;
use crate::node::{Node, NodeId};

/// Connector for an item with more siblings below it.
pub const BRANCH: &str = "├── ";
/// Connector for the last item in a directory.
pub const LAST_BRANCH: &str = "└── ";
/// Indentation run under a directory that still has siblings below.
pub const PIPE: &str = "│   ";
/// Indentation run under a last child.
pub const SPACER: &str = "    ";
/// Columns per nesting level.
pub const INDENT_WIDTH: usize = 4;
/// Suffix marking a directory name.
pub const DIR_SUFFIX: char = '/';

const CONNECTORS: [&str; 2] = [BRANCH, LAST_BRANCH];

/// Parse a tree drawing into its root node.
///
/// Ids are assigned from 1 in order of appearance. Blank lines, lines whose
/// connector has no item after it and connector-less lines after the root are
/// skipped.
pub fn parse(layout: &str) -> Result<Node, LayoutError> {
    let mut next_id: NodeId = 0;
    // Nodes in order of appearance, each with the index of its parent.
    let mut nodes: Vec<(Node, Option<usize>)> = Vec::new();
    // Indices of open directories, deepest last.
    let mut stack: Vec<usize> = Vec::new();

    for (i, line) in layout.lines().enumerate() {
        let line_no = i + 1;
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }

        let (item, depth) = match split_connector(line) {
            Some((indent, item)) => {
                let mut depth = indent_level(indent);
                if !item.is_empty() {
                    depth += 1;
                }
                (item, depth)
            }
            None if nodes.is_empty() => (line.trim(), 0),
            None => {
                debug!(line = line_no, text = line, "skipping line without connector");
                continue;
            }
        };

        if item.is_empty() {
            debug!(line = line_no, text = line, "skipping line without item name");
            continue;
        }

        let (name, is_dir) = classify(item);
        next_id += 1;
        let mut node = Node::new(next_id, name, is_dir, depth);
        debug!(
            line = line_no,
            id = node.id,
            name = %node.name,
            depth = node.depth,
            is_dir = node.is_dir,
            "parsed item"
        );

        if nodes.is_empty() {
            if node.depth != 0 {
                warn!(
                    line = line_no,
                    name = %node.name,
                    depth = node.depth,
                    "first item is indented, treating it as the root"
                );
                node.depth = 0;
            }
            if node.is_dir {
                stack.push(0);
            }
            nodes.push((node, None));
            continue;
        }

        while let Some(&top) = stack.last() {
            if nodes[top].0.depth >= node.depth {
                stack.pop();
            } else {
                break;
            }
        }

        let Some(&parent) = stack.last() else {
            return Err(LayoutError::OrphanedNode {
                line: line_no,
                name: node.name,
                depth: node.depth,
            });
        };

        node.parent = Some(nodes[parent].0.id);
        let idx = nodes.len();
        let opens_scope = node.is_dir;
        nodes.push((node, Some(parent)));
        if opens_scope {
            stack.push(idx);
        }
    }

    assemble(nodes)
}

/// Split `line` at the first recognised connector into indent and trimmed item.
fn split_connector(line: &str) -> Option<(&str, &str)> {
    CONNECTORS.iter().find_map(|connector| {
        line.find(connector)
            .map(|idx| (&line[..idx], line[idx + connector.len()..].trim()))
    })
}

/// Nesting level implied by an indentation run of bars and spaces.
fn indent_level(indent: &str) -> usize {
    indent.chars().filter(|&c| c == '│' || c == ' ').count() / INDENT_WIDTH
}

/// Split a raw item token into its display name and directory flag.
pub fn classify(token: &str) -> (&str, bool) {
    match token.strip_suffix(DIR_SUFFIX) {
        Some(name) => (name, true),
        None => (token, false),
    }
}

/// Link the flat node list into an owned tree.
///
/// Children always follow their parent, so draining from the back lets each
/// node move into its parent before the parent itself is moved.
fn assemble(mut nodes: Vec<(Node, Option<usize>)>) -> Result<Node, LayoutError> {
    while let Some((node, parent)) = nodes.pop() {
        match parent {
            Some(p) => nodes[p].0.children.insert(0, node),
            None => return Ok(node),
        }
    }
    Err(LayoutError::EmptyInput)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "app/\n├── src/\n│   └── main.ext\n└── README.md\n";

    fn names(root: &Node) -> Vec<(NodeId, String, bool, usize)> {
        root.iter()
            .map(|n| (n.id, n.name.clone(), n.is_dir, n.depth))
            .collect()
    }

    #[test]
    fn parses_sample_tree() {
        let root = parse(SAMPLE).unwrap();
        assert_eq!(
            names(&root),
            vec![
                (1, "app".into(), true, 0),
                (2, "src".into(), true, 1),
                (3, "main.ext".into(), false, 2),
                (4, "README.md".into(), false, 1),
            ]
        );
        assert!(root.is_root());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children[0].parent, Some(2));
        assert_eq!(root.children[1].parent, Some(1));
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(parse(""), Err(LayoutError::EmptyInput));
        assert_eq!(parse("\n   \n\r\n"), Err(LayoutError::EmptyInput));
    }

    #[test]
    fn bare_second_top_level_item_is_noise() {
        let root = parse("app/\nother/\n└── a.txt").unwrap();
        assert_eq!(
            names(&root),
            vec![(1, "app".into(), true, 0), (2, "a.txt".into(), false, 1)]
        );
    }

    #[test]
    fn item_under_file_root_is_orphaned() {
        let err = parse("main.rs\n└── lib.rs").unwrap_err();
        assert_eq!(
            err,
            LayoutError::OrphanedNode {
                line: 2,
                name: "lib.rs".into(),
                depth: 1,
            }
        );
    }

    #[test]
    fn indented_first_item_becomes_root() {
        let root = parse("    └── app/\n    │   └── a.txt").unwrap();
        assert_eq!(root.name, "app");
        assert_eq!(root.depth, 0);
        assert_eq!(root.children[0].name, "a.txt");
        assert_eq!(root.children[0].depth, 3);
    }

    #[test]
    fn connector_less_lines_after_root_are_skipped() {
        let root = parse("app/\nsome commentary\n└── a.txt").unwrap();
        assert_eq!(root.node_count(), 2);
        assert_eq!(root.children[0].id, 2);
    }

    #[test]
    fn connector_without_item_is_skipped() {
        let root = parse("app/\n├── \n└── a.txt").unwrap();
        assert_eq!(names(&root)[1], (2, "a.txt".into(), false, 1));
    }

    #[test]
    fn depth_jump_attaches_to_nearest_ancestor() {
        let root = parse("app/\n└── src/\n            └── deep.rs").unwrap();
        let src = &root.children[0];
        assert_eq!(src.children[0].name, "deep.rs");
        assert_eq!(src.children[0].depth, 4);
    }

    #[test]
    fn files_never_become_parents() {
        let root = parse("app/\n├── a.txt\n│   └── b.txt").unwrap();
        // b.txt is deeper than a.txt but a.txt is a file, so b.txt joins app.
        assert_eq!(root.children.len(), 2);
        assert!(root.children.iter().all(|c| c.children.is_empty()));
        assert_eq!(root.children[1].parent, Some(1));
    }

    #[test]
    fn closes_sibling_groups() {
        let text = "app/\n├── a/\n│   ├── x.rs\n│   └── y/\n│       └── z.rs\n└── b/\n    └── w.rs";
        let root = parse(text).unwrap();
        let a = &root.children[0];
        let b = &root.children[1];
        assert_eq!(a.name, "a");
        assert_eq!(a.children.len(), 2);
        assert_eq!(a.children[1].children[0].name, "z.rs");
        assert_eq!(b.children[0].name, "w.rs");
        assert_eq!(b.children[0].parent, Some(b.id));
    }

    #[test]
    fn ids_restart_for_each_parse() {
        let first = parse(SAMPLE).unwrap();
        let second = parse(SAMPLE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn tolerates_carriage_returns() {
        let root = parse(&SAMPLE.replace('\n', "\r\n")).unwrap();
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn classify_strips_dir_suffix() {
        assert_eq!(classify("src/"), ("src", true));
        assert_eq!(classify("main.rs"), ("main.rs", false));
        assert_eq!(classify(".github/"), (".github", true));
    }

    #[test]
    fn children_are_deeper_than_parents() {
        let text = "app/\n├── a/\n│   └── b/\n│       └── c.rs\n└── d.rs";
        let root = parse(text).unwrap();
        for node in root.iter() {
            for child in &node.children {
                assert!(child.depth > node.depth);
                assert!(node.is_dir);
            }
        }
    }
}
