use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};

use crate::node::Node;

/// What a materialization run did.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub created_dirs: Vec<PathBuf>,
    pub created_files: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, io::Error)>,
}

impl MaterializeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Create every directory and empty file of `root` under `base`, in tree order.
///
/// A failed item is recorded and skipped; a failed directory also skips its
/// subtree. Only a failure to create `base` itself is returned as an error.
pub fn materialize(root: &Node, base: &Path) -> io::Result<MaterializeReport> {
    if !base.as_os_str().is_empty() {
        fs::create_dir_all(base)?;
    }
    let mut report = MaterializeReport::default();
    create_node(root, base, &mut report);
    Ok(report)
}

/// True when joining `name` onto a base cannot leave that base.
fn is_contained(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn create_node(node: &Node, base: &Path, report: &mut MaterializeReport) {
    if !is_contained(&node.name) {
        warn!(
            "Refusing to create {}: path escapes {}",
            node.name,
            base.display()
        );
        report.failures.push((
            PathBuf::from(&node.name),
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' escapes the output directory", node.name),
            ),
        ));
        return;
    }
    let item_path = base.join(&node.name);

    if node.is_dir {
        if let Err(e) = fs::create_dir_all(&item_path) {
            warn!("Error creating directory {}: {}", item_path.display(), e);
            report.failures.push((item_path, e));
            return;
        }
        info!("Created directory: {}/", item_path.display());
        report.created_dirs.push(item_path.clone());
        for child in &node.children {
            create_node(child, &item_path, report);
        }
    } else {
        if let Some(parent) = item_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(
                    "Error creating parent directory {} for file {}: {}",
                    parent.display(),
                    item_path.display(),
                    e
                );
                report.failures.push((item_path, e));
                return;
            }
        }
        match File::create(&item_path) {
            Ok(_) => {
                info!("Created file: {}", item_path.display());
                report.created_files.push(item_path);
            }
            Err(e) => {
                warn!("Error creating file {}: {}", item_path.display(), e);
                report.failures.push((item_path, e));
            }
        }
    }
}
