//! Source-tree scanning helpers for architecture contract tests.

use std::fs;
use std::path::{Path, PathBuf};

/// One matching source line: `(path relative to the crate root, line number, text)`.
pub type Hit = (String, usize, String);

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn display_path(path: &Path) -> String {
    let root = crate_root();
    let relative = path.strip_prefix(&root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

/// Every `.rs` file below `relative_dir`, in sorted order.
pub fn rust_sources(relative_dir: &str) -> Vec<PathBuf> {
    let mut pending = vec![crate_root().join(relative_dir)];
    let mut sources = Vec::new();

    while let Some(dir) = pending.pop() {
        let listing = fs::read_dir(&dir)
            .unwrap_or_else(|e| panic!("cannot list {}: {e}", dir.display()));
        for entry in listing {
            let path = entry.expect("readable dir entry").path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                sources.push(path);
            }
        }
    }

    sources.sort();
    sources
}

/// Lines under `relative_dir` containing any of `needles`.
pub fn find_lines_containing(relative_dir: &str, needles: &[&str]) -> Vec<Hit> {
    rust_sources(relative_dir)
        .into_iter()
        .flat_map(|path| {
            let text = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
            let shown = display_path(&path);
            text.lines()
                .enumerate()
                .filter(|(_, line)| needles.iter().any(|n| line.contains(n)))
                .map(|(idx, line)| (shown.clone(), idx + 1, line.to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Like [`find_lines_containing`], skipping files under any allowed prefix.
pub fn find_lines_containing_outside(
    relative_dir: &str,
    needles: &[&str],
    allowed_prefixes: &[&str],
) -> Vec<Hit> {
    find_lines_containing(relative_dir, needles)
        .into_iter()
        .filter(|(path, _, _)| !allowed_prefixes.iter().any(|p| path.starts_with(p)))
        .collect()
}

pub fn path_exists(relative_path: &str) -> bool {
    crate_root().join(relative_path).exists()
}

pub fn read_relative(relative_path: &str) -> String {
    fs::read_to_string(crate_root().join(relative_path))
        .unwrap_or_else(|e| panic!("cannot read {relative_path}: {e}"))
}
