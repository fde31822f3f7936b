// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

const SOURCE_ROOTS: [&str; 3] = ["src", "tests", "benches"];

fn manifest_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

/// Every `.rs` file below `dir`, in sorted order.
fn rust_sources(dir: &Path) -> Vec<PathBuf> {
    let mut sources = Vec::new();
    let mut entries: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(read) => read.map(|e| e.unwrap().path()).collect(),
        Err(_) => return sources,
    };
    entries.sort();
    for path in entries {
        if path.is_dir() {
            sources.extend(rust_sources(&path));
        } else if path.extension().map_or(false, |e| e == "rs") {
            sources.push(path);
        }
    }
    sources
}

fn manifest_license() -> String {
    let manifest = fs::read_to_string(manifest_dir().join("Cargo.toml")).unwrap();
    manifest
        .lines()
        .find_map(|line| line.strip_prefix("license = "))
        .map(|value| value.trim_matches('"').to_string())
        .expect("Cargo.toml declares a license")
}

#[test]
fn test_sources_carry_manifest_license_header() {
    let header = format!("// SPDX-License-Identifier: {}", manifest_license());
    let missing: Vec<PathBuf> = SOURCE_ROOTS
        .iter()
        .flat_map(|root| rust_sources(&manifest_dir().join(root)))
        .filter(|path| {
            let text = fs::read_to_string(path).unwrap();
            text.lines().next() != Some(header.as_str())
        })
        .collect();
    assert!(
        missing.is_empty(),
        "sources without `{}` as their first line: {:?}",
        header,
        missing
    );
}

#[test]
fn test_source_roots_are_not_empty() {
    for root in SOURCE_ROOTS {
        assert!(
            !rust_sources(&manifest_dir().join(root)).is_empty(),
            "no Rust sources under {}",
            root
        );
    }
}
