//! Perform Compile
//!
//! File discovery and parallel compilation of template files.

use anyhow::Context;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use wasaby_compiler::{compile_template, CompileResult, CompilerConfig};

/// Expand glob patterns into a sorted, deduplicated list of files.
/// A pattern without glob metacharacters is taken as a literal path.
pub fn collect_files(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            files.push(PathBuf::from(pattern));
            continue;
        }
        let entries = glob::glob(pattern).with_context(|| format!("invalid pattern {}", pattern))?;
        for entry in entries {
            let path = entry?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Read and compile one file. The file path becomes the config's file name.
pub fn compile_file(path: &Path, config: &CompilerConfig) -> anyhow::Result<CompileResult> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = config.clone().with_file_name(&path.to_string_lossy());
    Ok(compile_template(&source, &config))
}

/// Compile every file on the rayon pool; results keep the input order
pub fn compile_files(
    files: &[PathBuf],
    config: &CompilerConfig,
) -> Vec<(PathBuf, anyhow::Result<CompileResult>)> {
    files
        .par_iter()
        .map(|path| (path.clone(), compile_file(path, config)))
        .collect()
}

pub fn load_config(path: Option<&str>) -> anyhow::Result<CompilerConfig> {
    match path {
        Some(path) => CompilerConfig::load(Path::new(path))
            .with_context(|| format!("failed to load config {}", path)),
        None => Ok(CompilerConfig::default()),
    }
}
