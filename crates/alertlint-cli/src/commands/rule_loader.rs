use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

/// A rule file read into memory, with the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFile {
    pub path: String,
    pub source: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),

    #[error("failed to read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to read directory '{}': {source}", .path.display())]
    Directory { path: PathBuf, source: io::Error },

    #[error("no .yml or .yaml files found in '{}'", .0.display())]
    Empty(PathBuf),
}

/// Loads every path given on the command line.
///
/// `-` reads stdin. Directories are walked recursively; files in them are
/// picked by extension and read in path order.
pub fn load_rule_files(paths: &[PathBuf]) -> Result<Vec<RuleFile>, LoadError> {
    let mut files = Vec::new();
    for path in paths {
        if path.as_os_str() == "-" {
            files.push(load_stdin()?);
        } else if path.is_dir() {
            let found = collect_dir(path)?;
            if found.is_empty() {
                return Err(LoadError::Empty(path.clone()));
            }
            for file in found {
                files.push(load_file(&file)?);
            }
        } else {
            files.push(load_file(path)?);
        }
    }
    Ok(files)
}

fn load_stdin() -> Result<RuleFile, LoadError> {
    let mut source = String::new();
    io::stdin()
        .read_to_string(&mut source)
        .map_err(LoadError::Stdin)?;
    Ok(RuleFile {
        path: "<stdin>".to_string(),
        source,
    })
}

fn load_file(path: &Path) -> Result<RuleFile, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = source.len(), "loaded rule file");
    Ok(RuleFile {
        path: path.to_string_lossy().into_owned(),
        source,
    })
}

pub(crate) fn is_rule_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yml" || ext == "yaml")
        .unwrap_or(false)
}

pub(crate) fn collect_dir(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let dir_error = |source: io::Error| LoadError::Directory {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(dir_error)?
        .map(|entry| entry.map(|e| e.path()).map_err(dir_error))
        .collect::<Result<Vec<_>, _>>()?;

    // Sort for deterministic ordering
    entries.sort();

    let mut found = Vec::new();
    for path in entries {
        if path.is_dir() {
            found.extend(collect_dir(&path)?);
        } else if is_rule_file(&path) {
            found.push(path);
        }
    }
    Ok(found)
}
