//! Files the pipeline reads and writes in the scratch directory.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use kexp_core::constants::{CLASS_EXTENSION, RULES_FILE, SOURCE_FILE};
use kexp_core::log_debug;

use crate::error::{ToolError, ToolResult};

/// R8 configuration written next to the classes before optimizing.
///
/// Arithmetic/cast simplification, field optimizations and class merging
/// stay off so the listing still resembles the source. Every method outside
/// the Kotlin runtime is kept.
pub const RULES: &str = "\
-optimizations !code/simplification/arithmetic,!code/simplification/cast,!field/*,!class/merging/*
-optimizationpasses 5
-dontpreverify
-dontobfuscate
-keep,allowoptimization class !kotlin.**,!kotlinx.** {
  <methods>;
}
";

/// Class files in `dir` (not recursive), by file name, sorted
/// lexicographically.
pub fn class_files(dir: &Path) -> ToolResult<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(ToolError::io(dir))?;

    let mut names = Vec::new();
    for entry in entries {
        let path = entry.map_err(ToolError::io(dir))?.path();
        if is_class_file(&path)
            && let Some(name) = path.file_name().and_then(OsStr::to_str)
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Delete class files left over from a previous build. Returns how many
/// were removed.
pub fn clean_class_files(dir: &Path) -> ToolResult<usize> {
    let classes = class_files(dir)?;
    for name in &classes {
        let path = dir.join(name);
        fs::remove_file(&path).map_err(ToolError::io(&path))?;
    }
    log_debug!("workspace", removed = classes.len(), dir = %dir.display(), "Cleaned stale classes");
    Ok(classes.len())
}

/// Write the snippet verbatim to [`SOURCE_FILE`].
pub fn write_source(dir: &Path, source: &str) -> ToolResult<PathBuf> {
    let path = dir.join(SOURCE_FILE);
    fs::write(&path, source).map_err(ToolError::io(&path))?;
    Ok(path)
}

/// Write [`RULES`] to [`RULES_FILE`].
pub fn write_rules_file(dir: &Path) -> ToolResult<PathBuf> {
    let path = dir.join(RULES_FILE);
    fs::write(&path, RULES).map_err(ToolError::io(&path))?;
    Ok(path)
}

fn is_class_file(path: &Path) -> bool {
    path.is_file() && path.extension() == Some(OsStr::new(CLASS_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn class_files_are_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["Z.class", "A.class", "KotlinExplorer.kt", "B.class", "rules.txt"] {
            touch(tmp.path(), name);
        }
        fs::create_dir(tmp.path().join("C.class")).unwrap();

        assert_eq!(
            class_files(tmp.path()).unwrap(),
            vec!["A.class", "B.class", "Z.class"]
        );
    }

    #[test]
    fn clean_removes_only_classes() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "MainKt.class");
        touch(tmp.path(), "Foo$Bar.class");
        touch(tmp.path(), "classes.dex");

        assert_eq!(clean_class_files(tmp.path()).unwrap(), 2);
        assert!(class_files(tmp.path()).unwrap().is_empty());
        assert!(tmp.path().join("classes.dex").exists());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = class_files(&tmp.path().join("gone")).unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
    }

    #[test]
    fn source_and_rules_are_written_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_source(tmp.path(), "fun main() {}\n").unwrap();
        assert_eq!(source.file_name().unwrap(), SOURCE_FILE);
        assert_eq!(fs::read_to_string(source).unwrap(), "fun main() {}\n");

        let rules = fs::read_to_string(write_rules_file(tmp.path()).unwrap()).unwrap();
        assert!(rules.contains("-dontobfuscate"));
        assert!(rules.contains("-optimizationpasses 5"));
        assert!(rules.contains("!kotlin.**,!kotlinx.**"));
    }
}
