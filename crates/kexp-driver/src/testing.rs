//! Test doubles shared by the driver's unit tests.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use kexp_core::{ProcessResult, ToolPaths};
use kexp_tools::{ProcessRunner, ToolCommand};

/// Answers runs from a queue (exit 0 with no output once it is empty)
/// and records every command.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    results: Mutex<VecDeque<ProcessResult>>,
    pub(crate) calls: Mutex<Vec<ToolCommand>>,
}

impl ScriptedRunner {
    pub(crate) fn new(results: impl IntoIterator<Item = ProcessResult>) -> Self {
        Self {
            results: Mutex::new(results.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, command: &ToolCommand, _dir: &Path) -> ProcessResult {
        self.calls.lock().unwrap().push(command.clone());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ProcessResult::new(0, ""))
    }
}

/// Tool paths whose every location exists under `root`.
pub(crate) fn fake_paths(root: &Path) -> ToolPaths {
    let file = |relative: &str| {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
        path
    };
    let scratch_dir = root.join("scratch");
    fs::create_dir_all(&scratch_dir).unwrap();
    let build_tools_dir = root.join("sdk/build-tools/34.0.0");

    ToolPaths {
        kotlinc: file("kotlin/bin/kotlinc"),
        java: file("jdk/bin/java"),
        optimizer_jar: file("sdk/build-tools/34.0.0/lib/d8.jar"),
        platform_jar: file("sdk/platforms/android-34/android.jar"),
        adb: file("sdk/platform-tools/adb"),
        dexdump: file("sdk/build-tools/34.0.0/dexdump"),
        build_tools_dir,
        runtime_jars: vec![file("kotlin/lib/kotlin-stdlib.jar")],
        scratch_dir,
    }
}

