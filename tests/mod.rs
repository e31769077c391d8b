
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Output;
use std::sync::{LazyLock, Mutex};

use assert_cmd::Command;

pub trait CommandExt {
    /// Same as [Command::output] except with hooks to print stdout/stderr in failed tests
    fn captured_output(&mut self) -> Output;
}

impl CommandExt for Command {
    fn captured_output(&mut self) -> Output {
        let output = self.output().expect("Failed to execute command");

        // libtest has hooks in the print! and eprint! macros to do output capturing in tests.
        print!("{}", String::from_utf8_lossy(&output.stdout));
        eprint!("{}", String::from_utf8_lossy(&output.stderr));

        output
    }
}

/// Get a command to run the given tool with Cargo
pub fn tool(name: &'static str) -> Command {
    static TOOL_PATH_CACHE: LazyLock<Mutex<HashMap<&'static str, PathBuf>>> =
        LazyLock::new(|| Mutex::new(HashMap::new()));

    let mut cache = TOOL_PATH_CACHE.lock().unwrap();
    #[allow(deprecated)]
    let path = cache
        .entry(name)
        .or_insert_with(|| assert_cmd::cargo::cargo_bin(name));

    let mut cmd = Command::new(path);
    cmd.arg("--log-level=TRACE");
    cmd
}
