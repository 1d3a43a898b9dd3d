//! Fake transfer tools for integration tests.
//!
//! A [`ToolScript`] installs a small POSIX shell script that records its
//! argv, optionally runs an arbitrary snippet (e.g. to populate the target
//! directory like a real fetch would), prints canned output lines, and exits
//! with a chosen code. Engine tests point the tool configuration at these
//! scripts instead of the real `rsync`/`debmirror` binaries.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Builder for one fake transfer-tool script.
#[derive(Debug)]
pub struct ToolScript {
    name: String,
    snippets: Vec<String>,
    lines: Vec<String>,
    exit_code: i32,
}

impl ToolScript {
    /// Start building a script with the given binary name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snippets: Vec::new(),
            lines: Vec::new(),
            exit_code: 0,
        }
    }

    /// Print a line on stdout when the tool runs.
    #[must_use]
    pub fn say(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Run an arbitrary shell snippet before printing the canned lines.
    /// `$1`, `$@` etc. refer to the tool's arguments.
    #[must_use]
    pub fn run(mut self, snippet: impl Into<String>) -> Self {
        self.snippets.push(snippet.into());
        self
    }

    /// Exit code the tool terminates with.
    #[must_use]
    pub const fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Write the executable script into `dir` and return its path.
    ///
    /// # Errors
    ///
    /// Returns an error when the script cannot be written or made
    /// executable.
    pub fn install(self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        let argv_log = dir.join(format!("{}.argv", self.name));

        let mut body = String::from("#!/bin/sh\n");
        body.push_str(&format!(
            "printf '%s\\n' \"$@\" > {}\n",
            shell_quote(&argv_log.display().to_string())
        ));
        for snippet in &self.snippets {
            body.push_str(snippet);
            body.push('\n');
        }
        for line in &self.lines {
            body.push_str(&format!("printf '%s\\n' {}\n", shell_quote(line)));
        }
        body.push_str(&format!("exit {}\n", self.exit_code));

        fs::write(&path, body)
            .with_context(|| format!("failed to write fake tool '{}'", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("failed to mark '{}' executable", path.display()))?;
        }
        Ok(path)
    }
}

/// Arguments the named fake tool was last invoked with, one per entry.
///
/// # Errors
///
/// Returns an error when the tool never ran (no argv log exists).
pub fn recorded_args(dir: &Path, name: &str) -> Result<Vec<String>> {
    let path = dir.join(format!("{name}.argv"));
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("fake tool '{name}' was never invoked"))?;
    Ok(raw.lines().map(ToString::to_string).collect())
}

/// Shell snippet giving a fake commit rsync real mirror semantics: the
/// penultimate argument (source, trailing slash) is copied over the last
/// argument (destination), extraneous destination entries removed.
#[must_use]
pub fn mirror_copy_snippet() -> &'static str {
    r#"eval "src=\${$(($#-1))}"
eval "dst=\${$#}"
rm -rf "$dst"
mkdir -p "$dst"
cp -a "${src}." "$dst""#
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
