use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// A `docker` stand-in that records its arguments and succeeds, unless
/// `FAKE_DOCKER_FAIL` names a compose subcommand to fail. Inline `-c`
/// scripts are logged as `<script>`; `exec` stdin goes to its own file.
pub struct FakeDocker {
    pub script: PathBuf,
    pub log_file: PathBuf,
    pub stdin_file: PathBuf,
}

impl FakeDocker {
    pub fn install(dir: &Path) -> Self {
        let bin_dir = dir.join("bin");
        fs::create_dir_all(&bin_dir).expect("Failed to create bin dir");
        let log_file = dir.join("docker.log");
        let stdin_file = dir.join("docker.stdin");
        let script = bin_dir.join("docker");

        let content = format!(
            r#"#!/bin/sh
line=""
prev=""
for arg in "$@"; do
    shown="$arg"
    if [ "$prev" = "-c" ]; then
        shown="<script>"
    fi
    line="$line${{line:+ }}$shown"
    prev="$arg"
done
echo "$line" >> "{log}"

if [ "$1" = "compose" ] && [ "$2" = "exec" ]; then
    cat >> "{stdin}"
    echo >> "{stdin}"
fi

case "$1" in
    info)
        exit 0
        ;;
    compose)
        if [ "$2" = "version" ]; then
            echo "Docker Compose version v2.29.0"
            exit 0
        fi
        if [ -n "$FAKE_DOCKER_FAIL" ] && [ "$2" = "$FAKE_DOCKER_FAIL" ]; then
            echo "simulated $2 failure" >&2
            exit 1
        fi
        ;;
esac

exit 0
"#,
            log = log_file.to_string_lossy(),
            stdin = stdin_file.to_string_lossy()
        );
        fs::write(&script, content).expect("Failed to write fake docker");
        let mut perms = fs::metadata(&script).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).expect("Failed to chmod fake docker");

        Self { script, log_file, stdin_file }
    }

    /// Every invocation so far, one line per call.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log_file)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Everything piped into `compose exec` calls.
    pub fn stdin(&self) -> String {
        fs::read_to_string(&self.stdin_file).unwrap_or_default()
    }

    pub fn was_called_with(&self, args: &str) -> bool {
        self.calls().iter().any(|line| line == args)
    }
}
