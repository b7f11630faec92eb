//! Stamps the binary with its git revision and build time for `--long-version`.
//!
//! Either stamp can be pinned through its environment variable for
//! reproducible builds. Otherwise it is probed from `git` or `date`, with a
//! placeholder when neither tool is available.

use std::path::Path;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

struct Stamp {
    var: &'static str,
    probe: fn() -> String,
}

const STAMPS: [Stamp; 2] = [
    Stamp {
        var: "GENVM_ASSIST_BUILD_GIT_HASH",
        probe: probe_git_revision,
    },
    Stamp {
        var: "GENVM_ASSIST_BUILD_TIMESTAMP",
        probe: probe_build_time,
    },
];

fn main() {
    watch_git_head(Path::new(".git"));
    for stamp in &STAMPS {
        println!("cargo:rerun-if-env-changed={}", stamp.var);
        let value = std::env::var(stamp.var)
            .ok()
            .filter(|pinned| !pinned.trim().is_empty())
            .unwrap_or_else(stamp.probe);
        println!("cargo:rustc-env={}={}", stamp.var, value.trim());
    }
}

/// Rebuild when HEAD moves or when the checked-out branch gets a commit.
fn watch_git_head(git_dir: &Path) {
    let head = git_dir.join("HEAD");
    println!("cargo:rerun-if-changed={}", head.display());
    let branch = std::fs::read_to_string(&head)
        .ok()
        .and_then(|text| text.trim().strip_prefix("ref: ").map(str::to_owned));
    if let Some(branch) = branch {
        println!("cargo:rerun-if-changed={}", git_dir.join(branch).display());
    }
}

fn probe_git_revision() -> String {
    capture("git", &["rev-parse", "--short=12", "HEAD"]).unwrap_or_else(|| "unknown".to_owned())
}

fn probe_build_time() -> String {
    capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| since.as_secs());
        format!("unix:{secs}")
    })
}

/// Trimmed stdout of a command that ran successfully and printed something.
fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}
