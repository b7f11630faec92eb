//! Compile-time build metadata exposed through `--version`.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("GENVM_ASSIST_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("GENVM_ASSIST_BUILD_TIMESTAMP");

/// Long version block used by `genvm-assist --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("GENVM_ASSIST_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("GENVM_ASSIST_BUILD_TIMESTAMP")
);

/// One-line metadata shown in verbose logs at startup.
pub fn version_line() -> String {
    format!("genvm-assist v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP})")
}
