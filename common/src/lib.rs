pub mod cli;
pub mod metrics;
pub mod tracer;

/// Expands to the crate's version string, combining the Cargo package
/// version with the current git commit hash (if available). Mirrors the
/// way the pipeline binaries report `--version`.
#[macro_export]
macro_rules! version {
    () => {
        $crate::const_format::concatcp!(env!("CARGO_PKG_VERSION"), "-", $crate::git_version!())
    };
}

#[doc(hidden)]
pub use const_format;
#[doc(hidden)]
pub use git_version::git_version;
