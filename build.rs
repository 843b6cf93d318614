use std::process::Command;

/// Run a git subcommand and return its trimmed stdout, if any.
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

    // Build number is the commit count, so it is stable for a given checkout
    let build = git(&["rev-list", "--count", "HEAD"]).unwrap_or_else(|| "0".to_string());
    let git_hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "debug".to_string());
    let profile = if profile == "release" { "release" } else { "development" };

    println!("cargo:rustc-env=COVERLESS_VERSION={}", version);
    println!("cargo:rustc-env=COVERLESS_BUILD={}", build);
    println!("cargo:rustc-env=COVERLESS_PROFILE={}", profile);
    println!("cargo:rustc-env=COVERLESS_GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=PROFILE");
}
