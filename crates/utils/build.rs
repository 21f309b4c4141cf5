use std::process::Command;

fn main() {
    // Docker builds pass these in; local builds ask git.
    let commit = std::env::var("TASKBOARD_GIT_COMMIT")
        .ok()
        .filter(|s| !s.is_empty() && s != "unknown")
        .or_else(|| git_output(&["rev-parse", "--short", "HEAD"]));

    if let Some(commit) = commit {
        println!("cargo:rustc-env=TASKBOARD_GIT_COMMIT={}", commit);
    }

    let branch = std::env::var("TASKBOARD_GIT_BRANCH")
        .ok()
        .filter(|s| !s.is_empty() && s != "unknown")
        .or_else(|| git_output(&["rev-parse", "--abbrev-ref", "HEAD"]));

    if let Some(branch) = branch {
        println!("cargo:rustc-env=TASKBOARD_GIT_BRANCH={}", branch);
    }

    // Build timestamp (ISO 8601 format)
    let timestamp = Command::new("date")
        .args(["-u", "+%Y-%m-%dT%H:%M:%SZ"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string());

    if let Some(timestamp) = timestamp {
        println!("cargo:rustc-env=TASKBOARD_BUILD_TIMESTAMP={}", timestamp);
    }

    println!("cargo:rerun-if-env-changed=TASKBOARD_GIT_COMMIT");
    println!("cargo:rerun-if-env-changed=TASKBOARD_GIT_BRANCH");
}

fn git_output(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}
