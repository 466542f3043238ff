use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

use chrono::Utc;

fn main() {
    println!("cargo:rerun-if-env-changed=CATALOG_BUILD_ID_OVERRIDE");
    println!("cargo:rerun-if-changed=.git/HEAD");

    if let Some(path) = git_head_path() {
        println!("cargo:rerun-if-changed={}", path);
    }

    let build_time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let git_label = git_describe().unwrap_or_else(|| "unknown".to_string());
    let build_id = env::var("CATALOG_BUILD_ID_OVERRIDE")
        .ok()
        .unwrap_or_else(|| format!("{} | {}", build_time, git_label));

    println!("cargo:rustc-env=CATALOG_BUILD_ID={}", build_id);
    println!("cargo:rustc-env=CATALOG_BUILD_TIME={}", build_time);
    println!("cargo:rustc-env=CATALOG_BUILD_GIT={}", git_label);
}

fn git_head_path() -> Option<String> {
    let head = Path::new(".git/HEAD");
    let head_ref = fs::read_to_string(head).ok()?;
    match head_ref.strip_prefix("ref: ") {
        Some(path) if Path::new(".git").join(path.trim()).exists() => {
            Some(format!(".git/{}", path.trim()))
        }
        _ => Some(head.display().to_string()),
    }
}

fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--dirty", "--always"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let label = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!label.is_empty()).then_some(label)
}
