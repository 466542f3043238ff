//! Build metadata baked in by `build.rs`.

use once_cell::sync::Lazy;

#[derive(Debug)]
struct BuildMeta {
    build_id: &'static str,
    build_time: &'static str,
    git_label: &'static str,
}

static META: Lazy<BuildMeta> = Lazy::new(|| BuildMeta {
    build_id: option_env!("CATALOG_BUILD_ID").unwrap_or("unknown build"),
    build_time: option_env!("CATALOG_BUILD_TIME").unwrap_or("unknown time"),
    git_label: option_env!("CATALOG_BUILD_GIT").unwrap_or("unknown git"),
});

/// Full build id, e.g. "2026-10-18 09:12:44 UTC | v0.1.0-3-gabc1234".
pub fn build_id() -> &'static str {
    META.build_id
}

pub fn build_timestamp() -> &'static str {
    META.build_time
}

/// Git tag/commit detected at build time.
pub fn git_label() -> &'static str {
    META.git_label
}

/// One-line banner for a binary.
pub fn formatted_banner(package: &str, version: &str) -> String {
    format!("{} {} | {}", package, version, build_id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_carries_package_version_and_build_id() {
        let banner = formatted_banner("catalog-check", "0.1.0");
        assert!(banner.starts_with("catalog-check 0.1.0 | "));
        assert!(banner.ends_with(build_id()));
        assert!(!build_timestamp().is_empty());
        assert!(!git_label().is_empty());
    }
}
