use serde::Serialize;

pub const DEFAULT_TIMEOUT_MS: u64 = 8_000;
pub const MIN_TIMEOUT_MS: u64 = 100;
pub const MAX_TIMEOUT_MS: u64 = 60_000;
pub const MAX_REDIRECTS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveLimits {
    pub timeout_ms: u64,
    pub max_redirects: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitSources {
    pub timeout_ms: &'static str, // "param" | "env" | "file" | "default"
    pub max_redirects: &'static str,
}

pub(crate) fn parse_u64(raw: Option<String>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok()
}

fn clamp(v: u64, min: u64, max: u64) -> u64 {
    if v < min {
        return min;
    }
    if v > max {
        return max;
    }
    v
}

/// Resolve HTTP limits for the catalog client.
/// - timeout_ms: from param → env(CATALOG_TIMEOUT_MS) → file → default(8000), clamped [100..60000]
/// - max_redirects: default 5
pub fn resolve_http_limits<F>(
    param_timeout_ms: Option<u64>,
    file_timeout_ms: Option<u64>,
    env: F,
) -> (EffectiveLimits, LimitSources)
where
    F: Fn(&str) -> Option<String>,
{
    let (timeout_ms, timeout_src) = if let Some(p) = param_timeout_ms {
        (clamp(p, MIN_TIMEOUT_MS, MAX_TIMEOUT_MS), "param")
    } else if let Some(envv) = parse_u64(env("CATALOG_TIMEOUT_MS")) {
        (clamp(envv, MIN_TIMEOUT_MS, MAX_TIMEOUT_MS), "env")
    } else if let Some(f) = file_timeout_ms {
        (clamp(f, MIN_TIMEOUT_MS, MAX_TIMEOUT_MS), "file")
    } else {
        (DEFAULT_TIMEOUT_MS, "default")
    };

    let effective = EffectiveLimits {
        timeout_ms,
        max_redirects: MAX_REDIRECTS,
    };
    let sources = LimitSources {
        timeout_ms: timeout_src,
        max_redirects: "default",
    };
    (effective, sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn param_wins_and_is_clamped() {
        let (limits, sources) =
            resolve_http_limits(Some(5), Some(3000), |_| Some("2000".to_string()));
        assert_eq!(limits.timeout_ms, MIN_TIMEOUT_MS);
        assert_eq!(sources.timeout_ms, "param");
    }

    #[test]
    fn env_then_file_then_default() {
        let (limits, sources) =
            resolve_http_limits(None, Some(3000), |_| Some("120000".to_string()));
        assert_eq!(limits.timeout_ms, MAX_TIMEOUT_MS);
        assert_eq!(sources.timeout_ms, "env");

        let (limits, sources) = resolve_http_limits(None, Some(3000), no_env);
        assert_eq!(limits.timeout_ms, 3000);
        assert_eq!(sources.timeout_ms, "file");

        let (limits, sources) = resolve_http_limits(None, None, no_env);
        assert_eq!(limits.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(sources.timeout_ms, "default");
    }

    #[test]
    fn garbage_env_falls_back_to_default() {
        let (limits, sources) = resolve_http_limits(None, None, |_| Some("soon".to_string()));
        assert_eq!(limits.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(sources.timeout_ms, "default");
    }
}
