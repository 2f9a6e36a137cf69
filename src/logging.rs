//! Logging setup
//!
//! Logs go to stderr so `--json` output on stdout stays machine-readable.

use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "dealerdash=warn";
const VERBOSE_FILTER: &str = "dealerdash=debug";

/// Initialize the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose, env.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// `RUST_LOG` (or the default) plus the crate debug directive when verbose
fn build_filter(verbose: bool, env: Option<&str>) -> EnvFilter {
    let filter = env
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    if !verbose {
        return filter;
    }
    match VERBOSE_FILTER.parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let filter = build_filter(false, None).to_string();
        assert_eq!(filter, DEFAULT_FILTER);
    }

    #[test]
    fn test_verbose_without_env() {
        let filter = build_filter(true, None).to_string();
        assert!(filter.contains(VERBOSE_FILTER), "filter: {}", filter);
    }

    #[test]
    fn test_verbose_adds_to_env_filter() {
        let filter = build_filter(true, Some("reqwest=info")).to_string();
        assert!(filter.contains("reqwest=info"), "filter: {}", filter);
        assert!(filter.contains(VERBOSE_FILTER), "filter: {}", filter);
    }

    #[test]
    fn test_env_filter_kept_when_not_verbose() {
        let filter = build_filter(false, Some("dealerdash=trace")).to_string();
        assert!(filter.contains("dealerdash=trace"), "filter: {}", filter);
        assert!(!filter.contains(VERBOSE_FILTER));
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let filter = build_filter(false, Some("dealerdash=loud")).to_string();
        assert_eq!(filter, DEFAULT_FILTER);
    }
}
