//! Runtime configuration of the interception layer.

/// Enables lifecycle logging (proxy creation, interface upgrades, destruction).
pub const VERBOSE_LOG_ENV: &str = "AERO_INTERCEPT_VERBOSE_LOG";
/// Turns every proxy into a plain pass-through that never consults the event registry.
pub const DISABLE_EVENTS_ENV: &str = "AERO_INTERCEPT_DISABLE_EVENTS";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterceptConfig {
    pub verbose_log: bool,
    pub dispatch_events: bool,
}

impl Default for InterceptConfig {
    fn default() -> Self {
        Self {
            verbose_log: false,
            dispatch_events: true,
        }
    }
}

impl InterceptConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let truthy = |name: &str| lookup(name).is_some_and(|raw| is_truthy(&raw));
        Self {
            verbose_log: truthy(VERBOSE_LOG_ENV),
            dispatch_events: !truthy(DISABLE_EVENTS_ENV),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    let v = raw.trim();
    v == "1"
        || v.eq_ignore_ascii_case("true")
        || v.eq_ignore_ascii_case("yes")
        || v.eq_ignore_ascii_case("on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> InterceptConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        InterceptConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn unset_environment_gives_defaults() {
        assert_eq!(config_from(&[]), InterceptConfig::default());
    }

    #[test]
    fn truthy_values_are_case_insensitive() {
        for raw in ["1", "true", "YES", " On "] {
            let cfg = config_from(&[(VERBOSE_LOG_ENV, raw), (DISABLE_EVENTS_ENV, raw)]);
            assert!(cfg.verbose_log, "{raw:?}");
            assert!(!cfg.dispatch_events, "{raw:?}");
        }
        let cfg = config_from(&[(DISABLE_EVENTS_ENV, "0")]);
        assert!(cfg.dispatch_events);
    }
}
