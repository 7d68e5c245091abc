//! Whether a call is logged, and with which masks.
//!
//! The decision is made once per call from the global [`LogMode`] and the
//! markers declared on the owner type and the operation. It has two outcomes
//! and no transitions.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::markers::{DeclaredMarkers, EnableLog, FieldPath, MaskRule};

/// Global default for calls without an explicit marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogMode {
    /// Log unless a disable marker is present.
    #[default]
    EnableByDefault,
    /// Log only if an enable marker is present.
    DisableByDefault,
}

/// Masks to apply to one logged call.
///
/// Built from owner-level then operation-level [`EnableLog`] markers: path
/// rules from the operation replace owner rules for the same path, format
/// names are unioned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectiveMaskConfig {
    pub request: BTreeMap<FieldPath, String>,
    pub response: BTreeMap<FieldPath, String>,
    pub formats: BTreeSet<String>,
}

impl EffectiveMaskConfig {
    /// Folds one marker into the configuration.
    pub fn merge(&mut self, enable: &EnableLog) {
        extend_rules(&mut self.request, &enable.request);
        extend_rules(&mut self.response, &enable.response);
        self.formats.extend(enable.formats.iter().cloned());
    }
}

fn extend_rules(target: &mut BTreeMap<FieldPath, String>, rules: &[MaskRule]) {
    for rule in rules {
        target.insert(rule.path.clone(), rule.format.clone());
    }
}

/// Outcome of [`decide`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Log(EffectiveMaskConfig),
    Skip,
}

/// Decides whether a call is logged.
///
/// Under [`LogMode::EnableByDefault`] only a disable marker (operation or
/// owner) skips the call. Under [`LogMode::DisableByDefault`] only an enable
/// marker logs it. Mask configuration is assembled only for logged calls.
#[must_use]
pub fn decide(mode: LogMode, markers: DeclaredMarkers<'_>) -> Decision {
    let scopes = [markers.class, markers.method];
    let should_log = match mode {
        LogMode::EnableByDefault => !scopes.iter().flatten().any(|scope| scope.disable),
        LogMode::DisableByDefault => scopes.iter().flatten().any(|scope| scope.enable.is_some()),
    };
    if !should_log {
        return Decision::Skip;
    }

    let mut config = EffectiveMaskConfig::default();
    for enable in scopes.iter().flatten().filter_map(|scope| scope.enable.as_ref()) {
        config.merge(enable);
    }
    Decision::Log(config)
}

#[cfg(test)]
mod tests {
    use super::{decide, Decision, LogMode};
    use crate::markers::{DeclaredMarkers, EnableLog, FieldPath, ScopeMarkers};

    fn enabled(request: &[&str], formats: &[&str]) -> ScopeMarkers {
        ScopeMarkers::enabled(EnableLog::from_declarations(request, &[], formats).unwrap())
    }

    fn markers<'a>(
        class: Option<&'a ScopeMarkers>,
        method: Option<&'a ScopeMarkers>,
    ) -> DeclaredMarkers<'a> {
        DeclaredMarkers { class, method }
    }

    #[test]
    fn enable_by_default_logs_without_markers() {
        assert_eq!(
            decide(LogMode::EnableByDefault, markers(None, None)),
            Decision::Log(Default::default())
        );
    }

    #[test]
    fn enable_by_default_skips_on_either_disable() {
        let disabled = ScopeMarkers::disabled();
        assert_eq!(
            decide(LogMode::EnableByDefault, markers(Some(&disabled), None)),
            Decision::Skip
        );
        assert_eq!(
            decide(LogMode::EnableByDefault, markers(None, Some(&disabled))),
            Decision::Skip
        );
    }

    #[test]
    fn disable_on_class_wins_over_enable_on_method() {
        let disabled = ScopeMarkers::disabled();
        let method = enabled(&[], &[]);
        assert_eq!(
            decide(LogMode::EnableByDefault, markers(Some(&disabled), Some(&method))),
            Decision::Skip
        );
    }

    #[test]
    fn disable_by_default_skips_without_markers() {
        assert_eq!(
            decide(LogMode::DisableByDefault, markers(None, None)),
            Decision::Skip
        );
        let disabled = ScopeMarkers::disabled();
        assert_eq!(
            decide(LogMode::DisableByDefault, markers(Some(&disabled), None)),
            Decision::Skip
        );
    }

    #[test]
    fn disable_by_default_logs_on_either_enable() {
        let scope = enabled(&[], &[]);
        assert!(matches!(
            decide(LogMode::DisableByDefault, markers(Some(&scope), None)),
            Decision::Log(_)
        ));
        assert!(matches!(
            decide(LogMode::DisableByDefault, markers(None, Some(&scope))),
            Decision::Log(_)
        ));
    }

    #[test]
    fn method_rules_override_class_rules_and_formats_union() {
        let class = enabled(&["user.password=default", "user.pin=default"], &["email"]);
        let method = enabled(&["user.password=secret"], &["mobile"]);

        let Decision::Log(config) =
            decide(LogMode::EnableByDefault, markers(Some(&class), Some(&method)))
        else {
            panic!("expected the call to be logged");
        };

        let password = FieldPath::parse("user.password").unwrap();
        let pin = FieldPath::parse("user.pin").unwrap();
        assert_eq!(config.request[&password], "secret");
        assert_eq!(config.request[&pin], "default");
        assert!(config.response.is_empty());
        assert_eq!(
            config.formats.iter().collect::<Vec<_>>(),
            ["email", "mobile"]
        );
    }

    #[test]
    fn mode_deserializes_from_kebab_case() {
        let mode: LogMode = serde_json::from_str("\"disable-by-default\"").unwrap();
        assert_eq!(mode, LogMode::DisableByDefault);
    }
}
