//! Declared logging markers and their static registry.
//!
//! Markers say whether an owner type or one of its operations opts in to or
//! out of logging, and which fields to mask when it is logged. They are
//! declared once at startup, either with `#[derive(LogTarget)]` or by building
//! [`TargetMarkers`] by hand, and collected in a [`MarkerRegistry`].

use std::{collections::HashMap, fmt, str::FromStr};

use crate::{error::RuleError, masking::DEFAULT_FORMAT};

/// A dotted field path, split into its segments.
///
/// Always holds at least one segment and no segment is empty.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parses `"user.password"` into `["user", "password"]`.
    pub fn parse(dotted: &str) -> Result<Self, RuleError> {
        if dotted.is_empty() {
            return Err(RuleError::EmptyPath);
        }
        let segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(RuleError::EmptySegment {
                rule: dotted.to_string(),
            });
        }
        Ok(Self(segments))
    }

    /// Builds a path from segments that were validated at compile time.
    #[doc(hidden)]
    pub fn from_segments(segments: &[&str]) -> Self {
        Self(segments.iter().map(|segment| (*segment).to_string()).collect())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// One `path=format` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskRule {
    pub path: FieldPath,
    pub format: String,
}

impl MaskRule {
    #[must_use]
    pub fn new(path: FieldPath, format: impl Into<String>) -> Self {
        Self {
            path,
            format: format.into(),
        }
    }

    /// Builds a rule from parts that were validated at compile time.
    #[doc(hidden)]
    pub fn from_parts(segments: &[&str], format: &str) -> Self {
        Self::new(FieldPath::from_segments(segments), format)
    }

    /// Parses `"user.password=default"`.
    ///
    /// The declaration splits at the first `=`. Without one the rule uses the
    /// `default` format.
    pub fn parse(declaration: &str) -> Result<Self, RuleError> {
        match declaration.split_once('=') {
            Some((path, format)) => {
                if format.is_empty() {
                    return Err(RuleError::EmptyFormat {
                        rule: declaration.to_string(),
                    });
                }
                Ok(Self::new(FieldPath::parse(path)?, format))
            }
            None => Ok(Self::new(FieldPath::parse(declaration)?, DEFAULT_FORMAT)),
        }
    }
}

impl FromStr for MaskRule {
    type Err = RuleError;

    fn from_str(declaration: &str) -> Result<Self, Self::Err> {
        Self::parse(declaration)
    }
}

/// Opt-in marker, with the masks to apply when the call is logged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnableLog {
    /// Path rules applied to every argument.
    pub request: Vec<MaskRule>,
    /// Path rules applied to the result.
    pub response: Vec<MaskRule>,
    /// Formats detected anywhere in arguments and result.
    pub formats: Vec<String>,
}

impl EnableLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the three declaration lists in one go.
    pub fn from_declarations(
        request: &[&str],
        response: &[&str],
        formats: &[&str],
    ) -> Result<Self, RuleError> {
        Ok(Self {
            request: parse_rules(request)?,
            response: parse_rules(response)?,
            formats: formats.iter().map(|name| (*name).to_string()).collect(),
        })
    }

    #[must_use]
    pub fn with_request(mut self, rule: MaskRule) -> Self {
        self.request.push(rule);
        self
    }

    #[must_use]
    pub fn with_response(mut self, rule: MaskRule) -> Self {
        self.response.push(rule);
        self
    }

    #[must_use]
    pub fn with_format(mut self, name: impl Into<String>) -> Self {
        self.formats.push(name.into());
        self
    }
}

fn parse_rules(declarations: &[&str]) -> Result<Vec<MaskRule>, RuleError> {
    declarations.iter().map(|rule| MaskRule::parse(rule)).collect()
}

/// Markers attached to one scope: an owner type or a single operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeMarkers {
    pub enable: Option<EnableLog>,
    pub disable: bool,
}

impl ScopeMarkers {
    #[must_use]
    pub fn enabled(enable: EnableLog) -> Self {
        Self {
            enable: Some(enable),
            disable: false,
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enable: None,
            disable: true,
        }
    }
}

/// Everything declared for one owner type.
#[derive(Clone, Debug, Default)]
pub struct TargetMarkers {
    scope: ScopeMarkers,
    operations: HashMap<String, ScopeMarkers>,
}

impl TargetMarkers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the owner-level markers.
    #[must_use]
    pub fn with_scope(mut self, scope: ScopeMarkers) -> Self {
        self.scope = scope;
        self
    }

    /// Sets the markers of the operation called `name`.
    #[must_use]
    pub fn with_operation(mut self, name: impl Into<String>, markers: ScopeMarkers) -> Self {
        self.operations.insert(name.into(), markers);
        self
    }

    #[must_use]
    pub fn scope(&self) -> &ScopeMarkers {
        &self.scope
    }

    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&ScopeMarkers> {
        self.operations.get(name)
    }
}

/// A type whose operations can be intercepted, with its declared markers.
///
/// Usually derived:
///
/// ```rust
/// use logmask::LogTarget;
///
/// #[derive(LogTarget)]
/// #[enable_log(request("user.password"), formats("email"))]
/// #[log_operation(name = "health", disable_log)]
/// struct AccountService;
///
/// assert!(AccountService::owner().ends_with("::AccountService"));
/// assert!(AccountService::markers().operation("health").unwrap().disable);
/// ```
pub trait LogTarget {
    /// Fully-qualified path of the type, `module::path::Type`.
    fn owner() -> &'static str;

    /// Markers declared on the type and its operations.
    fn markers() -> TargetMarkers;
}

/// Markers found for one call. Either level may be absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclaredMarkers<'a> {
    pub class: Option<&'a ScopeMarkers>,
    pub method: Option<&'a ScopeMarkers>,
}

/// Owner path to declared markers, built at startup.
#[derive(Clone, Debug, Default)]
pub struct MarkerRegistry {
    targets: HashMap<String, TargetMarkers>,
}

impl MarkerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the markers `T` declares under `T::owner()`.
    pub fn register<T: LogTarget>(&mut self) -> &mut Self {
        self.insert(T::owner(), T::markers())
    }

    /// Registers markers for an owner path, replacing earlier ones.
    pub fn insert(&mut self, owner: impl Into<String>, markers: TargetMarkers) -> &mut Self {
        self.targets.insert(owner.into(), markers);
        self
    }

    #[must_use]
    pub fn lookup(&self, owner: &str, operation: &str) -> DeclaredMarkers<'_> {
        match self.targets.get(owner) {
            Some(target) => DeclaredMarkers {
                class: Some(target.scope()),
                method: target.operation(operation),
            },
            None => DeclaredMarkers::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EnableLog, FieldPath, MarkerRegistry, MaskRule, ScopeMarkers, TargetMarkers,
    };
    use crate::error::RuleError;

    #[test]
    fn field_path_splits_on_dots() {
        let path = FieldPath::parse("user.address.city").unwrap();
        assert_eq!(path.segments(), ["user", "address", "city"]);
        assert_eq!(path.to_string(), "user.address.city");
    }

    #[test]
    fn field_path_rejects_empty_segments() {
        assert_eq!(FieldPath::parse(""), Err(RuleError::EmptyPath));
        assert!(matches!(
            FieldPath::parse("user..password"),
            Err(RuleError::EmptySegment { .. })
        ));
        assert!(matches!(
            FieldPath::parse(".password"),
            Err(RuleError::EmptySegment { .. })
        ));
    }

    #[test]
    fn rule_without_format_uses_default() {
        let rule = MaskRule::parse("user.password").unwrap();
        assert_eq!(rule.path.segments(), ["user", "password"]);
        assert_eq!(rule.format, "default");
    }

    #[test]
    fn rule_splits_at_first_equals() {
        let rule: MaskRule = "token=custom=v2".parse().unwrap();
        assert_eq!(rule.path.segments(), ["token"]);
        assert_eq!(rule.format, "custom=v2");
    }

    #[test]
    fn rule_rejects_empty_format() {
        assert!(matches!(
            MaskRule::parse("user.password="),
            Err(RuleError::EmptyFormat { .. })
        ));
    }

    #[test]
    fn declarations_parse_all_lists() {
        let enable = EnableLog::from_declarations(
            &["user.password=default"],
            &["account.cardNumber=creditCard"],
            &["email", "mobile"],
        )
        .unwrap();
        assert_eq!(enable.request, [MaskRule::from_parts(&["user", "password"], "default")]);
        assert_eq!(
            enable.response,
            [MaskRule::from_parts(&["account", "cardNumber"], "creditCard")]
        );
        assert_eq!(enable.formats, ["email", "mobile"]);
    }

    #[test]
    fn declarations_report_first_bad_rule() {
        let err = EnableLog::from_declarations(&["ok", "bad..path"], &[], &[]).unwrap_err();
        assert_eq!(
            err,
            RuleError::EmptySegment {
                rule: "bad..path".to_string()
            }
        );
    }

    #[test]
    fn lookup_returns_class_and_method_markers() {
        let mut registry = MarkerRegistry::new();
        registry.insert(
            "app::Service",
            TargetMarkers::new()
                .with_scope(ScopeMarkers::enabled(EnableLog::new()))
                .with_operation("health", ScopeMarkers::disabled()),
        );

        let found = registry.lookup("app::Service", "health");
        assert!(found.class.unwrap().enable.is_some());
        assert!(found.method.unwrap().disable);

        let found = registry.lookup("app::Service", "other");
        assert!(found.class.is_some());
        assert!(found.method.is_none());
    }

    #[test]
    fn lookup_of_unknown_owner_finds_nothing() {
        let registry = MarkerRegistry::new();
        let found = registry.lookup("app::Unknown", "run");
        assert!(found.class.is_none());
        assert!(found.method.is_none());
    }
}
