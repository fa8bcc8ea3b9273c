use {
    crate::{AssemblerError, PolicyField, PolicyVersion, Statement},
    lazy_static::lazy_static,
    log::debug,
    regex::{NoExpand, Regex},
};

lazy_static! {
    /// The legacy policy-variable marker, written `&{...}` so it does not clash with `${...}` templating.
    static ref LEGACY_INTERPOLATION: Regex = Regex::new(r"&\{").unwrap();

    /// Version-gated syntax rules. Adding a policy language version is a matter of adding rows here.
    static ref VERSION_RULES: Vec<VersionRule> = vec![
        VersionRule {
            version: PolicyVersion::V2008_10_17,
            marker: &LEGACY_INTERPOLATION,
            action: RuleAction::Reject,
        },
        VersionRule {
            version: PolicyVersion::V2012_10_17,
            marker: &LEGACY_INTERPOLATION,
            action: RuleAction::Rewrite("${"),
        },
    ];
}

/// What to do with a value containing a rule's marker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RuleAction {
    /// The marker is not allowed in this version.
    Reject,

    /// Replace the marker with the given text.
    Rewrite(&'static str),
}

#[derive(Debug)]
struct VersionRule {
    version: PolicyVersion,
    marker: &'static Regex,
    action: RuleAction,
}

impl VersionRule {
    fn apply(&self, field: PolicyField, value: &str) -> Result<String, AssemblerError> {
        if !self.marker.is_match(value) {
            return Ok(value.to_string());
        }

        match self.action {
            RuleAction::Reject => {
                debug!("Rejecting {} value {:?} for policy version {}", field, value, self.version);
                Err(AssemblerError::UnsupportedVersionFeature {
                    field,
                    value: value.to_string(),
                    version: self.version,
                })
            }
            RuleAction::Rewrite(replacement) => Ok(self.marker.replace_all(value, NoExpand(replacement)).into_owned()),
        }
    }
}

/// Check a statement against the rules for `version`, returning the statement with any rewrites applied.
///
/// Condition values, principal and not-principal identifiers, resources, and not-resources are scanned. An unset
/// version is checked as the latest version.
pub(crate) fn apply_version_rules(statement: &Statement, version: PolicyVersion) -> Result<Statement, AssemblerError> {
    let version = version.or_latest();
    let rules: Vec<&VersionRule> = VERSION_RULES.iter().filter(|rule| rule.version == version).collect();

    if rules.is_empty() {
        return Ok(statement.clone());
    }

    statement.try_map_scanned(|field, value| {
        let mut result = value.to_string();
        for rule in rules.iter() {
            result = rule.apply(field, &result)?;
        }
        Ok(result)
    })
}
