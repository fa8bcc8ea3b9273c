use {
    crate::{display_json, from_str_json, serutil::StringList, Condition, Effect, PolicyField, Principal},
    derive_builder::Builder,
    serde::{
        de::{self, Deserializer, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::fmt::{Formatter, Result as FmtResult},
};

const STATEMENT_FIELDS: &[&str] =
    &["Sid", "Effect", "Action", "NotAction", "Resource", "NotResource", "Principal", "NotPrincipal", "Condition"];

/// A canonical statement, either normalized from a [StatementInput][crate::StatementInput] or parsed from a source or
/// override document.
///
/// An empty `sid` marks an unnamed statement. Unnamed statements never collide with each other and are never replaced
/// by an override.
#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[builder(setter(into), default)]
    pub(crate) sid: String,

    #[builder(default)]
    pub(crate) effect: Effect,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) action: Option<StringList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) not_action: Option<StringList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) resource: Option<StringList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) not_resource: Option<StringList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) principal: Option<Principal>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) not_principal: Option<Principal>,

    #[builder(setter(into, strip_option), default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) condition: Option<Condition>,
}

impl Statement {
    pub fn builder() -> StatementBuilder {
        StatementBuilder::default()
    }

    #[inline]
    pub fn sid(&self) -> &str {
        &self.sid
    }

    #[inline]
    pub fn has_sid(&self) -> bool {
        !self.sid.is_empty()
    }

    #[inline]
    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    #[inline]
    pub fn action(&self) -> Option<&StringList> {
        self.action.as_ref()
    }

    #[inline]
    pub fn not_action(&self) -> Option<&StringList> {
        self.not_action.as_ref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&StringList> {
        self.resource.as_ref()
    }

    #[inline]
    pub fn not_resource(&self) -> Option<&StringList> {
        self.not_resource.as_ref()
    }

    #[inline]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    #[inline]
    pub fn not_principal(&self) -> Option<&Principal> {
        self.not_principal.as_ref()
    }

    #[inline]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Rewrite every value in the fields that may carry policy variables, in the order: condition values, principal
    /// identifiers, not-principal identifiers, resources, not-resources. Actions and the sid are left untouched.
    ///
    /// `f` receives the field being scanned along with each value. The first error it returns stops the scan.
    pub(crate) fn try_map_scanned<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(PolicyField, &str) -> Result<String, E>,
    {
        let condition = match &self.condition {
            Some(c) => Some(c.try_map_values(|v| f(PolicyField::ConditionValue, v))?),
            None => None,
        };

        let principal = match &self.principal {
            Some(p) => Some(p.try_map_identifiers(|v| f(PolicyField::PrincipalIdentifier, v))?),
            None => None,
        };

        let not_principal = match &self.not_principal {
            Some(p) => Some(p.try_map_identifiers(|v| f(PolicyField::NotPrincipalIdentifier, v))?),
            None => None,
        };

        let resource = match &self.resource {
            Some(r) => Some(r.try_map(|v| f(PolicyField::Resource, v))?),
            None => None,
        };

        let not_resource = match &self.not_resource {
            Some(r) => Some(r.try_map(|v| f(PolicyField::NotResource, v))?),
            None => None,
        };

        Ok(Self {
            sid: self.sid.clone(),
            effect: self.effect,
            action: self.action.clone(),
            not_action: self.not_action.clone(),
            resource,
            not_resource,
            principal,
            not_principal,
            condition,
        })
    }
}

display_json!(Statement);
from_str_json!(Statement);

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StatementVisitor {})
    }
}

/// An empty list in a parsed document is treated the same as an absent field.
fn non_empty(list: StringList) -> Option<StringList> {
    if list.is_empty() {
        None
    } else {
        Some(list)
    }
}

struct StatementVisitor;
impl<'de> Visitor<'de> for StatementVisitor {
    type Value = Statement;

    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("a map of statement properties")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Statement, A::Error> {
        let mut builder = Statement::builder();
        let mut sid_seen = false;
        let mut effect_seen = false;
        let mut action_seen = false;
        let mut not_action_seen = false;
        let mut resource_seen = false;
        let mut not_resource_seen = false;
        let mut principal_seen = false;
        let mut not_principal_seen = false;
        let mut condition_seen = false;

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "Sid" => {
                    if sid_seen {
                        return Err(de::Error::duplicate_field("Sid"));
                    }

                    sid_seen = true;
                    builder.sid(access.next_value::<String>()?);
                }
                "Effect" => {
                    if effect_seen {
                        return Err(de::Error::duplicate_field("Effect"));
                    }

                    effect_seen = true;
                    builder.effect(access.next_value::<Effect>()?);
                }
                "Action" => {
                    if action_seen {
                        return Err(de::Error::duplicate_field("Action"));
                    }

                    action_seen = true;
                    if let Some(action) = non_empty(access.next_value::<StringList>()?) {
                        builder.action(action);
                    }
                }
                "NotAction" => {
                    if not_action_seen {
                        return Err(de::Error::duplicate_field("NotAction"));
                    }

                    not_action_seen = true;
                    if let Some(not_action) = non_empty(access.next_value::<StringList>()?) {
                        builder.not_action(not_action);
                    }
                }
                "Resource" => {
                    if resource_seen {
                        return Err(de::Error::duplicate_field("Resource"));
                    }

                    resource_seen = true;
                    if let Some(resource) = non_empty(access.next_value::<StringList>()?) {
                        builder.resource(resource);
                    }
                }
                "NotResource" => {
                    if not_resource_seen {
                        return Err(de::Error::duplicate_field("NotResource"));
                    }

                    not_resource_seen = true;
                    if let Some(not_resource) = non_empty(access.next_value::<StringList>()?) {
                        builder.not_resource(not_resource);
                    }
                }
                "Principal" => {
                    if principal_seen {
                        return Err(de::Error::duplicate_field("Principal"));
                    }

                    principal_seen = true;
                    builder.principal(access.next_value::<Principal>()?);
                }
                "NotPrincipal" => {
                    if not_principal_seen {
                        return Err(de::Error::duplicate_field("NotPrincipal"));
                    }

                    not_principal_seen = true;
                    builder.not_principal(access.next_value::<Principal>()?);
                }
                "Condition" => {
                    if condition_seen {
                        return Err(de::Error::duplicate_field("Condition"));
                    }

                    condition_seen = true;
                    let condition = access.next_value::<Condition>()?;
                    if !condition.is_empty() {
                        builder.condition(condition);
                    }
                }
                _ => {
                    log::debug!("Rejecting unknown statement field {}", key);
                    return Err(de::Error::unknown_field(&key, STATEMENT_FIELDS));
                }
            }
        }

        builder.build().map_err(de::Error::custom)
    }
}
