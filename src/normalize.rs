use {
    crate::{serutil::StringList, Condition, Effect, Principal, Statement},
    derive_builder::Builder,
};

/// One `principals`/`not_principals` block as supplied by the caller: a principal type and a set of identifiers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrincipalInput {
    principal_type: String,
    identifiers: Vec<String>,
}

impl PrincipalInput {
    pub fn new<T, I, S>(principal_type: T, identifiers: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principal_type: principal_type.into(),
            identifiers: identifiers.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn principal_type(&self) -> &str {
        &self.principal_type
    }

    #[inline]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }
}

/// One `condition` block as supplied by the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConditionInput {
    test: String,
    variable: String,
    values: Vec<String>,
}

impl ConditionInput {
    pub fn new<T, V, I, S>(test: T, variable: V, values: I) -> Self
    where
        T: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            test: test.into(),
            variable: variable.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    #[inline]
    pub fn test(&self) -> &str {
        &self.test
    }

    #[inline]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    #[inline]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A statement description as supplied by the caller, before normalization.
///
/// Values are assumed to have passed the caller's own schema validation; nothing here is rejected.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
pub struct StatementInput {
    #[builder(setter(into, strip_option), default)]
    sid: Option<String>,

    #[builder(setter(into, strip_option), default)]
    effect: Option<Effect>,

    #[builder(setter(into, each(name = "action", into)), default)]
    actions: Vec<String>,

    #[builder(setter(into, each(name = "not_action", into)), default)]
    not_actions: Vec<String>,

    #[builder(setter(into, each(name = "resource", into)), default)]
    resources: Vec<String>,

    #[builder(setter(into, each(name = "not_resource", into)), default)]
    not_resources: Vec<String>,

    #[builder(setter(into, each(name = "principal")), default)]
    principals: Vec<PrincipalInput>,

    #[builder(setter(into, each(name = "not_principal")), default)]
    not_principals: Vec<PrincipalInput>,

    #[builder(setter(into, each(name = "condition")), default)]
    conditions: Vec<ConditionInput>,
}

impl StatementInput {
    #[inline]
    pub fn builder() -> StatementInputBuilder {
        StatementInputBuilder::default()
    }

    #[inline]
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    #[inline]
    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    #[inline]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    #[inline]
    pub fn not_actions(&self) -> &[String] {
        &self.not_actions
    }

    #[inline]
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    #[inline]
    pub fn not_resources(&self) -> &[String] {
        &self.not_resources
    }

    #[inline]
    pub fn principals(&self) -> &[PrincipalInput] {
        &self.principals
    }

    #[inline]
    pub fn not_principals(&self) -> &[PrincipalInput] {
        &self.not_principals
    }

    #[inline]
    pub fn conditions(&self) -> &[ConditionInput] {
        &self.conditions
    }

    /// Convert this description into a canonical [Statement].
    ///
    /// The effect defaults to `Allow` and a missing sid becomes the empty (unnamed) sid. Empty lists are dropped;
    /// one-element lists become scalars. Principal and condition blocks are folded as described on
    /// [Principal::from_inputs] and [Condition::from_inputs].
    pub fn normalize(&self) -> Statement {
        Statement {
            sid: self.sid.clone().unwrap_or_default(),
            effect: self.effect.unwrap_or_default(),
            action: non_empty(&self.actions),
            not_action: non_empty(&self.not_actions),
            resource: non_empty(&self.resources),
            not_resource: non_empty(&self.not_resources),
            principal: Principal::from_inputs(&self.principals),
            not_principal: Principal::from_inputs(&self.not_principals),
            condition: Condition::from_inputs(&self.conditions),
        }
    }
}

fn non_empty(values: &[String]) -> Option<StringList> {
    if values.is_empty() {
        None
    } else {
        Some(StringList::from(values.to_vec()))
    }
}
