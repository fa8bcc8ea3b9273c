use {
    crate::{display_json, from_str_json, serutil::ElementList, AssemblerError, Statement},
    derive_builder::Builder,
    serde::{
        de,
        de::{Deserializer, MapAccess, Visitor},
        ser::{SerializeMap, Serializer},
        Deserialize, Serialize,
    },
    std::{
        fmt::{Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// Policy language versions.
///
/// Variants are ordered oldest to newest; `None` (unset) sorts before every real version.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PolicyVersion {
    None,
    V2008_10_17,
    V2012_10_17,
}

impl PolicyVersion {
    /// The newest supported version. Unset versions resolve to this.
    #[inline]
    pub const fn latest() -> Self {
        Self::V2012_10_17
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    #[inline]
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Returns this version, or [PolicyVersion::latest] if unset.
    #[inline]
    pub fn or_latest(self) -> Self {
        match self {
            Self::None => Self::latest(),
            v => v,
        }
    }
}

impl Default for PolicyVersion {
    fn default() -> Self {
        Self::None
    }
}

impl Display for PolicyVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::None => Ok(()),
            Self::V2008_10_17 => f.write_str("2008-10-17"),
            Self::V2012_10_17 => f.write_str("2012-10-17"),
        }
    }
}

impl<'de> Deserialize<'de> for PolicyVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value.is_empty() {
            return Ok(Self::None);
        }

        match PolicyVersion::from_str(&value) {
            Ok(v) => Ok(v),
            Err(e) => Err(serde::de::Error::custom(e)),
        }
    }
}

impl FromStr for PolicyVersion {
    type Err = AssemblerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2008-10-17" => Ok(Self::V2008_10_17),
            "2012-10-17" => Ok(Self::V2012_10_17),
            _ => Err(AssemblerError::InvalidPolicyVersion(s.to_string())),
        }
    }
}

impl Serialize for PolicyVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// A policy document: the current document being assembled, or a parsed source or override document.
///
/// This does not directly derive Deserialize/Serialize so that `Statement` may be given as either a single map or a
/// list, and so that empty fields are left out of the rendered output.
#[derive(Builder, Clone, Debug, Default, Eq, PartialEq)]
pub struct PolicyDocument {
    /// The policy language version. Unset means the document did not say; it renders as the latest version.
    #[builder(setter(into), default)]
    pub(crate) version: PolicyVersion,

    /// An optional identifier for the policy.
    #[builder(setter(into, strip_option), default)]
    pub(crate) id: Option<String>,

    /// Statements in output order.
    #[builder(setter(into), default)]
    pub(crate) statement: Vec<Statement>,
}

impl PolicyDocument {
    #[inline]
    pub fn builder() -> PolicyDocumentBuilder {
        PolicyDocumentBuilder::default()
    }

    #[inline]
    pub fn version(&self) -> PolicyVersion {
        self.version
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the id only if it is set and non-empty.
    #[inline]
    pub(crate) fn non_empty_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    #[inline]
    pub fn statement(&self) -> &[Statement] {
        &self.statement
    }
}

display_json!(PolicyDocument);
from_str_json!(PolicyDocument);

impl<'de> Visitor<'de> for PolicyDocumentBuilder {
    type Value = PolicyDocument;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str("policy document")
    }

    fn visit_map<A: MapAccess<'de>>(mut self, mut access: A) -> Result<Self::Value, A::Error> {
        let builder = &mut self;
        let mut version_seen = false;
        let mut id_seen = false;
        let mut statement_seen = false;

        while let Some(key) = access.next_key::<String>()? {
            match key.as_str() {
                "Version" => {
                    if version_seen {
                        return Err(de::Error::duplicate_field("Version"));
                    }
                    version_seen = true;
                    builder.version(access.next_value::<PolicyVersion>()?);
                }
                "Id" => {
                    if id_seen {
                        return Err(de::Error::duplicate_field("Id"));
                    }
                    id_seen = true;
                    builder.id(access.next_value::<String>()?);
                }
                "Statement" => {
                    if statement_seen {
                        return Err(de::Error::duplicate_field("Statement"));
                    }
                    statement_seen = true;
                    builder.statement(access.next_value::<ElementList<Statement>>()?.into_vec());
                }
                _ => return Err(de::Error::unknown_field(&key, &["Version", "Id", "Statement"])),
            }
        }

        self.build().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for PolicyDocument {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<PolicyDocument, D::Error> {
        d.deserialize_map(PolicyDocumentBuilder::default())
    }
}

impl Serialize for PolicyDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(None)?;
        state.serialize_entry("Version", &self.version.or_latest())?;
        if let Some(id) = self.non_empty_id() {
            state.serialize_entry("Id", id)?;
        }
        if !self.statement.is_empty() {
            state.serialize_entry("Statement", &self.statement)?;
        }
        state.end()
    }
}
