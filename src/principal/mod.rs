mod specified;

pub use specified::SpecifiedPrincipal;

use {
    crate::{display_json, serutil::StringList, PrincipalInput},
    log::debug,
    serde::{
        de::{self, value::MapAccessDeserializer, Deserializer, MapAccess, Unexpected, Visitor},
        ser::Serializer,
        Deserialize, Serialize,
    },
    std::{
        collections::{BTreeMap, BTreeSet},
        fmt::{Formatter, Result as FmtResult},
    },
};

/// The wildcard principal type and identifier.
const WILDCARD: &str = "*";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Principal {
    Any,
    Specified(SpecifiedPrincipal),
}

impl Principal {
    /// Fold principal blocks into a single principal.
    ///
    /// Blocks sharing a type are merged under one key. Identifiers are deduplicated and sorted. If the result is a
    /// lone `"*"` type whose only identifier is `"*"`, it collapses to [Principal::Any]. Types without identifiers are
    /// dropped. Returns `None` if no identifiers remain.
    pub fn from_inputs(inputs: &[PrincipalInput]) -> Option<Self> {
        let mut by_type: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for input in inputs {
            let identifiers = by_type.entry(input.principal_type()).or_default();
            identifiers.extend(input.identifiers().iter().map(String::as_str));
        }

        by_type.retain(|_, identifiers| !identifiers.is_empty());
        if by_type.is_empty() {
            return None;
        }

        if by_type.len() == 1 {
            if let Some(identifiers) = by_type.get(WILDCARD) {
                if identifiers.len() == 1 && identifiers.contains(WILDCARD) {
                    return Some(Self::Any);
                }
            }
        }

        Some(Self::Specified(
            by_type
                .into_iter()
                .map(|(principal_type, identifiers)| {
                    let identifiers: Vec<String> = identifiers.into_iter().map(str::to_string).collect();
                    (principal_type.to_string(), StringList::from(identifiers))
                })
                .collect(),
        ))
    }

    #[inline]
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Rewrite every identifier with `f`. [Principal::Any] is returned unchanged.
    pub fn try_map_identifiers<E, F>(&self, f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        match self {
            Self::Any => Ok(Self::Any),
            Self::Specified(specified) => Ok(Self::Specified(specified.try_map_identifiers(f)?)),
        }
    }
}

impl From<SpecifiedPrincipal> for Principal {
    fn from(sp: SpecifiedPrincipal) -> Self {
        Self::Specified(sp)
    }
}

struct PrincipalVisitor {}

impl<'de> Visitor<'de> for PrincipalVisitor {
    type Value = Principal;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "map of principal types to values or \"*\"")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if v == WILDCARD {
            Ok(Principal::Any)
        } else {
            Err(E::invalid_value(Unexpected::Str(v), &self))
        }
    }

    fn visit_map<A>(self, access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let deserializer = MapAccessDeserializer::new(access);
        match SpecifiedPrincipal::deserialize(deserializer) {
            Ok(pm) => Ok(Principal::Specified(pm)),
            Err(e) => {
                debug!("Failed to deserialize principal: {:?}", e);
                Err(e)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PrincipalVisitor {})
    }
}

impl Serialize for Principal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Any => serializer.serialize_str(WILDCARD),
            Self::Specified(specified) => specified.serialize(serializer),
        }
    }
}

display_json!(Principal);
