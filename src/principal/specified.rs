use {
    crate::{display_json, serutil::StringList},
    serde::{
        de::{Deserializer, MapAccess, Visitor},
        ser::{SerializeMap, Serializer},
        Deserialize, Serialize,
    },
    std::{
        collections::{btree_map::Iter, BTreeMap},
        fmt::{Formatter, Result as FmtResult},
    },
};

/// A principal given as a map of principal types (`AWS`, `Service`, `Federated`, `CanonicalUser`, ...) to one or more
/// identifiers.
///
/// Types are kept in sorted order so rendering is deterministic.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SpecifiedPrincipal {
    map: BTreeMap<String, StringList>,
}

display_json!(SpecifiedPrincipal);

impl SpecifiedPrincipal {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, principal_type: &str) -> Option<&StringList> {
        self.map.get(principal_type)
    }

    #[inline]
    pub fn insert<T: Into<String>, I: Into<StringList>>(&mut self, principal_type: T, identifiers: I) {
        self.map.insert(principal_type.into(), identifiers.into());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, String, StringList> {
        self.map.iter()
    }

    /// Rewrite every identifier with `f`, keeping the principal types intact.
    pub fn try_map_identifiers<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        let mut map = BTreeMap::new();
        for (principal_type, identifiers) in self.map.iter() {
            map.insert(principal_type.clone(), identifiers.try_map(&mut f)?);
        }

        Ok(Self {
            map,
        })
    }
}

impl FromIterator<(String, StringList)> for SpecifiedPrincipal {
    fn from_iter<T: IntoIterator<Item = (String, StringList)>>(iter: T) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

struct SpecifiedPrincipalVisitor;

impl<'de> Visitor<'de> for SpecifiedPrincipalVisitor {
    type Value = SpecifiedPrincipal;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("map of principal types to identifiers")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = BTreeMap::new();

        while let Some(principal_type) = access.next_key::<String>()? {
            if map.contains_key(&principal_type) {
                return Err(serde::de::Error::custom(format!("duplicate principal type `{}`", principal_type)));
            }

            let identifiers = access.next_value::<StringList>()?;
            map.insert(principal_type, identifiers);
        }

        Ok(SpecifiedPrincipal {
            map,
        })
    }
}

impl<'de> Deserialize<'de> for SpecifiedPrincipal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SpecifiedPrincipalVisitor)
    }
}

impl Serialize for SpecifiedPrincipal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(self.map.len()))?;
        for (principal_type, identifiers) in self.map.iter() {
            state.serialize_entry(principal_type, identifiers)?;
        }
        state.end()
    }
}
