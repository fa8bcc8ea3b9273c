use {
    crate::{display_json, from_str_json, serutil::StringList, ConditionInput},
    serde::{
        de::{self, Deserializer, MapAccess, SeqAccess, Visitor},
        ser::Serializer,
        Deserialize, Serialize,
    },
    std::{
        collections::{btree_map::Iter, BTreeMap},
        fmt::{Formatter, Result as FmtResult},
    },
};

/// Condition keys (variables) mapped to the values they are tested against.
pub type ConditionMap = BTreeMap<String, StringList>;

/// A statement's `Condition` block: condition operators (tests) mapped to their [ConditionMap].
///
/// Operators are not interpreted here; any test name a caller supplies is carried through as-is.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Condition {
    map: BTreeMap<String, ConditionMap>,
}

display_json!(Condition);
from_str_json!(Condition);

impl Condition {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold condition blocks into a single condition.
    ///
    /// Blocks with the same test share one operator map; blocks with the same test and variable have their values
    /// appended in input order. Returns `None` if there are no blocks.
    pub fn from_inputs(inputs: &[ConditionInput]) -> Option<Self> {
        if inputs.is_empty() {
            return None;
        }

        let mut result = Self::new();
        for input in inputs {
            result.add(input.test(), input.variable(), input.values().iter().cloned());
        }

        Some(result)
    }

    /// Add values for `test` and `variable`, appending to any values already present.
    pub fn add<I: IntoIterator<Item = String>>(&mut self, test: &str, variable: &str, values: I) {
        let cmap = self.map.entry(test.to_string()).or_default();
        match cmap.get_mut(variable) {
            Some(existing) => existing.extend(values),
            None => {
                cmap.insert(variable.to_string(), StringList::from(values.into_iter().collect::<Vec<_>>()));
            }
        }
    }

    #[inline]
    pub fn get(&self, test: &str) -> Option<&ConditionMap> {
        self.map.get(test)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, String, ConditionMap> {
        self.map.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Rewrite every condition value with `f`, keeping tests and variables intact.
    pub fn try_map_values<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        let mut map = BTreeMap::new();
        for (test, cmap) in self.map.iter() {
            let mut new_cmap = ConditionMap::new();
            for (variable, values) in cmap.iter() {
                new_cmap.insert(variable.clone(), values.try_map(&mut f)?);
            }
            map.insert(test.clone(), new_cmap);
        }

        Ok(Self {
            map,
        })
    }
}

/// A single condition value in a parsed document. Strings, booleans, and numbers are all kept in their string form.
struct ConditionScalar(String);

struct ConditionScalarVisitor;

impl<'de> Visitor<'de> for ConditionScalarVisitor {
    type Value = ConditionScalar;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("condition value")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ConditionScalar(v.to_string()))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ConditionScalar(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ConditionScalar(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(ConditionScalar(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ConditionScalar(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for ConditionScalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConditionScalarVisitor)
    }
}

/// One condition value or a list of them.
struct ConditionValues(StringList);

struct ConditionValuesVisitor;

impl<'de> Visitor<'de> for ConditionValuesVisitor {
    type Value = ConditionValues;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("condition value or list of condition values")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ConditionValues(StringList::from(v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ConditionValues(StringList::from(v.to_string())))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ConditionValues(StringList::from(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(ConditionValues(StringList::from(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ConditionValues(StringList::from(v.to_string())))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result = Vec::with_capacity(access.size_hint().unwrap_or(0));

        while let Some(ConditionScalar(value)) = access.next_element::<ConditionScalar>()? {
            result.push(value);
        }

        Ok(ConditionValues(StringList::from(result)))
    }
}

impl<'de> Deserialize<'de> for ConditionValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConditionValuesVisitor)
    }
}

struct ConditionMapVisitor;

impl<'de> Visitor<'de> for ConditionMapVisitor {
    type Value = ConditionMap;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("map of condition keys to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut cmap = ConditionMap::new();
        while let Some(variable) = access.next_key::<String>()? {
            if cmap.contains_key(&variable) {
                return Err(de::Error::custom(format!("duplicate condition key `{}`", variable)));
            }

            let ConditionValues(values) = access.next_value::<ConditionValues>()?;
            cmap.insert(variable, values);
        }

        Ok(cmap)
    }
}

struct ConditionMapSeed;

impl<'de> de::DeserializeSeed<'de> for ConditionMapSeed {
    type Value = ConditionMap;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_map(ConditionMapVisitor)
    }
}

struct ConditionVisitor;

impl<'de> Visitor<'de> for ConditionVisitor {
    type Value = Condition;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        f.write_str("map of condition operators to condition maps")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = BTreeMap::new();
        while let Some(test) = access.next_key::<String>()? {
            if map.contains_key(&test) {
                return Err(de::Error::custom(format!("duplicate condition operator `{}`", test)));
            }

            let cmap = access.next_value_seed(ConditionMapSeed)?;
            map.insert(test, cmap);
        }

        Ok(Condition {
            map,
        })
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ConditionVisitor)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.map.serialize(serializer)
    }
}
