use {
    log::debug,
    serde::{
        de::{
            self,
            value::{MapAccessDeserializer, SeqAccessDeserializer},
            Deserializer, MapAccess, SeqAccess, Unexpected, Visitor,
        },
        ser::{SerializeSeq, Serializer},
        Deserialize, Serialize,
    },
    std::{
        fmt::{Debug, Display, Formatter, Result as FmtResult},
        marker::PhantomData,
        ops::Index,
    },
};

/// Implement Display for a given class by formatting it as pretty-printed JSON.
#[macro_export]
macro_rules! display_json {
    ($cls:ident) => {
        impl std::fmt::Display for $cls {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                let buf = Vec::new();
                let serde_formatter = ::serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut ser = ::serde_json::Serializer::with_formatter(buf, serde_formatter);
                match self.serialize(&mut ser) {
                    Ok(()) => (),
                    Err(e) => {
                        ::log::error!("Failed to serialize: {}", e);
                        return Err(::std::fmt::Error {});
                    }
                };
                match std::str::from_utf8(&ser.into_inner()) {
                    Ok(s) => write!(f, "{}", s),
                    Err(e) => {
                        ::log::error!("JSON serialization contained non-UTF-8 characters: {}", e);
                        Err(::std::fmt::Error {})
                    }
                }
            }
        }
    };
}

/// Implement FromStr for a given class by parsing it as JSON.
#[macro_export]
macro_rules! from_str_json {
    ($cls:ident) => {
        impl ::std::str::FromStr for $cls {
            type Err = ::serde_json::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match ::serde_json::from_str::<Self>(s) {
                    Ok(result) => Ok(result),
                    Err(e) => {
                        ::log::debug!("Failed to parse: {}: {:?}", s, e);
                        Err(e)
                    }
                }
            }
        }
    };
}

/// ElementList allows a JSON field to be an element (represented as a JSON object) or a list of elements (represented
/// as a JSON array).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ElementList<E> {
    Single(E),
    List(Vec<E>),
}

impl<E> ElementList<E> {
    pub fn into_vec(self) -> Vec<E> {
        match self {
            Self::Single(element) => vec![element],
            Self::List(element_list) => element_list,
        }
    }
}

impl<E> Default for ElementList<E> {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

struct ElementListVisitor<E> {
    phantom: PhantomData<E>,
}

impl<'de, E: Deserialize<'de>> Visitor<'de> for ElementListVisitor<E> {
    type Value = ElementList<E>;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "element or list of elements")
    }

    fn visit_map<A: MapAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        Ok(ElementList::Single(E::deserialize(MapAccessDeserializer::new(access))?))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut result = match access.size_hint() {
            None => Vec::new(),
            Some(size) => Vec::with_capacity(size),
        };

        while let Some(item) = access.next_element::<E>()? {
            result.push(item);
        }
        Ok(ElementList::List(result))
    }
}

impl<'de, E: Deserialize<'de>> Deserialize<'de> for ElementList<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ElementListVisitor {
            phantom: PhantomData,
        })
    }
}

impl<E: Serialize> Serialize for ElementList<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(v) => v.serialize(serializer),
            Self::List(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for e in v {
                    seq.serialize_element(e)?;
                }
                seq.end()
            }
        }
    }
}

/// StringList allows a JSON field to be a string or list of strings.
///
/// A list holding exactly one string is always stored and serialized as a bare string, so a value survives a
/// parse/render cycle unchanged.
#[derive(Clone, Debug)]
pub enum StringList {
    Single(String),
    List(Vec<String>),
}

impl StringList {
    pub fn to_vec(&self) -> Vec<&str> {
        match self {
            Self::Single(s) => vec![s.as_str()],
            Self::List(s_list) => s_list.iter().map(String::as_str).collect(),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(s) => vec![s],
            Self::List(s_list) => s_list,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        let (single, list) = match self {
            Self::Single(s) => (Some(s), &[][..]),
            Self::List(s_list) => (None, s_list.as_slice()),
        };
        single.into_iter().chain(list.iter())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(_) => false,
            Self::List(s_list) => s_list.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(s_list) => s_list.len(),
        }
    }

    /// Append values to the end of this list, promoting a single value to a list as needed.
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, values: I) {
        let mut combined = std::mem::replace(self, Self::List(Vec::new())).into_vec();
        combined.extend(values);
        *self = Self::from(combined);
    }

    /// Apply `f` to every value, stopping at the first error.
    pub fn try_map<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&str) -> Result<String, E>,
    {
        let mut result = Vec::with_capacity(self.len());
        for s in self.iter() {
            result.push(f(s)?);
        }
        Ok(Self::from(result))
    }
}

impl From<String> for StringList {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<&str> for StringList {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<Vec<String>> for StringList {
    fn from(mut v: Vec<String>) -> Self {
        if v.len() == 1 {
            Self::Single(v.remove(0))
        } else {
            Self::List(v)
        }
    }
}

impl From<Vec<&str>> for StringList {
    fn from(v: Vec<&str>) -> Self {
        Self::from(v.into_iter().map(str::to_string).collect::<Vec<_>>())
    }
}

impl Index<usize> for StringList {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        match self {
            Self::Single(s) => {
                if index == 0 {
                    s
                } else {
                    panic!("index out of bounds: the len is 1 but the index is {}", index);
                }
            }
            Self::List(s_list) => &s_list[index],
        }
    }
}

impl Display for StringList {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Single(s) => f.write_str(s),
            Self::List(s_list) => write!(f, "[{}]", s_list.join(", ")),
        }
    }
}

impl PartialEq<StringList> for StringList {
    fn eq(&self, other: &StringList) -> bool {
        match (self, other) {
            (Self::Single(my_el), Self::Single(other_el)) => my_el == other_el,
            (Self::Single(my_el), Self::List(other_el)) => other_el.len() == 1 && my_el == &other_el[0],
            (Self::List(my_el), Self::Single(other_el)) => my_el.len() == 1 && &my_el[0] == other_el,
            (Self::List(my_el), Self::List(other_el)) => my_el == other_el,
        }
    }
}

impl Eq for StringList {}

struct StringListVisitor {}

impl<'de> Visitor<'de> for StringListVisitor {
    type Value = StringList;

    fn expecting(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "string or list of strings")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, access: A) -> Result<Self::Value, A::Error> {
        let deserializer = SeqAccessDeserializer::new(access);
        match Vec::<String>::deserialize(deserializer) {
            Ok(l) => Ok(StringList::from(l)),
            Err(e) => {
                debug!("Failed to deserialize string list: {:?}", e);
                Err(<A::Error as de::Error>::invalid_value(Unexpected::Seq, &self))
            }
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(StringList::Single(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StringListVisitor {})
    }
}

impl Serialize for StringList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(v) => v.serialize(serializer),
            Self::List(v) if v.len() == 1 => v[0].serialize(serializer),
            Self::List(v) => v.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::serutil::{ElementList, StringList},
        pretty_assertions::{assert_eq, assert_ne},
        serde::Serialize,
        std::panic::catch_unwind,
    };

    #[test_log::test]
    fn test_element_list_ops() {
        let el1: ElementList<u32> = serde_json::from_str("[1, 2]").unwrap();
        let el2 = ElementList::<u32>::List(vec![]);
        let el3 = ElementList::<u32>::Single(7);

        assert_eq!(el1.clone().into_vec(), vec![1, 2]);
        assert_eq!(el3.clone().into_vec(), vec![7]);
        assert_eq!(ElementList::<u32>::default(), el2);
        assert_eq!(serde_json::to_string(&el3).unwrap(), "7");
        assert_eq!(serde_json::to_string(&el1).unwrap(), "[1,2]");
    }

    #[test_log::test]
    fn test_string_list_collapse() {
        let sl1 = StringList::from(vec!["s3:ListBucket"]);
        assert!(matches!(sl1, StringList::Single(_)));
        assert_eq!(serde_json::to_string(&sl1).unwrap(), r#""s3:ListBucket""#);

        let sl2: StringList = serde_json::from_str(r#"["s3:ListBucket"]"#).unwrap();
        assert_eq!(sl1, sl2);
        assert_eq!(serde_json::to_string(&sl2).unwrap(), r#""s3:ListBucket""#);

        // A hand-built one-element list still renders as a scalar.
        let sl3 = StringList::List(vec!["a".to_string()]);
        assert_eq!(serde_json::to_string(&sl3).unwrap(), r#""a""#);
        assert_eq!(sl3, StringList::from("a"));

        let sl4 = StringList::from(vec!["a", "b"]);
        assert_eq!(serde_json::to_string(&sl4).unwrap(), r#"["a","b"]"#);
        assert_ne!(sl3, sl4);
        assert_eq!(sl4.to_vec(), vec!["a", "b"]);
        assert_eq!(format!("{}", sl4), "[a, b]");
        assert_eq!(format!("{}", sl1), "s3:ListBucket");
    }

    #[test_log::test]
    fn test_string_list_extend() {
        let mut sl = StringList::from("one/");
        sl.extend(vec!["two/".to_string()]);
        assert_eq!(sl, StringList::from(vec!["one/", "two/"]));
        assert_eq!(sl.len(), 2);

        let mut sl = StringList::List(vec![]);
        assert!(sl.is_empty());
        sl.extend(vec!["only".to_string()]);
        assert!(matches!(sl, StringList::Single(_)));
        assert_eq!(&sl[0], "only");

        let e = catch_unwind(|| {
            let sl = StringList::from("x");
            println!("This won't print: {}", &sl[1]);
        })
        .unwrap_err();
        assert_eq!(*e.downcast::<String>().unwrap(), "index out of bounds: the len is 1 but the index is 1");
    }

    #[test_log::test]
    fn test_string_list_try_map() {
        let sl = StringList::from(vec!["a", "b"]);
        let upper: Result<StringList, ()> = sl.try_map(|s| Ok(s.to_uppercase()));
        assert_eq!(upper.unwrap(), StringList::from(vec!["A", "B"]));

        let failed: Result<StringList, String> =
            sl.try_map(|s| if s == "b" { Err(format!("bad {}", s)) } else { Ok(s.to_string()) });
        assert_eq!(failed.unwrap_err(), "bad b");
    }

    #[test_log::test]
    fn test_string_list_bad_types() {
        let e = serde_json::from_str::<StringList>("[1, 2]").unwrap_err();
        assert!(e.to_string().starts_with("invalid value: sequence, expected string or list of strings"));

        let e = serde_json::from_str::<StringList>("3").unwrap_err();
        assert_eq!(e.to_string(), "invalid type: integer `3`, expected string or list of strings at line 1 column 1");
    }

    #[derive(Clone, Debug)]
    struct SerFail {}
    display_json!(SerFail);

    impl Serialize for SerFail {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("Serialization failed"))
        }
    }

    #[test_log::test]
    fn test_ser_fail() {
        let el = ElementList::Single(SerFail {});
        assert!(serde_json::to_string(&el).is_err());

        let e = catch_unwind(|| SerFail {}.to_string()).unwrap_err();
        let e2 = e.downcast::<String>().unwrap();
        assert!((*e2).contains("a Display implementation returned an error"));
    }
}
