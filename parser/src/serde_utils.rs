use serde::de::Visitor;
use serde::ser::SerializeMap;
use serde::{Deserializer, Serializer};
use std::fmt;

/// Writes ordered key/value pairs as a JSON object, preserving their order.
pub fn serialize_fields_as_map<S>(fields: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (k, v) in fields {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

/// Reads a JSON object back into ordered pairs. A repeated key keeps its
/// first position and takes the last value.
pub fn deserialize_fields_from_map<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MapVisitor;

    impl<'de> Visitor<'de> for MapVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a JSON object of string values")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut fields = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, String>()? {
                upsert_field(&mut fields, key, value);
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_map(MapVisitor)
}

/// Inserts a pair, overwriting the value in place if the key already exists.
pub fn upsert_field(fields: &mut Vec<(String, String)>, key: String, value: String) {
    match fields.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => fields.push((key, value)),
    }
}
