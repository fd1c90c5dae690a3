use super::{MalformedPropertyError, MalformedReason, PropertyKind, PropertySet, PropertyValue};
use crate::policy::{retention, startup};

const PAIR_SEPARATOR: char = ',';
const KEY_VALUE_SEPARATOR: char = '=';

/// Vocabulary of recognized keys and the scalar kind each one decodes to.
///
/// Keys outside the vocabulary decode to [`PropertyValue::Str`]. A recognized key
/// whose text does not parse as its kind also stays a string; judging such values
/// is left to the typed layer above the codec.
#[derive(Debug, Clone, Copy)]
pub struct PropertySchema {
    fields: &'static [(&'static str, PropertyKind)],
}

impl PropertySchema {
    pub const fn new(fields: &'static [(&'static str, PropertyKind)]) -> Self {
        Self { fields }
    }

    /// Every key decodes to a string.
    pub const OPAQUE: Self = Self::new(&[]);

    /// Backup retention (`prune-backups`) keys.
    pub const RETENTION: Self = Self::new(retention::FIELDS);

    /// Guest startup/shutdown ordering (`startup`) keys.
    pub const STARTUP: Self = Self::new(startup::FIELDS);

    /// Union of all vocabularies known to this crate.
    pub const BUILTIN: Self = Self::new(&[
        (retention::KEEP_ALL, PropertyKind::Bool),
        (retention::KEEP_LAST, PropertyKind::Int),
        (retention::KEEP_HOURLY, PropertyKind::Int),
        (retention::KEEP_DAILY, PropertyKind::Int),
        (retention::KEEP_WEEKLY, PropertyKind::Int),
        (retention::KEEP_MONTHLY, PropertyKind::Int),
        (retention::KEEP_YEARLY, PropertyKind::Int),
        (startup::ORDER, PropertyKind::Int),
        (startup::UP, PropertyKind::Int),
        (startup::DOWN, PropertyKind::Int),
    ]);

    pub fn kind_of(&self, key: &str) -> Option<PropertyKind> {
        self.fields
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }
}

impl Default for PropertySchema {
    fn default() -> Self {
        Self::BUILTIN
    }
}

/// Converts between [`PropertySet`] and the flat `key=value,key=value` wire form.
///
/// Encoding sorts keys and never emits absent fields; an empty set encodes to
/// the empty string. Decoding splits on `,` and then on the first `=`, lets the
/// last duplicate win and keeps unknown keys as strings.
///
/// For sets whose recognized keys carry their schema kind and whose other keys
/// carry strings, `decode(encode(set)) == set` as long as no value contains `,`
/// or `=`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyStringCodec {
    schema: PropertySchema,
}

impl PropertyStringCodec {
    pub const fn new(schema: PropertySchema) -> Self {
        Self { schema }
    }

    pub const fn opaque() -> Self {
        Self::new(PropertySchema::OPAQUE)
    }

    pub const fn retention() -> Self {
        Self::new(PropertySchema::RETENTION)
    }

    pub const fn startup() -> Self {
        Self::new(PropertySchema::STARTUP)
    }

    pub fn encode(&self, set: &PropertySet) -> String {
        let mut out = String::new();
        for (key, value) in set.iter() {
            if !out.is_empty() {
                out.push(PAIR_SEPARATOR);
            }
            out.push_str(key);
            out.push(KEY_VALUE_SEPARATOR);
            out.push_str(&value.to_string());
        }
        out
    }

    pub fn decode(&self, input: &str) -> Result<PropertySet, MalformedPropertyError> {
        let mut set = PropertySet::new();
        if input.is_empty() {
            return Ok(set);
        }

        for (index, segment) in input.split(PAIR_SEPARATOR).enumerate() {
            let Some((key, raw)) = segment.split_once(KEY_VALUE_SEPARATOR) else {
                return Err(malformed(index, segment, MalformedReason::MissingSeparator));
            };
            if key.is_empty() {
                return Err(malformed(index, segment, MalformedReason::EmptyKey));
            }
            set.set(key, self.typed(key, raw));
        }
        Ok(set)
    }

    fn typed(&self, key: &str, raw: &str) -> PropertyValue {
        self.schema
            .kind_of(key)
            .and_then(|kind| PropertyValue::parse_as(kind, raw))
            .unwrap_or_else(|| PropertyValue::Str(raw.to_string()))
    }
}

fn malformed(index: usize, segment: &str, reason: MalformedReason) -> MalformedPropertyError {
    MalformedPropertyError {
        index,
        segment: segment.to_string(),
        reason,
    }
}

/// Encode with the built-in vocabulary.
pub fn encode(set: &PropertySet) -> String {
    PropertyStringCodec::default().encode(set)
}

/// Decode with the built-in vocabulary.
pub fn decode(input: &str) -> Result<PropertySet, MalformedPropertyError> {
    PropertyStringCodec::default().decode(input)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_roundtrip() {
        assert_eq!(encode(&PropertySet::new()), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn encode_sorts_keys() {
        let set = PropertySet::new()
            .with("keep-last", 5i64)
            .with("keep-daily", 3i64);
        assert_eq!(encode(&set), "keep-daily=3,keep-last=5");
    }

    #[test]
    fn encode_omits_absent_fields() {
        let set = PropertySet::new()
            .with_opt::<_, i64>("keep-daily", None)
            .with("keep-last", 3i64);
        assert_eq!(encode(&set), "keep-last=3");
    }

    #[test]
    fn decode_last_duplicate_wins() {
        let set = decode("keep-last=5,keep-last=9").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("keep-last"), Some(&PropertyValue::Int(9)));
    }

    #[test]
    fn decode_segment_without_separator_fails() {
        let err = decode("bogus").unwrap_err();
        assert_eq!(err.index, 0);
        assert_eq!(err.segment, "bogus");
        assert_eq!(err.reason, MalformedReason::MissingSeparator);

        let err = decode("keep-last=1,").unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.segment, "");
    }

    #[test]
    fn decode_rejects_empty_key() {
        let err = decode("=3").unwrap_err();
        assert_eq!(err.reason, MalformedReason::EmptyKey);
    }

    #[test]
    fn decode_splits_on_first_separator_only() {
        let set = PropertyStringCodec::opaque().decode("comment=a=b").unwrap();
        assert_eq!(set.get("comment"), Some(&PropertyValue::from("a=b")));
    }

    #[test]
    fn decode_types_recognized_keys_and_keeps_unknown_as_strings() {
        let set = decode("keep-all=1,keep-last=4,future-key=7").unwrap();
        assert_eq!(set.get("keep-all"), Some(&PropertyValue::Bool(true)));
        assert_eq!(set.get("keep-last"), Some(&PropertyValue::Int(4)));
        assert_eq!(set.get("future-key"), Some(&PropertyValue::from("7")));
    }

    #[test]
    fn decode_keeps_unparsable_recognized_value_as_string() {
        let set = decode("keep-last=many").unwrap();
        assert_eq!(set.get("keep-last"), Some(&PropertyValue::from("many")));
    }

    #[test]
    fn opaque_codec_never_types_values() {
        let set = PropertyStringCodec::opaque().decode("keep-last=4").unwrap();
        assert_eq!(set.get("keep-last"), Some(&PropertyValue::from("4")));
    }

    fn typed_entry() -> impl Strategy<Value = (String, PropertyValue)> {
        let fields: Vec<(&'static str, PropertyKind)> = retention::FIELDS
            .iter()
            .chain(startup::FIELDS)
            .copied()
            .collect();
        prop::sample::select(fields).prop_flat_map(|(key, kind)| {
            let value = match kind {
                PropertyKind::Bool => any::<bool>().prop_map(PropertyValue::Bool).boxed(),
                _ => any::<i64>().prop_map(PropertyValue::Int).boxed(),
            };
            (Just(key.to_string()), value)
        })
    }

    fn free_entry() -> impl Strategy<Value = (String, PropertyValue)> {
        ("[a-z][a-z0-9_-]{0,11}", "[A-Za-z0-9 ._:/+@-]{0,16}")
            .prop_filter("key must be outside the schema", |(key, _)| {
                PropertySchema::BUILTIN.kind_of(key).is_none()
            })
            .prop_map(|(key, value)| (key, PropertyValue::Str(value)))
    }

    fn conforming_set() -> impl Strategy<Value = PropertySet> {
        prop::collection::vec(prop_oneof![typed_entry(), free_entry()], 0..8)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        #[test]
        fn schema_conforming_sets_survive_roundtrip(set in conforming_set()) {
            prop_assert_eq!(decode(&encode(&set)).unwrap(), set);
        }
    }

    #[test]
    fn non_conforming_values_decode_to_schema_view() {
        let set = PropertySet::new()
            .with("maxworkers", 3i64)
            .with("keep-last", "5");
        let back = decode(&encode(&set)).unwrap();
        assert_eq!(back.get("maxworkers"), Some(&PropertyValue::from("3")));
        assert_eq!(back.get("keep-last"), Some(&PropertyValue::Int(5)));
    }

    #[test]
    fn startup_codec_only_knows_startup_keys() {
        let set = PropertyStringCodec::startup()
            .decode("order=1,keep-last=2")
            .unwrap();
        assert_eq!(set.get("order"), Some(&PropertyValue::Int(1)));
        assert_eq!(set.get("keep-last"), Some(&PropertyValue::from("2")));
    }
}
