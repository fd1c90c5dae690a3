use super::{take_count, take_flag};
use crate::{PropertyKind, PropertySet, PropertyStringCodec, ValidationError};

/// Record field holding the encoded retention policy.
pub const PRUNE_BACKUPS: &str = "prune-backups";

/// Legacy single-count retention field superseded by [`PRUNE_BACKUPS`].
pub const LEGACY_MAXFILES: &str = "maxfiles";

pub(crate) const KEEP_ALL: &str = "keep-all";
pub(crate) const KEEP_LAST: &str = "keep-last";
pub(crate) const KEEP_HOURLY: &str = "keep-hourly";
pub(crate) const KEEP_DAILY: &str = "keep-daily";
pub(crate) const KEEP_WEEKLY: &str = "keep-weekly";
pub(crate) const KEEP_MONTHLY: &str = "keep-monthly";
pub(crate) const KEEP_YEARLY: &str = "keep-yearly";

pub(crate) const FIELDS: &[(&str, PropertyKind)] = &[
    (KEEP_ALL, PropertyKind::Bool),
    (KEEP_LAST, PropertyKind::Int),
    (KEEP_HOURLY, PropertyKind::Int),
    (KEEP_DAILY, PropertyKind::Int),
    (KEEP_WEEKLY, PropertyKind::Int),
    (KEEP_MONTHLY, PropertyKind::Int),
    (KEEP_YEARLY, PropertyKind::Int),
];

/// Backup retention policy as edited in storage and backup job dialogs.
///
/// Unset counters are absent from the encoded string. Keys this crate does not
/// know are carried through in [`RetentionPolicy::extra`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub keep_all: Option<bool>,
    pub keep_last: Option<u32>,
    pub keep_hourly: Option<u32>,
    pub keep_daily: Option<u32>,
    pub keep_weekly: Option<u32>,
    pub keep_monthly: Option<u32>,
    pub keep_yearly: Option<u32>,
    pub extra: PropertySet,
}

impl RetentionPolicy {
    /// Policy applied to newly created storages: keep every backup.
    pub fn keep_all() -> Self {
        Self {
            keep_all: Some(true),
            ..Default::default()
        }
    }

    /// `true` when the policy encodes to the empty string.
    pub fn is_empty(&self) -> bool {
        self.to_property_set().is_empty()
    }

    pub fn to_property_set(&self) -> PropertySet {
        self.extra
            .clone()
            .with_opt(KEEP_ALL, self.keep_all)
            .with_opt(KEEP_LAST, self.keep_last)
            .with_opt(KEEP_HOURLY, self.keep_hourly)
            .with_opt(KEEP_DAILY, self.keep_daily)
            .with_opt(KEEP_WEEKLY, self.keep_weekly)
            .with_opt(KEEP_MONTHLY, self.keep_monthly)
            .with_opt(KEEP_YEARLY, self.keep_yearly)
    }

    pub fn to_property_string(&self) -> String {
        PropertyStringCodec::retention().encode(&self.to_property_set())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let set = PropertyStringCodec::retention().decode(input)?;
        Self::try_from(set)
    }

    /// Build the editable policy from a stored record.
    ///
    /// A non-empty `prune-backups` value wins. Without it, a positive legacy
    /// `maxfiles` count becomes `keep-last`; zero or absent means no policy.
    pub fn from_record(
        prune_backups: Option<&str>,
        maxfiles: Option<i64>,
    ) -> Result<Self, ValidationError> {
        if let Some(encoded) = prune_backups.filter(|s| !s.is_empty()) {
            return Self::parse(encoded);
        }
        match maxfiles {
            Some(count) if count > 0 => {
                let keep_last = u32::try_from(count).map_err(|_| {
                    ValidationError::invalid(LEGACY_MAXFILES, format!("count {count} is too large"))
                })?;
                Ok(Self {
                    keep_last: Some(keep_last),
                    ..Default::default()
                })
            }
            _ => Ok(Self::default()),
        }
    }
}

impl TryFrom<PropertySet> for RetentionPolicy {
    type Error = ValidationError;

    fn try_from(mut set: PropertySet) -> Result<Self, Self::Error> {
        Ok(Self {
            keep_all: take_flag(&mut set, KEEP_ALL)?,
            keep_last: take_count(&mut set, KEEP_LAST)?,
            keep_hourly: take_count(&mut set, KEEP_HOURLY)?,
            keep_daily: take_count(&mut set, KEEP_DAILY)?,
            keep_weekly: take_count(&mut set, KEEP_WEEKLY)?,
            keep_monthly: take_count(&mut set, KEEP_MONTHLY)?,
            keep_yearly: take_count(&mut set, KEEP_YEARLY)?,
            extra: set,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PropertyValue;

    #[test]
    fn parse_and_print_are_canonical() {
        let policy = RetentionPolicy::parse("keep-last=5,keep-daily=3").unwrap();
        assert_eq!(policy.keep_last, Some(5));
        assert_eq!(policy.keep_daily, Some(3));
        assert_eq!(policy.to_property_string(), "keep-daily=3,keep-last=5");
    }

    #[test]
    fn empty_policy_prints_empty_string() {
        let policy = RetentionPolicy::default();
        assert!(policy.is_empty());
        assert_eq!(policy.to_property_string(), "");
    }

    #[test]
    fn keep_all_encodes_as_flag() {
        assert_eq!(RetentionPolicy::keep_all().to_property_string(), "keep-all=1");
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let policy = RetentionPolicy::parse("keep-last=2,keep-decades=1").unwrap();
        assert_eq!(
            policy.extra.get("keep-decades"),
            Some(&PropertyValue::from("1"))
        );
        assert_eq!(policy.to_property_string(), "keep-decades=1,keep-last=2");
    }

    #[test]
    fn non_numeric_count_is_a_validation_error() {
        let err = RetentionPolicy::parse("keep-last=lots").unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { ref field, .. } if field == "keep-last"));
    }

    #[test]
    fn negative_count_is_rejected() {
        assert!(RetentionPolicy::parse("keep-weekly=-1").is_err());
    }

    #[test]
    fn malformed_string_surfaces_codec_error() {
        let err = RetentionPolicy::parse("keep-last").unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn record_prefers_structured_policy() {
        let policy = RetentionPolicy::from_record(Some("keep-daily=7"), Some(3)).unwrap();
        assert_eq!(policy.keep_daily, Some(7));
        assert_eq!(policy.keep_last, None);
    }

    #[test]
    fn record_maps_positive_maxfiles_to_keep_last() {
        let policy = RetentionPolicy::from_record(None, Some(4)).unwrap();
        assert_eq!(policy.keep_last, Some(4));

        let policy = RetentionPolicy::from_record(Some(""), Some(2)).unwrap();
        assert_eq!(policy.keep_last, Some(2));
    }

    #[test]
    fn record_with_zero_maxfiles_has_no_policy() {
        let policy = RetentionPolicy::from_record(None, Some(0)).unwrap();
        assert!(policy.is_empty());
    }
}
