use super::take_count;
use crate::{PropertyKind, PropertySet, PropertyStringCodec, ValidationError};

/// Guest config field holding the encoded startup order.
pub const STARTUP: &str = "startup";

pub(crate) const ORDER: &str = "order";
pub(crate) const UP: &str = "up";
pub(crate) const DOWN: &str = "down";

pub(crate) const FIELDS: &[(&str, PropertyKind)] = &[
    (ORDER, PropertyKind::Int),
    (UP, PropertyKind::Int),
    (DOWN, PropertyKind::Int),
];

/// Start/shutdown ordering of a guest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupOrder {
    /// Position in the boot sequence.
    pub order: Option<u32>,
    /// Seconds to wait after starting this guest.
    pub up: Option<u32>,
    /// Shutdown timeout in seconds.
    pub down: Option<u32>,
    pub extra: PropertySet,
}

impl StartupOrder {
    pub fn is_empty(&self) -> bool {
        self.to_property_set().is_empty()
    }

    pub fn to_property_set(&self) -> PropertySet {
        self.extra
            .clone()
            .with_opt(ORDER, self.order)
            .with_opt(UP, self.up)
            .with_opt(DOWN, self.down)
    }

    pub fn to_property_string(&self) -> String {
        PropertyStringCodec::startup().encode(&self.to_property_set())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let set = PropertyStringCodec::startup().decode(input)?;
        Self::try_from(set)
    }
}

impl TryFrom<PropertySet> for StartupOrder {
    type Error = ValidationError;

    fn try_from(mut set: PropertySet) -> Result<Self, Self::Error> {
        Ok(Self {
            order: take_count(&mut set, ORDER)?,
            up: take_count(&mut set, UP)?,
            down: take_count(&mut set, DOWN)?,
            extra: set,
        })
    }
}
