mod codec;
pub use codec::{PropertySchema, PropertyStringCodec, decode, encode};

mod error;
pub use error::{MalformedPropertyError, MalformedReason};

mod set;
pub use set::PropertySet;

mod value;
pub use value::{PropertyKind, PropertyValue};
