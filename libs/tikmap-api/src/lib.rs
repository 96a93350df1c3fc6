//! Mapping primitives for device API responses.
//!
//! - [`record`]: string-keyed rows as they come off the wire.
//! - [`mapping`]: per-field accessors and the [`Entity`] declaration trait.
//! - [`executor`]: the command execution capability the engine consumes.

extern crate self as tikmap_api;

pub use tikmap_api_derive::Entity;
pub mod error;
pub mod executor;
pub mod mapping;
pub mod record;
pub mod value;

pub use error::{ErrorKind, ExecutorError, FieldError, TrapError};
pub use executor::{CommandExecutor, EventReceiver, EventSender, StreamEvent, event_channel};
pub use mapping::{Entity, EntityMetadata, PropertyAccessor};
pub use record::{ResponseRecord, TrapRecord};
pub use value::FieldValue;
