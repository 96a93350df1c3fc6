//! Load strategies that turn device responses into typed entities.
//!
//! | Strategy | Returns |
//! |---|---|
//! | [`load_list`] | every row, in arrival order |
//! | [`load_single`] | exactly one row |
//! | [`load_single_or_default`] | zero or one row |
//! | [`load_with_duration`] | rows collected for a soft deadline |
//! | [`AsyncLoad`] | rows streamed to callbacks on a worker task |
//!
//! All strategies share one [`metadata`] cache per entity type.

pub mod error;
pub mod load;
pub mod materialize;
pub mod metadata;
pub mod stream;

pub use error::LoadError;
pub use load::{collect_for, load_list, load_single, load_single_or_default, load_with_duration};
pub use materialize::{dematerialize, materialize, materialize_all, materialize_with};
pub use metadata::{EntityMetadataCache, metadata};
pub use stream::{AsyncLoad, Dispatcher, StreamCanceller, StreamHandle, StreamOutcome};
