pub mod catalog;
pub mod clock;
pub mod error;
pub mod field;
pub mod normalize;
pub mod snapshot;

pub use catalog::{CatalogEntry, FieldCatalog};
pub use clock::{MsClock, TimeSource};
pub use error::CoreError;
pub use field::{Field, FieldKey, Position};
pub use snapshot::Snapshot;
