//! Access layer: how filterable fields are described and read.
//!
//! - **DataType**: the closed set of native field types
//! - **Value**: tagged union of field values and converted literals
//! - **FieldDescriptor**: a field name, its type, and an accessor closure
//! - **FieldRegistry**: the immutable set of filterable fields of one entity type
//!
//! The registry is built once per entity type and shared by every compilation
//! afterwards; nothing in this layer is mutated after `build()`.

pub mod registry;
pub mod value;

pub use registry::{FieldDescriptor, FieldRegistry, RegistryBuilder};
pub use value::{DataType, Value};
