//! # xacml-datatypes: XACML attribute datatypes
//!
//! Converts untyped request inputs into typed attribute values and back.
//!
//! - [`Source`]: what a datatype is asked to convert (text, numbers, bytes,
//!   request nodes, already-typed values).
//! - [`DataType`] / [`DynDataType`]: statically and dynamically typed views
//!   of one datatype.
//! - [`builtin`]: the fifteen XACML 3.0 datatypes as singletons.
//! - [`DataTypeFactory`]: identifier lookup, legacy aliases, and
//!   configuration-driven registration.
//! - [`AttributeValue`]: a value tagged with its datatype and category.
//!
//! ```
//! use xacml_datatypes::{DataType, Source, builtin::DATE_TIME};
//!
//! let value = DATE_TIME
//!     .convert(&Source::from("2014-02-28T13:45:00+01:00"))
//!     .unwrap();
//! assert_eq!(value.hour(), 13);
//! assert_eq!(DATE_TIME.to_string_value(&value), "2014-02-28T13:45:00+01:00");
//! ```

pub mod attribute;
pub mod builtin;
pub mod datatype;
pub mod error;
pub mod identifiers;
pub mod registry;
pub mod source;
pub mod value;

pub use attribute::AttributeValue;
pub use datatype::{Canonical, DataType, DataTypeBase, DynDataType, ValueType};
pub use error::{DataTypeError, ErrorKind, Result};
pub use identifiers::Identifier;
pub use registry::{BUILTIN_DATA_TYPES, DataTypeFactory, LEGACY_ALIASES, default_factory};
pub use source::{Source, TextNode};
pub use value::Value;

pub use xacml_config::XacmlConfig;
pub use xacml_types as types;
