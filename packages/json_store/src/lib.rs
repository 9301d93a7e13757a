//! JSON file persistence for [`DotMap`] containers.
//!
//! A [`PersistentMap`] owns a container plus an optional [`Binding`] to a
//! file on disk. Writes happen only on [`PersistentMap::sync`].

pub mod binding;
pub mod persistent;

pub use binding::{Binding, EMPTY_DOCUMENT};
pub use persistent::{load, PersistentMap};

pub use dotstore_core::{DotMap, Error, Result, Value};
