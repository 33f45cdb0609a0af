//! Identity shared by every persisted record.

use std::fmt::Debug;

/// A persisted record with a stable integer primary key.
///
/// Identity is supplied by the caller; storage never assigns it.
pub trait Record: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Kind label, e.g. `"user"`
    const KIND: &'static str;

    /// Primary key
    fn id(&self) -> i32;

    /// Human readable reference such as `user 7`
    fn label(&self) -> String {
        describe::<Self>(self.id())
    }
}

/// Reference to a record of kind `R` that may not exist (yet).
pub fn describe<R: Record>(id: i32) -> String {
    format!("{} {}", R::KIND, id)
}
