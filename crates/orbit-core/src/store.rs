//! The `DocumentStore` trait.
//!
//! Persistence is a collaborator of the tracker, not part of it: after a
//! session mutates the [`Document`], the caller hands a snapshot to a store.
//! Implemented by storage backends (e.g. `orbit-store-sqlite`).

use std::future::Future;

use crate::document::Document;

/// Abstraction over somewhere a [`Document`] can be saved and reloaded.
///
/// Saves overwrite: the last write wins. All methods return `Send` futures so
/// the trait can be used from multi-threaded async runtimes.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the saved document. Returns `None` if nothing has been saved yet.
  fn load(
    &self,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  /// Replace the saved document with `document`.
  fn save<'a>(
    &'a self,
    document: &'a Document,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
