//! Error types for registry mutation.

use thiserror::Error;

use crate::tag::Tag;
use crate::tag::TagName;

/// Errors returned when adding a name to a [`Registry`].
///
/// [`Registry`]: crate::registry::Registry
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
  /// The name already has a tag assigned.
  #[error("tag with name {0:?} is already registered")]
  DuplicateName(TagName),

  /// Every tag value below [`Tag::UNKNOWN`] has been assigned.
  #[error("registry is full: cannot assign more than {} tags", u64::from(Tag::MAX.into_bits()) + 1)]
  Exhausted,
}
