use thiserror::Error;

/// Errors returned by the checked accessors of [`LinkedPtr`][crate::LinkedPtr].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LinkError {
    /// The pointer does not hold a value.
    #[error("linked pointer is null")]
    Null,

    /// The value is shared with at least one other pointer, so it cannot be accessed mutably.
    #[error("linked pointer shares its value with other pointers")]
    Shared,
}
