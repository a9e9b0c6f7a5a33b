//! A shared-ownership [`LinkedPtr`] that does not count its owners.
//!
//! `LinkedPtr` behaves like [`std::rc::Rc`] with one difference: there is no counter. All pointers
//! that share a value are kept in a doubly-linked chain instead. Each pointer owns two
//! [`Connector`]s, a left and a right end, and the right end of one pointer links to the left end
//! of the next. A pointer whose two connectors are both unlinked is the only owner, and dropping
//! it drops the value.
//!
//! Cloning splices the clone into the chain right after its source, dropping or resetting splices
//! a pointer out of its chain. Both are a handful of pointer writes and never touch the value
//! itself. Swapping two pointers exchanges their connector allocations and needs no repair of the
//! chain at all.
//!
//! Pointers that share a value are recognised by the address they hold and nothing else. Sharing
//! must therefore always go through [`Clone`] or [`LinkedPtr::copy_from`]; two pointers built
//! independently from the same address with [`LinkedPtr::from_raw`] would both drop the value.
//!
//! The chain is not synchronised in any way. `LinkedPtr` is neither [`Send`] nor [`Sync`].
//!
//! # Features
//!
//! - `tracing` (default): emits `trace` events when a pointer joins a chain and when the last
//!   owner releases its value.
//! - `unsize`: sharing a value between pointers of different element types, e.g. a
//!   `LinkedPtr<T>` and a `LinkedPtr<dyn Trait>`, through the `unsize` crate.
//!
//! The tests cover both features:
//!
//! ```text
//! cargo test --all-features
//! ```

// `tracing::trace!` that expands to nothing without the `tracing` feature.
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    };
}

mod connector;
mod error;
mod linked;

pub use crate::connector::Connector;
pub use crate::error::LinkError;
pub use crate::linked::LinkedPtr;
