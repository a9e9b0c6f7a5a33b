use std::{cell::Cell, fmt, ptr::NonNull};

/// One end of a [`LinkedPtr`][crate::LinkedPtr].
///
/// Every `LinkedPtr` owns two connectors, its left and its right end. A connector holds at most
/// one reference to a connector of a neighbouring pointer in the same chain. The right end of a
/// pointer links to the left end of its successor, and the left end links back to the right end
/// of its predecessor. A pointer whose connectors are both unlinked is alone in its chain.
///
/// Connectors live on the heap so that their address survives moves of the owning pointer.
/// Neighbours write into a connector they do not own while splicing, hence the [`Cell`].
pub struct Connector {
    connected_with: Cell<Option<NonNull<Connector>>>,
}

impl Connector {
    /// Allocates a new unlinked connector. The caller is responsible for freeing it with
    /// [`Connector::free`].
    pub(crate) fn alloc() -> NonNull<Connector> {
        NonNull::from(Box::leak(Box::new(Connector {
            connected_with: Cell::new(None),
        })))
    }

    /// Frees a connector created by [`Connector::alloc`].
    ///
    /// # Safety
    ///
    /// `this` must come from [`Connector::alloc`], must not have been freed yet and no other
    /// connector may still link to it.
    pub(crate) unsafe fn free(this: NonNull<Connector>) {
        debug_assert!(!this.as_ref().is_linked());
        drop(Box::from_raw(this.as_ptr()));
    }

    /// Returns `true` if this connector is linked to a connector of another pointer.
    ///
    /// # Examples
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// let a = LinkedPtr::new(5);
    /// assert!(!a.right().is_linked());
    ///
    /// let b = a.clone();
    /// assert!(a.right().is_linked());
    /// assert!(b.left().is_linked());
    /// assert!(!b.right().is_linked());
    /// ```
    pub fn is_linked(&self) -> bool {
        self.connected_with.get().is_some()
    }

    pub(crate) fn get(&self) -> Option<NonNull<Connector>> {
        self.connected_with.get()
    }

    pub(crate) fn set(&self, with: Option<NonNull<Connector>>) {
        self.connected_with.set(with);
    }

    pub(crate) fn take(&self) -> Option<NonNull<Connector>> {
        self.connected_with.take()
    }

    /// Points the connector at `with` to `to`. Does nothing when `with` is `None`.
    ///
    /// # Safety
    ///
    /// `with` must be `None` or a live connector.
    pub(crate) unsafe fn repoint(with: Option<NonNull<Connector>>, to: Option<NonNull<Connector>>) {
        if let Some(with) = with {
            with.as_ref().set(to);
        }
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("linked", &self.is_linked())
            .finish()
    }
}
