use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem,
    ops::Deref,
    ptr,
    ptr::NonNull,
};

#[cfg(feature = "unsize")]
use std::mem::ManuallyDrop;

use crate::{Connector, LinkError};

/// A shared-ownership pointer without a reference count.
///
/// All `LinkedPtr`s that share one value form a chain through their [`Connector`]s. Cloning a
/// pointer splices the clone into the chain right after the original, dropping a pointer splices
/// it out again. The pointer that leaves a chain of one drops the value.
///
/// `LinkedPtr` is neither [`Send`] nor [`Sync`]. Every operation on one pointer may write into its
/// neighbours in the chain.
///
/// # Examples
///
/// ```
/// # use linked_ptr::LinkedPtr;
/// let p = LinkedPtr::new(42);
/// let q = p.clone();
///
/// assert!(!p.is_unique() && !q.is_unique());
/// assert!(p == q);
///
/// drop(q);
/// assert!(p.is_unique());
/// ```
pub struct LinkedPtr<T>
where
    T: ?Sized,
{
    left: NonNull<Connector>,
    right: NonNull<Connector>,
    target: Option<NonNull<T>>,
    _owns: PhantomData<T>,
}

impl<T> Drop for LinkedPtr<T>
where
    T: ?Sized,
{
    fn drop(&mut self) {
        let doomed = self.detach();

        unsafe {
            Connector::free(self.left);
            Connector::free(self.right);
        }

        drop(doomed);
    }
}

impl<T> LinkedPtr<T> {
    /// Moves `value` to the heap and creates the only pointer to it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// let p = LinkedPtr::new(5);
    /// assert!(p.is_unique());
    /// assert!(*p == 5);
    /// ```
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Moves the value out of the pointer if it is the only owner. Otherwise the pointer is
    /// returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// let p = LinkedPtr::new(String::from("a"));
    /// let q = p.clone();
    ///
    /// let p = p.into_inner().unwrap_err();
    /// drop(q);
    /// assert!(p.into_inner().unwrap() == "a");
    /// ```
    pub fn into_inner(mut self) -> Result<T, Self> {
        if !self.is_unique() {
            return Err(self);
        }

        match self.detach() {
            Some(boxed) => Ok(*boxed),
            None => Err(self),
        }
    }

    /// Replaces the value with a new one owned only by this pointer. See [`LinkedPtr::reset`].
    pub fn reset_with(&mut self, value: T) {
        self.reset_box(Box::new(value));
    }
}

impl<T> LinkedPtr<T>
where
    T: ?Sized,
{
    /// Creates a pointer that holds nothing.
    pub fn null() -> Self {
        LinkedPtr {
            left: Connector::alloc(),
            right: Connector::alloc(),
            target: None,
            _owns: PhantomData,
        }
    }

    /// Takes ownership of a boxed value. Unsized values work as well, the box is coerced at the
    /// call site.
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// # use std::fmt::Debug;
    /// let p = LinkedPtr::<dyn Debug>::from_box(Box::new(5));
    /// assert!(format!("{p:?}") == "5");
    /// ```
    pub fn from_box(value: Box<T>) -> Self {
        let mut ret = Self::null();
        ret.target = Some(NonNull::from(Box::leak(value)));
        ret
    }

    /// Takes ownership of a raw pointer. A null pointer creates a null `LinkedPtr`.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must come from [`Box::into_raw`] and must not be owned by anything else,
    /// in particular not by another `LinkedPtr`. Two pointers created this way from the same
    /// address are treated as sharing the value but are not linked, so both would drop it.
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        let mut ret = Self::null();
        ret.target = NonNull::new(ptr);
        ret
    }

    /// Gets a reference to the value, or `None` for a null pointer.
    pub fn get(&self) -> Option<&T> {
        self.target.map(|target| unsafe { &*target.as_ptr() })
    }

    /// Gets a mutable reference to the value if this pointer is its only owner.
    ///
    /// # Examples
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// let mut p = LinkedPtr::new(1);
    /// *p.get_mut().unwrap() += 1;
    ///
    /// let q = p.clone();
    /// assert!(p.get_mut().is_none());
    ///
    /// drop(q);
    /// assert!(p.get_mut() == Some(&mut 2));
    /// ```
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if !self.is_unique() {
            return None;
        }

        self.target.map(|target| unsafe { &mut *target.as_ptr() })
    }

    /// Like [`LinkedPtr::get`] but reports a null pointer as [`LinkError::Null`].
    pub fn try_get(&self) -> Result<&T, LinkError> {
        self.get().ok_or(LinkError::Null)
    }

    /// Like [`LinkedPtr::get_mut`] but tells apart a null pointer from a shared value.
    pub fn try_get_mut(&mut self) -> Result<&mut T, LinkError> {
        if self.target.is_none() {
            return Err(LinkError::Null);
        }

        self.get_mut().ok_or(LinkError::Shared)
    }

    /// Gets a raw pointer to the value.
    pub fn as_ptr(&self) -> Option<NonNull<T>> {
        self.target
    }

    /// Returns `true` if the pointer holds nothing.
    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }

    /// Returns `true` if the pointer holds a value.
    pub fn is_some(&self) -> bool {
        self.target.is_some()
    }

    /// Returns `true` if this pointer holds a value and no other pointer shares it. Dropping or
    /// resetting a unique pointer drops the value.
    ///
    /// A null pointer is never unique.
    ///
    /// # Examples
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// let p = LinkedPtr::new(5);
    /// assert!(p.is_unique());
    ///
    /// let q = p.clone();
    /// assert!(!p.is_unique());
    ///
    /// drop(q);
    /// assert!(p.is_unique());
    ///
    /// assert!(!LinkedPtr::<u8>::null().is_unique());
    /// ```
    pub fn is_unique(&self) -> bool {
        self.target.is_some() && !self.left().is_linked() && !self.right().is_linked()
    }

    /// Returns `true` if both pointers hold the same address. Works across element types.
    pub fn ptr_eq<U>(this: &Self, other: &LinkedPtr<U>) -> bool
    where
        U: ?Sized,
    {
        this.addr() == other.addr()
    }

    /// The connector that links to the previous pointer in the chain.
    pub fn left(&self) -> &Connector {
        unsafe { self.left.as_ref() }
    }

    /// The connector that links to the next pointer in the chain.
    pub fn right(&self) -> &Connector {
        unsafe { self.right.as_ref() }
    }

    /// Makes this pointer share the value of `src`.
    ///
    /// Nothing happens if both pointers already hold the same address. Otherwise the old value is
    /// released first, dropping it if this pointer was its only owner, and this pointer joins the
    /// chain of `src` right after it. Sharing a null pointer leaves this pointer null and alone.
    ///
    /// # Examples
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// let a = LinkedPtr::new(1);
    /// let mut b = LinkedPtr::new(2);
    ///
    /// b.copy_from(&a);
    /// assert!(a == b && *b == 1);
    /// assert!(!a.is_unique() && !b.is_unique());
    /// ```
    pub fn copy_from(&mut self, src: &LinkedPtr<T>) {
        self.link_after(src, src.target);
    }

    /// Drops this pointer's claim on its value and leaves it null.
    ///
    /// The value is dropped if no other pointer shares it.
    ///
    /// # Examples
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// let mut p = LinkedPtr::new(1);
    /// let q = p.clone();
    ///
    /// p.reset();
    /// assert!(p.is_null());
    /// assert!(q.is_unique());
    /// ```
    pub fn reset(&mut self) {
        self.replace_target(None);
    }

    /// Replaces the value with a boxed one owned only by this pointer. See [`LinkedPtr::reset`].
    pub fn reset_box(&mut self, value: Box<T>) {
        self.replace_target(Some(NonNull::from(Box::leak(value))));
    }

    /// Replaces the value with a raw pointer owned only by this pointer. See [`LinkedPtr::reset`].
    ///
    /// # Safety
    ///
    /// Same contract as [`LinkedPtr::from_raw`]. In particular `ptr` must not be the value this
    /// pointer currently holds.
    pub unsafe fn reset_raw(&mut self, ptr: *mut T) {
        self.replace_target(NonNull::new(ptr));
    }

    /// Exchanges the values and chain positions of two pointers.
    ///
    /// The connectors move together with the value, so the neighbours of both pointers stay
    /// linked to the right place. This is the same as [`mem::swap`].
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    fn addr(&self) -> *const () {
        self.target
            .map_or(ptr::null(), |target| target.cast::<()>().as_ptr() as *const ())
    }

    fn replace_target(&mut self, target: Option<NonNull<T>>) {
        let doomed = self.detach();
        self.target = target;
        self.debug_check();
        drop(doomed);
    }

    /// Shares `target`, which must be the value of `src` viewed as a `T`.
    fn link_after<U>(&mut self, src: &LinkedPtr<U>, target: Option<NonNull<T>>)
    where
        U: ?Sized,
    {
        if self.addr() == src.addr() {
            return;
        }

        let doomed = self.detach();

        if let Some(target) = target {
            self.target = Some(target);

            unsafe {
                let next = src.right().get();
                self.right().set(next);
                Connector::repoint(next, Some(self.right));
                self.left().set(Some(src.right));
                src.right().set(Some(self.left));
            }

            trace!(value = std::any::type_name::<T>(), "linked pointer joined a chain");
        }

        self.debug_check();
        drop(doomed);
    }

    /// Splices this pointer out of its chain and clears the target. Returns the value if this
    /// pointer was its only owner; the caller drops it once the chain is consistent again.
    fn detach(&mut self) -> Option<Box<T>> {
        let unique = self.is_unique();

        let prev = self.left().take();
        let next = self.right().take();
        unsafe {
            Connector::repoint(prev, next);
            Connector::repoint(next, prev);
        }

        let target = self.target.take()?;
        if !unique {
            return None;
        }

        trace!(value = std::any::type_name::<T>(), "last linked pointer released its value");

        Some(unsafe { Box::from_raw(target.as_ptr()) })
    }

    fn debug_check(&self) {
        debug_assert!(
            self.target.is_some() || !(self.left().is_linked() || self.right().is_linked()),
            "null LinkedPtr is part of a chain"
        );
    }
}

#[cfg(feature = "unsize")]
unsafe impl<T, U> unsize::CoerciblePtr<U> for LinkedPtr<T>
where
    U: ?Sized,
{
    type Pointee = T;
    type Output = LinkedPtr<U>;

    fn as_sized_ptr(&mut self) -> *mut Self::Pointee {
        self.target.map_or(ptr::null_mut(), NonNull::as_ptr)
    }

    unsafe fn replace_ptr(self, ptr: *mut U) -> Self::Output {
        let this = ManuallyDrop::new(self);

        LinkedPtr {
            left: this.left,
            right: this.right,
            target: NonNull::new(ptr),
            _owns: PhantomData,
        }
    }
}

#[cfg(feature = "unsize")]
impl<T> LinkedPtr<T> {
    /// Converts this pointer with an unsizing coercion (e.g. from `T` to `dyn Trait`). The
    /// pointer keeps its place in the chain.
    ///
    /// ```
    /// # use linked_ptr::LinkedPtr;
    /// # use unsize::Coercion;
    /// let p = LinkedPtr::new(5);
    /// let q = p.clone();
    ///
    /// let q = LinkedPtr::unsize(q, Coercion::to_debug());
    /// assert!(p == q && !p.is_unique());
    /// ```
    pub fn unsize<U, F>(this: Self, with: unsize::Coercion<T, U, F>) -> LinkedPtr<U>
    where
        U: ?Sized,
        F: FnOnce(*const T) -> *const U,
    {
        unsize::CoerceUnsize::unsize(this, with)
    }

    /// Creates a new pointer of another element type that shares the value of this one. The new
    /// pointer is placed right after `self` in the chain, like a clone.
    pub fn share_unsized<U, F>(&self, with: unsize::Coercion<T, U, F>) -> LinkedPtr<U>
    where
        U: ?Sized,
        F: FnOnce(*const T) -> *const U,
    {
        let mut ret: LinkedPtr<U> = LinkedPtr::null();
        ret.copy_from_unsized(self, with);
        ret
    }
}

#[cfg(feature = "unsize")]
impl<T> LinkedPtr<T>
where
    T: ?Sized,
{
    /// [`LinkedPtr::copy_from`] for a source of another element type.
    pub fn copy_from_unsized<U, F>(&mut self, src: &LinkedPtr<U>, with: unsize::Coercion<U, T, F>)
    where
        F: FnOnce(*const U) -> *const T,
    {
        let target = src
            .target
            .map(|target| unsize::CoerceUnsize::unsize(target, with));
        self.link_after(src, target);
    }
}

impl<T> Clone for LinkedPtr<T>
where
    T: ?Sized,
{
    fn clone(&self) -> Self {
        let mut ret = Self::null();
        ret.copy_from(self);
        ret
    }

    fn clone_from(&mut self, source: &Self) {
        self.copy_from(source);
    }
}

impl<T> Default for LinkedPtr<T>
where
    T: ?Sized,
{
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<T> for LinkedPtr<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> From<Box<T>> for LinkedPtr<T>
where
    T: ?Sized,
{
    fn from(value: Box<T>) -> Self {
        Self::from_box(value)
    }
}

impl<T> Deref for LinkedPtr<T>
where
    T: ?Sized,
{
    type Target = T;

    /// # Panics
    ///
    /// Panics if the pointer is null.
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced a null LinkedPtr"),
        }
    }
}

impl<T> fmt::Debug for LinkedPtr<T>
where
    T: ?Sized + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => fmt::Debug::fmt(value, f),
            None => f.write_str("null"),
        }
    }
}

impl<T> fmt::Pointer for LinkedPtr<T>
where
    T: ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.addr(), f)
    }
}

impl<T, U> PartialEq<LinkedPtr<U>> for LinkedPtr<T>
where
    T: ?Sized,
    U: ?Sized,
{
    fn eq(&self, other: &LinkedPtr<U>) -> bool {
        PartialEq::eq(&self.addr(), &other.addr())
    }
}

impl<T> Eq for LinkedPtr<T> where T: ?Sized {}

impl<T, U> PartialOrd<LinkedPtr<U>> for LinkedPtr<T>
where
    T: ?Sized,
    U: ?Sized,
{
    fn partial_cmp(&self, other: &LinkedPtr<U>) -> Option<Ordering> {
        PartialOrd::partial_cmp(&self.addr(), &other.addr())
    }
}

impl<T> Ord for LinkedPtr<T>
where
    T: ?Sized,
{
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&self.addr(), &other.addr())
    }
}

impl<T> Hash for LinkedPtr<T>
where
    T: ?Sized,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.addr(), state)
    }
}
