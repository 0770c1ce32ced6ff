use std::{
    cell::{
        BorrowError,
        BorrowMutError,
        Ref,
        RefCell,
        RefMut,
    },
    fmt::Debug,
    rc::Rc,
};

use crate::Error;

/// Fixed-length byte storage shared by reference.
///
/// Cloning a [`Storage`] does not copy the bytes: all clones alias the same
/// allocation, and a write through one of them is visible through all others.
/// Use [`Storage::snapshot`] to get an owned copy.
///
/// The length of the storage never changes after it was created.
#[derive(Clone, Default)]
pub struct Storage {
    inner: Rc<RefCell<Box<[u8]>>>,
    len: usize,
}

impl Storage {
    /// Allocates zero-filled storage of `length` bytes.
    pub fn zeroed(length: usize) -> Self {
        vec![0; length].into()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether `self` and `other` alias the same bytes.
    #[inline]
    pub fn ptr_eq(&self, other: &Storage) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns the number of handles sharing these bytes.
    #[inline]
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Returns a copy of the bytes.
    ///
    /// # Panic
    ///
    /// Panics if the bytes are currently borrowed mutably.
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.borrow().to_vec()
    }

    /// # Panic
    ///
    /// Panics if the bytes are currently borrowed mutably.
    #[inline]
    pub fn bytes(&self) -> Ref<'_, [u8]> {
        Ref::map(self.inner.borrow(), |bytes| &**bytes)
    }

    /// # Panic
    ///
    /// Panics if the bytes are currently borrowed.
    #[inline]
    pub fn bytes_mut(&self) -> RefMut<'_, [u8]> {
        RefMut::map(self.inner.borrow_mut(), |bytes| &mut **bytes)
    }

    #[inline]
    pub fn try_bytes(&self) -> Result<Ref<'_, [u8]>, BorrowError> {
        Ok(Ref::map(self.inner.try_borrow()?, |bytes| &**bytes))
    }

    #[inline]
    pub fn try_bytes_mut(&self) -> Result<RefMut<'_, [u8]>, BorrowMutError> {
        Ok(RefMut::map(self.inner.try_borrow_mut()?, |bytes| {
            &mut **bytes
        }))
    }

    pub(crate) fn checked_bytes(&self, operation: &'static str) -> Result<Ref<'_, [u8]>, Error> {
        self.try_bytes().map_err(|_| Error::borrowed(operation))
    }

    pub(crate) fn checked_bytes_mut(
        &self,
        operation: &'static str,
    ) -> Result<RefMut<'_, [u8]>, Error> {
        self.try_bytes_mut().map_err(|_| Error::borrowed(operation))
    }

    pub(crate) fn check_writable(&self, operation: &'static str) -> Result<(), Error> {
        self.checked_bytes_mut(operation).map(|_| ())
    }
}

impl From<Vec<u8>> for Storage {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        value.into_boxed_slice().into()
    }
}

impl From<Box<[u8]>> for Storage {
    #[inline]
    fn from(value: Box<[u8]>) -> Self {
        Self {
            len: value.len(),
            inner: Rc::new(RefCell::new(value)),
        }
    }
}

impl<'a> From<&'a [u8]> for Storage {
    #[inline]
    fn from(value: &'a [u8]) -> Self {
        value.to_vec().into()
    }
}

impl<const N: usize> From<[u8; N]> for Storage {
    #[inline]
    fn from(value: [u8; N]) -> Self {
        value.to_vec().into()
    }
}

impl PartialEq<[u8]> for Storage {
    fn eq(&self, other: &[u8]) -> bool {
        *self.bytes() == *other
    }
}

impl Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("len", &self.len())
            .field("handles", &self.handle_count())
            .finish()
    }
}
