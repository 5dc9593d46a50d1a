use std::ops::{Deref, DerefMut};

/// Owner of a pointer allocated by sqlite, released with `dealloc` unless null.
#[derive(Debug)]
pub(crate) struct CBox<T> {
    pub(crate) ptr: *mut T,
    dealloc: fn(*mut T),
}

impl<T> CBox<T> {
    pub fn new(ptr: *mut T, dealloc: fn(*mut T)) -> Self {
        Self { ptr, dealloc }
    }
}

impl<T> Drop for CBox<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            (self.dealloc)(self.ptr);
        }
    }
}

impl<T> Deref for CBox<T> {
    type Target = *mut T;

    fn deref(&self) -> &Self::Target {
        &self.ptr
    }
}

impl<T> DerefMut for CBox<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.ptr
    }
}

unsafe impl<T> Send for CBox<T> {}
unsafe impl<T> Sync for CBox<T> {}

#[cfg(test)]
mod tests {
    use crate::cbox::CBox;
    use std::{
        ptr,
        sync::atomic::{AtomicBool, Ordering},
    };

    #[test]
    fn cbox_releases_only_non_null() {
        static RELEASED: AtomicBool = AtomicBool::new(false);
        {
            let empty = CBox::<i32>::new(ptr::null_mut(), |_| RELEASED.store(true, Ordering::SeqCst));
            assert!(empty.is_null());
        }
        assert!(!RELEASED.load(Ordering::SeqCst));
        let mut value = 123;
        {
            let boxed = CBox::new(&mut value as *mut i32, |_| RELEASED.store(true, Ordering::SeqCst));
            assert_eq!(unsafe { **boxed }, 123);
            assert!(!RELEASED.load(Ordering::SeqCst));
        }
        assert!(RELEASED.load(Ordering::SeqCst));
    }
}
