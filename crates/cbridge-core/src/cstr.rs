//! Owned null-terminated string buffers crossing the native boundary.
//!
//! A `char*` returned by native code points at memory the host now owns.
//! [`OwnedCStr`] wraps that buffer and offers exactly one release path:
//! [`release`](OwnedCStr::release) with the paired native deallocator, or
//! [`into_raw`](OwnedCStr::into_raw) to hand ownership back to the caller.
//! Consuming `self` makes a second release unrepresentable.
//!
//! Dropping an `OwnedCStr` that was neither released nor unwrapped frees the
//! buffer through the platform's general-purpose deallocator as a scoped
//! fallback. When the native side requires its own deallocation routine,
//! call `release` explicitly instead of leaning on drop.

use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;
use std::ptr::NonNull;
use std::str::Utf8Error;

use libc::{c_char, c_void};

/// An owned, native-heap, null-terminated byte buffer.
pub struct OwnedCStr {
    ptr: NonNull<c_char>,
    released: bool,
}

// The buffer is exclusively owned and never written after construction.
unsafe impl Send for OwnedCStr {}
unsafe impl Sync for OwnedCStr {}

impl OwnedCStr {
    /// Take ownership of a native buffer.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must point at a null-terminated buffer allocated on the native
    /// heap (compatible with `free`), and nothing else may retain ownership
    /// of it afterwards.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Option<OwnedCStr> {
        NonNull::new(ptr).map(|ptr| OwnedCStr {
            ptr,
            released: false,
        })
    }

    /// Borrow the buffer address without giving up ownership.
    pub fn as_ptr(&self) -> *const c_char {
        self.ptr.as_ptr()
    }

    /// The buffer contents up to (excluding) the terminator.
    pub fn to_bytes(&self) -> &[u8] {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_bytes()
    }

    /// The contents as UTF-8.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(self.to_bytes())
    }

    /// The contents as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.to_bytes())
    }

    /// Release the buffer through the paired native deallocator.
    ///
    /// Runs exactly once; the token is consumed.
    pub fn release(mut self, free_fn: unsafe extern "C" fn(*mut c_void)) {
        unsafe { free_fn(self.ptr.as_ptr().cast()) };
        self.released = true;
    }

    /// Unwrap the raw pointer, transferring ownership back to the caller.
    pub fn into_raw(mut self) -> *mut c_char {
        self.released = true;
        self.ptr.as_ptr()
    }
}

impl Drop for OwnedCStr {
    fn drop(&mut self) {
        if !self.released {
            unsafe { libc::free(self.ptr.as_ptr().cast()) };
        }
    }
}

impl fmt::Debug for OwnedCStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedCStr")
            .field(&self.to_string_lossy())
            .finish()
    }
}

impl PartialEq for OwnedCStr {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}
