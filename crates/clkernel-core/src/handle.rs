//! Opaque native handles.
//!
//! These are the raw `cl_*` object references handed to this crate by the
//! surrounding binding layer (program build, device enumeration, memory
//! allocation). None of them owns the object it names; ownership lives with
//! [`Kernel`](crate::Kernel) for kernels and with the allocating collaborator
//! for everything else.

use std::ffi::c_void;
use std::ptr;

macro_rules! raw_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(*mut c_void);

        impl $name {
            /// The null handle.
            pub const fn null() -> Self {
                Self(ptr::null_mut())
            }

            /// Wrap a raw native pointer.
            pub const fn from_ptr(ptr: *mut c_void) -> Self {
                Self(ptr)
            }

            /// The raw native pointer.
            pub const fn as_ptr(self) -> *mut c_void {
                self.0
            }

            /// True for the null handle.
            pub fn is_null(self) -> bool {
                self.0.is_null()
            }

            /// Handle value as an address-sized integer.
            pub fn addr(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_addr(addr: usize) -> Self {
                Self(addr as *mut c_void)
            }
        }

        // Handles are plain identifiers; thread-safety of the object they name
        // is the native API's concern.
        unsafe impl Send for $name {}
        unsafe impl Sync for $name {}
    };
}

raw_handle!(
    /// Native `cl_kernel`.
    RawKernel
);
raw_handle!(
    /// Native `cl_device_id`.
    RawDevice
);
raw_handle!(
    /// Native `cl_context`.
    RawContext
);
raw_handle!(
    /// Native `cl_program`.
    RawProgram
);
raw_handle!(
    /// Native `cl_mem` (buffer or image).
    RawMem
);
raw_handle!(
    /// Native `cl_sampler`.
    RawSampler
);

/// Device a kernel is queried against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Device {
    raw: RawDevice,
}

impl Device {
    /// Wrap a device id obtained from device enumeration.
    pub fn from_raw(raw: RawDevice) -> Self {
        Self { raw }
    }

    /// The native device id.
    pub fn raw(&self) -> RawDevice {
        self.raw
    }
}

/// Borrowed view of a buffer object allocated elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Buffer {
    raw: RawMem,
}

impl Buffer {
    /// Wrap a `cl_mem` created with `clCreateBuffer`.
    pub fn from_raw(raw: RawMem) -> Self {
        Self { raw }
    }

    /// The native memory object.
    pub fn raw(&self) -> RawMem {
        self.raw
    }
}

/// Borrowed view of an image object allocated elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Image {
    raw: RawMem,
}

impl Image {
    /// Wrap a `cl_mem` created with `clCreateImage`.
    pub fn from_raw(raw: RawMem) -> Self {
        Self { raw }
    }

    /// The native memory object.
    pub fn raw(&self) -> RawMem {
        self.raw
    }
}

/// Borrowed view of a sampler object allocated elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sampler {
    raw: RawSampler,
}

impl Sampler {
    /// Wrap a `cl_sampler` created with `clCreateSampler`.
    pub fn from_raw(raw: RawSampler) -> Self {
        Self { raw }
    }

    /// The native sampler object.
    pub fn raw(&self) -> RawSampler {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(RawKernel::null().is_null());
        assert_eq!(RawKernel::null().addr(), 0);
    }

    #[test]
    fn test_addr_round_trip() {
        let raw = RawContext::from_addr(0xdead_0000);
        assert_eq!(raw.addr(), 0xdead_0000);
        assert!(!raw.is_null());
    }
}
