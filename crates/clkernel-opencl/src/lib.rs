//! OpenCL backend for clkernel
//!
//! This crate provides the production [`KernelApi`] implementation, calling
//! the system OpenCL ICD loader through `opencl-sys`.
//!
//! # Requirements
//!
//! - The `opencl` cargo feature
//! - An OpenCL ICD loader (`libOpenCL.so` / `OpenCL.dll` / OpenCL.framework)
//!
//! Without the feature, [`OpenClApi`] is a stub whose every call reports
//! `CL_PLATFORM_NOT_FOUND_KHR`, so code written against it still builds.
//!
//! # Example
//!
//! ```ignore
//! use clkernel_opencl::{kernel_from_raw, OpenClKernel};
//!
//! // `raw` comes from clCreateKernel in the program-build layer.
//! let mut kernel: OpenClKernel = unsafe { kernel_from_raw(raw) };
//! println!("{} takes {} args", kernel.function_name()?, kernel.num_args()?);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

use std::ffi::c_void;

use clkernel_core::handle::RawKernel;
use clkernel_core::{Kernel, KernelConfig};

#[cfg(feature = "opencl")]
mod api;

#[cfg(feature = "opencl")]
pub use api::OpenClApi;

// Placeholder implementation when OpenCL is not available
#[cfg(not(feature = "opencl"))]
mod stub {
    use clkernel_core::error::Status;
    use clkernel_core::handle::{RawDevice, RawKernel};
    use clkernel_core::{ClError, KernelApi};

    /// Stub OpenCL API when the `opencl` feature is disabled.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct OpenClApi;

    impl OpenClApi {
        /// Creates the stub API.
        pub fn new() -> Self {
            Self
        }
    }

    const UNAVAILABLE: Status = ClError::PLATFORM_NOT_FOUND_KHR.code();

    impl KernelApi for OpenClApi {
        fn kernel_info(
            &self,
            _kernel: RawKernel,
            _param: u32,
            _value: Option<&mut [u8]>,
            _size_ret: &mut usize,
        ) -> Status {
            UNAVAILABLE
        }

        fn kernel_work_group_info(
            &self,
            _kernel: RawKernel,
            _device: RawDevice,
            _param: u32,
            _value: Option<&mut [u8]>,
            _size_ret: &mut usize,
        ) -> Status {
            UNAVAILABLE
        }

        fn set_kernel_arg(&self, _kernel: RawKernel, _index: u32, _value: &[u8]) -> Status {
            UNAVAILABLE
        }

        fn release_kernel(&self, _kernel: RawKernel) -> Status {
            UNAVAILABLE
        }
    }
}

#[cfg(not(feature = "opencl"))]
pub use stub::OpenClApi;

/// Kernel handle backed by the system OpenCL library.
pub type OpenClKernel = Kernel<OpenClApi>;

/// Wrap a `cl_kernel` produced by `clCreateKernel`.
///
/// # Safety
///
/// `raw` must be a valid `cl_kernel`; its reference is transferred to the
/// returned handle.
pub unsafe fn kernel_from_raw(raw: *mut c_void) -> OpenClKernel {
    // SAFETY: forwarded to the caller.
    unsafe { Kernel::from_raw(OpenClApi::new(), RawKernel::from_ptr(raw)) }
}

/// Wrap a `cl_kernel` with explicit configuration.
///
/// # Safety
///
/// Same contract as [`kernel_from_raw`].
pub unsafe fn kernel_from_raw_with_config(raw: *mut c_void, config: KernelConfig) -> OpenClKernel {
    // SAFETY: forwarded to the caller.
    unsafe { Kernel::from_raw_with_config(OpenClApi::new(), RawKernel::from_ptr(raw), config) }
}

/// Check if OpenCL is available at runtime.
///
/// Returns false if the `opencl` feature is disabled or the ICD loader
/// reports no platforms.
pub fn is_opencl_available() -> bool {
    #[cfg(feature = "opencl")]
    {
        api::platform_count() > 0
    }
    #[cfg(not(feature = "opencl"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(feature = "opencl"))]
    fn test_stub_reports_platform_not_found() {
        let mut kernel = unsafe {
            kernel_from_raw_with_config(
                0x1000 as *mut c_void,
                clkernel_core::KernelConfigBuilder::new()
                    .with_release_on_drop(false)
                    .build(),
            )
        };
        assert!(!is_opencl_available());
        assert_eq!(
            kernel.num_args().unwrap_err().native_code(),
            Some(clkernel_core::ClError::PLATFORM_NOT_FOUND_KHR.code())
        );
        assert_eq!(
            kernel.set_arg(0, 1i32),
            Err(clkernel_core::ClError::PLATFORM_NOT_FOUND_KHR)
        );
        // Release failure leaves the handle live.
        assert!(kernel.release().is_err());
        assert!(!kernel.is_released());
    }
}
