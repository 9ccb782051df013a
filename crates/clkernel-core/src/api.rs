//! The native compute API boundary.
//!
//! [`KernelApi`] mirrors the four OpenCL entry points a kernel handle needs.
//! Pointer/size pairs are expressed as byte slices; an implementation passes
//! `value.len()` as the size and `value.as_ptr()` as the pointer.

use crate::error::Status;
use crate::handle::{RawDevice, RawKernel};

/// Native kernel entry points.
///
/// Every method returns the raw native status; callers convert it with
/// [`ClError::check`](crate::ClError::check).
pub trait KernelApi: Send + Sync {
    /// `clGetKernelInfo`.
    ///
    /// With `value == None` only the required size is written to `size_ret`.
    fn kernel_info(
        &self,
        kernel: RawKernel,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: &mut usize,
    ) -> Status;

    /// `clGetKernelWorkGroupInfo`.
    fn kernel_work_group_info(
        &self,
        kernel: RawKernel,
        device: RawDevice,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: &mut usize,
    ) -> Status;

    /// `clSetKernelArg` with `arg_size = value.len()`.
    fn set_kernel_arg(&self, kernel: RawKernel, index: u32, value: &[u8]) -> Status;

    /// `clReleaseKernel`.
    fn release_kernel(&self, kernel: RawKernel) -> Status;
}

impl<A: KernelApi + ?Sized> KernelApi for std::sync::Arc<A> {
    fn kernel_info(
        &self,
        kernel: RawKernel,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: &mut usize,
    ) -> Status {
        (**self).kernel_info(kernel, param, value, size_ret)
    }

    fn kernel_work_group_info(
        &self,
        kernel: RawKernel,
        device: RawDevice,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: &mut usize,
    ) -> Status {
        (**self).kernel_work_group_info(kernel, device, param, value, size_ret)
    }

    fn set_kernel_arg(&self, kernel: RawKernel, index: u32, value: &[u8]) -> Status {
        (**self).set_kernel_arg(kernel, index, value)
    }

    fn release_kernel(&self, kernel: RawKernel) -> Status {
        (**self).release_kernel(kernel)
    }
}
