//! `KernelApi` over the system OpenCL ICD loader.

use std::ffi::c_void;
use std::ptr;

use opencl_sys::{
    clGetKernelInfo, clGetKernelWorkGroupInfo, clGetPlatformIDs, clReleaseKernel,
    clSetKernelArg, cl_device_id, cl_kernel, cl_uint, CL_SUCCESS,
};

use clkernel_core::error::Status;
use clkernel_core::handle::{RawDevice, RawKernel};
use clkernel_core::KernelApi;

/// Native kernel entry points resolved from the linked OpenCL library.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenClApi;

impl OpenClApi {
    /// Creates the API handle.
    pub fn new() -> Self {
        Self
    }
}

fn out_ptr(value: Option<&mut [u8]>) -> (usize, *mut c_void) {
    match value {
        Some(buf) => (buf.len(), buf.as_mut_ptr().cast()),
        None => (0, ptr::null_mut()),
    }
}

impl KernelApi for OpenClApi {
    fn kernel_info(
        &self,
        kernel: RawKernel,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: &mut usize,
    ) -> Status {
        let (size, dst) = out_ptr(value);
        // SAFETY: `dst` is either null with size 0 or a live buffer of `size` bytes.
        unsafe {
            clGetKernelInfo(
                kernel.as_ptr() as cl_kernel,
                param,
                size,
                dst,
                size_ret,
            )
        }
    }

    fn kernel_work_group_info(
        &self,
        kernel: RawKernel,
        device: RawDevice,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: &mut usize,
    ) -> Status {
        let (size, dst) = out_ptr(value);
        // SAFETY: as in `kernel_info`.
        unsafe {
            clGetKernelWorkGroupInfo(
                kernel.as_ptr() as cl_kernel,
                device.as_ptr() as cl_device_id,
                param,
                size,
                dst,
                size_ret,
            )
        }
    }

    fn set_kernel_arg(&self, kernel: RawKernel, index: u32, value: &[u8]) -> Status {
        // SAFETY: the driver copies `value.len()` bytes before returning.
        unsafe {
            clSetKernelArg(
                kernel.as_ptr() as cl_kernel,
                index,
                value.len(),
                value.as_ptr().cast(),
            )
        }
    }

    fn release_kernel(&self, kernel: RawKernel) -> Status {
        // SAFETY: the caller owns one reference to `kernel`.
        unsafe { clReleaseKernel(kernel.as_ptr() as cl_kernel) }
    }
}

/// Number of OpenCL platforms reported by the ICD loader.
pub(crate) fn platform_count() -> usize {
    let mut count: cl_uint = 0;
    // SAFETY: count-only query with a null destination.
    let status = unsafe { clGetPlatformIDs(0, ptr::null_mut(), &mut count) };
    if status == CL_SUCCESS {
        count as usize
    } else {
        tracing::debug!(status, "clGetPlatformIDs failed");
        0
    }
}
