//! Recording test double for [`KernelApi`].
//!
//! `MockApi` answers native queries from scripted responses and logs every
//! call so tests can assert on exact native traffic (call counts, argument
//! payloads). Share it with a kernel through `Arc<MockApi>`.
//!
//! ```ignore
//! let api = Arc::new(MockApi::new());
//! api.stub_function_name("myKernel");
//! let mut kernel = unsafe { Kernel::from_raw(Arc::clone(&api), MockApi::KERNEL) };
//! assert_eq!(kernel.function_name()?, "myKernel");
//! assert_eq!(api.kernel_info_calls(), 2);
//! ```

use std::collections::{HashMap, VecDeque};
use std::ffi::c_void;

use parking_lot::Mutex;

use crate::api::KernelApi;
use crate::error::{Status, CL_SUCCESS};
use crate::handle::{RawDevice, RawKernel};
use crate::info::KernelInfo;
use crate::work_group::WorkGroupInfo;

const CL_INVALID_VALUE: Status = -30;

/// One recorded native call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `clGetKernelInfo`; `sized` is false for a length-only query.
    KernelInfo {
        /// Kernel queried.
        kernel: RawKernel,
        /// `cl_kernel_info` code.
        param: u32,
        /// Whether a destination buffer was supplied.
        sized: bool,
    },
    /// `clGetKernelWorkGroupInfo`.
    WorkGroupInfo {
        /// Kernel queried.
        kernel: RawKernel,
        /// Device queried.
        device: RawDevice,
        /// `cl_kernel_work_group_info` code.
        param: u32,
    },
    /// `clSetKernelArg`.
    SetArg {
        /// Kernel bound.
        kernel: RawKernel,
        /// Argument index.
        index: u32,
        /// Exact payload bytes.
        value: Vec<u8>,
    },
    /// `clReleaseKernel`.
    Release {
        /// Kernel released.
        kernel: RawKernel,
    },
}

#[derive(Default)]
struct MockState {
    calls: Vec<MockCall>,
    kernel_info: HashMap<u32, Vec<u8>>,
    kernel_info_status: HashMap<u32, Status>,
    work_group_info: HashMap<(RawDevice, u32), Vec<u8>>,
    work_group_status: HashMap<u32, Status>,
    set_arg_status: HashMap<u32, Status>,
    release_status: VecDeque<Status>,
}

/// Scripted, recording implementation of the native kernel API.
#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    /// Kernel handle the mock conventionally hands out.
    pub const KERNEL: RawKernel = RawKernel::from_ptr(0x1000 as *mut c_void);

    /// Creates a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script raw response bytes for a kernel property.
    pub fn stub_kernel_info(&self, info: KernelInfo, bytes: impl Into<Vec<u8>>) {
        self.state.lock().kernel_info.insert(info.code(), bytes.into());
    }

    /// Script `CL_KERNEL_FUNCTION_NAME`, NUL terminator appended.
    pub fn stub_function_name(&self, name: &str) {
        let mut bytes = name.as_bytes().to_vec();
        bytes.push(0);
        self.stub_kernel_info(KernelInfo::FunctionName, bytes);
    }

    /// Script a `cl_uint` kernel property.
    pub fn stub_uint(&self, info: KernelInfo, value: u32) {
        self.stub_kernel_info(info, value.to_ne_bytes());
    }

    /// Script a handle-valued kernel property.
    pub fn stub_handle(&self, info: KernelInfo, addr: usize) {
        self.stub_kernel_info(info, addr.to_ne_bytes());
    }

    /// Script a `size_t` work-group property for one device.
    pub fn stub_work_group_size(&self, device: RawDevice, info: WorkGroupInfo, value: usize) {
        self.state
            .lock()
            .work_group_info
            .insert((device, info.code()), value.to_ne_bytes().to_vec());
    }

    /// Script a `cl_ulong` work-group property for one device.
    pub fn stub_work_group_ulong(&self, device: RawDevice, info: WorkGroupInfo, value: u64) {
        self.state
            .lock()
            .work_group_info
            .insert((device, info.code()), value.to_ne_bytes().to_vec());
    }

    /// Make every `clGetKernelInfo` for `param` return `status`.
    pub fn fail_kernel_info(&self, param: u32, status: Status) {
        self.state.lock().kernel_info_status.insert(param, status);
    }

    /// Make every `clGetKernelWorkGroupInfo` for `param` return `status`.
    pub fn fail_work_group_info(&self, param: u32, status: Status) {
        self.state.lock().work_group_status.insert(param, status);
    }

    /// Make every `clSetKernelArg` at `index` return `status`.
    pub fn fail_set_arg(&self, index: u32, status: Status) {
        self.state.lock().set_arg_status.insert(index, status);
    }

    /// Make the next `clReleaseKernel` return `status`.
    pub fn fail_next_release(&self, status: Status) {
        self.state.lock().release_status.push_back(status);
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    /// Total number of native calls.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Number of `clGetKernelInfo` calls.
    pub fn kernel_info_calls(&self) -> usize {
        self.count(|call| matches!(call, MockCall::KernelInfo { .. }))
    }

    /// Number of `clGetKernelWorkGroupInfo` calls.
    pub fn work_group_info_calls(&self) -> usize {
        self.count(|call| matches!(call, MockCall::WorkGroupInfo { .. }))
    }

    /// Recorded `clSetKernelArg` calls as `(index, payload)`.
    pub fn set_arg_calls(&self) -> Vec<(u32, Vec<u8>)> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::SetArg { index, value, .. } => Some((*index, value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of `clReleaseKernel` calls.
    pub fn release_calls(&self) -> usize {
        self.count(|call| matches!(call, MockCall::Release { .. }))
    }

    /// Forget recorded calls, keep scripted responses.
    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn count(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(*c)).count()
    }
}

/// Copy a scripted response into the caller's buffer.
fn answer(bytes: Option<&Vec<u8>>, value: Option<&mut [u8]>, size_ret: &mut usize) -> Status {
    let Some(bytes) = bytes else {
        return CL_INVALID_VALUE;
    };
    if let Some(dst) = value {
        if dst.len() < bytes.len() {
            return CL_INVALID_VALUE;
        }
        dst[..bytes.len()].copy_from_slice(bytes);
    }
    *size_ret = bytes.len();
    CL_SUCCESS
}

impl KernelApi for MockApi {
    fn kernel_info(
        &self,
        kernel: RawKernel,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: &mut usize,
    ) -> Status {
        let mut state = self.state.lock();
        state.calls.push(MockCall::KernelInfo {
            kernel,
            param,
            sized: value.is_some(),
        });
        if let Some(status) = state.kernel_info_status.get(&param) {
            return *status;
        }
        answer(state.kernel_info.get(&param), value, size_ret)
    }

    fn kernel_work_group_info(
        &self,
        kernel: RawKernel,
        device: RawDevice,
        param: u32,
        value: Option<&mut [u8]>,
        size_ret: &mut usize,
    ) -> Status {
        let mut state = self.state.lock();
        state.calls.push(MockCall::WorkGroupInfo {
            kernel,
            device,
            param,
        });
        if let Some(status) = state.work_group_status.get(&param) {
            return *status;
        }
        answer(state.work_group_info.get(&(device, param)), value, size_ret)
    }

    fn set_kernel_arg(&self, kernel: RawKernel, index: u32, value: &[u8]) -> Status {
        let mut state = self.state.lock();
        state.calls.push(MockCall::SetArg {
            kernel,
            index,
            value: value.to_vec(),
        });
        state.set_arg_status.get(&index).copied().unwrap_or(CL_SUCCESS)
    }

    fn release_kernel(&self, kernel: RawKernel) -> Status {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Release { kernel });
        state.release_status.pop_front().unwrap_or(CL_SUCCESS)
    }
}
