//! Kernel handle: property queries, argument binding and release.

use std::any::Any;
use std::collections::HashMap;
use std::mem::size_of;

use crate::api::KernelApi;
use crate::args::KernelArg;
use crate::config::KernelConfig;
use crate::error::{ClError, DisplayStatus, QueryError, Result, CL_SUCCESS};
use crate::handle::{Device, RawContext, RawDevice, RawKernel, RawProgram};
use crate::info::{KernelInfo, KernelInfoValue, QueryShape};
use crate::work_group::{WorkGroupInfo, WorkGroupInfoValue};

/// Largest fixed-size query destination (`size_t[3]`).
const MAX_FIXED_QUERY: usize = 3 * size_of::<usize>();

/// Result of a property query.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// Owned handle to a compiled OpenCL kernel object.
///
/// The handle exclusively owns one reference to the native kernel until
/// [`release`](Self::release) succeeds. Resolved properties are memoized per
/// handle; work-group properties are memoized per `(device, property)`.
///
/// Every mutating operation takes `&mut self`. Share a kernel across threads
/// behind a `Mutex` or give each worker its own handle.
pub struct Kernel<A: KernelApi> {
    /// Native reference; null once released.
    raw: RawKernel,
    /// Native API used for every call.
    api: A,
    /// Behaviour switches.
    config: KernelConfig,
    /// Resolved kernel-level properties.
    properties: HashMap<KernelInfo, KernelInfoValue>,
    /// Resolved work-group properties.
    work_group_properties: HashMap<(RawDevice, WorkGroupInfo), WorkGroupInfoValue>,
}

impl<A: KernelApi> Kernel<A> {
    /// Take ownership of a native kernel reference.
    ///
    /// # Safety
    ///
    /// `raw` must be a valid `cl_kernel` whose reference is transferred to the
    /// returned handle; nothing else may release it.
    pub unsafe fn from_raw(api: A, raw: RawKernel) -> Self {
        // SAFETY: forwarded to the caller.
        unsafe { Self::from_raw_with_config(api, raw, KernelConfig::default()) }
    }

    /// Take ownership of a native kernel reference with explicit configuration.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw`](Self::from_raw).
    pub unsafe fn from_raw_with_config(api: A, raw: RawKernel, config: KernelConfig) -> Self {
        Self {
            raw,
            api,
            config,
            properties: HashMap::new(),
            work_group_properties: HashMap::new(),
        }
    }

    /// The native kernel reference (null once released).
    pub fn raw(&self) -> RawKernel {
        self.raw
    }

    /// True once the native reference has been released.
    pub fn is_released(&self) -> bool {
        self.raw.is_null()
    }

    /// Active configuration.
    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Native API backing this handle.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Drop all memoized property values.
    pub fn clear_cache(&mut self) {
        self.properties.clear();
        self.work_group_properties.clear();
    }

    /// Give up ownership of the native reference without releasing it.
    pub fn into_raw(mut self) -> RawKernel {
        std::mem::replace(&mut self.raw, RawKernel::null())
    }

    fn live(&self) -> Result<RawKernel> {
        if self.raw.is_null() {
            Err(ClError::INVALID_KERNEL)
        } else {
            Ok(self.raw)
        }
    }

    fn caches(&self, info: KernelInfo) -> bool {
        self.config.cache_properties
            && !(info == KernelInfo::ReferenceCount && self.config.refresh_reference_count)
    }

    // ---- kernel-level properties ----

    /// Resolve a kernel-level property.
    ///
    /// Cached values are returned without a native call. String properties
    /// that report a length below one resolve to an empty string.
    pub fn property(&mut self, info: KernelInfo) -> QueryResult<KernelInfoValue> {
        let raw = self.live()?;
        let cache = self.caches(info);
        if cache {
            if let Some(value) = self.properties.get(&info) {
                return Ok(value.clone());
            }
        }

        let value = match info.shape() {
            QueryShape::String => KernelInfoValue::Str(self.query_string(raw, info)?),
            _ => self.query_fixed(raw, info)?,
        };
        tracing::debug!(kernel = ?raw, property = info.name(), ?value, "resolved kernel property");

        if cache {
            self.properties.insert(info, value.clone());
        }
        Ok(value)
    }

    /// Resolve a kernel-level property from its raw `cl_kernel_info` code.
    ///
    /// Unknown codes fail with [`QueryError::Unsupported`] without a native call.
    pub fn property_by_code(&mut self, code: u32) -> QueryResult<KernelInfoValue> {
        let info = KernelInfo::from_code(code).ok_or(QueryError::Unsupported(code))?;
        self.property(info)
    }

    fn query_string(&self, raw: RawKernel, info: KernelInfo) -> QueryResult<String> {
        let mut len = 0usize;
        let status = self.api.kernel_info(raw, info.code(), None, &mut len);
        ClError::check(status)?;
        if len < 1 {
            return Ok(String::new());
        }

        let mut buf = vec![0u8; len];
        let mut filled = 0usize;
        let status = self
            .api
            .kernel_info(raw, info.code(), Some(buf.as_mut_slice()), &mut filled);
        ClError::check(status)?;
        if filled < 1 {
            return Ok(String::new());
        }

        // Drop the native terminator.
        let end = (filled - 1).min(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    fn query_fixed(&self, raw: RawKernel, info: KernelInfo) -> QueryResult<KernelInfoValue> {
        let width = info
            .shape()
            .fixed_size()
            .ok_or(QueryError::NotImplemented(info.name()))?;
        let mut buf = [0u8; MAX_FIXED_QUERY];
        let mut size_ret = 0usize;
        let status = self
            .api
            .kernel_info(raw, info.code(), Some(&mut buf[..width]), &mut size_ret);
        ClError::check(status)?;
        info.decode_fixed(&buf[..width])
            .ok_or(QueryError::Native(ClError::INVALID_VALUE))
    }

    /// `CL_KERNEL_FUNCTION_NAME`.
    pub fn function_name(&mut self) -> QueryResult<String> {
        self.string_property(KernelInfo::FunctionName)
    }

    /// `CL_KERNEL_ATTRIBUTES`.
    pub fn attributes(&mut self) -> QueryResult<String> {
        self.string_property(KernelInfo::Attributes)
    }

    /// `CL_KERNEL_NUM_ARGS`.
    pub fn num_args(&mut self) -> QueryResult<u32> {
        self.uint_property(KernelInfo::NumArgs)
    }

    /// `CL_KERNEL_REFERENCE_COUNT`.
    pub fn reference_count(&mut self) -> QueryResult<u32> {
        self.uint_property(KernelInfo::ReferenceCount)
    }

    /// `CL_KERNEL_CONTEXT`.
    pub fn context(&mut self) -> QueryResult<RawContext> {
        let value = self.property(KernelInfo::Context)?;
        value.as_context().ok_or(QueryError::Native(ClError::INVALID_VALUE))
    }

    /// `CL_KERNEL_PROGRAM`.
    pub fn program(&mut self) -> QueryResult<RawProgram> {
        let value = self.property(KernelInfo::Program)?;
        value.as_program().ok_or(QueryError::Native(ClError::INVALID_VALUE))
    }

    fn string_property(&mut self, info: KernelInfo) -> QueryResult<String> {
        match self.property(info)? {
            KernelInfoValue::Str(s) => Ok(s),
            _ => Err(QueryError::Native(ClError::INVALID_VALUE)),
        }
    }

    fn uint_property(&mut self, info: KernelInfo) -> QueryResult<u32> {
        let value = self.property(info)?;
        value.as_u32().ok_or(QueryError::Native(ClError::INVALID_VALUE))
    }

    // ---- work-group properties ----

    /// Resolve a work-group property of this kernel on `device`.
    ///
    /// `CL_KERNEL_COMPILE_WORK_GROUP_SIZE` is recognized but not implemented
    /// and fails with [`QueryError::NotImplemented`] without a native call.
    pub fn work_group_property(
        &mut self,
        device: &Device,
        info: WorkGroupInfo,
    ) -> QueryResult<WorkGroupInfoValue> {
        let raw = self.live()?;
        let key = (device.raw(), info);
        if self.config.cache_properties {
            if let Some(value) = self.work_group_properties.get(&key) {
                return Ok(*value);
            }
        }

        let width = match info.shape() {
            QueryShape::Size | QueryShape::Ulong => info.shape().fixed_size(),
            _ => None,
        }
        .ok_or(QueryError::NotImplemented(info.name()))?;

        let mut buf = [0u8; MAX_FIXED_QUERY];
        let mut size_ret = 0usize;
        let status = self.api.kernel_work_group_info(
            raw,
            device.raw(),
            info.code(),
            Some(&mut buf[..width]),
            &mut size_ret,
        );
        ClError::check(status)?;
        let value = info
            .decode(&buf[..width])
            .ok_or(QueryError::Native(ClError::INVALID_VALUE))?;
        tracing::debug!(
            kernel = ?raw,
            device = ?device.raw(),
            property = info.name(),
            ?value,
            "resolved work-group property"
        );

        if self.config.cache_properties {
            self.work_group_properties.insert(key, value);
        }
        Ok(value)
    }

    /// Resolve a work-group property from its raw code.
    ///
    /// Unknown codes fail with [`QueryError::Unsupported`] without a native call.
    pub fn work_group_property_by_code(
        &mut self,
        device: &Device,
        code: u32,
    ) -> QueryResult<WorkGroupInfoValue> {
        let info = WorkGroupInfo::from_code(code).ok_or(QueryError::Unsupported(code))?;
        self.work_group_property(device, info)
    }

    /// `CL_KERNEL_WORK_GROUP_SIZE` on `device`.
    pub fn work_group_size(&mut self, device: &Device) -> QueryResult<usize> {
        self.size_property(device, WorkGroupInfo::WorkGroupSize)
    }

    /// `CL_KERNEL_PREFERRED_WORK_GROUP_SIZE_MULTIPLE` on `device`.
    pub fn preferred_work_group_size_multiple(&mut self, device: &Device) -> QueryResult<usize> {
        self.size_property(device, WorkGroupInfo::PreferredWorkGroupSizeMultiple)
    }

    /// `CL_KERNEL_LOCAL_MEM_SIZE` on `device`, in bytes.
    pub fn local_mem_size(&mut self, device: &Device) -> QueryResult<u64> {
        self.ulong_property(device, WorkGroupInfo::LocalMemSize)
    }

    /// `CL_KERNEL_PRIVATE_MEM_SIZE` on `device`, in bytes.
    pub fn private_mem_size(&mut self, device: &Device) -> QueryResult<u64> {
        self.ulong_property(device, WorkGroupInfo::PrivateMemSize)
    }

    fn size_property(&mut self, device: &Device, info: WorkGroupInfo) -> QueryResult<usize> {
        let value = self.work_group_property(device, info)?;
        value.as_usize().ok_or(QueryError::Native(ClError::INVALID_VALUE))
    }

    fn ulong_property(&mut self, device: &Device, info: WorkGroupInfo) -> QueryResult<u64> {
        let value = self.work_group_property(device, info)?;
        value.as_u64().ok_or(QueryError::Native(ClError::INVALID_VALUE))
    }

    // ---- argument binding ----

    /// Bind `value` to the argument at `index` (0-based).
    ///
    /// Buffers, images and samplers bind their native handle; scalars bind
    /// by value. Keeping `index` below `CL_KERNEL_NUM_ARGS` is the caller's
    /// responsibility.
    pub fn set_arg<'a>(&mut self, index: u32, value: impl Into<KernelArg<'a>>) -> Result<()> {
        let raw = self.live()?;
        let arg = value.into();
        let payload = arg.encode();
        let status = self.api.set_kernel_arg(raw, index, payload.as_bytes());
        if status != CL_SUCCESS {
            tracing::debug!(
                kernel = ?raw,
                index,
                kind = arg.kind(),
                status = %DisplayStatus(status),
                "argument binding failed"
            );
        } else {
            tracing::trace!(kernel = ?raw, index, kind = arg.kind(), "bound kernel argument");
        }
        ClError::check(status)
    }

    /// Bind a dynamically typed value.
    ///
    /// Types other than `Buffer`, `Image`, `Sampler`, `i32` and `f32` fail with
    /// `CL_INVALID_VALUE` before any native call.
    pub fn set_arg_any(&mut self, index: u32, value: &dyn Any) -> Result<()> {
        let arg = KernelArg::from_any(value)?;
        self.set_arg(index, arg)
    }

    /// Bind `values` to consecutive indices starting at `offset`.
    ///
    /// Stops at the first failure and returns it. Bindings issued before the
    /// failure stay in effect on the native kernel.
    pub fn set_args(&mut self, offset: u32, values: &[KernelArg<'_>]) -> Result<()> {
        for (i, value) in values.iter().enumerate() {
            let index = u32::try_from(i)
                .ok()
                .and_then(|i| offset.checked_add(i))
                .ok_or(ClError::INVALID_ARG_INDEX)?;
            self.set_arg(index, *value)?;
        }
        Ok(())
    }

    // ---- lifetime ----

    /// Release the native kernel reference.
    ///
    /// Idempotent: a released handle returns `Ok(())` without a native call.
    /// On native failure the reference is kept so the release can be retried.
    pub fn release(&mut self) -> Result<()> {
        if self.raw.is_null() {
            return Ok(());
        }
        let status = self.api.release_kernel(self.raw);
        if let Err(err) = ClError::check(status) {
            tracing::warn!(kernel = ?self.raw, error = %err, "kernel release failed");
            return Err(err);
        }
        tracing::info!(kernel = ?self.raw, "released kernel");
        self.raw = RawKernel::null();
        self.clear_cache();
        Ok(())
    }
}

impl<A: KernelApi> Drop for Kernel<A> {
    fn drop(&mut self) {
        if self.config.release_on_drop && !self.raw.is_null() {
            // Best effort; failures are already logged by release().
            let _ = self.release();
        }
    }
}

impl<A: KernelApi> std::fmt::Debug for Kernel<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("raw", &self.raw)
            .field("config", &self.config)
            .field("cached_properties", &self.properties.len())
            .field("cached_work_group_properties", &self.work_group_properties.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockApi, MockCall};
    use std::sync::Arc;

    fn kernel_with(api: &Arc<MockApi>) -> Kernel<Arc<MockApi>> {
        unsafe { Kernel::from_raw(Arc::clone(api), MockApi::KERNEL) }
    }

    #[test]
    fn test_function_name_two_phase() {
        let api = Arc::new(MockApi::new());
        api.stub_function_name("myKernel");
        let mut kernel = kernel_with(&api);

        assert_eq!(kernel.function_name().unwrap(), "myKernel");
        assert_eq!(
            api.calls(),
            vec![
                MockCall::KernelInfo {
                    kernel: MockApi::KERNEL,
                    param: KernelInfo::FunctionName.code(),
                    sized: false,
                },
                MockCall::KernelInfo {
                    kernel: MockApi::KERNEL,
                    param: KernelInfo::FunctionName.code(),
                    sized: true,
                },
            ]
        );
    }

    #[test]
    fn test_empty_string_property() {
        let api = Arc::new(MockApi::new());
        api.stub_kernel_info(KernelInfo::Attributes, Vec::new());
        let mut kernel = kernel_with(&api);

        assert_eq!(kernel.attributes().unwrap(), "");
        // Length query only.
        assert_eq!(api.kernel_info_calls(), 1);
    }

    #[test]
    fn test_uint_property_cached() {
        let api = Arc::new(MockApi::new());
        api.stub_uint(KernelInfo::NumArgs, 3);
        let mut kernel = kernel_with(&api);

        assert_eq!(kernel.num_args().unwrap(), 3);
        assert_eq!(kernel.num_args().unwrap(), 3);
        assert_eq!(api.kernel_info_calls(), 1);
    }

    #[test]
    fn test_native_failure_surfaces_code() {
        let api = Arc::new(MockApi::new());
        api.fail_kernel_info(KernelInfo::Context.code(), -5);
        let mut kernel = kernel_with(&api);

        let err = kernel.context().unwrap_err();
        assert_eq!(err.native_code(), Some(-5));
        // Failures are not cached.
        let _ = kernel.context();
        assert_eq!(api.kernel_info_calls(), 2);
    }

    #[test]
    fn test_uncached_config() {
        let api = Arc::new(MockApi::new());
        api.stub_uint(KernelInfo::NumArgs, 2);
        let mut kernel = unsafe {
            Kernel::from_raw_with_config(Arc::clone(&api), MockApi::KERNEL, KernelConfig::uncached())
        };

        kernel.num_args().unwrap();
        kernel.num_args().unwrap();
        assert_eq!(api.kernel_info_calls(), 2);
    }

    #[test]
    fn test_live_reference_count() {
        let api = Arc::new(MockApi::new());
        api.stub_uint(KernelInfo::ReferenceCount, 1);
        api.stub_uint(KernelInfo::NumArgs, 4);
        let mut kernel = unsafe {
            Kernel::from_raw_with_config(
                Arc::clone(&api),
                MockApi::KERNEL,
                KernelConfig::live_refcount(),
            )
        };

        assert_eq!(kernel.reference_count().unwrap(), 1);
        api.stub_uint(KernelInfo::ReferenceCount, 2);
        assert_eq!(kernel.reference_count().unwrap(), 2);

        kernel.num_args().unwrap();
        kernel.num_args().unwrap();
        assert_eq!(api.kernel_info_calls(), 3);
    }

    #[test]
    fn test_compile_work_group_size_not_implemented() {
        let api = Arc::new(MockApi::new());
        let mut kernel = kernel_with(&api);
        let device = Device::from_raw(RawDevice::from_addr(0x10));

        let err = kernel
            .work_group_property(&device, WorkGroupInfo::CompileWorkGroupSize)
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::NotImplemented("CL_KERNEL_COMPILE_WORK_GROUP_SIZE")
        );
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn test_released_handle_fails_cleanly() {
        let api = Arc::new(MockApi::new());
        api.stub_uint(KernelInfo::NumArgs, 1);
        let mut kernel = kernel_with(&api);
        kernel.num_args().unwrap();
        kernel.release().unwrap();
        api.reset_calls();

        assert!(kernel.is_released());
        assert_eq!(
            kernel.num_args().unwrap_err(),
            QueryError::Native(ClError::INVALID_KERNEL)
        );
        assert_eq!(kernel.set_arg(0, 1i32), Err(ClError::INVALID_KERNEL));
        assert_eq!(api.call_count(), 0);
    }

    #[test]
    fn test_release_failure_keeps_reference() {
        let api = Arc::new(MockApi::new());
        api.fail_next_release(-48);
        let mut kernel = kernel_with(&api);

        assert_eq!(kernel.release(), Err(ClError::new(-48)));
        assert!(!kernel.is_released());
        assert!(kernel.release().is_ok());
        assert!(kernel.is_released());
        assert_eq!(api.release_calls(), 2);
    }

    #[test]
    fn test_drop_releases() {
        let api = Arc::new(MockApi::new());
        drop(kernel_with(&api));
        assert_eq!(api.release_calls(), 1);
    }

    #[test]
    fn test_into_raw_skips_release() {
        let api = Arc::new(MockApi::new());
        let raw = kernel_with(&api).into_raw();
        assert_eq!(raw, MockApi::KERNEL);
        assert_eq!(api.release_calls(), 0);
    }
}
