//! OpenCL Kernel Verification Tests
//!
//! These tests build a real kernel through the ICD loader and check that the
//! handle's queries and bindings reach the driver. They require an OpenCL
//! platform and run only with `--features opencl -- --ignored`.

#![cfg(feature = "opencl")]

use std::ffi::{c_void, CString};
use std::ptr;

use opencl_sys::{
    clBuildProgram, clCreateBuffer, clCreateContext, clCreateKernel, clCreateProgramWithSource,
    clGetDeviceIDs, clGetPlatformIDs, clReleaseContext, clReleaseMemObject, clReleaseProgram,
    cl_context, cl_device_id, cl_int, cl_mem, cl_platform_id, cl_program, cl_uint,
    CL_DEVICE_TYPE_ALL, CL_MEM_READ_WRITE, CL_SUCCESS,
};

use clkernel_core::handle::{RawDevice, RawMem};
use clkernel_core::{Buffer, Device, KernelArg, WorkGroupInfo};
use clkernel_opencl::{is_opencl_available, kernel_from_raw};

/// OpenCL C kernel that scales a float array in place.
const SCALE_KERNEL_CL: &str = r#"
__kernel void scale(__global float* data, float factor, int count) {
    int gid = get_global_id(0);
    if (gid < count) {
        data[gid] = data[gid] * factor;
    }
}
"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Context, program and device for the scale kernel.
struct Fixture {
    device: cl_device_id,
    context: cl_context,
    program: cl_program,
}

impl Fixture {
    fn new() -> Self {
        unsafe {
            let mut platform: cl_platform_id = ptr::null_mut();
            let mut num_platforms: cl_uint = 0;
            assert_eq!(clGetPlatformIDs(1, &mut platform, &mut num_platforms), CL_SUCCESS);

            let mut device: cl_device_id = ptr::null_mut();
            let mut num_devices: cl_uint = 0;
            assert_eq!(
                clGetDeviceIDs(platform, CL_DEVICE_TYPE_ALL, 1, &mut device, &mut num_devices),
                CL_SUCCESS
            );

            let mut err: cl_int = 0;
            let context = clCreateContext(
                ptr::null(),
                1,
                &device,
                None,
                ptr::null_mut(),
                &mut err,
            );
            assert_eq!(err, CL_SUCCESS);

            let source = CString::new(SCALE_KERNEL_CL).unwrap();
            let source_ptr = source.as_ptr();
            let program =
                clCreateProgramWithSource(context, 1, &source_ptr, ptr::null(), &mut err);
            assert_eq!(err, CL_SUCCESS);
            assert_eq!(
                clBuildProgram(program, 1, &device, ptr::null(), None, ptr::null_mut()),
                CL_SUCCESS
            );

            Self {
                device,
                context,
                program,
            }
        }
    }

    fn create_kernel(&self, name: &str) -> *mut c_void {
        let name = CString::new(name).unwrap();
        let mut err: cl_int = 0;
        let kernel = unsafe { clCreateKernel(self.program, name.as_ptr(), &mut err) };
        assert_eq!(err, CL_SUCCESS);
        kernel.cast()
    }

    fn create_buffer(&self, bytes: usize) -> cl_mem {
        let mut err: cl_int = 0;
        let mem = unsafe {
            clCreateBuffer(
                self.context,
                CL_MEM_READ_WRITE,
                bytes,
                ptr::null_mut(),
                &mut err,
            )
        };
        assert_eq!(err, CL_SUCCESS);
        mem
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        unsafe {
            clReleaseProgram(self.program);
            clReleaseContext(self.context);
        }
    }
}

#[test]
#[ignore] // Requires an OpenCL platform
fn test_kernel_properties_from_driver() {
    init_tracing();
    assert!(is_opencl_available());
    let fixture = Fixture::new();
    let mut kernel = unsafe { kernel_from_raw(fixture.create_kernel("scale")) };

    assert_eq!(kernel.function_name().unwrap(), "scale");
    assert_eq!(kernel.num_args().unwrap(), 3);
    assert!(kernel.reference_count().unwrap() >= 1);
    assert_eq!(kernel.context().unwrap().as_ptr(), fixture.context.cast());
    assert_eq!(kernel.program().unwrap().as_ptr(), fixture.program.cast());

    kernel.release().unwrap();
    assert!(kernel.is_released());
}

#[test]
#[ignore] // Requires an OpenCL platform
fn test_work_group_properties_from_driver() {
    init_tracing();
    let fixture = Fixture::new();
    let mut kernel = unsafe { kernel_from_raw(fixture.create_kernel("scale")) };
    let device = Device::from_raw(RawDevice::from_ptr(fixture.device.cast()));

    let wg_size = kernel.work_group_size(&device).unwrap();
    assert!(wg_size >= 1);
    let multiple = kernel.preferred_work_group_size_multiple(&device).unwrap();
    assert!(multiple >= 1);
    kernel.local_mem_size(&device).unwrap();
    kernel.private_mem_size(&device).unwrap();
    assert!(kernel
        .work_group_property(&device, WorkGroupInfo::CompileWorkGroupSize)
        .is_err());
}

#[test]
#[ignore] // Requires an OpenCL platform
fn test_bind_arguments_on_driver() {
    init_tracing();
    let fixture = Fixture::new();
    let mut kernel = unsafe { kernel_from_raw(fixture.create_kernel("scale")) };
    let mem = fixture.create_buffer(1024 * std::mem::size_of::<f32>());
    let buffer = Buffer::from_raw(RawMem::from_ptr(mem.cast()));

    kernel
        .set_args(
            0,
            &[
                KernelArg::from(&buffer),
                KernelArg::Float(2.0),
                KernelArg::Int(1024),
            ],
        )
        .unwrap();

    // `scale` declares three arguments.
    let err = kernel.set_arg(3, 1i32).unwrap_err();
    assert_eq!(err.name(), Some("CL_INVALID_ARG_INDEX"));

    kernel.release().unwrap();
    unsafe {
        clReleaseMemObject(mem);
    }
}
