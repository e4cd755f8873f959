#![allow(dead_code)]

use slate_gpu::recording::RecordingContext;
use slate_gpu::{ProgramId, RenderDevice, ShaderName};

/// One program id per shader, as the external shader manager would hand over.
pub fn programs() -> [ProgramId; ShaderName::COUNT] {
    std::array::from_fn(|i| ProgramId(i as u32 + 1))
}

pub fn program_of(shader: ShaderName) -> ProgramId {
    programs()[shader.index()]
}

pub fn device() -> RenderDevice<RecordingContext> {
    RenderDevice::new(RecordingContext::new(), programs()).expect("recording context cannot fail")
}

/// A device with the initial full apply flushed and the call log cleared, so
/// tests observe steady-state behavior only.
pub fn flushed_device() -> RenderDevice<RecordingContext> {
    let mut device = device();
    device.apply_changes();
    device.context_mut().clear_calls();
    device
}
