use std::ops::Range;

use crate::shader::ShaderId;

/// Narrow device interface the batch renderer submits through.
///
/// A flush issues, in order: one `use_program`, one `upload_instances` with
/// every instance of the batch, then one `bind_texture` + `draw_instances`
/// pair per consecutive same-texture run. Ranges index into the last upload.
pub trait GpuDevice {
    fn use_program(&mut self, program: ShaderId);

    /// Replaces the instance data for following draws.
    fn upload_instances(&mut self, bytes: &[u8]);

    /// Binds `texture_id` for following draws. Never called with 0.
    fn bind_texture(&mut self, texture_id: u32);

    fn draw_instances(&mut self, instances: Range<u32>);
}

impl<D: GpuDevice + ?Sized> GpuDevice for &mut D {
    fn use_program(&mut self, program: ShaderId) {
        (**self).use_program(program);
    }

    fn upload_instances(&mut self, bytes: &[u8]) {
        (**self).upload_instances(bytes);
    }

    fn bind_texture(&mut self, texture_id: u32) {
        (**self).bind_texture(texture_id);
    }

    fn draw_instances(&mut self, instances: Range<u32>) {
        (**self).draw_instances(instances);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum DeviceCall {
        UseProgram(ShaderId),
        Upload(usize),
        BindTexture(u32),
        Draw(Range<u32>),
    }

    /// Records every call; uploads keep their byte length and contents.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingDevice {
        pub calls: Vec<DeviceCall>,
        pub uploads: Vec<Vec<u8>>,
    }

    impl RecordingDevice {
        pub fn draw_count(&self) -> usize {
            self.calls.iter().filter(|c| matches!(c, DeviceCall::Draw(_))).count()
        }

        pub fn programs(&self) -> Vec<ShaderId> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    DeviceCall::UseProgram(id) => Some(*id),
                    _ => None,
                })
                .collect()
        }
    }

    impl GpuDevice for RecordingDevice {
        fn use_program(&mut self, program: ShaderId) {
            self.calls.push(DeviceCall::UseProgram(program));
        }

        fn upload_instances(&mut self, bytes: &[u8]) {
            self.calls.push(DeviceCall::Upload(bytes.len()));
            self.uploads.push(bytes.to_vec());
        }

        fn bind_texture(&mut self, texture_id: u32) {
            self.calls.push(DeviceCall::BindTexture(texture_id));
        }

        fn draw_instances(&mut self, instances: Range<u32>) {
            self.calls.push(DeviceCall::Draw(instances));
        }
    }

    #[test]
    fn forwarding_through_mut_ref() {
        fn drive<D: GpuDevice>(mut device: D) {
            device.bind_texture(4);
            device.draw_instances(0..2);
        }

        let mut inner = RecordingDevice::default();
        drive(&mut inner);
        assert_eq!(inner.calls, vec![DeviceCall::BindTexture(4), DeviceCall::Draw(0..2)]);
    }
}
