/// GPU buffer rebuilt every frame from CPU-side data.
///
/// Grows to the next power of two and never shrinks.
pub(super) struct TransientBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    min_bytes: u64,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

impl TransientBuffer {
    pub fn new(label: &'static str, usage: wgpu::BufferUsages, min_bytes: u64) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            min_bytes,
            buffer: None,
            capacity: 0,
        }
    }

    /// Makes room for `required` bytes. Returns true when the buffer was
    /// (re)created, which invalidates bind groups that reference it.
    pub fn ensure(&mut self, device: &wgpu::Device, required: u64) -> bool {
        if required <= self.capacity && self.buffer.is_some() {
            return false;
        }

        let new_cap = required.next_power_of_two().max(self.min_bytes);
        log::debug!("{}: growing to {} bytes", self.label, new_cap);

        self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: new_cap,
            usage: self.usage,
            mapped_at_creation: false,
        }));
        self.capacity = new_cap;
        true
    }

    /// Uploads `bytes` at offset 0, growing first if needed.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) -> bool {
        let grew = self.ensure(device, bytes.len() as u64);
        if let Some(buffer) = self.buffer.as_ref() {
            if !bytes.is_empty() {
                queue.write_buffer(buffer, 0, bytes);
            }
        }
        grew
    }

    #[inline]
    pub fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }
}
