use alloc::{collections::VecDeque, vec::Vec};

use crate::format::NOP;

/// The encoder's fixed-capacity write buffer.
///
/// Codes are packed two per byte. While a byte holds only its high nibble,
/// `half` points at it; payload bytes written in the meantime go after it and
/// the next code completes it. When a write would overflow the buffer,
/// everything before the half-written byte is moved to `ready` and the rest is
/// compacted to the front. If the write still does not fit, the half-written
/// byte is padded with a no-op and the payload is emitted as a segment of its
/// own.
#[derive(Debug)]
pub(crate) struct OutputBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    half: Option<usize>,
    ready: VecDeque<Vec<u8>>,
}

impl OutputBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
            half: None,
            ready: VecDeque::new(),
        }
    }

    /// Appends one 4-bit code.
    pub(crate) fn code(&mut self, nibble: u8) {
        debug_assert!(nibble < 0x10, "code {nibble:#x} does not fit a nibble");
        if let Some(at) = self.half.take() {
            self.bytes[at] |= nibble;
            return;
        }
        if self.bytes.len() == self.capacity {
            self.flush_all();
        }
        self.half = Some(self.bytes.len());
        self.bytes.push((nibble << 4) | NOP);
    }

    /// Appends raw payload bytes.
    pub(crate) fn write(&mut self, data: &[u8]) {
        if self.bytes.len() + data.len() > self.capacity {
            self.flush_complete();
        }
        if self.bytes.len() + data.len() > self.capacity {
            // The low nibble is already NOP, so dropping `half` pads the byte.
            self.half = None;
            self.flush_all();
            self.ready.push_back(data.to_vec());
            return;
        }
        self.bytes.extend_from_slice(data);
    }

    /// Pads any half-written byte and moves everything to `ready`.
    pub(crate) fn finish(&mut self) {
        self.half = None;
        self.flush_all();
    }

    /// Takes the oldest completed segment.
    pub(crate) fn pop_segment(&mut self) -> Option<Vec<u8>> {
        self.ready.pop_front()
    }

    #[cfg(test)]
    pub(crate) fn has_half(&self) -> bool {
        self.half.is_some()
    }

    /// Emits every byte before the half-written one and compacts the rest.
    fn flush_complete(&mut self) {
        let cut = self.half.unwrap_or(self.bytes.len());
        if cut == 0 {
            return;
        }
        let mut rest = self.bytes.split_off(cut);
        rest.reserve(self.capacity.saturating_sub(rest.len()));
        let full = core::mem::replace(&mut self.bytes, rest);
        self.ready.push_back(full);
        if let Some(at) = self.half.as_mut() {
            *at = 0;
        }
    }

    fn flush_all(&mut self) {
        debug_assert!(self.half.is_none());
        if self.bytes.is_empty() {
            return;
        }
        let full = core::mem::replace(&mut self.bytes, Vec::with_capacity(self.capacity));
        self.ready.push_back(full);
    }
}
