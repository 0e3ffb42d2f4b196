//! Compressed packets and the scoped guard that recycles their buffers.

use std::ops::Deref;

use crate::error::Result;
use crate::handle::Owned;
use ffmpeg_sys::*;

/// RAII wrapper for AVPacket.
///
/// One packet is meant to be reused for every read of a decode loop; see
/// [`PacketUnref`].
#[derive(Debug)]
pub struct Packet(Owned<AVPacket>);

impl Packet {
    pub fn new() -> Result<Self> {
        Owned::alloc(|| unsafe { av_packet_alloc() }).map(Self)
    }

    pub fn as_ptr(&self) -> *const AVPacket {
        self.0.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut AVPacket {
        self.0.as_ptr()
    }

    /// Borrow the packet until the returned guard is dropped, at which point
    /// its buffers are unreferenced.
    pub fn scoped_unref(&mut self) -> PacketUnref<'_> {
        PacketUnref::acquire(self)
    }

    pub fn stream_index(&self) -> i32 {
        unsafe { (*self.0.as_ptr()).stream_index }
    }

    /// Payload size in bytes; 0 for a blank packet.
    pub fn size(&self) -> usize {
        unsafe { (*self.0.as_ptr()).size.max(0) as usize }
    }

    pub fn data(&self) -> &[u8] {
        unsafe {
            let pkt = self.0.as_ptr();
            if (*pkt).data.is_null() {
                &[]
            } else {
                std::slice::from_raw_parts((*pkt).data, self.size())
            }
        }
    }

    /// Presentation timestamp in stream time base, if set.
    pub fn pts(&self) -> Option<i64> {
        match unsafe { (*self.0.as_ptr()).pts } {
            i64::MIN => None,
            pts => Some(pts),
        }
    }
}

/// Unreferences a packet's buffers on drop, leaving the packet itself
/// allocated and ready for the next read.
#[derive(Debug)]
pub struct PacketUnref<'a> {
    packet: &'a mut Packet,
}

impl<'a> PacketUnref<'a> {
    pub fn acquire(packet: &'a mut Packet) -> Self {
        Self { packet }
    }

    pub fn as_ptr(&self) -> *const AVPacket {
        self.packet.as_ptr()
    }

    /// For native calls that fill the packet (`av_read_frame`).
    pub fn as_mut_ptr(&mut self) -> *mut AVPacket {
        self.packet.as_mut_ptr()
    }
}

impl Deref for PacketUnref<'_> {
    type Target = Packet;

    fn deref(&self) -> &Packet {
        &*self.packet
    }
}

impl Drop for PacketUnref<'_> {
    fn drop(&mut self) {
        unsafe { av_packet_unref(self.packet.as_mut_ptr()) }
    }
}
