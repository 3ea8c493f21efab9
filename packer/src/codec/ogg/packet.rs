//! Ogg packets.

/// A packet of a logical bitstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Packet payload.
    pub data: Vec<u8>,
    /// Position in the stream, starting at 1.
    pub packet_no: u64,
    /// Absolute granule position at the end of this packet, or -1 when
    /// the page it ends on carries no position for it.
    pub granule_position: i64,
    /// First packet of the stream.
    pub is_first_in_stream: bool,
    /// Last packet of the stream.
    pub is_last_in_stream: bool,
}

impl Packet {
    /// Returns the payload length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for a zero-length packet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
