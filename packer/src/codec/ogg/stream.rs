//! Ogg stream state.

/// Per-stream bookkeeping of a logical bitstream.
#[derive(Debug)]
pub struct StreamState {
    serial: u32,
    sequence: u32,
    packet_no: u64,
    granule_position: i64,
    bos_seen: bool,
    eos_seen: bool,
}

impl StreamState {
    /// Creates a new stream state.
    pub fn new(serial: u32) -> Self {
        Self {
            serial,
            sequence: 0,
            packet_no: 1,
            granule_position: 0,
            bos_seen: false,
            eos_seen: false,
        }
    }

    /// Returns the serial number.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Returns the sequence number of the next page.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns the number the next packet will get.
    pub fn packet_no(&self) -> u64 {
        self.packet_no
    }

    /// Returns the granule position.
    pub fn granule_position(&self) -> i64 {
        self.granule_position
    }

    /// Advances the granule position by `delta` and returns the new value.
    pub fn advance_granule(&mut self, delta: u64) -> i64 {
        self.granule_position = self.granule_position.saturating_add(delta as i64);
        self.granule_position
    }

    /// Takes the next packet number.
    pub fn next_packet_no(&mut self) -> u64 {
        let no = self.packet_no;
        self.packet_no += 1;
        no
    }

    /// Takes the next page sequence number.
    pub fn next_sequence(&mut self) -> u32 {
        let seq = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        seq
    }

    /// Returns true once a beginning-of-stream packet was written.
    pub fn bos_seen(&self) -> bool {
        self.bos_seen
    }

    /// Returns true once an end-of-stream packet was written.
    pub fn eos_seen(&self) -> bool {
        self.eos_seen
    }

    pub(crate) fn mark_bos(&mut self) {
        self.bos_seen = true;
    }

    pub(crate) fn mark_eos(&mut self) {
        self.eos_seen = true;
    }
}
