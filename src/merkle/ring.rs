use crate::hash::Digest;

use super::types::MerkleError;

/// Fixed-capacity circular store for in-progress hashes.
///
/// Slots are addressed by the cursors in [`RingCursors`]; the ring itself
/// only owns storage, so two rings can share one cursor set when two
/// traversals run in lockstep.
pub(crate) struct HashRing {
    slots: Vec<Option<Digest>>,
}

impl HashRing {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Reads the digest stored at `slot`. An empty slot means the proof
    /// asked for a hash that was never produced.
    pub(crate) fn get(&self, slot: usize) -> Result<Digest, MerkleError> {
        self.slots[slot].ok_or(MerkleError::MalformedProof {
            reason: "read from an empty working slot",
        })
    }

    pub(crate) fn put(&mut self, slot: usize, digest: Digest) {
        self.slots[slot] = Some(digest);
    }
}

/// Read/write cursors shared by every ring of a traversal.
///
/// Both cursors advance independently and wrap modulo the capacity. Reads
/// start from the caller-supplied leaf array and switch to the ring once
/// the read cursor wraps for the first time, i.e. once every leaf has been
/// consumed.
pub(crate) struct RingCursors {
    capacity: usize,
    read: usize,
    write: usize,
    use_leaves: bool,
}

impl RingCursors {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            read: 0,
            write: 0,
            use_leaves: true,
        }
    }

    /// Current read slot together with whether it still addresses the leaf
    /// array rather than the ring.
    pub(crate) fn read_source(&self) -> (usize, bool) {
        (self.read, self.use_leaves)
    }

    pub(crate) fn read_slot(&self) -> usize {
        self.read
    }

    pub(crate) fn write_slot(&self) -> usize {
        self.write
    }

    pub(crate) fn advance_read(&mut self) {
        self.read = (self.read + 1) % self.capacity;
        if self.read == 0 {
            self.use_leaves = false;
        }
    }

    pub(crate) fn advance_write(&mut self) {
        self.write = (self.write + 1) % self.capacity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::DIGEST_SIZE;

    fn digest(fill: u8) -> Digest {
        Digest::from_bytes([fill; DIGEST_SIZE])
    }

    #[test]
    fn cursors_wrap_and_leave_leaf_mode() {
        let mut cursors = RingCursors::new(3);
        assert_eq!(cursors.read_source(), (0, true));
        cursors.advance_read();
        cursors.advance_read();
        assert_eq!(cursors.read_source(), (2, true));
        cursors.advance_read();
        assert_eq!(cursors.read_source(), (0, false));
    }

    #[test]
    fn single_slot_ring_leaves_leaf_mode_immediately() {
        let mut cursors = RingCursors::new(1);
        cursors.advance_read();
        assert_eq!(cursors.read_source(), (0, false));
    }

    #[test]
    fn empty_slot_read_is_malformed() {
        let mut ring = HashRing::new(2);
        assert!(ring.get(0).is_err());
        ring.put(0, digest(0x55));
        assert_eq!(ring.get(0).unwrap(), digest(0x55));
        assert!(ring.get(1).is_err());
    }

    #[test]
    fn write_cursor_wraps_independently() {
        let mut cursors = RingCursors::new(2);
        cursors.advance_write();
        assert_eq!(cursors.write_slot(), 1);
        cursors.advance_write();
        assert_eq!(cursors.write_slot(), 0);
        assert_eq!(cursors.read_slot(), 0);
    }
}
