//! Fixed-size photo slot collection with cyclic upload overwrite.
//!
//! Uploads never add slots.  Each incoming image lands on the slot the
//! upload cursor points at, and the cursor moves on, so a batch larger than
//! the tree wraps around and starts replacing its own earlier uploads.

use log::debug;

use crate::error::TreeError;
use crate::layout::{PhotoSlot, SlotId};

/// Record of a single overwrite, returned so the caller can release the
/// image that was displaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Overwrite {
    pub index:        usize,
    pub id:           SlotId,
    pub previous_url: String,
}

/// Ordered photo slots plus the session-long upload cursor.
#[derive(Debug, Default)]
pub struct PhotoSlotStore {
    slots:  Option<Vec<PhotoSlot>>,
    cursor: u64,
}

impl PhotoSlotStore {
    pub fn new() -> Self {
        PhotoSlotStore::default()
    }

    /// Replace the whole collection.  The upload cursor is left alone.
    pub fn initialize(&mut self, slots: Vec<PhotoSlot>) {
        debug!("slot store initialized with {} slots", slots.len());
        self.slots = Some(slots);
    }

    pub fn slots(&self) -> &[PhotoSlot] {
        self.slots.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize { self.slots().len() }

    pub fn is_empty(&self) -> bool { self.slots().is_empty() }

    /// Total uploads applied this session.
    pub fn upload_cursor(&self) -> u64 { self.cursor }

    /// Id of the first slot, the fixed double-pinch target.
    pub fn first_id(&self) -> Option<SlotId> {
        self.slots().first().map(|s| s.id)
    }

    pub fn get(&self, id: SlotId) -> Option<&PhotoSlot> {
        self.slots().iter().find(|s| s.id == id)
    }

    /// Index the next upload will land on.
    pub fn next_index(&self) -> Result<usize, TreeError> {
        let n = self.writable_len()?;
        Ok((self.cursor % n as u64) as usize)
    }

    /// Point the next slot in the cycle at `url`.
    pub fn overwrite_next(&mut self, url: impl Into<String>) -> Result<Overwrite, TreeError> {
        let index = self.next_index()?;
        let slots = self.slots.as_mut().ok_or_else(uninitialized)?;
        let slot  = &mut slots[index];

        let previous_url = std::mem::replace(&mut slot.url, url.into());
        self.cursor += 1;
        debug!("upload #{} -> slot {} (index {})", self.cursor, slot.id, index);

        Ok(Overwrite { index, id: slot.id, previous_url })
    }

    /// Apply one overwrite per url, in order.  Empty input is a no-op and
    /// succeeds even on an uninitialized store.
    pub fn overwrite_batch<I, S>(&mut self, urls: I) -> Result<Vec<Overwrite>, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut urls = urls.into_iter().peekable();
        if urls.peek().is_none() {
            return Ok(Vec::new());
        }
        // Validate before touching anything so a bad store never half-applies.
        self.writable_len()?;
        urls.map(|u| self.overwrite_next(u)).collect()
    }

    fn writable_len(&self) -> Result<usize, TreeError> {
        match &self.slots {
            None => Err(uninitialized()),
            Some(s) if s.is_empty() => {
                Err(TreeError::invalid_state("slot store holds zero slots"))
            }
            Some(s) => Ok(s.len()),
        }
    }
}

fn uninitialized() -> TreeError {
    TreeError::invalid_state("slot store used before initialize")
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::generate_default;

    fn store(n: usize) -> PhotoSlotStore {
        let mut s = PhotoSlotStore::new();
        s.initialize(generate_default(n));
        s
    }

    #[test]
    fn overwrite_before_initialize_fails() {
        let mut s = PhotoSlotStore::new();
        let err = s.overwrite_next("a").unwrap_err();
        assert!(matches!(err, TreeError::InvalidState { .. }));
        assert_eq!(s.upload_cursor(), 0);
    }

    #[test]
    fn overwrite_on_zero_slots_fails() {
        let mut s = store(0);
        assert!(matches!(s.overwrite_next("a"), Err(TreeError::InvalidState { .. })));
        assert!(matches!(s.overwrite_batch(["a", "b"]), Err(TreeError::InvalidState { .. })));
        assert_eq!(s.upload_cursor(), 0);
    }

    #[test]
    fn empty_batch_is_noop_even_uninitialized() {
        let mut s = PhotoSlotStore::new();
        assert_eq!(s.overwrite_batch(Vec::<String>::new()).unwrap(), vec![]);
        let mut s = store(6);
        let before = s.slots().to_vec();
        assert!(s.overwrite_batch(Vec::<String>::new()).unwrap().is_empty());
        assert_eq!(s.slots(), &before[..]);
        assert_eq!(s.upload_cursor(), 0);
    }

    #[test]
    fn overwrite_replaces_url_only() {
        let mut s = store(6);
        let before = s.slots()[0].clone();
        let ow = s.overwrite_next("blob:new").unwrap();
        assert_eq!(ow.index, 0);
        assert_eq!(ow.id, 1);
        assert_eq!(ow.previous_url, before.url);

        let after = &s.slots()[0];
        assert_eq!(after.url, "blob:new");
        assert_eq!(after.id, before.id);
        assert_eq!(after.position, before.position);
        assert_eq!(after.rotation, before.rotation);
    }

    #[test]
    fn eight_uploads_wrap_onto_first_two_slots() {
        let mut s = store(6);
        let urls: Vec<String> = (0..8).map(|i| format!("blob:{}", i)).collect();
        let done = s.overwrite_batch(urls).unwrap();

        let indices: Vec<usize> = done.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 0, 1]);

        let mut touched = [0usize; 6];
        for o in &done { touched[o.index] += 1; }
        assert_eq!(touched, [2, 2, 1, 1, 1, 1]);

        // The second lap displaced the first lap's uploads.
        assert_eq!(done[6].previous_url, "blob:0");
        assert_eq!(s.slots()[0].url, "blob:6");
        assert_eq!(s.slots()[1].url, "blob:7");
        assert_eq!(s.slots()[2].url, "blob:2");
        assert_eq!(s.upload_cursor(), 8);
    }

    #[test]
    fn k_uploads_advance_cursor_by_k_and_keep_geometry() {
        for k in 0..20u64 {
            let mut s = store(5);
            let original = s.slots().to_vec();
            s.overwrite_batch((0..k).map(|i| format!("u{}", i))).unwrap();
            assert_eq!(s.upload_cursor(), k);
            for (i, (a, b)) in original.iter().zip(s.slots()).enumerate() {
                assert_eq!(a.id, b.id);
                assert_eq!(a.position, b.position);
                assert_eq!(a.rotation, b.rotation);
                // Slot i was reached iff at least i + 1 uploads happened.
                assert_eq!(a.url != b.url, (i as u64) < k, "slot {} after {} uploads", i, k);
            }
        }
    }

    #[test]
    fn cursor_survives_reinitialize() {
        let mut s = store(6);
        s.overwrite_batch(["a", "b", "c"]).unwrap();
        s.initialize(generate_default(6));
        assert_eq!(s.upload_cursor(), 3);
        assert_eq!(s.overwrite_next("d").unwrap().index, 3);
    }

    #[test]
    fn first_id_and_lookup() {
        let s = store(6);
        assert_eq!(s.first_id(), Some(1));
        assert_eq!(s.get(4).map(|p| p.id), Some(4));
        assert!(s.get(7).is_none());
        assert_eq!(PhotoSlotStore::new().first_id(), None);
    }
}
