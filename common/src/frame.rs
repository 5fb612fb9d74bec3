use core::ptr;

use crate::headers::Header;

/// Read-only view of one received frame.
///
/// The only way to look inside a frame is to copy a whole header out of it,
/// and that copy is refused when any byte of the header lies past the end.
pub trait Frame {
    /// Copy the header `H` found at `offset`, or `None` if it does not fit.
    fn load<H: Header>(&self, offset: usize) -> Option<H>;
}

impl Frame for [u8] {
    #[inline(always)]
    fn load<H: Header>(&self, offset: usize) -> Option<H> {
        let end = offset.checked_add(H::LEN)?;
        if end > self.len() {
            return None;
        }
        // SAFETY: offset..end is in bounds and H accepts any bit pattern
        Some(unsafe { ptr::read_unaligned(self.as_ptr().add(offset) as *const H) })
    }
}
