use bytemuck::{
  Pod,
  Zeroable,
};

use crate::error::HalaSceneError;

/// The unit of the arena's backing memory.
/// Keeping the base address 16-byte aligned lets any 16-aligned offset be cast to a typed slice.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy)]
struct HalaArenaBlock([u8; 16]);

// SAFETY: A plain byte array with a size equal to its alignment has no padding and no invalid bit patterns.
unsafe impl Zeroable for HalaArenaBlock {}
unsafe impl Pod for HalaArenaBlock {}

const BLOCK_SIZE: usize = std::mem::size_of::<HalaArenaBlock>();

/// A single growable byte buffer holding all variable-length scene data.
/// Regions are addressed by byte offsets relative to the start of the buffer, never by address.
#[derive(Debug, Clone, Default)]
pub struct HalaArena {
  blocks: Vec<HalaArenaBlock>,
  len: usize,
}

/// The implementation of the arena.
impl HalaArena {
  /// Create a new empty arena.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Grow the arena to hold at least `total_size` bytes.
  /// Growing keeps the existing content and zero fills the new bytes.
  /// A size not larger than the current one is a no-op.
  /// param total_size: The required size in bytes.
  /// return: The result.
  pub fn reserve(&mut self, total_size: u64) -> Result<(), HalaSceneError> {
    if total_size > u32::MAX as u64 {
      return Err(HalaSceneError::size_overflow(
        &format!("The arena size {} exceeds the 32-bit offset range.", total_size)));
    }
    let total_size = total_size as usize;
    if total_size <= self.len {
      return Ok(());
    }

    self.blocks.resize(total_size.div_ceil(BLOCK_SIZE), HalaArenaBlock([0; BLOCK_SIZE]));
    log::debug!("The arena grew from {} to {} bytes.", self.len, total_size);
    self.len = total_size;
    Ok(())
  }

  /// Get the content of the arena.
  pub fn bytes(&self) -> &[u8] {
    &bytemuck::cast_slice::<_, u8>(&self.blocks)[..self.len]
  }

  /// Get the mutable content of the arena.
  pub fn bytes_mut(&mut self) -> &mut [u8] {
    let len = self.len;
    &mut bytemuck::cast_slice_mut::<_, u8>(&mut self.blocks)[..len]
  }

  /// Get a typed window of the arena.
  /// Panics if the region does not lie inside the arena or the offset is misaligned for `T`.
  /// param offset: The byte offset of the first element.
  /// param count: The number of elements.
  /// return: The typed slice.
  pub fn slice<T: Pod>(&self, offset: u32, count: u32) -> &[T] {
    let range = self.checked_range::<T>(offset, count);
    bytemuck::cast_slice(&self.bytes()[range])
  }

  /// Get a mutable typed window of the arena.
  /// Panics if the region does not lie inside the arena or the offset is misaligned for `T`.
  /// param offset: The byte offset of the first element.
  /// param count: The number of elements.
  /// return: The mutable typed slice.
  pub fn slice_mut<T: Pod>(&mut self, offset: u32, count: u32) -> &mut [T] {
    let range = self.checked_range::<T>(offset, count);
    bytemuck::cast_slice_mut(&mut self.bytes_mut()[range])
  }

  /// Get two disjoint mutable typed windows of the arena, the first one ending before the second one starts.
  /// param first: The byte offset and element count of the first window.
  /// param second: The byte offset and element count of the second window.
  /// return: The two mutable typed slices.
  pub fn split_mut<A: Pod, B: Pod>(&mut self, first: (u32, u32), second: (u32, u32)) -> (&mut [A], &mut [B]) {
    let first_range = self.checked_range::<A>(first.0, first.1);
    let second_range = self.checked_range::<B>(second.0, second.1);
    assert!(
      first_range.end <= second_range.start,
      "Arena regions {:?} and {:?} overlap or are out of order.", first_range, second_range
    );

    let (head, tail) = self.bytes_mut().split_at_mut(second_range.start);
    let second_len = second_range.len();
    (
      bytemuck::cast_slice_mut(&mut head[first_range]),
      bytemuck::cast_slice_mut(&mut tail[..second_len]),
    )
  }

  fn checked_range<T>(&self, offset: u32, count: u32) -> std::ops::Range<usize> {
    let start = offset as usize;
    let end = count as usize * std::mem::size_of::<T>() + start;
    assert!(
      end <= self.len,
      "Arena region [{}, {}) is out of range, the arena holds {} bytes.", start, end, self.len
    );
    start..end
  }
}
