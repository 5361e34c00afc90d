#![forbid(unsafe_code)]

//! The ordered frame collection with its tag dictionary.

use alloc::{
  collections::BTreeMap,
  string::{String, ToString},
  vec::Vec,
};
use core::ops::{Bound, Index, IndexMut, RangeBounds};

use crate::{uuid::new_uuid, Frame};

/// Tag key holding a frame set's identity.
pub const UUID_TAG: &str = "UUID";

/// An ordered list of frames, plus string tags and a display name.
///
/// The set owns its frames exclusively and keeps them in insertion order.
/// There's always a non-empty [`UUID_TAG`] tag: one is generated on
/// construction, and again on clone or decode whenever it went missing.
#[derive(Debug, PartialEq, Eq)]
pub struct FrameSet {
  frames: Vec<Frame>,
  tags: BTreeMap<String, String>,
  name: String,
}

impl Default for FrameSet {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl Clone for FrameSet {
  fn clone(&self) -> Self {
    let mut out =
      Self { frames: self.frames.clone(), tags: self.tags.clone(), name: self.name.clone() };
    out.ensure_uuid();
    out
  }
}

impl FrameSet {
  /// An empty set with a freshly generated identity.
  #[must_use]
  pub fn new() -> Self {
    let mut out = Self { frames: Vec::new(), tags: BTreeMap::new(), name: String::new() };
    out.assign_new_uuid();
    out
  }

  /// Makes a set out of frames that were already decoded.
  #[must_use]
  pub fn from_frames(frames: Vec<Frame>) -> Self {
    let mut out = Self::new();
    out.frames = frames;
    out
  }

  /// Number of frames.
  #[inline]
  #[must_use]
  pub fn len(&self) -> usize {
    self.frames.len()
  }

  /// If there are no frames.
  #[inline]
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.frames.is_empty()
  }

  /// Gets a frame.
  ///
  /// ## Panics
  /// * If `index` is out of bounds. Use [`get`](Self::get) to check first.
  #[inline]
  #[must_use]
  #[track_caller]
  pub fn frame(&self, index: usize) -> &Frame {
    &self.frames[index]
  }

  /// Gets a frame mutably.
  ///
  /// ## Panics
  /// * If `index` is out of bounds.
  #[inline]
  #[must_use]
  #[track_caller]
  pub fn frame_mut(&mut self, index: usize) -> &mut Frame {
    &mut self.frames[index]
  }

  /// Gets a frame, or `None` when out of bounds.
  #[inline]
  #[must_use]
  pub fn get(&self, index: usize) -> Option<&Frame> {
    self.frames.get(index)
  }

  /// All frames in order.
  #[inline]
  #[must_use]
  pub fn frames(&self) -> &[Frame] {
    &self.frames
  }

  /// Takes the frames out, dropping tags and name.
  #[inline]
  #[must_use]
  pub fn into_frames(self) -> Vec<Frame> {
    self.frames
  }

  /// Iterates the frames in order.
  #[inline]
  pub fn iter(&self) -> core::slice::Iter<'_, Frame> {
    self.frames.iter()
  }

  /// Appends a frame, giving back its index.
  #[inline]
  pub fn add(&mut self, frame: Frame) -> usize {
    self.frames.push(frame);
    self.frames.len() - 1
  }

  /// Inserts a frame so that it ends up at `index`.
  ///
  /// ## Failure
  /// * When `index > len` the frame is handed back.
  #[inline]
  pub fn insert_at(&mut self, index: usize, frame: Frame) -> Result<(), Frame> {
    if index <= self.frames.len() {
      self.frames.insert(index, frame);
      Ok(())
    } else {
      Err(frame)
    }
  }

  /// Removes the frame at `index`.
  #[inline]
  pub fn remove_at(&mut self, index: usize) -> Option<Frame> {
    (index < self.frames.len()).then(|| self.frames.remove(index))
  }

  /// Swaps in a new frame at `index`, giving back the old one.
  #[inline]
  pub fn replace(&mut self, index: usize, frame: Frame) -> Option<Frame> {
    self.frames.get_mut(index).map(|slot| core::mem::replace(slot, frame))
  }

  /// Moves the frame at `from` so that it ends up at `to`.
  ///
  /// Returns `false` (and does nothing) if either index is out of bounds.
  pub fn move_frame(&mut self, from: usize, to: usize) -> bool {
    let len = self.frames.len();
    if from >= len || to >= len {
      return false;
    }
    let f = self.frames.remove(from);
    self.frames.insert(to, f);
    true
  }

  /// Removes every frame. Tags and name are kept.
  #[inline]
  pub fn clear(&mut self) {
    self.frames.clear();
  }

  /// Copies a range of frames into a new set.
  ///
  /// The new set gets this set's name and its own identity, but no other tags.
  /// Gives `None` if the range is out of bounds.
  #[must_use]
  pub fn to_subset(&self, range: impl RangeBounds<usize>) -> Option<FrameSet> {
    let bounds: (Bound<usize>, Bound<usize>) =
      (range.start_bound().cloned(), range.end_bound().cloned());
    let frames = self.frames.get(bounds)?.to_vec();
    let mut out = FrameSet::from_frames(frames);
    out.name = self.name.clone();
    Some(out)
  }

  /// Gets a tag value, or the empty string when it isn't set.
  #[inline]
  #[must_use]
  pub fn tag(&self, key: &str) -> &str {
    self.tags.get(key).map(String::as_str).unwrap_or("")
  }

  /// Sets a tag, replacing any old value.
  ///
  /// Emptying [`UUID_TAG`] generates a new identity instead.
  #[inline]
  pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.tags.insert(key.into(), value.into());
    self.ensure_uuid();
  }

  /// Removes a tag, giving back its old value.
  ///
  /// Removing [`UUID_TAG`] generates a new identity in its place.
  #[inline]
  pub fn remove_tag(&mut self, key: &str) -> Option<String> {
    let old = self.tags.remove(key);
    self.ensure_uuid();
    old
  }

  /// Iterates all tags, sorted by key.
  #[inline]
  pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
    self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Replaces all of this set's tags with a copy of `src`'s tags.
  pub fn copy_tags(&mut self, src: &FrameSet) {
    self.tags.clone_from(&src.tags);
    self.ensure_uuid();
  }

  /// Gives this set a new random identity.
  #[inline]
  pub fn assign_new_uuid(&mut self) {
    self.tags.insert(UUID_TAG.to_string(), new_uuid());
  }

  /// Generates an identity if there isn't a usable one.
  pub(crate) fn ensure_uuid(&mut self) {
    if self.tag(UUID_TAG).is_empty() {
      self.assign_new_uuid();
    }
  }

  /// The display name.
  #[inline]
  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Sets the display name.
  #[inline]
  pub fn set_name(&mut self, name: impl Into<String>) {
    self.name = name.into();
  }
}

impl Index<usize> for FrameSet {
  type Output = Frame;
  #[inline]
  #[track_caller]
  fn index(&self, index: usize) -> &Frame {
    &self.frames[index]
  }
}
impl IndexMut<usize> for FrameSet {
  #[inline]
  #[track_caller]
  fn index_mut(&mut self, index: usize) -> &mut Frame {
    &mut self.frames[index]
  }
}

impl<'a> IntoIterator for &'a FrameSet {
  type Item = &'a Frame;
  type IntoIter = core::slice::Iter<'a, Frame>;
  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.frames.iter()
  }
}
