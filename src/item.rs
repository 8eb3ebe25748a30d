/// A single message travelling over a pipeline channel.
///
/// The termination marker is a proper variant rather than a reserved payload
/// value, so no legitimate input can ever be mistaken for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<T> {
    /// An orderable payload on its way to its sorted position.
    Value(T),
    /// Stream-termination marker. Emitted twice per run: the first occurrence
    /// tells a stage that no fresh values follow (its retained value is still
    /// flushed after it), the second closes the stream for good.
    EndOfStream,
}

impl<T> Item<T> {
    /// Whether this item is the termination marker.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Item::EndOfStream)
    }
}
