/// Read-time selector of which stack depth a query observes. Resolution
/// happens on every read from the current stack length and configured
/// offsets, so a cursor handle is stateless across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// The newest layer.
    #[default]
    Head,
    /// A configured number of layers behind the tip, past the point where
    /// reorganizations are expected.
    Solid,
    /// The quorum-confirmed depth supplied by the consensus layer.
    Confirmed,
}
