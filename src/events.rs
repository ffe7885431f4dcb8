//! Session events that drive the announcement gate.

/// A triggering event delivered to the gate by the hosting session.
///
/// Events arrive one at a time on the session event loop; the host never
/// delivers two concurrently.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session began and the persisted markers are readable.
    SessionStarted,

    /// The navigation collaborator reported a new active route.
    RouteChanged(String),

    /// A horizontal carousel scroll settled.
    ScrollSettled {
        /// Final horizontal scroll position, in display units.
        offset: f64,
        /// Width of one slide, in the same units.
        slide_width: f64,
    },

    /// The user dismissed the announcement.
    Acknowledged,
}
