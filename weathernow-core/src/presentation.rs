use std::fmt::Debug;

/// Side effects the resolution flow asks of whatever is drawing the screen.
///
/// Rendering itself is pull-based: the front end reads
/// [`ResolutionState`](crate::ResolutionState) whenever it redraws.
pub trait Presenter: Send + Sync + Debug {
    /// Blocking-style notification naming a failure in plain terms.
    ///
    /// Called while the flow holds its state lock: implementations must not
    /// call back into the flow from here.
    fn alert(&self, message: &str);

    /// Drop focus from the search input (hide the on-screen keyboard).
    fn dismiss_input(&self) {}
}
