//! Callback trait - what the dispatcher invokes

use contracts::DispatchError;

use crate::Dispatcher;

/// A registered payload handler.
///
/// The invoking dispatcher is passed alongside the payload so the handler can
/// call [`Dispatcher::wait_for`] on its dependencies. Closures of the shape
/// `FnMut(&Dispatcher<P>, &P) -> Result<(), DispatchError>` implement it.
pub trait Callback<P> {
    /// Handle one payload
    ///
    /// # Errors
    /// Any error aborts the current dispatch cycle and reaches the
    /// `dispatch` caller unchanged.
    fn call(&mut self, dispatcher: &Dispatcher<P>, payload: &P) -> Result<(), DispatchError>;
}

impl<P, F> Callback<P> for F
where
    F: FnMut(&Dispatcher<P>, &P) -> Result<(), DispatchError>,
{
    fn call(&mut self, dispatcher: &Dispatcher<P>, payload: &P) -> Result<(), DispatchError> {
        self(dispatcher, payload)
    }
}
