use crate::shared::error::SessionError;
use crate::shared::frame::Frame;

/// Domain interface for the capture device.
///
/// A source owns at most one live stream; `acquire` opens it, `release`
/// closes it. Implementations may be stateful, hence `&mut self`.
pub trait CameraSource: Send {
    /// Open the device and start the stream.
    fn acquire(&mut self) -> Result<(), SessionError>;

    /// Return the most recent frame. Fails with [`SessionError::NoFrame`]
    /// when nothing decodable is available.
    fn frame(&mut self) -> Result<Frame, SessionError>;

    /// Close the stream. Safe to call more than once.
    fn release(&mut self);
}
