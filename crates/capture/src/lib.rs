//! Seams to the camera and the sign classifier.
//!
//! Neither is implemented here. The application drives a [`Camera`] and a
//! [`SignDetector`] through these traits, and the device handle lives inside
//! the [`FrameSource`] returned by [`Camera::open`]: dropping the source is
//! what releases the device.

mod device;

pub use device::CameraDevice;

use fingerspell_sign::Detection;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("could not open webcam {0}")]
    OpenFailed(u32),
    #[error("could not read frame: {0}")]
    ReadFailed(String),
    #[error("camera disconnected")]
    Disconnected,
    #[error("detector failed: {0}")]
    Detector(String),
}

pub type Result<T> = std::result::Result<T, CaptureError>;

/// Something that can list and open cameras.
pub trait Camera {
    type Frame;
    type Source: FrameSource<Frame = Self::Frame>;

    /// Cameras that can currently be opened.
    fn devices(&mut self) -> Vec<CameraDevice>;

    /// Acquire the device. It stays held until the returned source is dropped.
    fn open(&mut self, device: &CameraDevice) -> Result<Self::Source>;
}

/// An open camera.
pub trait FrameSource {
    type Frame;

    fn read_frame(&mut self) -> Result<Self::Frame>;
}

/// The classifier, treated as a black box.
pub trait SignDetector<F> {
    /// All detections for one frame, in any order.
    fn detect(&mut self, frame: &F) -> Result<Vec<Detection>>;
}
