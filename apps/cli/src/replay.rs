//! A camera that plays back recorded detections.
//!
//! The driver pushes each recorded frame into a channel right before it ticks
//! the session, so a read always finds exactly the frame for that tick. When
//! the driver drops the sender the camera counts as unplugged.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use fingerspell_capture::{Camera, CameraDevice, CaptureError, FrameSource, SignDetector};
use fingerspell_sign::Detection;

pub type ReplayFrame = Vec<Detection>;

pub struct ReplayCamera {
    frames: Receiver<ReplayFrame>,
    device_count: u32,
}

impl ReplayCamera {
    /// Returns the camera and the sender that feeds it.
    pub fn new(device_count: u32) -> (Self, Sender<ReplayFrame>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let camera = Self {
            frames: rx,
            device_count,
        };
        (camera, tx)
    }
}

impl Camera for ReplayCamera {
    type Frame = ReplayFrame;
    type Source = ReplaySource;

    fn devices(&mut self) -> Vec<CameraDevice> {
        (0..self.device_count).map(CameraDevice::new).collect()
    }

    fn open(&mut self, device: &CameraDevice) -> Result<ReplaySource, CaptureError> {
        if device.index >= self.device_count {
            return Err(CaptureError::OpenFailed(device.index));
        }
        tracing::debug!(device = %device, "replay camera opened");
        Ok(ReplaySource {
            device: device.clone(),
            frames: self.frames.clone(),
        })
    }
}

pub struct ReplaySource {
    device: CameraDevice,
    frames: Receiver<ReplayFrame>,
}

impl FrameSource for ReplaySource {
    type Frame = ReplayFrame;

    fn read_frame(&mut self) -> Result<ReplayFrame, CaptureError> {
        match self.frames.try_recv() {
            Ok(frame) => Ok(frame),
            Err(TryRecvError::Disconnected) => Err(CaptureError::Disconnected),
            Err(TryRecvError::Empty) => Err(CaptureError::ReadFailed("no frame queued".to_string())),
        }
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        tracing::debug!(device = %self.device, "replay camera released");
    }
}

/// The recorded frames already are detector output.
pub struct RecordedDetector;

impl SignDetector<ReplayFrame> for RecordedDetector {
    fn detect(&mut self, frame: &ReplayFrame) -> Result<Vec<Detection>, CaptureError> {
        Ok(frame.clone())
    }
}
