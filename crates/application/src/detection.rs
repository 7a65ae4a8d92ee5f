//! Detection session: owns the camera handle and drives the speller.

use fingerspell_capture::{Camera, CameraDevice, CaptureError, FrameSource, SignDetector};
use fingerspell_events::Status;
use fingerspell_sign::{top_detection, ConfirmedSymbol, Sample, Timestamp};

use crate::error::{Result, SessionError};
use crate::speller::Speller;

/// One camera, one detector, one speller.
///
/// The open device lives in `source`. It is acquired by [`start`](Self::start)
/// and released by dropping the source, which happens in exactly one place
/// ([`release`](Self::release)) whether detection stops on request or because
/// the camera failed.
pub struct DetectionSession<C: Camera, D> {
    camera: C,
    detector: D,
    speller: Speller,
    selected: Option<CameraDevice>,
    source: Option<C::Source>,
}

impl<C, D> DetectionSession<C, D>
where
    C: Camera,
    D: SignDetector<C::Frame>,
{
    pub fn new(camera: C, detector: D, speller: Speller) -> Self {
        Self {
            camera,
            detector,
            speller,
            selected: None,
            source: None,
        }
    }

    pub fn speller(&self) -> &Speller {
        &self.speller
    }

    /// Edit commands go through here; they are serialized with ticks by `&mut`.
    pub fn speller_mut(&mut self) -> &mut Speller {
        &mut self.speller
    }

    pub fn devices(&mut self) -> Vec<CameraDevice> {
        self.camera.devices()
    }

    pub fn selected_device(&self) -> Option<&CameraDevice> {
        self.selected.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }

    /// Choose the camera for the next [`start`](Self::start). Stops a running
    /// session first.
    pub fn select_device(&mut self, device: CameraDevice) {
        if self.is_running() {
            self.stop();
        }
        tracing::info!(device = %device, "camera selected");
        self.speller.publish(Status::DeviceSelected(device.index));
        self.selected = Some(device);
    }

    /// Open the selected camera and begin detecting. No-op if already running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let Some(device) = self.selected.clone() else {
            self.speller.publish(Status::SelectDeviceFirst);
            return Err(SessionError::NoDeviceSelected);
        };

        let source = match self.camera.open(&device) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(device = %device, error = %e, "failed to open camera");
                self.speller.publish(Status::Error(e.to_string()));
                return Err(e.into());
            }
        };

        self.source = Some(source);
        self.speller.reset_engine();
        tracing::info!(device = %device, "detection started");
        self.speller.publish(Status::DetectionStarted);
        Ok(())
    }

    /// Stop detecting and release the camera. No-op if not running.
    pub fn stop(&mut self) {
        if self.release() {
            self.speller.publish(Status::DetectionStopped);
        }
    }

    pub fn toggle(&mut self) -> Result<()> {
        if self.is_running() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Grab a frame, classify it and feed the best detection to the speller.
    ///
    /// Does nothing while stopped. A camera failure stops the session and
    /// releases the device before the error is returned.
    pub fn tick(&mut self, now: Timestamp) -> Result<Option<ConfirmedSymbol>> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };

        let frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => return Err(self.fail(e)),
        };

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                tracing::warn!(error = %e, at = %now, "detector failed, treating as no detection");
                Vec::new()
            }
        };

        let sample = Sample::from_detection(top_detection(&detections), now);
        Ok(self.speller.tick(&sample, now))
    }

    fn fail(&mut self, error: CaptureError) -> SessionError {
        tracing::error!(error = %error, "camera failed, stopping detection");
        self.release();
        self.speller.publish(Status::Error(error.to_string()));
        self.speller.publish(Status::DetectionStopped);
        error.into()
    }

    /// Drop the source (releasing the device) and reset the stabilizer.
    /// Returns whether a device was held.
    fn release(&mut self) -> bool {
        let Some(source) = self.source.take() else {
            return false;
        };
        drop(source);
        self.speller.reset_engine();
        tracing::info!("camera released");
        true
    }
}

impl<C: Camera, D> Drop for DetectionSession<C, D> {
    fn drop(&mut self) {
        if self.source.take().is_some() {
            tracing::debug!("camera released on drop");
        }
    }
}
