use std::time::Duration;

use crossbeam_channel::Sender;
use fingerspell_application::{DetectionSession, SessionError, Speller};
use fingerspell_capture::CameraDevice;
use fingerspell_sign::Timestamp;

use crate::replay::{RecordedDetector, ReplayCamera, ReplayFrame};
use crate::trace::{Command, TraceEvent, TraceLine};

/// Feeds trace lines into a detection session, one at a time.
pub struct Driver {
    session: DetectionSession<ReplayCamera, RecordedDetector>,
    frames: Option<Sender<ReplayFrame>>,
    now: Timestamp,
}

impl Driver {
    pub fn new(speller: Speller, device_count: u32) -> Self {
        let (camera, frames) = ReplayCamera::new(device_count);
        Self {
            session: DetectionSession::new(camera, RecordedDetector, speller),
            frames: Some(frames),
            now: Timestamp::ZERO,
        }
    }

    pub fn session(&self) -> &DetectionSession<ReplayCamera, RecordedDetector> {
        &self.session
    }

    /// Select `device` and start detecting on it.
    pub fn begin(&mut self, device: u32) -> Result<(), SessionError> {
        let device = self
            .session
            .devices()
            .into_iter()
            .find(|d| d.index == device)
            .unwrap_or_else(|| CameraDevice::new(device));
        self.session.select_device(device);
        self.session.start()
    }

    /// Apply one line. Time never goes backwards: an out-of-order line is
    /// handled at the latest time seen so far.
    pub fn apply(&mut self, line: &TraceLine) {
        self.now = self.now.max(Timestamp::from_millis(line.t_ms));
        match &line.event {
            TraceEvent::Frame(detections) => self.frame(detections),
            TraceEvent::Command(command) => self.command(command),
        }
    }

    fn frame(&mut self, detections: &ReplayFrame) {
        if !self.session.is_running() {
            tracing::trace!(at = %self.now, "detection stopped, frame skipped");
            return;
        }
        let Some(frames) = &self.frames else {
            return;
        };
        if frames.send(detections.clone()).is_err() {
            tracing::warn!("replay camera is gone, frame dropped");
            return;
        }
        if let Err(e) = self.session.tick(self.now) {
            tracing::warn!(error = %e, at = %self.now, "tick failed");
        }
    }

    fn command(&mut self, command: &Command) {
        tracing::debug!(?command, at = %self.now, "command");
        let result = match command {
            Command::Backspace => {
                self.session.speller_mut().backspace();
                Ok(())
            }
            Command::Space => {
                self.session.speller_mut().add_space();
                Ok(())
            }
            Command::Clear => {
                self.session.speller_mut().clear();
                Ok(())
            }
            Command::Submit => self.session.speller_mut().submit().map(|_| ()),
            Command::ClearHistory => self.session.speller_mut().clear_history(),
            Command::SetConfidence(value) => {
                self.session.speller_mut().set_confidence_min(*value);
                Ok(())
            }
            Command::SetHoldMs(ms) => {
                self.session.speller_mut().set_hold_duration(Duration::from_millis(*ms));
                Ok(())
            }
            Command::Start => self.session.start(),
            Command::Stop => {
                self.session.stop();
                Ok(())
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, ?command, "command failed");
        }
    }

    /// The recording is over: unplug the camera and let the session notice.
    pub fn finish(&mut self) {
        self.frames = None;
        if !self.session.is_running() {
            return;
        }
        match self.session.tick(self.now) {
            Err(SessionError::Device(e)) => tracing::info!(error = %e, "end of trace"),
            Err(e) => tracing::warn!(error = %e, "end of trace"),
            Ok(_) => {}
        }
    }

    /// Interrupted: stop and release the camera.
    pub fn cancel(&mut self) {
        self.session.stop();
    }
}
