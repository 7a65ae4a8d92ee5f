use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraDevice {
    pub index: u32,
    pub name: String,
}

impl CameraDevice {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            name: format!("Webcam {index}"),
        }
    }
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
