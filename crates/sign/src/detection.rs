use serde::{Deserialize, Serialize};

/// Pixel box of a detection, `(x1, y1)` top-left to `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One detector result for a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    #[serde(default)]
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: BoundingBox) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }
}

/// Highest-confidence detection of a frame. Ties go to the earliest one.
pub fn top_detection(detections: &[Detection]) -> Option<&Detection> {
    detections.iter().fold(None, |best: Option<&Detection>, d| match best {
        // NaN never wins
        Some(b) if !(d.confidence > b.confidence) => Some(b),
        _ if d.confidence.is_nan() => best,
        _ => Some(d),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(label: &str, confidence: f32) -> Detection {
        Detection::new(label, confidence, BoundingBox::default())
    }

    #[test]
    fn test_top_detection_empty() {
        assert!(top_detection(&[]).is_none());
    }

    #[test]
    fn test_top_detection_picks_highest() {
        let dets = vec![det("A", 0.4), det("B", 0.92), det("C", 0.7)];
        assert_eq!(top_detection(&dets).map(|d| d.label.as_str()), Some("B"));
    }

    #[test]
    fn test_top_detection_tie_keeps_first() {
        let dets = vec![det("A", 0.8), det("B", 0.8)];
        assert_eq!(top_detection(&dets).map(|d| d.label.as_str()), Some("A"));
    }

    #[test]
    fn test_top_detection_skips_nan() {
        let dets = vec![det("A", f32::NAN), det("B", 0.1)];
        assert_eq!(top_detection(&dets).map(|d| d.label.as_str()), Some("B"));
    }

    #[test]
    fn test_detection_deserialize_bbox_array() {
        let json = r#"{"label": "L", "confidence": 0.88, "bbox": [1, 2, 30, 40]}"#;
        let d: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(d.bbox, BoundingBox { x1: 1, y1: 2, x2: 30, y2: 40 });
    }

    #[test]
    fn test_detection_deserialize_without_bbox() {
        let json = r#"{"label": "L", "confidence": 0.5}"#;
        let d: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(d.bbox, BoundingBox::default());
    }
}
