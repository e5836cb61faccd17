//! Hand landmark topology
//!
//! Strongly-typed landmark indices for the 21-point hand model produced by
//! the detector, plus the fixed-length per-hand point set.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Number of landmarks reported per detected hand
pub const LANDMARKS_PER_HAND: usize = 21;

/// Landmark set construction and lookup errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    /// Detector produced a point list of unexpected length
    #[error("Hand landmark set has {actual} points (expected {expected})")]
    WrongLength {
        /// Required number of points
        expected: usize,
        /// Number of points received
        actual: usize,
    },

    /// Numeric landmark index outside the hand topology
    #[error("Landmark index {0} out of range (0..{max})", max = LANDMARKS_PER_HAND)]
    IndexOutOfRange(i64),

    /// Landmark name not recognised
    #[error("Unknown landmark name: {0}")]
    UnknownName(String),
}

/// A single landmark position in camera-frame-relative coordinates.
///
/// `x` and `y` are fractions of the frame width/height. `z` is relative
/// depth and is carried but never used for cursor or gesture math.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    /// Horizontal position (0.0 = left edge, 1.0 = right edge)
    pub x: f64,
    /// Vertical position (0.0 = top edge, 1.0 = bottom edge)
    pub y: f64,
    /// Relative depth
    #[serde(default)]
    pub z: f64,
}

impl NormalizedPoint {
    /// Create a point
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar euclidean distance to another point (z ignored)
    pub fn planar_distance(&self, other: &NormalizedPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Anatomical landmark identifiers.
///
/// Discriminants are the detector's stable point indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "LandmarkRepr")]
#[repr(u8)]
#[allow(missing_docs)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexFingerMcp = 5,
    IndexFingerPip = 6,
    IndexFingerDip = 7,
    IndexFingerTip = 8,
    MiddleFingerMcp = 9,
    MiddleFingerPip = 10,
    MiddleFingerDip = 11,
    MiddleFingerTip = 12,
    RingFingerMcp = 13,
    RingFingerPip = 14,
    RingFingerDip = 15,
    RingFingerTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    /// All landmarks in index order
    pub const ALL: [HandLandmark; LANDMARKS_PER_HAND] = [
        HandLandmark::Wrist,
        HandLandmark::ThumbCmc,
        HandLandmark::ThumbMcp,
        HandLandmark::ThumbIp,
        HandLandmark::ThumbTip,
        HandLandmark::IndexFingerMcp,
        HandLandmark::IndexFingerPip,
        HandLandmark::IndexFingerDip,
        HandLandmark::IndexFingerTip,
        HandLandmark::MiddleFingerMcp,
        HandLandmark::MiddleFingerPip,
        HandLandmark::MiddleFingerDip,
        HandLandmark::MiddleFingerTip,
        HandLandmark::RingFingerMcp,
        HandLandmark::RingFingerPip,
        HandLandmark::RingFingerDip,
        HandLandmark::RingFingerTip,
        HandLandmark::PinkyMcp,
        HandLandmark::PinkyPip,
        HandLandmark::PinkyDip,
        HandLandmark::PinkyTip,
    ];

    /// Detector point index
    pub fn index(self) -> usize {
        self as usize
    }

    /// Configuration name (snake_case)
    pub fn name(self) -> &'static str {
        match self {
            HandLandmark::Wrist => "wrist",
            HandLandmark::ThumbCmc => "thumb_cmc",
            HandLandmark::ThumbMcp => "thumb_mcp",
            HandLandmark::ThumbIp => "thumb_ip",
            HandLandmark::ThumbTip => "thumb_tip",
            HandLandmark::IndexFingerMcp => "index_finger_mcp",
            HandLandmark::IndexFingerPip => "index_finger_pip",
            HandLandmark::IndexFingerDip => "index_finger_dip",
            HandLandmark::IndexFingerTip => "index_finger_tip",
            HandLandmark::MiddleFingerMcp => "middle_finger_mcp",
            HandLandmark::MiddleFingerPip => "middle_finger_pip",
            HandLandmark::MiddleFingerDip => "middle_finger_dip",
            HandLandmark::MiddleFingerTip => "middle_finger_tip",
            HandLandmark::RingFingerMcp => "ring_finger_mcp",
            HandLandmark::RingFingerPip => "ring_finger_pip",
            HandLandmark::RingFingerDip => "ring_finger_dip",
            HandLandmark::RingFingerTip => "ring_finger_tip",
            HandLandmark::PinkyMcp => "pinky_mcp",
            HandLandmark::PinkyPip => "pinky_pip",
            HandLandmark::PinkyDip => "pinky_dip",
            HandLandmark::PinkyTip => "pinky_tip",
        }
    }

    /// Look up a landmark by configuration name
    pub fn from_name(name: &str) -> Result<Self, LandmarkError> {
        let wanted = name.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|landmark| landmark.name() == wanted)
            .ok_or_else(|| LandmarkError::UnknownName(name.to_string()))
    }
}

impl TryFrom<i64> for HandLandmark {
    type Error = LandmarkError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(LandmarkError::IndexOutOfRange(index))
    }
}

impl fmt::Display for HandLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.index())
    }
}

impl Serialize for HandLandmark {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Accepted configuration spellings of a landmark: name or raw index
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Index(i64),
    Name(String),
}

impl TryFrom<LandmarkRepr> for HandLandmark {
    type Error = LandmarkError;

    fn try_from(repr: LandmarkRepr) -> Result<Self, Self::Error> {
        match repr {
            LandmarkRepr::Index(index) => HandLandmark::try_from(index),
            LandmarkRepr::Name(name) => HandLandmark::from_name(&name),
        }
    }
}

/// All landmarks of one detected hand, indexed by [`HandLandmark`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NormalizedPoint>", into = "Vec<NormalizedPoint>")]
pub struct HandLandmarkSet {
    points: [NormalizedPoint; LANDMARKS_PER_HAND],
}

impl HandLandmarkSet {
    /// Build a set from a detector point list
    pub fn from_points(points: Vec<NormalizedPoint>) -> Result<Self, LandmarkError> {
        let actual = points.len();
        let points: [NormalizedPoint; LANDMARKS_PER_HAND] =
            points.try_into().map_err(|_| LandmarkError::WrongLength {
                expected: LANDMARKS_PER_HAND,
                actual,
            })?;
        Ok(Self { points })
    }

    /// Set with every landmark at the same position
    pub fn uniform(point: NormalizedPoint) -> Self {
        Self {
            points: [point; LANDMARKS_PER_HAND],
        }
    }

    /// Replace one landmark, builder style
    pub fn with(mut self, landmark: HandLandmark, point: NormalizedPoint) -> Self {
        self.points[landmark.index()] = point;
        self
    }

    /// Position of a landmark
    pub fn get(&self, landmark: HandLandmark) -> NormalizedPoint {
        self.points[landmark.index()]
    }

    /// All points in index order
    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }
}

impl TryFrom<Vec<NormalizedPoint>> for HandLandmarkSet {
    type Error = LandmarkError;

    fn try_from(points: Vec<NormalizedPoint>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<HandLandmarkSet> for Vec<NormalizedPoint> {
    fn from(set: HandLandmarkSet) -> Self {
        set.points.to_vec()
    }
}
