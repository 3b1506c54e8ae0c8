//! Transformation kinds and worker parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// The four supported transformation kinds.
///
/// The set is closed: routing performs an exhaustive match over these
/// variants, and a payload naming anything else is rejected at parse
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transformation_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationType {
    /// Rotate by a right-angle multiple.
    Rotate,
    /// Resize preserving aspect ratio.
    Resize,
    /// Resize to exact dimensions, ignoring aspect ratio.
    ForceResize,
    /// Convert to a different image format.
    Convert,
}

impl TransformationType {
    /// All known kinds, for exhaustive binding-table construction.
    pub const ALL: [TransformationType; 4] = [
        Self::Rotate,
        Self::Resize,
        Self::ForceResize,
        Self::Convert,
    ];

    /// Return the kind in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotate => "ROTATE",
            Self::Resize => "RESIZE",
            Self::ForceResize => "FORCE_RESIZE",
            Self::Convert => "CONVERT",
        }
    }
}

impl fmt::Display for TransformationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransformationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROTATE" => Ok(Self::Rotate),
            "RESIZE" => Ok(Self::Resize),
            "FORCE_RESIZE" => Ok(Self::ForceResize),
            "CONVERT" => Ok(Self::Convert),
            other => Err(format!("unknown transformation type: '{other}'")),
        }
    }
}

/// Client-supplied transformation parameters.
///
/// Validated at intake, then stored and forwarded as an opaque blob;
/// only the external worker interprets the fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransformationParameters {
    /// Target width in pixels (RESIZE / FORCE_RESIZE).
    #[validate(range(min = 1, message = "Width must be greater than 0"))]
    pub width: Option<u32>,
    /// Target height in pixels (RESIZE / FORCE_RESIZE).
    #[validate(range(min = 1, message = "Height must be greater than 0"))]
    pub height: Option<u32>,
    /// Rotation in degrees (ROTATE); must be one of 0, 90, 180, 270.
    #[validate(custom(function = "validate_degree"))]
    pub degree: Option<u32>,
    /// Target format (CONVERT); one of PNG, JPEG, GIF, BMP, TIFF.
    #[validate(custom(function = "validate_format"))]
    pub format: Option<String>,
}

fn validate_degree(degree: u32) -> Result<(), validator::ValidationError> {
    if matches!(degree, 0 | 90 | 180 | 270) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("degree");
        err.message = Some("Degree must be one of 0, 90, 180, 270".into());
        Err(err)
    }
}

fn validate_format(format: &str) -> Result<(), validator::ValidationError> {
    const SUPPORTED: [&str; 5] = ["PNG", "JPEG", "GIF", "BMP", "TIFF"];
    if SUPPORTED.contains(&format) {
        Ok(())
    } else {
        let mut err = validator::ValidationError::new("format");
        err.message = Some("Supported formats are PNG, JPEG, GIF, BMP, TIFF".into());
        Err(err)
    }
}
