use std::fmt;
use std::str::FromStr;

/**
    Rotation/flip applied to the decoded video before display.

    Mirrors the orientation methods understood by GStreamer's `videoflip`
    element. The supervising GUI historically passed the raw numeric value
    of the orientation enum, so both the number and the GStreamer nickname
    are accepted on the command line.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoDirection {
    /// No transformation
    #[default]
    Identity,
    /// Rotate 90° clockwise
    Rotate90Cw,
    /// Rotate 180°
    Rotate180,
    /// Rotate 90° counter-clockwise
    Rotate90Ccw,
    /// Flip horizontally
    FlipHorizontal,
    /// Flip vertically
    FlipVertical,
    /// Flip across the upper-left/lower-right diagonal
    FlipUpperLeft,
    /// Flip across the upper-right/lower-left diagonal
    FlipUpperRight,
    /// Select the transformation from image metadata
    Auto,
}

impl VideoDirection {
    /// The `videoflip` property nickname for this direction.
    pub fn nick(self) -> &'static str {
        match self {
            VideoDirection::Identity => "identity",
            VideoDirection::Rotate90Cw => "90r",
            VideoDirection::Rotate180 => "180",
            VideoDirection::Rotate90Ccw => "90l",
            VideoDirection::FlipHorizontal => "horiz",
            VideoDirection::FlipVertical => "vert",
            VideoDirection::FlipUpperLeft => "ul-lr",
            VideoDirection::FlipUpperRight => "ur-ll",
            VideoDirection::Auto => "auto",
        }
    }
}

impl fmt::Display for VideoDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nick())
    }
}

/// Error returned when a direction argument is not recognized.
#[derive(Debug)]
pub struct InvalidDirection(pub String);

impl fmt::Display for InvalidDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown video direction {:?} (expected 0-8 or one of identity, 90r, 180, 90l, horiz, vert, ul-lr, ur-ll, auto)",
            self.0
        )
    }
}

impl std::error::Error for InvalidDirection {}

impl FromStr for VideoDirection {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let direction = match s.trim() {
            "0" => VideoDirection::Identity,
            "1" => VideoDirection::Rotate90Cw,
            "2" => VideoDirection::Rotate180,
            "3" => VideoDirection::Rotate90Ccw,
            "4" => VideoDirection::FlipHorizontal,
            "5" => VideoDirection::FlipVertical,
            "6" => VideoDirection::FlipUpperLeft,
            "7" => VideoDirection::FlipUpperRight,
            "8" => VideoDirection::Auto,
            token => match token.to_ascii_lowercase().as_str() {
                // "none" is the label the GUI shows for the untransformed stream
                "identity" | "none" => VideoDirection::Identity,
                "90r" => VideoDirection::Rotate90Cw,
                "180" => VideoDirection::Rotate180,
                "90l" => VideoDirection::Rotate90Ccw,
                "horiz" => VideoDirection::FlipHorizontal,
                "vert" => VideoDirection::FlipVertical,
                "ul-lr" => VideoDirection::FlipUpperLeft,
                "ur-ll" => VideoDirection::FlipUpperRight,
                "auto" => VideoDirection::Auto,
                _ => return Err(InvalidDirection(s.to_string())),
            },
        };

        Ok(direction)
    }
}
