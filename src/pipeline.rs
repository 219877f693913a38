use std::fmt;
use std::str::FromStr;

use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use tracing::debug;

use crate::direction::{InvalidDirection, VideoDirection};

/**
    Video encodings the camera server can ship over RTP.

    The names match the V4L2 pixel format strings the server reports, which
    is what the supervising GUI passes through on the command line.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    Mjpg,
    H264,
}

impl StreamFormat {
    fn depayloader(self) -> &'static str {
        match self {
            StreamFormat::Mjpg => "rtpjpegdepay",
            StreamFormat::H264 => "rtph264depay",
        }
    }

    fn decoder(self) -> &'static str {
        match self {
            StreamFormat::Mjpg => "jpegdec",
            StreamFormat::H264 => "avdec_h264",
        }
    }

    /// RTP caps announced by the sending side (rtpjpegpay / rtph264pay
    /// with their default payload types).
    fn rtp_caps(self) -> gst::Caps {
        match self {
            StreamFormat::Mjpg => gst::Caps::builder("application/x-rtp")
                .field("encoding-name", "JPEG")
                .field("payload", 26i32)
                .build(),
            StreamFormat::H264 => gst::Caps::builder("application/x-rtp")
                .field("encoding-name", "H264")
                .field("payload", 96i32)
                .build(),
        }
    }
}

impl FromStr for StreamFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MJPG" => Ok(StreamFormat::Mjpg),
            "H264" => Ok(StreamFormat::H264),
            _ => Err(PipelineError::UnsupportedFormat(s.to_string())),
        }
    }
}

/**
    Typed pipeline construction error.

    Any of these aborts startup; there is no partial pipeline to salvage.
*/
#[derive(Debug)]
pub enum PipelineError {
    /// The requested format is not one the camera server can send
    UnsupportedFormat(String),
    /// The requested rotation/flip is not understood by videoflip
    UnsupportedDirection(String),
    /// A required element factory is missing from the GStreamer installation
    MissingElement(&'static str),
    /// The bin rejected an element or a link refused to connect
    Assembly(glib::BoolError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::UnsupportedFormat(format) => {
                write!(f, "unsupported stream format {:?} (expected MJPG or H264)", format)
            }
            PipelineError::UnsupportedDirection(direction) => {
                write!(f, "unknown video direction {:?}", direction)
            }
            PipelineError::MissingElement(factory) => {
                write!(f, "GStreamer element {:?} is not available (missing plugin?)", factory)
            }
            PipelineError::Assembly(err) => write!(f, "failed to assemble pipeline: {}", err),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<glib::BoolError> for PipelineError {
    fn from(err: glib::BoolError) -> Self {
        PipelineError::Assembly(err)
    }
}

fn make_element(factory: &'static str) -> Result<gst::Element, PipelineError> {
    gst::ElementFactory::make(factory)
        .build()
        .map_err(|_| PipelineError::MissingElement(factory))
}

/**
    Assemble the receive/decode/display pipeline for one stream.

    Both formats share the same shape: a UDP source feeding an RTP
    depayloader through a fixed caps filter, then decode, rotate/flip,
    convert, and present. Only the depayloader, decoder, and caps differ
    per format.
*/
pub fn build(port: u16, format: &str, direction: &str) -> Result<gst::Pipeline, PipelineError> {
    let format: StreamFormat = format.parse()?;
    let direction: VideoDirection = direction
        .parse()
        .map_err(|InvalidDirection(raw)| PipelineError::UnsupportedDirection(raw))?;

    debug!(port, ?format, %direction, "building pipeline");

    let pipeline = gst::Pipeline::with_name("cam-viewer");

    let udp_source = make_element("udpsrc")?;
    udp_source.set_property("port", i32::from(port));

    let depayloader = make_element(format.depayloader())?;
    let decoder = make_element(format.decoder())?;

    let flipper = make_element("videoflip")?;
    flipper.set_property_from_str("video-direction", direction.nick());

    let converter = make_element("autovideoconvert")?;
    let sink = make_element("ximagesink")?;

    pipeline.add_many([
        &udp_source,
        &depayloader,
        &decoder,
        &flipper,
        &converter,
        &sink,
    ])?;

    udp_source.link_filtered(&depayloader, &format.rtp_caps())?;
    gst::Element::link_many([&depayloader, &decoder, &flipper, &converter, &sink])?;

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!("MJPG".parse::<StreamFormat>().unwrap(), StreamFormat::Mjpg);
        assert_eq!("H264".parse::<StreamFormat>().unwrap(), StreamFormat::H264);
    }

    #[test]
    fn test_format_is_exact_match() {
        // the server reports V4L2 pixel formats verbatim; nothing else is valid
        assert!("mjpg".parse::<StreamFormat>().is_err());
        assert!("JPEG".parse::<StreamFormat>().is_err());
        assert!("AV1".parse::<StreamFormat>().is_err());
    }

    #[test]
    fn test_unknown_format_fails_before_any_element_work() {
        // deliberately no gst::init() here: the format check must come first
        assert!(matches!(
            build(9000, "YUYV", "0"),
            Err(PipelineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_unknown_direction_fails_before_any_element_work() {
        assert!(matches!(
            build(9000, "MJPG", "9"),
            Err(PipelineError::UnsupportedDirection(_))
        ));
    }

    #[test]
    fn test_rtp_caps_match_sender() {
        gst::init().unwrap();

        let caps = StreamFormat::Mjpg.rtp_caps();
        let s = caps.structure(0).unwrap();
        assert_eq!(s.name(), "application/x-rtp");
        assert_eq!(s.get::<&str>("encoding-name").unwrap(), "JPEG");
        assert_eq!(s.get::<i32>("payload").unwrap(), 26);

        let caps = StreamFormat::H264.rtp_caps();
        let s = caps.structure(0).unwrap();
        assert_eq!(s.get::<&str>("encoding-name").unwrap(), "H264");
        assert_eq!(s.get::<i32>("payload").unwrap(), 96);
    }
}
