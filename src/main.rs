use std::process;

use clap::Parser;
use clap::error::ErrorKind;
use gstreamer as gst;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod direction;
mod pipeline;
mod playback;

/// Exit codes shared with the supervising GUI.
const EXIT_USAGE: i32 = -1;
const EXIT_STARTUP: i32 = -2;

/**
    Receive one RTP camera stream over UDP and render it into an existing
    window.

    Spawned by the camera viewer GUI, one process per displayed stream. The
    window belongs to the caller; this program only draws into it and exits
    when the stream ends or fails.
*/
#[derive(Parser, Debug)]
#[command(name = "cam_viewer")]
#[command(about = "Receive an RTP video stream over UDP and render it into an existing window")]
struct Args {
    /// UDP port to listen on for RTP packets
    port: u16,

    /// Stream encoding: MJPG or H264
    format: String,

    /// Rotation/flip: 0-8 or a videoflip nickname (identity, 90r, 180, 90l, horiz, vert, auto, ...)
    video_direction: String,

    /// Native window id (X11 XID) to render into
    window_id: u64,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cam_viewer=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(EXIT_USAGE),
            }
        }
    };

    if let Err(err) = gst::init() {
        error!("failed to initialize GStreamer: {err}");
        process::exit(EXIT_STARTUP);
    }

    let pipeline = match pipeline::build(args.port, &args.format, &args.video_direction) {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!("failed to create pipeline: {err}");
            process::exit(EXIT_STARTUP);
        }
    };

    if let Err(err) = playback::run(&pipeline, args.window_id) {
        error!("failed to start playback: {err:#}");
        process::exit(EXIT_STARTUP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_four_positional_args() {
        let args =
            Args::try_parse_from(["cam_viewer", "20123", "MJPG", "2", "174063681"]).unwrap();
        assert_eq!(args.port, 20123);
        assert_eq!(args.format, "MJPG");
        assert_eq!(args.video_direction, "2");
        assert_eq!(args.window_id, 174063681);
    }

    #[test]
    fn test_rejects_missing_args() {
        assert!(Args::try_parse_from(["cam_viewer", "20123", "MJPG"]).is_err());
    }

    #[test]
    fn test_rejects_extra_args() {
        assert!(
            Args::try_parse_from(["cam_viewer", "20123", "MJPG", "2", "174063681", "extra"])
                .is_err()
        );
    }

    #[test]
    fn test_rejects_non_numeric_port() {
        assert!(Args::try_parse_from(["cam_viewer", "video0", "MJPG", "0", "1"]).is_err());
    }

    #[test]
    fn test_format_and_direction_stay_raw() {
        // interpreted later so a bad value is a construction failure, not a
        // usage error
        let args = Args::try_parse_from(["cam_viewer", "20123", "YUYV", "upside-down", "1"])
            .unwrap();
        assert_eq!(args.format, "YUYV");
        assert_eq!(args.video_direction, "upside-down");
    }
}
