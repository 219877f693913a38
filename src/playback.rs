use anyhow::{Context, Result};
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use gstreamer_video as gst_video;
use gstreamer_video::prelude::*;
use tracing::{error, info, warn};

/**
    Drive a constructed pipeline until the stream ends.

    Two bus hooks do all the supervision: a synchronous handler that hands
    the sink our window the moment it asks for one, and an asynchronous
    watch that stops the main loop on end-of-stream or error. Everything
    else is GStreamer's business.
*/
pub fn run(pipeline: &gst::Pipeline, window_id: u64) -> Result<()> {
    let main_loop = glib::MainLoop::new(None, false);

    let bus = pipeline.bus().context("pipeline has no message bus")?;
    bind_window_handle(&bus, window_id);

    let watch_guard = {
        let main_loop = main_loop.clone();
        bus.add_watch(move |_, message| match message.view() {
            gst::MessageView::Eos(..) => {
                info!("end of stream");
                main_loop.quit();
                glib::ControlFlow::Break
            }
            gst::MessageView::Error(err) => {
                error!(
                    source = err
                        .src()
                        .map(|s| s.path_string())
                        .as_deref()
                        .unwrap_or("unknown"),
                    debug = ?err.debug(),
                    "stream error: {}",
                    err.error()
                );
                main_loop.quit();
                glib::ControlFlow::Break
            }
            _ => glib::ControlFlow::Continue,
        })
        .context("failed to attach bus watch")?
    };

    if let Err(err) = pipeline.set_state(gst::State::Playing) {
        // The failure is also posted on the bus as an error message, so the
        // watch above still terminates the loop.
        warn!("pipeline refused to start: {err}");
    }

    main_loop.run();

    drop(watch_guard);

    if let Err(err) = pipeline.set_state(gst::State::Null) {
        warn!("failed to reset pipeline state: {err}");
    }

    Ok(())
}

/// Route the sink's prepare-window-handle request to the caller's window.
///
/// Must run synchronously on the streaming thread: by the time the message
/// would reach the main loop the sink has already created its own window.
fn bind_window_handle(bus: &gst::Bus, window_id: u64) {
    bus.set_sync_handler(move |_, message| {
        if !gst_video::is_video_overlay_prepare_window_handle_message(message) {
            return gst::BusSyncReply::Pass;
        }

        if let Some(overlay) = message
            .src()
            .and_then(|source| source.dynamic_cast_ref::<gst_video::VideoOverlay>())
        {
            info!(window_id, "binding video overlay to caller's window");
            unsafe { overlay.set_window_handle(window_id as usize) };
        }

        gst::BusSyncReply::Drop
    });
}
