//! Acquisition loop.

use super::PipelineShared;
use crate::capabilities::FrameSource;
use crate::error::Result;
use std::sync::Arc;
use tracing::{error, info};

/// Run the acquisition loop to completion.
///
/// Publishes every captured frame into the shared slot and opens the ready
/// latch after the first one. A clean end-of-clip requests shutdown and
/// returns `Ok`; any other capture failure requests shutdown and propagates
/// the error, which takes the whole pipeline down (fail fast, no
/// reconnect).
pub fn run(mut source: Box<dyn FrameSource>, shared: Arc<PipelineShared>, max_frames: u64) -> Result<()> {
    let (width, height) = source.resolution();
    info!(width, height, "acquisition started");

    let mut captured: u64 = 0;
    while !shared.is_shutdown() {
        let frame = match source.acquire() {
            Ok(frame) => frame,
            Err(e) if e.is_exhausted() => {
                info!(frames = captured, "frame source exhausted");
                shared.request_shutdown();
                return Ok(());
            }
            Err(e) => {
                error!(error = %e, frames = captured, "frame capture failed");
                shared.request_shutdown();
                return Err(e);
            }
        };

        shared.raw.publish(frame);
        captured += 1;
        if captured == 1 {
            shared.ready.open();
        }
        if max_frames > 0 && captured >= max_frames {
            info!(frames = captured, "frame limit reached");
            shared.request_shutdown();
            break;
        }
    }

    info!(frames = captured, "acquisition stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{MockCamera, ScriptedSource};
    use crate::frame::Frame;

    #[test]
    fn test_opens_latch_and_publishes() {
        let shared = Arc::new(PipelineShared::new());
        let source = Box::new(MockCamera::new(32, 32));
        run(source, Arc::clone(&shared), 5).expect("acquisition");
        assert!(shared.ready.is_open());
        assert!(shared.raw.snapshot().is_some());
        assert!(shared.is_shutdown());
    }

    #[test]
    fn test_exhaustion_is_clean_stop() {
        let shared = Arc::new(PipelineShared::new());
        let source = Box::new(ScriptedSource::new(vec![Frame::uniform(8, 8, 0); 3]));
        run(source, Arc::clone(&shared), 0).expect("clean stop");
        assert!(shared.is_shutdown());
    }

    #[test]
    fn test_capture_fault_propagates() {
        let shared = Arc::new(PipelineShared::new());
        let source = Box::new(
            ScriptedSource::new(vec![Frame::uniform(8, 8, 0)]).failing_after_exhaustion(),
        );
        let err = run(source, Arc::clone(&shared), 0).unwrap_err();
        assert!(!err.is_exhausted());
        assert!(shared.is_shutdown());
    }

    #[test]
    fn test_respects_external_shutdown() {
        let shared = Arc::new(PipelineShared::new());
        shared.request_shutdown();
        let source = Box::new(MockCamera::new(32, 32));
        run(source, Arc::clone(&shared), 0).expect("immediate exit");
        assert!(shared.raw.snapshot().is_none());
    }
}
