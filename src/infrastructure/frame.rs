use gloo::render::{AnimationFrame, request_animation_frame};

use crate::application::scheduler::FrameHost;

/// `requestAnimationFrame`; dropping the handle cancels the frame
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFrameHost;

impl FrameHost for BrowserFrameHost {
    type Handle = AnimationFrame;

    fn request_frame(&self, callback: Box<dyn FnOnce()>) -> AnimationFrame {
        request_animation_frame(move |_timestamp| callback())
    }
}
