//! Frame buffer + panel pairing behind the shared render lock.
//!
//! Exactly one [`GfxRenderer`] exists per device. It is handed to every
//! activity as `Arc<Mutex<_>>`; whoever holds the lock owns both the frame
//! buffer and the panel for the duration. Render tasks hold it for one
//! whole redraw, activity teardown acquires it before halting a task.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::DisplayDevice;
use crate::framebuffer::FrameBuffer;

pub struct GfxRenderer {
    framebuffer: FrameBuffer,
    panel: Box<dyn DisplayDevice>,
}

pub type SharedRenderer = Arc<Mutex<GfxRenderer>>;

impl GfxRenderer {
    pub fn new(panel: Box<dyn DisplayDevice>) -> Self {
        Self {
            framebuffer: FrameBuffer::new(),
            panel,
        }
    }

    pub fn shared(panel: Box<dyn DisplayDevice>) -> SharedRenderer {
        Arc::new(Mutex::new(Self::new(panel)))
    }

    pub fn framebuffer(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    /// Push the current frame buffer to the panel (slow).
    pub fn present(&mut self) {
        if let Err(err) = self.panel.present(self.framebuffer.raster()) {
            log::warn!("present failed: {}", err);
        }
    }

    /// Put the panel into its lowest-power state ahead of device deep sleep.
    pub fn sleep_panel(&mut self) {
        self.panel.deep_sleep();
    }
}

/// Lock the renderer, recovering the guard if a render thread panicked.
pub fn lock(renderer: &SharedRenderer) -> MutexGuard<'_, GfxRenderer> {
    match renderer.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::TestPanel;
    use crate::framebuffer::FrameBuffer;
    use embedded_graphics::pixelcolor::BinaryColor;

    #[test]
    fn present_pushes_current_raster() {
        let (panel, probe) = TestPanel::new();
        let mut renderer = GfxRenderer::new(Box::new(panel));
        renderer.framebuffer().set_pixel(0, 0, BinaryColor::On);
        renderer.present();
        assert_eq!(probe.presents_completed(), 1);
        assert_eq!(probe.last_raster().len(), FrameBuffer::raster_len());
        // MSB of the first byte is the (0,0) pixel; black clears it.
        assert_eq!(probe.last_raster()[0] & 0x80, 0);
    }
}
