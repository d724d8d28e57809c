use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use softbuffer::{Context as SoftContext, Surface};
use winit::window::Window;

type WindowHandle = Arc<Window>;

/// CPU-side surface used to paint the slideshow window black between items.
pub struct BlankSurface {
    window: WindowHandle,
    _context: SoftContext<WindowHandle>,
    surface: Surface<WindowHandle, WindowHandle>,
}

impl BlankSurface {
    pub fn new(window: WindowHandle) -> Result<Self> {
        let context = SoftContext::new(window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer context: {err}"))?;
        let surface = Surface::new(&context, window.clone())
            .map_err(|err| anyhow!("failed to create softbuffer surface: {err}"))?;
        Ok(Self {
            window,
            _context: context,
            surface,
        })
    }

    pub fn fill_black(&mut self) -> Result<()> {
        let size = self.window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };
        self.surface
            .resize(width, height)
            .map_err(|err| anyhow!("resize failed: {err}"))?;
        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|err| anyhow!("buffer unavailable: {err}"))?;
        buffer.fill(0);
        buffer
            .present()
            .map_err(|err| anyhow!("present failed: {err}"))
    }
}
