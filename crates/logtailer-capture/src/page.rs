use std::rc::Rc;

use crate::Result;
use crate::bridge::{RelayBridge, RuntimePort};
use crate::console::{Console, ConsoleOutput};
use crate::interceptor::{InstalledInterceptor, Interceptor};
use crate::window::{Window, WindowId};

/// One page load: a window, its console, and the capture installed on it.
///
/// Dropping the page tears the interceptor down again.
pub struct Page {
    window: Window,
    console: Rc<Console>,
    installed: InstalledInterceptor,
}

impl Page {
    /// Load a page and install `interceptor` before any page code runs.
    pub fn load(window_id: WindowId, output: Rc<dyn ConsoleOutput>, interceptor: &Interceptor) -> Result<Self> {
        let window = Window::new(window_id);
        let console = Console::new(output);
        let installed = interceptor.install(&console, &window)?;
        Ok(Self {
            window,
            console,
            installed,
        })
    }

    /// Load a page with a relay bridge already listening on its window.
    pub fn load_with_bridge<P>(
        window_id: WindowId,
        output: Rc<dyn ConsoleOutput>,
        interceptor: &Interceptor,
        port: P,
    ) -> Result<Self>
    where
        P: RuntimePort + 'static,
    {
        let page = Self::load(window_id, output, interceptor)?;
        RelayBridge::attach(&page.window, port);
        Ok(page)
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn captured_levels(&self) -> Vec<logtailer_types::LogLevel> {
        self.installed.levels()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("window", &self.window)
            .field("captured_levels", &self.captured_levels())
            .finish()
    }
}
