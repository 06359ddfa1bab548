//! Page-side half of logtailer.
//!
//! A [`Page`] owns a console, the window it posts to, and the interceptor
//! that copies every console call into a [`logtailer_types::PageMessage`].
//! A [`RelayBridge`] listens on the same window and forwards those records
//! to the privileged runtime through a [`RuntimePort`].

pub mod bridge;
pub mod console;
pub mod error;
pub mod interceptor;
pub mod page;
pub mod serialize;
pub mod value;
pub mod window;

pub use bridge::{Relay, RelayBridge, RuntimePort};
pub use console::{CallSite, Console, ConsoleMethod, ConsoleOutput, RecordingOutput, StderrOutput};
pub use error::{Error, Result};
pub use interceptor::{InstalledInterceptor, Interceptor};
pub use page::Page;
pub use serialize::{CIRCULAR_MARKER, FALLBACK_MESSAGE, Serializer, serialize_args};
pub use value::{ArrayRef, ObjectRef, Value};
pub use window::{Window, WindowId, WindowMessage};
