/// UI-independent logic shared by the terminal front end and the monitor:
/// - Message bus for UI-core communication
/// - Core runtime loop
/// - Scrollback panel data
/// - The connection session
pub mod bus;
pub mod logs;
pub mod runtime;
pub mod session;

pub use bus::{Bus, CoreToUi, UiToCore};
pub use runtime::{CoreContext, CoreRuntimeConfig};
pub use session::Session;
