//! Serial Port Com: a terminal front end for a single serial port.
//!
//! Pick a port, set the UART parameters, send typed lines and watch the
//! traffic that comes back. The crate is split into the port layer
//! (`protocol`), UI-independent session logic (`core`) and the frontends
//! (`tui`, plus the headless monitor and one-shot actions in `cli`).

#[doc(hidden)]
pub mod boot;
pub mod cli;
pub mod core;
pub mod i18n;
pub mod protocol;
#[doc(hidden)]
pub mod tui;
