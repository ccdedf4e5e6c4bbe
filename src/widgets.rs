//! Character-grid rendering primitives.
//!
//! Screens never talk to the terminal directly. They paint into a [`Surface`]
//! (in production a ratatui [`Buffer`](ratatui::buffer::Buffer)) through the
//! helpers in [`draw`], and get back the [`ClickRegion`]s that map a tap to an
//! action id.
//!
//! Every write is clip-and-continue: text that falls outside the grid is
//! dropped by the surface, so a terminal that is too small renders partially
//! instead of failing.

pub mod click;
pub mod draw;
pub mod surface;

pub use click::{is_primary_click, resolve, ClickRegion, InputEvent};
pub use surface::Surface;
