// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Layer/surface drawing model, ordered render queue and scene graph
//! for a Guacamole-style remote-desktop protocol client.
//!
//! # Quick start
//!
//! ```
//! use guac_render::{Display, RenderQueue};
//! # struct NullSurface;
//! # impl guac_render::Surface for NullSurface {
//! #     fn width(&self) -> u32 { 0 }
//! #     fn height(&self) -> u32 { 0 }
//! #     fn resize(&mut self, _w: u32, _h: u32) -> guac_render::Result<()> { Ok(()) }
//! #     fn move_to(&mut self, _x: f64, _y: f64) {}
//! #     fn line_to(&mut self, _x: f64, _y: f64) {}
//! #     fn curve_to(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64, _x3: f64, _y3: f64) {}
//! #     fn arc(&mut self, _cx: f64, _cy: f64, _r: f64, _s: f64, _e: f64, _ccw: bool) {}
//! #     fn rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64) {}
//! #     fn close_path(&mut self) {}
//! #     fn clip(&mut self) {}
//! #     fn fill_color(&mut self, _rgba: [u8; 4], _mask: guac_render::ChannelMask) {}
//! #     fn fill_layer(&mut self, _source: &dyn guac_render::Surface, _mask: guac_render::ChannelMask) {}
//! #     fn stroke_color(&mut self, _cap: guac_render::LineCap, _join: guac_render::LineJoin, _t: f64, _rgba: [u8; 4], _mask: guac_render::ChannelMask) {}
//! #     fn stroke_layer(&mut self, _cap: guac_render::LineCap, _join: guac_render::LineJoin, _t: f64, _source: &dyn guac_render::Surface, _mask: guac_render::ChannelMask) {}
//! #     fn draw_image(&mut self, _x: f64, _y: f64, _rgba: &[u8], _w: u32, _h: u32) {}
//! #     fn draw_encoded_image(&mut self, _x: f64, _y: f64, _mimetype: &str, _data: &[u8]) {}
//! #     fn transfer(&mut self, _source: &dyn guac_render::Surface, _sx: u32, _sy: u32, _w: u32, _h: u32, _dx: u32, _dy: u32, _f: guac_render::TransferFn) {}
//! #     fn put(&mut self, _source: &dyn guac_render::Surface, _sx: u32, _sy: u32, _w: u32, _h: u32, _dx: u32, _dy: u32) {}
//! #     fn copy(&mut self, _source: &dyn guac_render::Surface, _sx: u32, _sy: u32, _w: u32, _h: u32, _dx: u32, _dy: u32) {}
//! #     fn push(&mut self) {}
//! #     fn pop(&mut self) {}
//! #     fn reset(&mut self) {}
//! #     fn set_transform(&mut self, _m: guac_render::AffineMatrix) {}
//! #     fn transform(&mut self, _m: guac_render::AffineMatrix) {}
//! #     fn set_channel_mask(&mut self, _mask: guac_render::ChannelMask) {}
//! #     fn set_miter_limit(&mut self, _limit: f64) {}
//! # }
//! let display = Display::new(Box::new(NullSurface));
//! let mut queue = RenderQueue::new();
//! queue.schedule(Box::new(move || { let _ = &display; }));
//! queue.flush();
//! ```

pub mod display;
pub mod error;
pub mod layer;
pub mod queue;
pub mod surface;

pub use display::{Display, CURSOR_LAYER_INDEX};
pub use error::{Result, SurfaceError};
pub use layer::Layer;
pub use queue::{RenderQueue, Task, TaskHandle};
pub use surface::{transfer_function, AffineMatrix, ChannelMask, LineCap, LineJoin, Surface, TransferFn, IDENTITY_MATRIX};
