// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! A buffered raster surface identified by a signed index: zero is the
//! root, positive is a visible layer, negative is an off-screen buffer.

use crate::surface::{AffineMatrix, ChannelMask, LineCap, LineJoin, Surface, TransferFn, IDENTITY_MATRIX};

/// One drawable layer or buffer, wrapping an embedder-supplied
/// [`Surface`] and adding autosize bookkeeping.
pub struct Layer {
    index: i32,
    surface: Box<dyn Surface>,
    autosize: bool,
    channel_mask: ChannelMask,
    transform: AffineMatrix,
}

impl Layer {
    #[must_use]
    pub fn new(index: i32, surface: Box<dyn Surface>) -> Self {
        Self {
            index,
            surface,
            // Buffers (negative index) default to autosize; the root and
            // visible layers start at a fixed size set by `size`.
            autosize: index < 0,
            channel_mask: ChannelMask::default(),
            transform: IDENTITY_MATRIX,
        }
    }

    #[must_use]
    pub const fn index(&self) -> i32 {
        self.index
    }

    #[must_use]
    pub const fn is_buffer(&self) -> bool {
        self.index < 0
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn set_autosize(&mut self, enabled: bool) {
        self.autosize = enabled;
    }

    #[must_use]
    pub const fn channel_mask(&self) -> ChannelMask {
        self.channel_mask
    }

    pub fn set_channel_mask(&mut self, code: u8) {
        // Forbidden codes are rejected silently: the layer keeps its
        // previous mask.
        if let Some(mask) = ChannelMask::from_code(code) {
            self.channel_mask = mask;
            self.surface.set_channel_mask(mask);
        }
    }

    /// Grow the surface, if autosizing, so that `(x, y, width, height)`
    /// fits within it.
    fn autosize_to(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if !self.autosize {
            return;
        }
        let needed_w = (x + width).max(0.0).ceil() as u32;
        let needed_h = (y + height).max(0.0).ceil() as u32;
        let new_w = self.surface.width().max(needed_w);
        let new_h = self.surface.height().max(needed_h);
        if new_w != self.surface.width() || new_h != self.surface.height() {
            let _ = self.surface.resize(new_w, new_h);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let _ = self.surface.resize(width, height);
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.surface.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.autosize_to(x, y, 0.0, 0.0);
        self.surface.line_to(x, y);
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.autosize_to(x3, y3, 0.0, 0.0);
        self.surface.curve_to(x1, y1, x2, y2, x3, y3);
    }

    pub fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, ccw: bool) {
        self.autosize_to(cx - radius, cy - radius, radius * 2.0, radius * 2.0);
        self.surface.arc(cx, cy, radius, start, end, ccw);
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.autosize_to(x, y, width, height);
        self.surface.rect(x, y, width, height);
    }

    pub fn close_path(&mut self) {
        self.surface.close_path();
    }

    /// Set the current path as the clipping region. Implicitly closes the
    /// path, matching `close_path`.
    pub fn clip(&mut self) {
        self.surface.clip();
    }

    pub fn fill_color(&mut self, rgba: [u8; 4]) {
        self.surface.fill_color(rgba, self.channel_mask);
    }

    pub fn fill_layer(&mut self, source: &Layer) {
        self.surface.fill_layer(source.surface.as_ref(), self.channel_mask);
    }

    pub fn stroke_color(&mut self, cap: LineCap, join: LineJoin, thickness: f64, rgba: [u8; 4]) {
        self.surface.stroke_color(cap, join, thickness, rgba, self.channel_mask);
    }

    pub fn stroke_layer(&mut self, cap: LineCap, join: LineJoin, thickness: f64, source: &Layer) {
        self.surface.stroke_layer(cap, join, thickness, source.surface.as_ref(), self.channel_mask);
    }

    pub fn draw_image(&mut self, x: f64, y: f64, rgba: &[u8], width: u32, height: u32) {
        self.autosize_to(x, y, f64::from(width), f64::from(height));
        self.surface.draw_image(x, y, rgba, width, height);
    }

    /// Draw a still-encoded image at `(x, y)`. The layer cannot autosize
    /// to its decoded dimensions without decoding it first, so callers
    /// that need autosizing must resize explicitly beforehand.
    pub fn draw_encoded_image(&mut self, x: f64, y: f64, mimetype: &str, data: &[u8]) {
        self.surface.draw_encoded_image(x, y, mimetype, data);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn transfer(
        &mut self,
        source: &Layer,
        src_x: u32,
        src_y: u32,
        width: u32,
        height: u32,
        dst_x: u32,
        dst_y: u32,
        code: u8,
    ) {
        self.autosize_to(f64::from(dst_x), f64::from(dst_y), f64::from(width), f64::from(height));
        // SRC and DEST are fast-pathed: SRC degenerates to `put`, DEST is a no-op.
        match code & 0x0F {
            0x3 => self.put(source, src_x, src_y, width, height, dst_x, dst_y),
            0x5 => {}
            _ => {
                let func: TransferFn = crate::surface::transfer_function(code);
                self.surface.transfer(source.surface.as_ref(), src_x, src_y, width, height, dst_x, dst_y, func);
            }
        }
    }

    pub fn put(&mut self, source: &Layer, src_x: u32, src_y: u32, width: u32, height: u32, dst_x: u32, dst_y: u32) {
        self.autosize_to(f64::from(dst_x), f64::from(dst_y), f64::from(width), f64::from(height));
        self.surface.put(source.surface.as_ref(), src_x, src_y, width, height, dst_x, dst_y);
    }

    pub fn copy(&mut self, source: &Layer, src_x: u32, src_y: u32, width: u32, height: u32, dst_x: u32, dst_y: u32) {
        self.autosize_to(f64::from(dst_x), f64::from(dst_y), f64::from(width), f64::from(height));
        self.surface.copy(source.surface.as_ref(), src_x, src_y, width, height, dst_x, dst_y);
    }

    pub fn push(&mut self) {
        self.surface.push();
    }

    /// No-op on an empty saved-state stack; the underlying surface is
    /// responsible for tolerating that silently.
    pub fn pop(&mut self) {
        self.surface.pop();
    }

    pub fn reset(&mut self) {
        self.surface.reset();
        self.transform = IDENTITY_MATRIX;
        self.channel_mask = ChannelMask::default();
    }

    pub fn set_transform(&mut self, matrix: AffineMatrix) {
        self.transform = matrix;
        self.surface.set_transform(matrix);
    }

    pub fn transform(&mut self, matrix: AffineMatrix) {
        self.surface.transform(matrix);
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.surface.set_miter_limit(limit);
    }
}
