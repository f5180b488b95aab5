// SPDX-FileCopyrightText: © 2025 StreamKit Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! User-registerable hooks fired by the dispatcher.
//!
//! These sit alongside the typed [`crate::error::ClientError`] hierarchy
//! rather than replacing it: dispatch failures are logged and handled
//! internally, while callbacks exist purely to let an embedder observe
//! protocol events it cares about.

use guac_core::Status;

type NameHandler = Box<dyn FnMut(&str) + Send>;
type ErrorHandler = Box<dyn FnMut(&Status) + Send>;
type SyncHandler = Box<dyn FnMut(u64) + Send>;
type FilesystemHandler = Box<dyn FnMut(u32, &str) + Send>;
type PipeHandler = Box<dyn FnMut(u32, &str, &str) -> bool + Send>;
type ClipboardHandler = Box<dyn FnMut(u32, &str) -> bool + Send>;
type BlobHandler = Box<dyn FnMut(u32, &str) + Send>;
type EndHandler = Box<dyn FnMut(u32) + Send>;

/// Holds every optional user callback the dispatcher can fire.
///
/// Unset callbacks simply mean the corresponding event is dropped after
/// any mandatory protocol bookkeeping (stream allocation, acking) still
/// happens.
#[derive(Default)]
pub struct Callbacks {
    pub on_name: Option<NameHandler>,
    pub on_error: Option<ErrorHandler>,
    pub on_sync: Option<SyncHandler>,
    pub on_filesystem: Option<FilesystemHandler>,
    pub on_pipe: Option<PipeHandler>,
    pub on_file: Option<PipeHandler>,
    pub on_clipboard: Option<ClipboardHandler>,
    /// Fired for every blob delivered to a clipboard/file/pipe input stream,
    /// carrying the stream index and the still-base64-encoded chunk.
    /// `img`/`audio` streams accumulate internally and never reach this.
    pub on_blob: Option<BlobHandler>,
    /// Fired once a clipboard/file/pipe input stream ends.
    pub on_end: Option<EndHandler>,
}

impl Callbacks {
    pub fn fire_name(&mut self, name: &str) {
        if let Some(handler) = self.on_name.as_mut() {
            handler(name);
        }
    }

    pub fn fire_error(&mut self, status: &Status) {
        if let Some(handler) = self.on_error.as_mut() {
            handler(status);
        }
    }

    pub fn fire_sync(&mut self, timestamp: u64) {
        if let Some(handler) = self.on_sync.as_mut() {
            handler(timestamp);
        }
    }

    pub fn fire_filesystem(&mut self, index: u32, name: &str) {
        if let Some(handler) = self.on_filesystem.as_mut() {
            handler(index, name);
        }
    }

    /// Returns `true` if a user handler accepted the stream.
    pub fn fire_pipe(&mut self, index: u32, mimetype: &str, name: &str) -> bool {
        self.on_pipe.as_mut().is_some_and(|handler| handler(index, mimetype, name))
    }

    pub fn fire_file(&mut self, index: u32, mimetype: &str, name: &str) -> bool {
        self.on_file.as_mut().is_some_and(|handler| handler(index, mimetype, name))
    }

    pub fn fire_clipboard(&mut self, index: u32, mimetype: &str) -> bool {
        self.on_clipboard.as_mut().is_some_and(|handler| handler(index, mimetype))
    }

    pub fn fire_blob(&mut self, index: u32, base64_text: &str) {
        if let Some(handler) = self.on_blob.as_mut() {
            handler(index, base64_text);
        }
    }

    pub fn fire_end(&mut self, index: u32) {
        if let Some(handler) = self.on_end.as_mut() {
            handler(index);
        }
    }
}
