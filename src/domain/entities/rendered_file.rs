//! RenderedFile entity - a rendered artifact ready for upload
//!
//! RenderedFiles are the result of rendering a template (or reading a file
//! verbatim when no mapping is supplied). They exist only long enough to be
//! uploaded to their remote path.

use crate::domain::value_objects::{ContentHash, RemotePath};

/// A rendered artifact ready to be copied to the remote host
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    /// Absolute remote path this artifact maps to
    remote_path: RemotePath,
    /// Rendered (or verbatim) content
    content: Vec<u8>,
    /// Whether a sensitive mapping value was substituted into the content
    sensitive: bool,
    /// Cached content hash
    hash: Option<ContentHash>,
}

impl RenderedFile {
    pub fn new(remote_path: RemotePath, content: Vec<u8>, sensitive: bool) -> Self {
        Self {
            remote_path,
            content,
            sensitive,
            hash: None,
        }
    }

    pub fn remote_path(&self) -> &RemotePath {
        &self.remote_path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Whether this artifact must be redacted in any captured output
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Compute and cache the content hash
    pub fn hash(&mut self) -> &ContentHash {
        if self.hash.is_none() {
            self.hash = Some(ContentHash::from_bytes(&self.content));
        }
        self.hash.as_ref().unwrap()
    }

    /// Content hash computed fresh, for immutable references
    pub fn content_hash(&self) -> ContentHash {
        match &self.hash {
            Some(hash) => hash.clone(),
            None => ContentHash::from_bytes(&self.content),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Content as UTF-8 text, for diff display
    pub fn content_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}
