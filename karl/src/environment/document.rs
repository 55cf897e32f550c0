//! In-process document body for icon warm-up elements.
//!
//! Headless hosts have no real DOM, yet still want icon preloads to resolve
//! so that later rendering code finds them marked as warm. `MemoryDocument`
//! keeps the inserted elements in order, the same way a document body keeps
//! its appended children.

use parking_lot::Mutex;

use crate::environment::completion::Completion;
use crate::environment::element::IconElement;
use crate::environment::traits::{GlyphSurface, SurfaceError};

/// A document body that records appended icon elements.
#[derive(Debug)]
pub struct MemoryDocument {
    /// `None` models a document whose body is missing.
    body: Mutex<Option<Vec<IconElement>>>,
}

impl MemoryDocument {
    /// Creates a document with an empty body.
    pub fn new() -> Self {
        Self {
            body: Mutex::new(Some(Vec::new())),
        }
    }

    /// Creates a document without a body; every insertion fails.
    pub fn without_body() -> Self {
        Self {
            body: Mutex::new(None),
        }
    }

    /// Snapshot of the appended elements, in insertion order.
    pub fn elements(&self) -> Vec<IconElement> {
        self.body.lock().as_ref().cloned().unwrap_or_default()
    }

    /// Number of appended elements.
    pub fn len(&self) -> usize {
        self.body.lock().as_ref().map(Vec::len).unwrap_or(0)
    }

    /// True when no element has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if an element warming `icon_name` has been appended.
    pub fn contains_icon(&self, icon_name: &str) -> bool {
        self.body
            .lock()
            .as_ref()
            .map(|children| children.iter().any(|e| e.content == icon_name))
            .unwrap_or(false)
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphSurface for MemoryDocument {
    fn insert_icon(&self, element: IconElement, completion: Completion<()>) {
        let appended = match self.body.lock().as_mut() {
            Some(children) => {
                children.push(element);
                true
            }
            None => false,
        };

        if appended {
            completion.loaded(());
        } else {
            completion.failed(SurfaceError::Construction(
                "document has no body to append to".to_string(),
            ));
        }
    }
}
