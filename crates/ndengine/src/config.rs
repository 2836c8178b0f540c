//! Array construction configuration.

use std::fmt;
use std::sync::Arc;

use crate::element::Element;
use crate::error::Result;
use crate::shape::Shape;
use crate::storage::{BackendSelector, DefaultSelector, InitialData, StorageBackend};

/// Configuration injected into every array at construction.
///
/// Holds the backend selection strategy and the aliasing policy for
/// `reshape`. Arrays carry their config, so derived arrays (slices, maps,
/// reshapes) are built with the same policy. There is no global default
/// beyond [`ArrayConfig::default`].
///
/// With `copy_on_write = true` (the default) a reshape of a dense array
/// aliases the source buffer; the first write to either side copies it.
/// With `copy_on_write = false` every reshape copies.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ndengine::{ArrayConfig, NdArray};
/// use ndengine::storage::{BackendKind, FixedSelector};
///
/// let config = ArrayConfig::default()
///     .with_selector(Arc::new(FixedSelector::new(BackendKind::Sparse)))
///     .with_copy_on_write(false);
/// let a: NdArray<f64> = NdArray::zeros_with_config(&[100, 100], config).unwrap();
/// assert_eq!(a.backend_kind(), BackendKind::Sparse);
/// ```
pub struct ArrayConfig<T: Element> {
    selector: Arc<dyn BackendSelector<T>>,
    copy_on_write: bool,
}

impl<T: Element> ArrayConfig<T> {
    /// Config using `selector` and copy-on-write reshapes.
    pub fn new(selector: Arc<dyn BackendSelector<T>>) -> Self {
        Self {
            selector,
            copy_on_write: true,
        }
    }

    pub fn with_selector(mut self, selector: Arc<dyn BackendSelector<T>>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_copy_on_write(mut self, copy_on_write: bool) -> Self {
        self.copy_on_write = copy_on_write;
        self
    }

    /// Whether reshape may alias the source buffer.
    pub fn copy_on_write(&self) -> bool {
        self.copy_on_write
    }

    /// The injected selection strategy.
    pub fn selector(&self) -> &Arc<dyn BackendSelector<T>> {
        &self.selector
    }

    /// Build storage for `shape` through the injected strategy.
    pub fn select_backend(
        &self,
        shape: Shape,
        initial: InitialData<T>,
    ) -> Result<Box<dyn StorageBackend<T>>> {
        self.selector.select_backend(shape, initial)
    }
}

impl<T: Element> Default for ArrayConfig<T> {
    fn default() -> Self {
        Self::new(Arc::new(DefaultSelector::default()))
    }
}

impl<T: Element> Clone for ArrayConfig<T> {
    fn clone(&self) -> Self {
        Self {
            selector: Arc::clone(&self.selector),
            copy_on_write: self.copy_on_write,
        }
    }
}

impl<T: Element> fmt::Debug for ArrayConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayConfig")
            .field("selector", &self.selector)
            .field("copy_on_write", &self.copy_on_write)
            .finish()
    }
}
