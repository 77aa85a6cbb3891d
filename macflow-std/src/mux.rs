//! Mux.

/// Mux extension.
pub trait MuxExt<V> {
    /// Selects the element at binary index `sel`. Out-of-range selections yield the default value.
    fn mux(&self, sel: usize) -> V;
}

impl<V: Copy + Default> MuxExt<V> for [V] {
    fn mux(&self, sel: usize) -> V { self.get(sel).copied().unwrap_or_default() }
}
