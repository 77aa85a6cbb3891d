//! Demux.

use crate::*;

/// One-hot demux extension.
pub trait DemuxOneHotExt<V> {
    /// Dispatches `self` to the lane selected by the one-hot vector `sel`.
    ///
    /// Returns one signal per bit of `sel`. Only the selected lane carries the data and is valid; every other lane is
    /// invalid. If `sel` is not one-hot, no lane is valid.
    fn demux_one_hot(self, sel: &Bits) -> Vec<Valid<V>>;
}

impl<V: Copy + Default> DemuxOneHotExt<V> for Valid<V> {
    fn demux_one_hot(self, sel: &Bits) -> Vec<Valid<V>> {
        let target = sel.position();
        (0..sel.width()).map(|lane| if target == Some(lane) { self } else { Valid::invalid() }).collect()
    }
}
