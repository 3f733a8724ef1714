//! Signal-processing stages between the vocoder and the caller.

pub mod istft;
pub mod post;

pub use istft::{hann_window, Istft};
pub use post::{resample_linear, PostProcessor};
