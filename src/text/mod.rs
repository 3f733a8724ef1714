//! Text-side processing: character utilities, vocabulary readers, and the
//! normalization passes that run before phonemization.

pub mod chars;
pub mod normalize;
pub mod tokens;

pub use normalize::{normalize, Lang};
pub use tokens::{Lexicon, TokenMap};
