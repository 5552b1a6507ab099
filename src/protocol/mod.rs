pub mod codec;
pub mod primitive;

pub use codec::{decode, encode, guess_type};
