pub mod image;
pub mod record;
pub mod response;
pub mod submission;

pub use image::{EncodedImage, WirePhoto};
pub use record::*;
pub use response::*;
pub use submission::*;
