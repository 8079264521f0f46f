pub mod errors;

pub use errors::{SipmError, SipmErrorCategory, SipmResult};
