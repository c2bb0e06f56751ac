pub use super::{Read, Write};
