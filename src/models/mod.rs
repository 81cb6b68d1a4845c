pub mod envelope;
pub mod form;
pub mod gemini;

pub use envelope::*;
pub use form::*;
pub use gemini::*;
