mod completion;
mod completion_stream;

pub use completion::*;
pub use completion_stream::*;
