mod openai;

pub use openai::*;
