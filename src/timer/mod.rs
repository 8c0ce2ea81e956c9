mod tie_break;
pub use tie_break::*;
