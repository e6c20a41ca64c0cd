//! Parameter validation and normalization.
//!
//! Every API method turns its arguments into a [`ParamBundle`] through the
//! rules here before any request is made. A bundle that exists satisfies
//! every constraint declared for its call.

mod enums;
mod rules;
mod timestamp;
mod value;

pub use enums::*;
pub use rules::*;
pub use timestamp::*;
pub use value::*;
