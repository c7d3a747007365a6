//! Listing query: the URL codec and the filter/search/sort pipeline.
//!
//! Both listing pages (certificates, awards) share this module; the record
//! type only contributes its category enumeration and the sorts it offers.

mod codec;
mod pipeline;

pub use codec::*;
pub use pipeline::*;
