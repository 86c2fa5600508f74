//! Container formats.
//!
//! Both parsers work on a complete in-memory buffer through
//! [`crate::stream::StreamIn`]. Readers consume a variable number of bytes,
//! so objects are decoded strictly in order and a failure anywhere ends the
//! whole decode.
//!
//! | Module     | Format | Description |
//! |------------|--------|-------------|
//! | [`xnb`]    | XNB    | Header, reader manifest and top-level objects |
//! | [`legacy`] | -      | Headerless single-texture files from early pipelines |

pub mod legacy;
pub mod xnb;
