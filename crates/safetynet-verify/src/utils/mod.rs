//! Shared helpers

pub(crate) mod base64url;
