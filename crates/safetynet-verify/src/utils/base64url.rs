//! Base64 decoding for statement segments and claim fields
//!
//! This module provides a thin wrapper around the `base64` crate with
//! size limit validation. Segments use the URL-safe alphabet; claim fields
//! are emitted with the standard alphabet, but both are accepted there.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// URL-safe alphabet, padding optional
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Standard alphabet, padding optional
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Why a decode was rejected
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DecodeError {
    Invalid(String),
    TooLarge { size: usize, max: usize },
}

/// Decode a Base64URL segment with maximum size limit
pub(crate) fn decode_segment(input: &str, max_size: usize) -> Result<Vec<u8>, DecodeError> {
    let result = URL_SAFE_LENIENT
        .decode(input)
        .map_err(|e| DecodeError::Invalid(e.to_string()))?;

    check_size(result, max_size)
}

/// Decode a claim field written in either Base64 alphabet
pub(crate) fn decode_field(input: &str, max_size: usize) -> Result<Vec<u8>, DecodeError> {
    let engine = if input.contains(['-', '_']) {
        &URL_SAFE_LENIENT
    } else {
        &STANDARD_LENIENT
    };

    let result = engine
        .decode(input)
        .map_err(|e| DecodeError::Invalid(e.to_string()))?;

    check_size(result, max_size)
}

fn check_size(bytes: Vec<u8>, max_size: usize) -> Result<Vec<u8>, DecodeError> {
    if bytes.len() > max_size {
        return Err(DecodeError::TooLarge {
            size: bytes.len(),
            max: max_size,
        });
    }
    Ok(bytes)
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Invalid(msg) => write!(f, "{msg}"),
            DecodeError::TooLarge { size, max } => {
                write!(f, "Decoded size exceeds limit: {size} bytes (max: {max})")
            }
        }
    }
}
