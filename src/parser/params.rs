//! Page parameter string parsing.
//!
//! The parameter string is `width,height,dpi,rotation,gamma`. Any field may
//! be empty and trailing fields may be left out entirely.

use crate::error::{Error, Result};
use crate::model::PageInfo;

/// How characters other than `0`-`9` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamMode {
    /// Fold every character into the value as `(c - '0') mod 10`.
    ///
    /// Never fails. This is what existing command lines rely on, so a
    /// stray character produces an odd number rather than an error.
    #[default]
    Lenient,
    /// Reject any character that is not an ASCII digit.
    Strict,
}

const FIELD_SEPARATOR: char = ',';
const FIELD_COUNT: usize = 5;

/// Parse a parameter string leniently. Never fails.
pub fn parse_params(params: &str) -> PageInfo {
    let fields = scan_fields(params);
    let [width, height, dpi, rotation, gamma] = fields.map(|field| field.map(fold_lenient));
    build_info(width, height, dpi, rotation, gamma)
}

/// Parse a parameter string with the given mode.
pub fn parse_params_with_mode(params: &str, mode: ParamMode) -> Result<PageInfo> {
    match mode {
        ParamMode::Lenient => Ok(parse_params(params)),
        ParamMode::Strict => {
            let fields = scan_fields(params);
            let mut values = [None; FIELD_COUNT];
            for (slot, field) in values.iter_mut().zip(fields) {
                *slot = field.map(fold_strict).transpose()?;
            }
            let [width, height, dpi, rotation, gamma] = values;
            Ok(build_info(width, height, dpi, rotation, gamma))
        }
    }
}

/// Split into at most five fields, left to right.
///
/// A field is `None` when no character of it was consumed: it is empty or
/// the string ended before reaching it. Anything after the fifth field's
/// terminator is ignored.
fn scan_fields(params: &str) -> [Option<&str>; FIELD_COUNT] {
    let mut fields = [None; FIELD_COUNT];
    let mut rest = params;

    for slot in fields.iter_mut() {
        let (field, tail) = match rest.find(FIELD_SEPARATOR) {
            Some(pos) => (&rest[..pos], &rest[pos + FIELD_SEPARATOR.len_utf8()..]),
            None => (rest, ""),
        };
        if !field.is_empty() {
            *slot = Some(field);
        }
        rest = tail;
    }

    fields
}

fn build_info(
    width: Option<u32>,
    height: Option<u32>,
    dpi: Option<u32>,
    rotation: Option<u32>,
    gamma: Option<u32>,
) -> PageInfo {
    PageInfo {
        width: width.unwrap_or(0),
        height: height.unwrap_or(0),
        dpi: dpi.unwrap_or(0),
        rotation: rotation.unwrap_or(PageInfo::DEFAULT_ROTATION),
        gamma: gamma.unwrap_or(PageInfo::DEFAULT_GAMMA),
    }
}

/// `value = value * 10 + (c - '0') mod 10` with wrapping arithmetic.
///
/// The remainder keeps the sign of `c - '0'`, so characters below `'0'`
/// subtract from the value.
fn fold_lenient(field: &str) -> u32 {
    field.chars().fold(0u32, |value, c| {
        let digit = (c as i64 - '0' as i64) % 10;
        value.wrapping_mul(10).wrapping_add(digit as u32)
    })
}

fn fold_strict(field: &str) -> Result<u32> {
    field.chars().try_fold(0u32, |value, c| {
        let digit = c.to_digit(10).ok_or_else(|| {
            Error::InvalidParams(format!("unexpected character {:?} in {:?}", c, field))
        })?;
        value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Error::InvalidParams(format!("value {:?} is too large", field)))
    })
}
