//! Hallticket identifiers and contiguous hallticket ranges.
//!
//! A hallticket is ten characters: an 8-character roll prefix followed by a
//! 2-character sequence suffix. Suffixes `00`..`99` are plain numbers; past
//! 99 the portal switches to a letter followed by a digit (`A0` = 100,
//! `A9` = 109, `B0` = 110, ...). The letters I and O are never issued.

use crate::error::{AppError, Result};

/// Largest accepted `end - start` for a bulk range.
pub const MAX_RANGE_SPAN: u32 = 210;

/// Length of the shared roll-number prefix.
pub const ROLL_PREFIX_LEN: usize = 8;

/// Length of the sequence suffix.
pub const SUFFIX_LEN: usize = 2;

const HALLTICKET_LEN: usize = ROLL_PREFIX_LEN + SUFFIX_LEN;

/// Letters used for suffixes above 99, in order.
const SUFFIX_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

const FIRST_ENCODED: u32 = 100;

/// Largest sequence number a suffix can express (`Z9`).
pub const MAX_SEQUENCE: u32 = FIRST_ENCODED + SUFFIX_LETTERS.len() as u32 * 10 - 1;

/// Decode a 2-character suffix into its sequence number.
pub fn decode_suffix(suffix: &str) -> Result<u32> {
    let bytes = suffix.as_bytes();
    if bytes.len() != SUFFIX_LEN {
        return Err(AppError::validation(format!(
            "hallticket suffix '{suffix}' must be {SUFFIX_LEN} characters"
        )));
    }

    let (lead, digit) = (bytes[0].to_ascii_uppercase(), bytes[1]);
    if !digit.is_ascii_digit() {
        return Err(AppError::validation(format!(
            "hallticket suffix '{suffix}' must end with a digit"
        )));
    }
    let digit = u32::from(digit - b'0');

    if lead.is_ascii_digit() {
        return Ok(u32::from(lead - b'0') * 10 + digit);
    }

    let index = SUFFIX_LETTERS
        .iter()
        .position(|&letter| letter == lead)
        .ok_or_else(|| {
            AppError::validation(format!("hallticket suffix '{suffix}' has an unknown letter"))
        })?;

    Ok(FIRST_ENCODED + index as u32 * 10 + digit)
}

/// Encode a sequence number back into its 2-character suffix.
pub fn encode_suffix(sequence: u32) -> Result<String> {
    if sequence < FIRST_ENCODED {
        return Ok(format!("{sequence:02}"));
    }
    if sequence > MAX_SEQUENCE {
        return Err(AppError::validation(format!(
            "sequence {sequence} exceeds the largest suffix ({MAX_SEQUENCE})"
        )));
    }

    let offset = sequence - FIRST_ENCODED;
    let letter = SUFFIX_LETTERS[(offset / 10) as usize] as char;
    Ok(format!("{letter}{}", offset % 10))
}

/// A validated, inclusive range of halltickets sharing one roll prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HallticketRange {
    prefix: String,
    start: u32,
    end: u32,
}

impl HallticketRange {
    /// Parse and validate the two endpoints of a range.
    pub fn parse(from: &str, to: &str, max_span: u32) -> Result<Self> {
        let from = normalize(from)?;
        let to = normalize(to)?;

        let (prefix, from_suffix) = from.split_at(ROLL_PREFIX_LEN);
        let (to_prefix, to_suffix) = to.split_at(ROLL_PREFIX_LEN);
        if prefix != to_prefix {
            return Err(AppError::validation(
                "starting and ending hallticket must share the same roll prefix",
            ));
        }

        let start = decode_suffix(from_suffix)?;
        let end = decode_suffix(to_suffix)?;
        if end < start {
            return Err(AppError::validation(
                "ending hallticket comes before the starting hallticket",
            ));
        }
        if end - start > max_span {
            return Err(AppError::validation(format!(
                "range spans {} halltickets, at most {} allowed",
                end - start,
                max_span
            )));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            start,
            end,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of halltickets in the range.
    pub fn count(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// Every hallticket in the range, in order.
    pub fn halltickets(&self) -> impl Iterator<Item = String> + '_ {
        (self.start..=self.end).filter_map(move |sequence| {
            encode_suffix(sequence)
                .ok()
                .map(|suffix| format!("{}{}", self.prefix, suffix))
        })
    }
}

fn normalize(hallticket: &str) -> Result<String> {
    let hallticket = hallticket.trim().to_ascii_uppercase();
    if hallticket.len() != HALLTICKET_LEN
        || !hallticket.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return Err(AppError::validation(format!(
            "hallticket '{hallticket}' must be {HALLTICKET_LEN} alphanumeric characters"
        )));
    }
    Ok(hallticket)
}
