//! Stored segment tables and offset → segment resolution.

use std::time::Duration;

use crate::error::{Error, LocateError, Result};
use crate::types::{Segment, StoredValue};

/// Decode a flat `(start_seconds, end_seconds, end_offset)` table.
///
/// Every entry is checked before any segment is returned; the first violation
/// is reported with its position in `values`.
pub fn decode_segments(values: &[StoredValue]) -> Result<Vec<Segment>> {
    if values.is_empty() {
        return Err(Error::malformed(0, "empty segment table"));
    }
    if values.len() % 3 != 0 {
        return Err(Error::malformed(values.len(), format!("length {} is not a multiple of 3", values.len())));
    }

    let mut numbers = Vec::with_capacity(values.len());
    for (position, value) in values.iter().enumerate() {
        match value {
            StoredValue::Number(n) if n.is_finite() && *n >= 0.0 => numbers.push(*n),
            StoredValue::Number(n) => return Err(Error::malformed(position, format!("expected a non-negative number, got {n}"))),
            StoredValue::Other(kind) => return Err(Error::malformed(position, format!("expected a number, got {kind}"))),
        }
    }

    let mut segments: Vec<Segment> = Vec::with_capacity(numbers.len() / 3);
    for (i, triple) in numbers.chunks_exact(3).enumerate() {
        let end_offset = to_offset(triple[2]).ok_or_else(|| {
            Error::malformed(i * 3 + 2, format!("end offset {} is not a positive integer", triple[2]))
        })?;
        if let Some(prev) = segments.last() {
            if end_offset <= prev.end_offset {
                return Err(Error::malformed(
                    i * 3 + 2,
                    format!("end offset {end_offset} does not follow {}", prev.end_offset),
                ));
            }
        }
        segments.push(Segment { start_time: to_duration(triple[0], i * 3)?, end_time: to_duration(triple[1], i * 3 + 1)?, end_offset });
    }
    Ok(segments)
}

fn to_duration(secs: f64, position: usize) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| Error::malformed(position, format!("time {secs}: {e}")))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn to_offset(n: f64) -> Option<usize> {
    if n.fract() != 0.0 || n < 1.0 || n > usize::MAX as f64 {
        return None;
    }
    Some(n as usize)
}

/// Index of the segment containing `offset`: the first segment whose
/// `end_offset` is greater than `offset`.
///
/// `segments` must be sorted by strictly increasing `end_offset`, which
/// [`decode_segments`] and the encoder guarantee.
pub fn locate(segments: &[Segment], offset: i64) -> std::result::Result<usize, LocateError> {
    let Ok(pos) = usize::try_from(offset) else {
        return Err(LocateError::InvalidOffset { offset });
    };
    let index = segments.partition_point(|s| s.end_offset <= pos);
    if index == segments.len() {
        let last_boundary = segments.last().map_or(0, |s| s.end_offset);
        return Err(LocateError::SegmentNotFound { offset, last_boundary });
    }
    Ok(index)
}
