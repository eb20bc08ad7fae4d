//! Decoding of streaming records.
//!
//! One record per line: `<label>\t<f1,f2,...,fn>`. The label and every
//! feature must parse as a finite number; the record becomes a
//! [`LabeledVector`] of dimension `n`. Surrounding whitespace other than tabs
//! is ignored and blank lines carry no record.
//!
//! # Examples
//!
//! ```
//! use hashlearn::stream::decoder::decode_record;
//!
//! let point = decode_record("2.5\t1,0,3", 1).unwrap().unwrap();
//! assert_eq!(point.label, 2.5);
//! assert_eq!(point.dimension(), 3);
//!
//! assert!(decode_record("   ", 2).unwrap().is_none());
//! assert!(decode_record("2.5 1,0,3", 3).is_err());
//! ```

use crate::error::{HashlearnError, Result};
use crate::ml::dataset::LabeledVector;

fn parse_number(field: &str, what: &str, line: usize) -> Result<f64> {
    let field = field.trim();
    let value: f64 = field.parse().map_err(|_| {
        HashlearnError::malformed_record(line, format!("{what} '{field}' is not a number"))
    })?;
    if !value.is_finite() {
        return Err(HashlearnError::malformed_record(
            line,
            format!("{what} '{field}' is not finite"),
        ));
    }
    Ok(value)
}

/// Decode one line. Returns `Ok(None)` for a blank line.
pub fn decode_record(line: &str, line_number: usize) -> Result<Option<LabeledVector>> {
    let line = line.trim_matches(|c: char| c.is_whitespace() && c != '\t');
    if line.is_empty() {
        return Ok(None);
    }

    let (label, features) = line.split_once('\t').ok_or_else(|| {
        HashlearnError::malformed_record(line_number, "missing tab between label and features")
    })?;
    let label = parse_number(label, "label", line_number)?;

    if features.trim().is_empty() {
        return Err(HashlearnError::malformed_record(
            line_number,
            "empty feature list",
        ));
    }
    let values = features
        .split(',')
        .enumerate()
        .map(|(position, field)| parse_number(field, &format!("feature {position}"), line_number))
        .collect::<Result<Vec<f64>>>()?;

    Ok(Some(LabeledVector::from_dense(label, &values)))
}

/// Decode numbered lines into a batch. Any malformed line fails the batch.
pub fn decode_batch<'a, I>(lines: I) -> Result<Vec<LabeledVector>>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    let mut batch = Vec::new();
    for (line_number, line) in lines {
        if let Some(point) = decode_record(line, line_number)? {
            batch.push(point);
        }
    }
    Ok(batch)
}
