//! Parsing of operator-supplied candidate value lists.
//!
//! Accepts comma-separated integers (`0,3,5`) and inclusive ranges written as
//! `start:end` or `start:end:step`. Both forms may be mixed (`0,10:30:10`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueListError {
    #[error("value list is empty")]
    Empty,
    #[error("invalid value `{0}`: expected a non-negative integer")]
    InvalidValue(String),
    #[error("invalid range `{0}`: expected start:end or start:end:step")]
    InvalidRange(String),
    #[error("range step must be positive in `{0}`")]
    ZeroStep(String),
    #[error("range start {start} is greater than end {end}")]
    DescendingRange { start: u32, end: u32 },
}

pub fn parse_value_list(input: &str) -> Result<Vec<u32>, ValueListError> {
    let mut values = Vec::new();

    for item in input.split(',').map(str::trim) {
        if item.is_empty() {
            continue;
        }
        if item.contains(':') {
            values.extend(parse_range(item)?);
        } else {
            values.push(parse_value(item)?);
        }
    }

    if values.is_empty() {
        return Err(ValueListError::Empty);
    }
    Ok(values)
}

fn parse_value(item: &str) -> Result<u32, ValueListError> {
    item.parse::<u32>()
        .map_err(|_| ValueListError::InvalidValue(item.to_string()))
}

fn parse_range(item: &str) -> Result<Vec<u32>, ValueListError> {
    let parts: Vec<&str> = item.split(':').map(str::trim).collect();
    let (start, end, step) = match parts.as_slice() {
        [start, end] => (parse_value(start)?, parse_value(end)?, 1),
        [start, end, step] => (parse_value(start)?, parse_value(end)?, parse_value(step)?),
        _ => return Err(ValueListError::InvalidRange(item.to_string())),
    };

    if step == 0 {
        return Err(ValueListError::ZeroStep(item.to_string()));
    }
    if start > end {
        return Err(ValueListError::DescendingRange { start, end });
    }

    Ok((start..=end).step_by(step as usize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_values() {
        assert_eq!(parse_value_list("0, 3,5,10").unwrap(), vec![0, 3, 5, 10]);
    }

    #[test]
    fn parses_inclusive_range_with_step() {
        assert_eq!(parse_value_list("40:100:20").unwrap(), vec![40, 60, 80, 100]);
    }

    #[test]
    fn range_without_step_counts_by_one() {
        assert_eq!(parse_value_list("1:4").unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn mixes_values_and_ranges_in_order() {
        assert_eq!(parse_value_list("0,10:30:10,99").unwrap(), vec![0, 10, 20, 30, 99]);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse_value_list(" , ,"), Err(ValueListError::Empty));
    }

    #[test]
    fn rejects_negative_and_non_numeric_values() {
        assert_eq!(
            parse_value_list("3,-1"),
            Err(ValueListError::InvalidValue("-1".to_string()))
        );
        assert_eq!(
            parse_value_list("abc"),
            Err(ValueListError::InvalidValue("abc".to_string()))
        );
    }

    #[test]
    fn rejects_zero_step_and_descending_range() {
        assert_eq!(
            parse_value_list("0:10:0"),
            Err(ValueListError::ZeroStep("0:10:0".to_string()))
        );
        assert_eq!(
            parse_value_list("10:0"),
            Err(ValueListError::DescendingRange { start: 10, end: 0 })
        );
    }

    #[test]
    fn rejects_malformed_range() {
        assert_eq!(
            parse_value_list("1:2:3:4"),
            Err(ValueListError::InvalidRange("1:2:3:4".to_string()))
        );
    }
}
