use std::{num::ParseIntError, str::FromStr};

use itertools::Itertools;
use nom::{
    character::complete::char,
    combinator::map_res,
    error::{FromExternalError, ParseError},
    sequence::separated_pair,
    IResult,
};
use thiserror::Error;
use tracing::{debug, instrument};
use util::{parse_nice, parse_unsigned, BadInput, Span};

pub const RANGE_SEPARATOR: char = '-';

/// Inclusive range of ingredient ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    lower: i64,
    upper: i64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    #[error("Range {lower}-{upper} ends before it starts")]
    Reversed { lower: i64, upper: i64 },
}

impl Range {
    pub fn new(lower: i64, upper: i64) -> Result<Self, RangeError> {
        if lower > upper {
            return Err(RangeError::Reversed { lower, upper });
        }

        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> i64 {
        self.lower
    }

    pub fn upper(&self) -> i64 {
        self.upper
    }

    pub fn contains(&self, id: i64) -> bool {
        self.lower <= id && id <= self.upper
    }

    /// Number of ids in the range, bounds included.
    pub fn id_count(&self) -> u64 {
        self.upper.abs_diff(self.lower) + 1
    }
}

#[derive(Error, Debug)]
pub enum InventoryParseError {
    #[error("Line {line_no} is neither an id range nor an ingredient id: {line:?}\n{report}")]
    Malformed {
        line_no: usize,
        line: String,
        report: String,
        #[source]
        source: BadInput,
    },
}

impl InventoryParseError {
    fn malformed(line_no: usize, line: &str, source: BadInput) -> Self {
        Self::Malformed {
            line_no,
            line: line.to_string(),
            report: source.render(),
            source,
        }
    }
}

/// Fresh id ranges and available ingredient ids, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    ranges: Vec<Range>,
    ingredients: Vec<i64>,
}

impl Inventory {
    pub fn new(ranges: Vec<Range>, ingredients: Vec<i64>) -> Self {
        Self {
            ranges,
            ingredients,
        }
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn ingredients(&self) -> &[i64] {
        &self.ingredients
    }

    pub fn count_fresh(&self) -> usize {
        count_fresh(&self.ingredients, &self.ranges)
    }

    pub fn total_fresh_ids(&self) -> u64 {
        total_fresh_ids(&self.ranges)
    }

    /// Both answers, one `Part N: <answer>` line each.
    pub fn report(&self) -> String {
        format!(
            "Part 1: {}\nPart 2: {}",
            self.count_fresh(),
            self.total_fresh_ids()
        )
    }
}

fn parse_range<'a, E>(i: Span<'a>) -> IResult<Span<'a>, Range, E>
where
    E: ParseError<Span<'a>>
        + FromExternalError<Span<'a>, ParseIntError>
        + FromExternalError<Span<'a>, RangeError>,
{
    map_res(
        separated_pair(parse_unsigned, char(RANGE_SEPARATOR), parse_unsigned),
        |(lower, upper)| Range::new(lower, upper),
    )(i)
}

impl FromStr for Inventory {
    type Err = InventoryParseError;

    #[instrument(skip_all, fields(bytes = s.len()))]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut inventory = Inventory::default();

        let lines = s
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        for (line_no, line) in lines {
            if line.contains(RANGE_SEPARATOR) {
                let range = parse_nice(line, parse_range)
                    .map_err(|e| InventoryParseError::malformed(line_no, line, e))?;
                debug!(line_no, ?range, "range");
                inventory.ranges.push(range);
            } else {
                let id = parse_nice(line, parse_unsigned)
                    .map_err(|e| InventoryParseError::malformed(line_no, line, e))?;
                debug!(line_no, id, "ingredient");
                inventory.ingredients.push(id);
            }
        }

        debug!(
            ranges = inventory.ranges.len(),
            ingredients = inventory.ingredients.len(),
            "parsed inventory"
        );

        Ok(inventory)
    }
}

/// Counts the ingredients that fall in at least one range. An ingredient
/// matching several ranges is counted once.
#[instrument(skip_all, fields(ingredients = ingredients.len(), ranges = ranges.len()))]
pub fn count_fresh(ingredients: &[i64], ranges: &[Range]) -> usize {
    ingredients
        .iter()
        .filter(|&&id| ranges.iter().any(|range| range.contains(id)))
        .count()
}

/// Sorts by lower bound and joins overlapping or touching ranges. Consecutive
/// ranges in the result are at least two apart.
#[instrument(skip_all, fields(ranges = ranges.len()))]
pub fn merge_ranges(ranges: &[Range]) -> Vec<Range> {
    ranges
        .iter()
        .copied()
        .sorted_by_key(|range| range.lower)
        .coalesce(|last, range| {
            if last.upper < range.lower.saturating_sub(1) {
                Err((last, range))
            } else {
                debug!(?last, ?range, "merging");
                Ok(Range {
                    lower: last.lower,
                    upper: last.upper.max(range.upper),
                })
            }
        })
        .collect()
}

/// Number of distinct ids covered by the union of `ranges`.
#[instrument(skip_all, fields(ranges = ranges.len()))]
pub fn total_fresh_ids(ranges: &[Range]) -> u64 {
    merge_ranges(ranges).iter().map(Range::id_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TEST_INPUT: &str = include_str!("../data/test_input");

    fn range(lower: i64, upper: i64) -> Range {
        Range::new(lower, upper).unwrap()
    }

    fn inventory(ranges: &[&str], ingredients: &[i64]) -> Inventory {
        let ingredients = ingredients.iter().map(|id| id.to_string());
        ranges
            .iter()
            .map(|r| r.to_string())
            .chain(ingredients)
            .join("\n")
            .parse()
            .unwrap()
    }

    #[test]
    fn part1() {
        let res = TEST_INPUT.parse::<Inventory>();
        assert!(res.is_ok());
        assert_eq!(res.unwrap().count_fresh(), 3);
    }

    #[test]
    fn part2() {
        let res = TEST_INPUT.parse::<Inventory>();
        assert!(res.is_ok());
        assert_eq!(res.unwrap().total_fresh_ids(), 14);
    }

    #[test]
    fn report_lists_both_parts() {
        let inventory = TEST_INPUT.parse::<Inventory>().unwrap();

        assert_eq!(inventory.report(), "Part 1: 3\nPart 2: 14");
    }

    #[test]
    fn parse_keeps_input_order() {
        let inventory = TEST_INPUT.parse::<Inventory>().unwrap();

        assert_eq!(
            inventory.ranges(),
            &[range(3, 5), range(10, 14), range(16, 20), range(12, 18)]
        );
        assert_eq!(inventory.ingredients(), &[1, 5, 8, 11, 17, 32]);
    }

    #[test]
    fn parse_trims_and_skips_blank_lines() {
        let inventory: Inventory = "  \n 3-5 \r\n\n\t7\n   \n10-12\n 4".parse().unwrap();

        assert_eq!(inventory, Inventory::new(vec![range(3, 5), range(10, 12)], vec![7, 4]));
    }

    #[test]
    fn parse_empty_input() {
        let inventory: Inventory = "\n\n".parse().unwrap();

        assert_eq!(inventory, Inventory::default());
        assert_eq!(inventory.count_fresh(), 0);
        assert_eq!(inventory.total_fresh_ids(), 0);
    }

    #[rstest]
    #[case("1-2\n3-4-5", 2)]
    #[case("1-2\n\n5-", 3)]
    #[case("-5", 1)]
    #[case("1-2\nabc", 2)]
    #[case("12x", 1)]
    #[case("10-5", 1)]
    #[case("1 - 2", 1)]
    #[case("1 -2", 1)]
    #[case("99999999999999999999", 1)]
    #[case("1-99999999999999999999", 1)]
    fn parse_malformed(#[case] input: &str, #[case] expected_line: usize) {
        let res = input.parse::<Inventory>();
        assert!(res.is_err());

        let InventoryParseError::Malformed { line_no, report, .. } = res.unwrap_err();
        assert_eq!(line_no, expected_line);
        assert!(!report.is_empty());
    }

    #[test]
    fn parse_error_names_the_line() {
        let err = "1-3\n4-x".parse::<Inventory>().unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Line 2"));
        assert!(message.contains("4-x"));
    }

    #[test]
    fn range_rejects_reversed_bounds() {
        assert_eq!(
            Range::new(8, 3),
            Err(RangeError::Reversed { lower: 8, upper: 3 })
        );
        assert!(Range::new(3, 3).is_ok());
    }

    #[rstest]
    #[case(range(10, 20), 10, true)]
    #[case(range(10, 20), 20, true)]
    #[case(range(10, 20), 15, true)]
    #[case(range(10, 20), 9, false)]
    #[case(range(10, 20), 21, false)]
    #[case(range(4, 4), 4, true)]
    fn range_contains_inclusive(#[case] r: Range, #[case] id: i64, #[case] expected: bool) {
        assert_eq!(r.contains(id), expected);
    }

    #[test]
    fn range_id_count_does_not_overflow() {
        assert_eq!(range(0, i64::MAX).id_count(), i64::MAX as u64 + 1);
    }

    #[rstest]
    #[case(&["10-20", "25-30"], &[15, 26, 5], 2)]
    #[case(&["1-10", "5-15"], &[7], 1)]
    #[case(&["10-20"], &[10, 20, 9, 21], 2)]
    #[case(&[], &[1, 2, 3], 0)]
    #[case(&["1-3"], &[2, 2, 2], 3)]
    fn count_fresh_cases(#[case] ranges: &[&str], #[case] ids: &[i64], #[case] expected: usize) {
        assert_eq!(inventory(ranges, ids).count_fresh(), expected);
    }

    #[rstest]
    #[case(&["1-5", "3-8", "10-12"], 11)]
    #[case(&["1-5", "6-10"], 10)]
    #[case(&["5-10", "5-10"], 6)]
    #[case(&["1-20", "4-6", "8-9"], 20)]
    #[case(&["10-12", "1-5", "7-8"], 10)]
    #[case(&["1-5", "7-10"], 9)]
    #[case(&["0-0"], 1)]
    fn total_fresh_ids_cases(#[case] ranges: &[&str], #[case] expected: u64) {
        assert_eq!(inventory(ranges, &[]).total_fresh_ids(), expected);
    }

    #[test]
    fn merge_ranges_joins_overlapping_and_touching() {
        let merged = merge_ranges(&[range(10, 12), range(1, 5), range(3, 8), range(13, 13), range(15, 16)]);

        assert_eq!(merged, vec![range(1, 8), range(10, 13), range(15, 16)]);
    }

    #[test]
    fn merge_ranges_keeps_lower_bound_of_first() {
        let merged = merge_ranges(&[range(2, 9), range(2, 4), range(5, 6)]);

        assert_eq!(merged, vec![range(2, 9)]);
    }
}
