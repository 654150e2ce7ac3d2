//! Pure verification helpers and the [`Check`] outcome type.
//!
//! Page-object verification methods return [`Check`] rather than `Err`, so
//! "the shop disagrees with the expected state" never looks like "the
//! automation broke".

use crate::result::ProbeError;
use std::cmp::Ordering;
use std::fmt;

/// Number of leading values shown when a sort check fails
pub const SORT_REPORT_PREFIX: usize = 5;

/// Leads a failed check caused by broken suite configuration rather than the shop
pub const CONFIG_FAULT_PREFIX: &str = "Suite configuration error";

/// Outcome of a page-level verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Expected state observed
    Pass,
    /// Expected state not observed, with a diagnostic message
    Fail(String),
}

impl Check {
    /// Failed check with a message
    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Pass when `condition` holds, otherwise fail with `message`
    #[must_use]
    pub fn expect(condition: bool, message: impl FnOnce() -> String) -> Self {
        if condition {
            Self::Pass
        } else {
            Self::Fail(message())
        }
    }

    /// Failed check carrying an error's text. Locator, data and settings
    /// errors are marked as suite configuration faults.
    #[must_use]
    pub fn from_error(err: &ProbeError) -> Self {
        if err.is_config_error() {
            Self::Fail(format!("{CONFIG_FAULT_PREFIX}: {err}"))
        } else {
            Self::Fail(err.to_string())
        }
    }

    /// True for [`Check::Pass`]
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Failure message, if any
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Pass => None,
            Self::Fail(message) => Some(message.as_str()),
        }
    }

    /// Convert into a `Result` with the failure message as error
    pub fn into_result(self) -> Result<(), String> {
        match self {
            Self::Pass => Ok(()),
            Self::Fail(message) => Err(message),
        }
    }

    /// Run the next check only if this one passed
    #[must_use]
    pub fn and_then(self, next: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Pass => next(),
            fail @ Self::Fail(_) => fail,
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Fail(message) => write!(f, "fail: {message}"),
        }
    }
}

impl From<Result<Check, ProbeError>> for Check {
    fn from(result: Result<Check, ProbeError>) -> Self {
        result.unwrap_or_else(|err| Self::from_error(&err))
    }
}

/// Product name is non-empty after trimming and contains a letter
#[must_use]
pub fn is_valid_name(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.chars().any(char::is_alphabetic)
}

/// Price is ASCII digits with at most one `.`, digits on both sides of it
/// (`12`, `12.00`; not `12.`, `.5` or `1.2.3`). Surrounding whitespace is
/// ignored.
#[must_use]
pub fn is_valid_price(text: &str) -> bool {
    let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    match text.trim().split_once('.') {
        Some((whole, fraction)) => digits(whole) && digits(fraction),
        None => digits(text.trim()),
    }
}

/// Case-insensitive containment
#[must_use]
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Direction of a sort check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

impl SortOrder {
    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

fn check_sorted_by<T, F>(what: &str, order: SortOrder, actual: &[T], compare: F) -> Check
where
    T: Clone + fmt::Debug,
    F: Fn(&T, &T) -> Ordering,
{
    if actual.len() < 2 {
        return Check::Pass;
    }
    let mut expected = actual.to_vec();
    expected.sort_by(|a, b| order.apply(compare(a, b)));
    let diverges = actual
        .iter()
        .zip(&expected)
        .any(|(a, e)| compare(a, e) != Ordering::Equal);
    Check::expect(!diverges, || {
        format!(
            "{what} not sorted {}: actual first {SORT_REPORT_PREFIX} {:?}, expected {:?}",
            order.label(),
            &actual[..actual.len().min(SORT_REPORT_PREFIX)],
            &expected[..expected.len().min(SORT_REPORT_PREFIX)],
        )
    })
}

/// Names are in case-insensitive `order`
#[must_use]
pub fn check_sorted_names<S: AsRef<str>>(names: &[S], order: SortOrder) -> Check {
    let names: Vec<String> = names.iter().map(|n| n.as_ref().trim().to_string()).collect();
    check_sorted_by("Names", order, &names, |a, b| {
        a.to_lowercase().cmp(&b.to_lowercase())
    })
}

/// Prices parse as numbers and are in numeric `order`
#[must_use]
pub fn check_sorted_prices<S: AsRef<str>>(prices: &[S], order: SortOrder) -> Check {
    if prices.len() < 2 {
        return Check::Pass;
    }
    let mut parsed = Vec::with_capacity(prices.len());
    for (index, text) in prices.iter().enumerate() {
        let text = text.as_ref().trim();
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => parsed.push(value),
            _ => return Check::Fail(format!("Price[{index}] is not a number: {text:?}")),
        }
    }
    check_sorted_by("Prices", order, &parsed, f64::total_cmp)
}

/// Pager indicator shows the expected page number
#[must_use]
pub fn check_current_page(actual: &str, expected: u32) -> Check {
    let actual = actual.trim();
    Check::expect(actual == expected.to_string(), || {
        format!("Expected current page {expected}, got: {actual:?}")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod name_tests {
        use super::*;

        #[test]
        fn test_name_cases() {
            assert!(!is_valid_name(""));
            assert!(!is_valid_name("123"));
            assert!(is_valid_name("T-Shirt"));
            assert!(!is_valid_name("   "));
            assert!(is_valid_name("  50's Rockabilly Polka Dot Top  "));
        }
    }

    mod price_tests {
        use super::*;

        #[test]
        fn test_price_cases() {
            assert!(!is_valid_price(""));
            assert!(!is_valid_price("$12.00"));
            assert!(is_valid_price("12.00"));
            assert!(!is_valid_price("12,00"));
            assert!(!is_valid_price("abc"));
            assert!(!is_valid_price("."));
            assert!(is_valid_price(" 1800.00 "));
        }

        #[test]
        fn test_single_separator_between_digits() {
            assert!(is_valid_price("12"));
            assert!(!is_valid_price("1.2.3"));
            assert!(!is_valid_price("1..0"));
            assert!(!is_valid_price("12."));
            assert!(!is_valid_price(".5"));
        }
    }

    mod keyword_tests {
        use super::*;

        #[test]
        fn test_keyword_is_case_insensitive() {
            assert!(contains_keyword("Computer", "computer"));
            assert!(contains_keyword("Build your own computer", "BUILD"));
            assert!(!contains_keyword("Laptop", "computer"));
        }
    }

    mod check_tests {
        use super::*;

        #[test]
        fn test_expect_and_then() {
            let check = Check::Pass.and_then(|| Check::fail("second"));
            assert_eq!(check.message(), Some("second"));
            let check = Check::fail("first").and_then(|| Check::fail("second"));
            assert_eq!(check.message(), Some("first"));
        }

        #[test]
        fn test_from_driver_error() {
            let check: Check = Err(ProbeError::driver("socket closed")).into();
            assert!(check.message().unwrap().contains("socket closed"));
            assert_eq!(Check::from(Ok(Check::Pass)), Check::Pass);
            assert!(!check.message().unwrap().starts_with(CONFIG_FAULT_PREFIX));
        }

        #[test]
        fn test_config_error_marked_as_suite_fault() {
            let check: Check = Err(ProbeError::locator_not_found("category", "pager")).into();
            let message = check.message().unwrap();
            assert!(message.starts_with("Suite configuration error: "), "{message}");
            assert!(message.contains("'category.pager' not found"), "{message}");
        }

        #[test]
        fn test_into_result() {
            assert_eq!(Check::Pass.into_result(), Ok(()));
            assert_eq!(Check::fail("x").into_result(), Err("x".to_string()));
        }
    }

    mod sort_tests {
        use super::*;

        #[test]
        fn test_names_ascending_case_insensitive() {
            let names = ["apple", "Banana", "cherry"];
            assert!(check_sorted_names(&names, SortOrder::Ascending).is_pass());
            assert!(!check_sorted_names(&names, SortOrder::Descending).is_pass());
        }

        #[test]
        fn test_prices_numeric_not_lexical() {
            let prices = ["9.00", "10.00", "100.00"];
            assert!(check_sorted_prices(&prices, SortOrder::Ascending).is_pass());
        }

        #[test]
        fn test_failure_reports_prefixes() {
            let prices = ["3", "1", "2", "4", "5", "6", "7"];
            let check = check_sorted_prices(&prices, SortOrder::Ascending);
            let msg = check.message().unwrap();
            assert!(msg.contains("[3.0, 1.0, 2.0, 4.0, 5.0]"));
            assert!(msg.contains("[1.0, 2.0, 3.0, 4.0, 5.0]"));
            assert!(!msg.contains("6.0"));
        }

        #[test]
        fn test_unparseable_price_names_index() {
            let check = check_sorted_prices(&["1.00", "n/a"], SortOrder::Ascending);
            assert!(check.message().unwrap().contains("Price[1]"));
        }

        #[test]
        fn test_short_sequences_are_sorted() {
            let empty: [&str; 0] = [];
            assert!(check_sorted_names(&empty, SortOrder::Ascending).is_pass());
            assert!(check_sorted_prices(&["5.00"], SortOrder::Descending).is_pass());
            assert!(check_sorted_prices(&["oops"], SortOrder::Descending).is_pass());
        }

        #[test]
        fn test_current_page() {
            assert!(check_current_page(" 2 ", 2).is_pass());
            assert_eq!(
                check_current_page("1", 2).message(),
                Some("Expected current page 2, got: \"1\"")
            );
        }
    }

    mod property_tests {
        use super::*;

        proptest! {
            #[test]
            fn prop_sort_check_is_idempotent(values in proptest::collection::vec("[a-zA-Z ]{0,8}", 0..12)) {
                let first = check_sorted_names(&values, SortOrder::Ascending);
                let second = check_sorted_names(&values, SortOrder::Ascending);
                prop_assert_eq!(first, second);
            }

            #[test]
            fn prop_sorted_input_passes(mut values in proptest::collection::vec(0u32..10_000, 0..20)) {
                values.sort_unstable();
                let prices: Vec<String> = values.iter().map(|v| format!("{}.{:02}", v / 100, v % 100)).collect();
                prop_assert!(check_sorted_prices(&prices, SortOrder::Ascending).is_pass());
                let reversed: Vec<String> = prices.iter().rev().cloned().collect();
                prop_assert!(check_sorted_prices(&reversed, SortOrder::Descending).is_pass());
            }

            #[test]
            fn prop_single_name_always_sorted(name in ".*") {
                prop_assert!(check_sorted_names(&[name.as_str()], SortOrder::Descending).is_pass());
            }

            #[test]
            fn prop_digit_strings_are_valid_prices(price in "[0-9]{1,6}(\\.[0-9]{1,2})?") {
                prop_assert!(is_valid_price(&price));
                prop_assert!(!is_valid_name(&price));
            }

            #[test]
            fn prop_keyword_matches_any_case(word in "[a-zA-Z]{1,10}") {
                let shouted = format!("THE {} ITEM", word.to_uppercase());
                prop_assert!(contains_keyword(&shouted, &word.to_lowercase()));
            }
        }
    }
}
