//! ### Year
//! The calendar files carry Month/Day/Hour but no year. Rows are in
//! chronological order, so the year is recovered by counting the points
//! where the month sequence wraps around.

/// Assigns an absolute year to every row of a chronologically ordered month
/// sequence, starting at `base_year`.
///
/// A row keeps the current year; the year advances for the rows after any
/// position where the next month is smaller than the current one. Any
/// decrease counts, not only December to January, so a single out-of-order
/// row in noisy data shifts every following row by a year. Callers that
/// cannot vouch for clean cyclical data should check the result.
pub fn infer_years(months: &[u32], base_year: i32) -> Vec<i32> {
    let mut year = base_year;
    let mut years = Vec::with_capacity(months.len());

    for pair in months.windows(2) {
        years.push(year);
        if pair[1] < pair[0] {
            year += 1;
        }
    }
    if !months.is_empty() {
        years.push(year);
    }

    years
}
