/// Format a value the way Office writes numeric cell and cache values:
/// integral values without a fractional part, everything else in the
/// shortest form that reads back to the same `f64`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        itoa::Buffer::new().format(value as i64).to_string()
    } else {
        ryu::Buffer::new().format(value).to_string()
    }
}
