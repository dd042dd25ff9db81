//! Custom askama filters used by the page templates.

pub fn money(value: &f64) -> askama::Result<String> {
    if value.fract().abs() < f64::EPSILON {
        Ok(format!("${value:.0}"))
    } else {
        Ok(format!("${value:.2}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_drops_trailing_zero_cents() {
        assert_eq!(money(&25.0).unwrap(), "$25");
        assert_eq!(money(&12.5).unwrap(), "$12.50");
        assert_eq!(money(&0.0).unwrap(), "$0");
    }
}
