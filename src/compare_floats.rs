pub fn min_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first < second {
        first
    } else {
        second
    }
}

pub fn max_of_2<T: PartialOrd + Copy>(first: T, second: T) -> T {
    if first > second {
        first
    } else {
        second
    }
}

/// Clamp a value into the closed range [0, 1].
pub(crate) fn clamp_fraction(value: f64) -> f64 {
    max_of_2(0.0, min_of_2(1.0, value))
}

/// Clamp a percentage into the closed range [0, 100].
pub(crate) fn clamp_percent(value: f64) -> f64 {
    max_of_2(0.0, min_of_2(100.0, value))
}
