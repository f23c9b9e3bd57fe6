pub fn decibels(x: f64) -> f64 {
    10. * x.log10()
}

pub fn decibels_or_else(x: f64, or: f64) -> f64 {
    if x <= 0. {
        or
    } else {
        10. * x.log10()
    }
}
