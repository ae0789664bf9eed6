/// Floor of the arithmetic mean, as whole roubles. Returns 0 when `count` is 0.
pub fn floor_mean(sum: f64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    (sum / count as f64).floor() as i64
}

/// Share of `part` in `total`, rounded to `places` decimal digits. Returns 0.0 when `total` is 0.
///
/// The quotient is rounded exactly in integers, ties going to the even last digit.
pub fn rounded_share(part: usize, total: usize, places: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let scale = 10u128.pow(places);
    let total = total as u128;
    let scaled = part as u128 * scale;
    let (mut digits, remainder) = (scaled / total, scaled % total);

    let twice = remainder * 2;
    if twice > total || (twice == total && digits % 2 == 1) {
        digits += 1;
    }
    digits as f64 / scale as f64
}
