const MONTH_ABBR: &[&str] = &[
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

fn group_thousands(int_part: &str, sep: char) -> String {
    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(c);
    }
    grouped.chars().rev().collect()
}

/// Format a float as Brazilian currency: R$ 1.234,56
pub fn money(val: f64) -> String {
    let negative = val < 0.0 && format!("{:.2}", val.abs()) != "0.00";
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));
    let grouped = group_thousands(int_part, '.');

    if negative {
        format!("-R$ {grouped},{dec_part}")
    } else {
        format!("R$ {grouped},{dec_part}")
    }
}

/// Plain number with thousands separators and no currency, for narrow columns.
pub fn number(val: f64) -> String {
    let s = money(val);
    s.replacen("R$ ", "", 1)
}

/// One decimal place and a `%` suffix.
pub fn pct(val: f64) -> String {
    format!("{val:.1}%")
}

pub fn pct_opt(val: Option<f64>) -> String {
    val.map(pct).unwrap_or_default()
}

/// `2024-03` → `mar/24`. Labels that are not months pass through unchanged.
pub fn month_short(label: &str) -> String {
    if let Some((year, month)) = label.split_once('-') {
        if let Ok(m) = month.parse::<usize>() {
            if (1..=12).contains(&m) && year.len() == 4 {
                return format!("{}/{}", MONTH_ABBR[m - 1], &year[2..]);
            }
        }
    }
    label.to_string()
}
