//! Text normalization: digits, dates, times, currency, units, percentages,
//! phone numbers and arithmetic glyphs become spelled-out readings.
//!
//! Passes run in a fixed order so later passes never re-consume tokens an
//! earlier pass already rewrote: date/time, years, currency, phone numbers,
//! percentages, units, math operators, then generic numbers.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::chars::{
    digits_to_chinese, digits_to_english, is_ascii_letter, is_cjk, number_to_chinese,
    number_to_english, ordinal_to_english, year_to_english,
};

/// Target language for the spelled-out readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Zh,
    En,
    /// Decide per match from the surrounding script.
    Auto,
}

/// Per-match resolution of [`Lang::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    Zh,
    En,
}

/// Normalize `text` for synthesis in `lang`.
pub fn normalize(text: &str, lang: Lang) -> String {
    let text = pass_dates(text, lang);
    let text = pass_times(&text, lang);
    let text = pass_years(&text, lang);
    let text = pass_currency(&text, lang);
    let text = pass_phones(&text, lang);
    let text = pass_percent(&text, lang);
    let text = pass_units(&text, lang);
    let text = pass_math(&text, lang);
    let text = pass_numbers(&text, lang);
    collapse_spaces(&text)
}

/// Operator replacement pads with spaces; collapse the runs it leaves.
fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !last_space {
                out.push(c);
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out.trim_end_matches(' ').trim_start_matches(' ').to_string()
}

/// Decide the reading language for a match by scanning ten characters on
/// either side and taking the majority script. Ties lean Chinese, which is
/// the engine's home language.
fn resolve(haystack: &str, start: usize, end: usize, lang: Lang) -> Resolved {
    match lang {
        Lang::Zh => Resolved::Zh,
        Lang::En => Resolved::En,
        Lang::Auto => {
            let before = haystack[..start].chars().rev().take(10);
            let after = haystack[end..].chars().take(10);
            let mut cjk = 0usize;
            let mut latin = 0usize;
            for c in before.chain(after) {
                if is_cjk(c) {
                    cjk += 1;
                } else if is_ascii_letter(c) {
                    latin += 1;
                }
            }
            if latin > cjk {
                Resolved::En
            } else {
                Resolved::Zh
            }
        }
    }
}

fn resolve_caps(haystack: &str, caps: &Captures, lang: Lang) -> Resolved {
    let m = caps.get(0).expect("whole match");
    resolve(haystack, m.start(), m.end(), lang)
}

/// `\b` counts CJK ideographs as word characters, so it never fires between
/// a hanzi and a digit. These explicit checks are used instead.
fn no_adjacent_digit(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
}

fn no_adjacent_alnum(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_alphanumeric())
        && !after.is_some_and(|c| c.is_ascii_alphanumeric())
}

/// Cardinal reading of a digit string with optional decimal point.
/// Integer parts too long for an i64 reading fall back to digit-by-digit.
fn read_number(num: &str, lang: Resolved) -> String {
    let (int_part, frac_part) = match num.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (num, None),
    };
    let (negative, digits) = match int_part.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, int_part),
    };
    let digits: String = digits.chars().filter(|c| *c != ',').collect();

    let mut out = String::new();
    match lang {
        Resolved::Zh => {
            if negative {
                out.push('负');
            }
            match digits.parse::<i64>() {
                Ok(n) if digits.len() <= 12 => out.push_str(&number_to_chinese(n)),
                _ => out.push_str(&digits_to_chinese(&digits)),
            }
            if let Some(frac) = frac_part {
                out.push('点');
                out.push_str(&digits_to_chinese(frac));
            }
        }
        Resolved::En => {
            if negative {
                out.push_str("negative ");
            }
            match digits.parse::<i64>() {
                Ok(n) if digits.len() <= 12 => out.push_str(&number_to_english(n)),
                _ => out.push_str(&digits_to_english(&digits)),
            }
            if let Some(frac) = frac_part {
                out.push_str(" point ");
                out.push_str(&digits_to_english(frac));
            }
        }
    }
    out
}

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn pass_dates(text: &str, lang: Lang) -> String {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\d{4})[-/年](\d{1,2})[-/月](\d{1,2})日?").unwrap());
    RE.replace_all(text, |caps: &Captures| {
        let year: u32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);
        if !(1000..=2999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
        {
            return caps[0].to_string();
        }
        match resolve_caps(text, caps, lang) {
            Resolved::Zh => format!(
                "{}年{}月{}日",
                digits_to_chinese(&caps[1]),
                number_to_chinese(month as i64),
                number_to_chinese(day as i64)
            ),
            Resolved::En => format!(
                "{} {}, {}",
                EN_MONTHS[(month - 1) as usize],
                ordinal_to_english(day),
                year_to_english(year)
            ),
        }
    })
    .into_owned()
}

fn pass_times(text: &str, lang: Lang) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})(?::(\d{2}))?").unwrap());
    RE.replace_all(text, |caps: &Captures| {
        let m = caps.get(0).expect("whole match");
        let hour: u32 = caps[1].parse().unwrap_or(99);
        let minute: u32 = caps[2].parse().unwrap_or(99);
        let second: Option<u32> = caps.get(3).map(|m| m.as_str().parse().unwrap_or(99));
        if hour >= 24
            || minute >= 60
            || second.is_some_and(|s| s >= 60)
            || !no_adjacent_digit(text, m.start(), m.end())
        {
            return caps[0].to_string();
        }
        match resolve_caps(text, caps, lang) {
            Resolved::Zh => {
                let mut out = format!(
                    "{}点{}分",
                    number_to_chinese(hour as i64),
                    number_to_chinese(minute as i64)
                );
                if let Some(s) = second {
                    out.push_str(&number_to_chinese(s as i64));
                    out.push('秒');
                }
                out
            }
            Resolved::En => {
                let suffix = if hour < 12 { "AM" } else { "PM" };
                let hour12 = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                let mut out = number_to_english(hour12 as i64);
                if minute == 0 {
                    out.push_str(" o'clock");
                } else if minute < 10 {
                    out.push_str(&format!(" oh {}", number_to_english(minute as i64)));
                } else {
                    out.push_str(&format!(" {}", number_to_english(minute as i64)));
                }
                out.push_str(&format!(" {suffix}"));
                if let Some(s) = second {
                    out.push_str(&format!(" and {} seconds", number_to_english(s as i64)));
                }
                out
            }
        }
    })
    .into_owned()
}

fn pass_years(text: &str, lang: Lang) -> String {
    // 年-suffixed years always read digit-by-digit in Chinese.
    static RE_ZH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})年").unwrap());
    let text = RE_ZH
        .replace_all(text, |caps: &Captures| {
            let year: u32 = caps[1].parse().unwrap_or(0);
            if (1000..=2999).contains(&year) {
                format!("{}年", digits_to_chinese(&caps[1]))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();

    // Bare four-digit years in English context get the conventional reading.
    static RE_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[12]\d{3}").unwrap());
    RE_BARE
        .replace_all(&text, |caps: &Captures| {
            let m = caps.get(0).expect("whole match");
            let year: u32 = caps[0].parse().unwrap_or(0);
            if (1000..=2999).contains(&year)
                && no_adjacent_alnum(&text, m.start(), m.end())
                && resolve_caps(&text, caps, lang) == Resolved::En
            {
                year_to_english(year)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

const CURRENCY_SYMBOLS: &[(char, &str, &str)] = &[
    ('¥', "元", "yuan"),
    ('$', "美元", "dollars"),
    ('€', "欧元", "euros"),
    ('£', "英镑", "pounds"),
    ('₩', "韩元", "won"),
    ('₹', "卢比", "rupees"),
];

fn pass_currency(text: &str, lang: Lang) -> String {
    // Symbol-prefixed amounts; digits before the thousands comma are kept,
    // the comma itself is skipped.
    static RE_SYMBOL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"([¥$€£₩₹])\s*(\d[\d,]*(?:\.\d+)?)").unwrap());
    let text = RE_SYMBOL
        .replace_all(text, |caps: &Captures| {
            let symbol = caps[1].chars().next().unwrap_or('$');
            let Some(&(_, zh, en)) = CURRENCY_SYMBOLS.iter().find(|&&(s, _, _)| s == symbol)
            else {
                return caps[0].to_string();
            };
            match resolve_caps(text, caps, lang) {
                Resolved::Zh => format!("{}{zh}", read_number(&caps[2], Resolved::Zh)),
                Resolved::En => format!("{} {en}", read_number(&caps[2], Resolved::En)),
            }
        })
        .into_owned();

    // Chinese currency-word suffixes force a Chinese number reading.
    static RE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(\d[\d,]*(?:\.\d+)?)(美元|人民币|日元|欧元|英镑|港币|元|块)").unwrap()
    });
    RE_SUFFIX
        .replace_all(&text, |caps: &Captures| {
            format!("{}{}", read_number(&caps[1], Resolved::Zh), &caps[2])
        })
        .into_owned()
}

fn pass_phones(text: &str, lang: Lang) -> String {
    // Mobile numbers: 11 digits starting 1[3-9].
    static RE_MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"1[3-9]\d{9}").unwrap());
    let text = RE_MOBILE
        .replace_all(text, |caps: &Captures| {
            let m = caps.get(0).expect("whole match");
            if !no_adjacent_digit(text, m.start(), m.end()) {
                return caps[0].to_string();
            }
            match resolve_caps(text, caps, lang) {
                Resolved::Zh => digits_to_chinese(&caps[0]),
                Resolved::En => digits_to_english(&caps[0]),
            }
        })
        .into_owned();

    // Landlines: 3-4 digit area code plus 7-8 digits.
    static RE_LANDLINE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(0\d{2,3})[- ]?(\d{7,8})").unwrap());
    RE_LANDLINE
        .replace_all(&text, |caps: &Captures| {
            let m = caps.get(0).expect("whole match");
            if !no_adjacent_digit(&text, m.start(), m.end()) {
                return caps[0].to_string();
            }
            let digits = format!("{}{}", &caps[1], &caps[2]);
            match resolve_caps(&text, caps, lang) {
                Resolved::Zh => digits_to_chinese(&digits),
                Resolved::En => digits_to_english(&digits),
            }
        })
        .into_owned()
}

fn pass_percent(text: &str, lang: Lang) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").unwrap());
    RE.replace_all(text, |caps: &Captures| match resolve_caps(text, caps, lang) {
        Resolved::Zh => format!("百分之{}", read_number(&caps[1], Resolved::Zh)),
        Resolved::En => format!("{} percent", read_number(&caps[1], Resolved::En)),
    })
    .into_owned()
}

/// Unit symbol with readings, ordered longest-first so `km` wins over `m`.
const UNITS: &[(&str, &str, &str)] = &[
    ("km²", "平方千米", "square kilometers"),
    ("km/h", "千米每小时", "kilometers per hour"),
    ("m/s", "米每秒", "meters per second"),
    ("kWh", "千瓦时", "kilowatt hours"),
    ("GHz", "吉赫", "gigahertz"),
    ("MHz", "兆赫", "megahertz"),
    ("kHz", "千赫", "kilohertz"),
    ("min", "分钟", "minutes"),
    ("°C", "摄氏度", "degrees Celsius"),
    ("°F", "华氏度", "degrees Fahrenheit"),
    ("m²", "平方米", "square meters"),
    ("m³", "立方米", "cubic meters"),
    ("km", "千米", "kilometers"),
    ("cm", "厘米", "centimeters"),
    ("mm", "毫米", "millimeters"),
    ("kg", "千克", "kilograms"),
    ("mg", "毫克", "milligrams"),
    ("TB", "太字节", "terabytes"),
    ("GB", "吉字节", "gigabytes"),
    ("MB", "兆字节", "megabytes"),
    ("KB", "千字节", "kilobytes"),
    ("mL", "毫升", "milliliters"),
    ("ml", "毫升", "milliliters"),
    ("Hz", "赫兹", "hertz"),
    ("kW", "千瓦", "kilowatts"),
    ("ms", "毫秒", "milliseconds"),
    ("m", "米", "meters"),
    ("g", "克", "grams"),
    ("t", "吨", "tons"),
    ("L", "升", "liters"),
    ("W", "瓦", "watts"),
    ("V", "伏", "volts"),
    ("A", "安培", "amperes"),
];

fn pass_units(text: &str, lang: Lang) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| {
        let symbols: Vec<String> = UNITS
            .iter()
            .map(|&(s, _, _)| regex::escape(s))
            .collect();
        Regex::new(&format!(r"(\d+(?:\.\d+)?)\s*({})", symbols.join("|"))).unwrap()
    });
    RE.replace_all(text, |caps: &Captures| {
        let m = caps.get(0).expect("whole match");
        let symbol = &caps[2];
        // A unit ending in an ASCII letter must not run into more letters
        // or digits ("5kmh" is not "5 km" + "h").
        let ascii_tail = symbol.chars().next_back().is_some_and(|c| c.is_ascii_alphabetic());
        if ascii_tail
            && text[m.end()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric())
        {
            return caps[0].to_string();
        }
        let Some(&(_, zh, en)) = UNITS.iter().find(|&&(s, _, _)| s == symbol) else {
            return caps[0].to_string();
        };
        match resolve_caps(text, caps, lang) {
            Resolved::Zh => format!("{}{zh}", read_number(&caps[1], Resolved::Zh)),
            Resolved::En => format!("{} {en}", read_number(&caps[1], Resolved::En)),
        }
    })
    .into_owned()
}

fn pass_math(text: &str, lang: Lang) -> String {
    // Powers first so the caret never reaches the operator table.
    static RE_POW: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*\^\s*(-?\d+)").unwrap());
    let text = RE_POW
        .replace_all(text, |caps: &Captures| match resolve_caps(text, caps, lang) {
            Resolved::Zh => format!("{}的{}次方", &caps[1], &caps[2]),
            Resolved::En => format!("{} to the power of {}", &caps[1], &caps[2]),
        })
        .into_owned();

    static RE_SQRT: Lazy<Regex> = Lazy::new(|| Regex::new(r"√\s*(\d+(?:\.\d+)?)").unwrap());
    let text = RE_SQRT
        .replace_all(&text, |caps: &Captures| {
            match resolve_caps(&text, caps, lang) {
                Resolved::Zh => format!("根号{}", &caps[1]),
                Resolved::En => format!("the square root of {}", &caps[1]),
            }
        })
        .into_owned();

    // Binary minus between digits; a remaining `-` directly before a digit
    // is read as "negative" by the generic-number pass.
    static RE_MINUS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(\d)\s*[−-]\s*(\d)").unwrap());
    let mut text = text;
    // Overlapping spans ("1-2-3") need repeated application.
    loop {
        let replaced = RE_MINUS
            .replace_all(&text, |caps: &Captures| {
                match resolve_caps(&text, caps, lang) {
                    Resolved::Zh => format!("{}减{}", &caps[1], &caps[2]),
                    Resolved::En => format!("{} minus {}", &caps[1], &caps[2]),
                }
            })
            .into_owned();
        if replaced == text {
            break;
        }
        text = replaced;
    }

    // Two-character operators before their single-character prefixes.
    const OPS: &[(&str, &str, &str)] = &[
        (">=", "大于等于", "is greater than or equal to"),
        ("<=", "小于等于", "is less than or equal to"),
        ("≥", "大于等于", "is greater than or equal to"),
        ("≤", "小于等于", "is less than or equal to"),
        ("≠", "不等于", "is not equal to"),
        ("+", "加", "plus"),
        ("×", "乘以", "times"),
        ("÷", "除以", "divided by"),
        ("=", "等于", "equals"),
        (">", "大于", "is greater than"),
        ("<", "小于", "is less than"),
        ("±", "正负", "plus or minus"),
    ];
    static RE_OPS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r">=|<=|≥|≤|≠|\+|×|÷|=|>|<|±").unwrap());
    RE_OPS
        .replace_all(&text, |caps: &Captures| {
            let glyph = &caps[0];
            let Some(&(_, zh, en)) = OPS.iter().find(|&&(g, _, _)| g == glyph) else {
                return glyph.to_string();
            };
            match resolve_caps(&text, caps, lang) {
                Resolved::Zh => zh.to_string(),
                Resolved::En => format!(" {en} "),
            }
        })
        .into_owned()
}

fn pass_numbers(text: &str, lang: Lang) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"-?\d+(?:,\d{3})*(?:\.\d+)?(?:[eE][+-]?\d+)?").unwrap()
    });
    RE.replace_all(text, |caps: &Captures| {
        let m = caps.get(0).expect("whole match");
        let mut literal = m.as_str();
        let mut start = m.start();
        // A minus is "negative" only when it does not follow a digit;
        // after a digit it would have been a binary minus already.
        if literal.starts_with('-')
            && text[..start].chars().next_back().is_some_and(|c| c.is_ascii_digit())
        {
            literal = &literal[1..];
            start += 1;
        }
        let resolved = resolve(text, start, m.end(), lang);

        let (mantissa, exponent) = match literal.find(['e', 'E']) {
            Some(pos) => (&literal[..pos], Some(&literal[pos + 1..])),
            None => (literal, None),
        };
        let mut out = if m.as_str() != literal {
            // Re-emit the digit the binary-minus rule left untouched.
            String::from("-")
        } else {
            String::new()
        };
        out.push_str(&read_number(mantissa, resolved));
        if let Some(exp) = exponent {
            let exp = exp.strip_prefix('+').unwrap_or(exp);
            match resolved {
                Resolved::Zh => {
                    out.push_str("乘以十的");
                    out.push_str(&read_number(exp, Resolved::Zh));
                    out.push_str("次方");
                }
                Resolved::En => {
                    out.push_str(" times ten to the power of ");
                    out.push_str(&read_number(exp, Resolved::En));
                }
            }
        }
        out
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_in_both_languages() {
        assert_eq!(normalize("2024年1月16日", Lang::Zh), "二零二四年一月十六日");
        assert_eq!(
            normalize("on 2024-01-16 we met", Lang::En),
            "on January sixteenth, twenty twenty-four we met"
        );
    }

    #[test]
    fn times_in_both_languages() {
        assert_eq!(normalize("现在是14:30", Lang::Zh), "现在是十四点三十分");
        assert_eq!(normalize("at 9:05", Lang::En), "at nine oh five AM");
        assert_eq!(normalize("at 15:00", Lang::En), "at three o'clock PM");
        assert_eq!(
            normalize("12:30:45", Lang::En),
            "twelve thirty PM and forty-five seconds"
        );
    }

    #[test]
    fn year_readings() {
        assert_eq!(normalize("2024年", Lang::Zh), "二零二四年");
        assert_eq!(
            normalize("The year 2024 was good.", Lang::En),
            "The year twenty twenty-four was good."
        );
        assert_eq!(
            normalize("The year 2024 was good.", Lang::Auto),
            "The year twenty twenty-four was good."
        );
    }

    #[test]
    fn currency_prefix_and_suffix() {
        assert_eq!(normalize("价格是¥1,234", Lang::Zh), "价格是一千二百三十四元");
        assert_eq!(
            normalize("it costs $5.50 today", Lang::En),
            "it costs five point five zero dollars today"
        );
        assert_eq!(normalize("共300元", Lang::Zh), "共三百元");
        assert_eq!(normalize("五块 or 5块", Lang::Zh), "五块 or 五块");
    }

    #[test]
    fn phone_numbers_digit_by_digit() {
        assert_eq!(
            normalize("打13800138000吧", Lang::Zh),
            "打一三八零零一三八零零零吧"
        );
        assert_eq!(
            normalize("电话010-12345678", Lang::Zh),
            "电话零一零一二三四五六七八"
        );
    }

    #[test]
    fn percentages() {
        assert_eq!(normalize("涨了25%", Lang::Zh), "涨了百分之二十五");
        assert_eq!(normalize("up 3.5%", Lang::En), "up three point five percent");
    }

    #[test]
    fn units_longest_first() {
        assert_eq!(normalize("跑了5km", Lang::Zh), "跑了五千米");
        assert_eq!(normalize("walked 5 km", Lang::En), "walked five kilometers");
        assert_eq!(normalize("气温21°C", Lang::Zh), "气温二十一摄氏度");
        assert_eq!(normalize("面积120m²", Lang::Zh), "面积一百二十平方米");
        assert_eq!(normalize("下载了500MB", Lang::Zh), "下载了五百兆字节");
    }

    #[test]
    fn math_operators() {
        assert_eq!(normalize("1+1=2", Lang::Zh), "一加一等于二");
        assert_eq!(normalize("3 - 1 = 2", Lang::En), "three minus one equals two");
        assert_eq!(normalize("2×3", Lang::Zh), "二乘以三");
        assert_eq!(normalize("a ≥ b", Lang::En), "a is greater than or equal to b");
        assert_eq!(normalize("2^10", Lang::Zh), "二的十次方");
        assert_eq!(normalize("√9", Lang::Zh), "根号九");
    }

    #[test]
    fn negative_numbers() {
        assert_eq!(normalize("温度是-5", Lang::Zh), "温度是负五");
        assert_eq!(normalize("x = -3", Lang::En), "x equals negative three");
    }

    #[test]
    fn generic_and_scientific_numbers() {
        assert_eq!(normalize("有1234个", Lang::Zh), "有一千二百三十四个");
        assert_eq!(normalize("约3.14", Lang::Zh), "约三点一四");
        assert_eq!(
            normalize("6.02e23", Lang::En),
            "six point zero two times ten to the power of twenty-three"
        );
        assert_eq!(
            normalize("1.5e-3", Lang::Zh),
            "一点五乘以十的负三次方"
        );
    }

    #[test]
    fn auto_detection_uses_surrounding_script() {
        assert_eq!(normalize("我有3个苹果", Lang::Auto), "我有三个苹果");
        assert_eq!(normalize("I have 3 apples", Lang::Auto), "I have three apples");
    }

    #[test]
    fn idempotent_on_spelled_text() {
        let inputs = [
            "你好世界",
            "hello there",
            "二零二四年一月十六日",
            "three minus one equals two",
        ];
        for input in inputs {
            let once = normalize(input, Lang::Auto);
            assert_eq!(normalize(&once, Lang::Auto), once);
        }
    }
}
