/// Capture parameters recovered from a file name such as
/// `g001_433.92M_250k.cu8`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FileHints {
    /// Center frequency in Hz, from a number suffixed with `M`/`m`.
    pub center_freq: Option<f64>,
    /// Sample rate in Hz, from a number suffixed with `k`/`K`.
    pub sample_rate: Option<f64>,
}

fn is_separator(c: u8) -> bool {
    matches!(c, b'_' | b'-' | b' ' | b'.')
}

/// Scans `name` for `<sep><number>M` and `<sep><number>k` tokens.
///
/// Later tokens override earlier ones. Any directory prefix is ignored.
pub fn parse_freq_rate(name: &str) -> FileHints {
    let name = name.rsplit('/').next().unwrap_or(name).as_bytes();
    let mut hints = FileHints::default();

    let mut p = 0;
    while p + 1 < name.len() {
        if is_separator(name[p]) {
            p += 1;
            let run = name[p..]
                .iter()
                .take_while(|c| c.is_ascii_digit() || **c == b'.')
                .count();
            if let Some(value) = parse_number(&name[p..p + run]) {
                p += run;
                match name.get(p) {
                    Some(b'M' | b'm') => hints.center_freq = Some(value * 1_000_000.0),
                    Some(b'k' | b'K') => hints.sample_rate = Some(value * 1_000.0),
                    _ => {}
                }
            }
        }
        p += 1;
    }

    hints
}

/// Parses the longest decimal prefix of `run` (digits with at most one dot).
fn parse_number(run: &[u8]) -> Option<f64> {
    let end = run
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == b'.')
        .nth(1)
        .map_or(run.len(), |(i, _)| i);
    let text = std::str::from_utf8(&run[..end]).ok()?;
    if !text.bytes().any(|c| c.is_ascii_digit()) {
        return None;
    }
    text.trim_end_matches('.').parse().ok().or_else(|| {
        // ".5" style runs
        format!("0{}", text).parse().ok()
    })
}

/// Upper-cased extension of `name`, or `"?"` when it has none.
pub fn parse_format(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) => name[pos + 1..].to_uppercase(),
        None => "?".to_string(),
    }
}
