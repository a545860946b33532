/// Parse a `minutes:seconds` label (e.g. "3:45") into seconds.
///
/// Only the two-part form is recognized. Labels with no colon, more than one
/// colon (including "h:mm:ss"), or non-numeric parts yield `None`.
pub fn parse_duration(label: &str) -> Option<u32> {
    let (minutes, seconds) = label.trim().split_once(':')?;

    if seconds.contains(':') {
        return None;
    }

    let minutes: u32 = parse_field(minutes)?;
    let seconds: u32 = parse_field(seconds)?;

    minutes.checked_mul(60)?.checked_add(seconds)
}

fn parse_field(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
