use chrono::NaiveTime;

const FORMATS: &[&str] = &["%I:%M %p", "%H:%M", "%H:%M:%S"];

/// Parses `09:00 AM`, `9 pm`, `9pm` or 24-hour `21:30`.
pub fn parse_reminder_time(raw: &str) -> Option<NaiveTime> {
    let value = raw.trim().to_ascii_uppercase();
    if value.is_empty() {
        return None;
    }

    let (clock, meridiem) = match value.strip_suffix("AM").or_else(|| value.strip_suffix("PM")) {
        Some(clock) => (clock.trim_end(), Some(&value[value.len() - 2..])),
        None => (value.as_str(), None),
    };

    // Bare hours get explicit minutes, chrono will not default them.
    let clock = if clock.contains(':') {
        clock.to_string()
    } else {
        format!("{}:00", clock)
    };
    let normalised = match meridiem {
        Some(meridiem) => format!("{} {}", clock, meridiem),
        None => clock,
    };

    FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&normalised, format).ok())
}

/// Comma separated list of times. Any unparseable entry fails the whole list.
pub fn parse_reminder_times(input: &str) -> Result<Vec<NaiveTime>, String> {
    let times = input
        .split(',')
        .map(|part| parse_reminder_time(part).ok_or_else(|| format!("Unrecognised time '{}'", part.trim())))
        .collect::<Result<Vec<_>, _>>()?;

    if times.is_empty() {
        return Err("No times given".to_string());
    }
    Ok(times)
}

/// `HH:MM`, 24-hour.
pub fn format_24h(times: &[NaiveTime]) -> String {
    times
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
