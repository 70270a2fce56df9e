//! GRBL Alarm Code Decoder
//! Converts numeric alarm codes to human-readable messages

/// Decode GRBL alarm code to human-readable message
pub fn decode_alarm(code: u8) -> &'static str {
    match code {
        1 => "Hard limit triggered. Machine position is likely lost. Re-homing is recommended.",
        2 => "Soft limit: motion target exceeds machine travel. Machine position retained.",
        3 => "Reset while in motion. Position may be lost. Re-homing is recommended.",
        4 => "Probe fail. Probe is not in the expected initial state.",
        5 => "Probe fail. Probe did not contact the workpiece within programmed travel.",
        6 => "Homing fail. Reset during active homing cycle.",
        7 => "Homing fail. Safety door was opened during homing.",
        8 => "Homing fail. Could not clear limit switch when pulling off.",
        9 => "Homing fail. Could not find limit switch within search distance.",
        10 => "Limit switch engaged. Cannot complete homing cycle.",
        11 => "Homing required before this operation.",
        12 => "E-stop asserted.",
        _ => "Unknown alarm code",
    }
}

/// Format alarm message with code and description
pub fn format_alarm(code: u8) -> String {
    format!("ALARM:{} - {}", code, decode_alarm(code))
}

/// Find every `ALARM:n` in a response and decode it
pub fn alarms_in(response: &str) -> Vec<String> {
    response
        .split(|c: char| c.is_whitespace() || c == '|' || c == '<' || c == '>')
        .filter_map(|token| token.strip_prefix("ALARM:"))
        .filter_map(|code| code.trim().parse::<u8>().ok())
        .map(format_alarm)
        .collect()
}
