/// The console's reply to a command it does not know.
pub fn unknown_command_echo(command: &str) -> String {
    format!("*** ERROR: unknown command '{}'", command)
}

/// Does `line` start like a server log line, `2020-01-01T00:00:00 `?
pub fn is_log_line(line: &str) -> bool {
    const PATTERN: &[u8; 20] = b"dddd-dd-ddTdd:dd:dd ";

    let bytes = line.as_bytes();
    bytes.len() >= PATTERN.len()
        && PATTERN.iter().zip(bytes).all(|(&p, &b)| match p {
            b'd' => b.is_ascii_digit(),
            _ => p == b,
        })
}

/// Cut one command's output out of everything read from the console.
///
/// Returns what lies after the echo of `start_marker` (and its line ending)
/// and before the echo of `end_marker`, without server log lines. Empty when
/// the start echo never showed up; runs to the end of `raw` when the end echo
/// did not.
pub fn frame(raw: &str, start_marker: &str, end_marker: &str) -> String {
    let start_echo = unknown_command_echo(start_marker);
    let end_echo = unknown_command_echo(end_marker);

    let Some(start) = raw.find(&start_echo) else {
        return String::new();
    };
    let body = &raw[start + start_echo.len()..];
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    let body = match body.find(&end_echo) {
        Some(end) => &body[..end],
        None => body,
    };

    let mut lines: Vec<&str> = body.lines().filter(|line| !is_log_line(line)).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    lines.join("\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(payload: &str) -> String {
        format!(
            "Connected with 7DTD server.\r\n\
             2024-05-01T10:00:00 12.345 INF Telnet connection from 127.0.0.1\r\n\
             *** ERROR: unknown command 'startcommand'\r\n\
             {}\
             *** ERROR: unknown command 'endcommand'\r\n",
            payload
        )
    }

    #[test]
    fn recognises_log_lines() {
        assert!(is_log_line("2020-01-01T00:00:00 1.000 INF Time: 0.00m"));
        assert!(is_log_line("2020-01-01T00:00:00 "));
        assert!(!is_log_line("2020-01-01T00:00:00"));
        assert!(!is_log_line("2020-01-01 00:00:00 INF"));
        assert!(!is_log_line("Day 7, 22:00"));
        assert!(!is_log_line(" 2020-01-01T00:00:00 INF"));
        assert!(!is_log_line(""));
    }

    #[test]
    fn keeps_only_command_output() {
        let raw = stream(
            "Day 7, 22:00\r\n\
             2024-05-01T10:00:01 12.400 INF Executing command 'gettime'\r\n\
             Blood moon tonight\r\n",
        );
        assert_eq!(
            frame(&raw, "startcommand", "endcommand"),
            "Day 7, 22:00\r\nBlood moon tonight"
        );
    }

    #[test]
    fn log_only_payload_is_empty() {
        let raw = stream(
            "2024-05-01T10:00:01 12.400 INF Executing command 'saveworld'\r\n\
             2024-05-01T10:00:02 13.000 INF World saved\r\n",
        );
        assert_eq!(frame(&raw, "startcommand", "endcommand"), "");
    }

    #[test]
    fn missing_start_echo_is_empty() {
        let raw = "Day 7, 22:00\r\n*** ERROR: unknown command 'endcommand'\r\n";
        assert_eq!(frame(raw, "startcommand", "endcommand"), "");
    }

    #[test]
    fn missing_end_echo_runs_to_end() {
        let raw = "*** ERROR: unknown command 'startcommand'\r\nline one\r\nline two\r\n";
        assert_eq!(frame(raw, "startcommand", "endcommand"), "line one\r\nline two");
    }

    #[test]
    fn plain_newlines() {
        let raw = "*** ERROR: unknown command 'startcommand'\nok\n\n*** ERROR: unknown command 'endcommand'\n";
        assert_eq!(frame(raw, "startcommand", "endcommand"), "ok");
    }
}
