/// One journaling event in its parsed form. The wire format is four
/// `|`-delimited segments: `HH:MM | type | k:v,k:v | message`. A segment may
/// be empty but the delimiter count is fixed when composing; parsing degrades
/// gracefully when trailing segments are missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub time: String,
    pub kind: String,
    pub meta: Vec<(String, String)>,
    pub message: String,
}

pub const DEFAULT_KIND: &str = "log";

impl LogLine {
    pub fn new(
        time: impl Into<String>,
        kind: impl Into<String>,
        meta: Vec<(String, String)>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            time: time.into(),
            kind: kind.into(),
            meta,
            message: message.into(),
        }
    }

    /// Parses a stored line. Uses at most 4 splits so that a `|` inside the
    /// message stays part of the message.
    pub fn parse(raw: &str) -> LogLine {
        let mut segments = raw.splitn(4, '|');

        let time = segments.next().unwrap_or("").trim().to_string();
        let kind = match segments.next().map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => DEFAULT_KIND.to_string(),
        };
        let meta_segment = segments.next().map(str::trim).unwrap_or("");
        let message = segments.next().map(str::trim).unwrap_or("").to_string();

        let meta = parse_meta(meta_segment);

        LogLine {
            time,
            kind,
            meta,
            message,
        }
    }

    /// Renders the line in its four-segment wire format.
    pub fn compose(&self) -> String {
        let meta = self
            .meta
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} | {} | {} | {}", self.time, self.kind, meta, self.message)
    }

    pub fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_meta(segment: &str) -> Vec<(String, String)> {
    if segment.is_empty() {
        return vec![];
    }
    segment
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, ':');
            let key = parts.next().unwrap_or("").trim().to_string();
            let value = parts.next().unwrap_or("").trim().to_string();
            (key, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::LogLine;

    #[test]
    fn parse_full_line() {
        let line = LogLine::parse("10:30 | mood | what:tired, actions:none | Happy");
        assert_eq!(line.time, "10:30");
        assert_eq!(line.kind, "mood");
        assert_eq!(
            line.meta,
            vec![
                ("what".to_string(), "tired".to_string()),
                ("actions".to_string(), "none".to_string())
            ]
        );
        assert_eq!(line.message, "Happy");
    }

    #[test]
    fn parse_missing_trailing_segments() {
        let line = LogLine::parse("10:30 | note");
        assert_eq!(line.time, "10:30");
        assert_eq!(line.kind, "note");
        assert!(line.meta.is_empty());
        assert_eq!(line.message, "");
    }

    #[test]
    fn parse_defaults_kind_when_absent() {
        let line = LogLine::parse("10:30");
        assert_eq!(line.kind, "log");
    }

    #[test]
    fn parse_keeps_pipes_inside_message() {
        let line = LogLine::parse("10:30 | chat | user:me | left | right");
        assert_eq!(line.message, "left | right");
    }

    #[test]
    fn compose_round_trips() {
        let line = LogLine::new(
            "09:15",
            "decision",
            vec![
                ("mood".to_string(), "Focused".to_string()),
                ("context".to_string(), "morning".to_string()),
            ],
            "Ship the draft",
        );
        let raw = line.compose();
        assert_eq!(
            raw,
            "09:15 | decision | mood:Focused, context:morning | Ship the draft"
        );
        assert_eq!(LogLine::parse(&raw), line);
    }

    #[test]
    fn compose_keeps_delimiter_count_with_empty_segments() {
        let line = LogLine::new("09:15", "log", vec![], "");
        assert_eq!(line.compose(), "09:15 | log |  | ");
        assert_eq!(line.compose().matches('|').count(), 3);
    }
}
