/// Scrollback panel data shared by the terminal front end and the headless monitor.
///
/// Entries are plain data; colouring and layout are left to the frontend.
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

pub const DEFAULT_SCROLLBACK: usize = 1000;

/// Severity of an info panel entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => "Info: ",
            LogLevel::Warning => "Warning: ",
            LogLevel::Error => "Error: ",
        }
    }
}

/// A line of the info panel.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.level.prefix(), self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rx,
    Tx,
}

/// A chunk of traffic shown in the messages panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEntry {
    pub timestamp: DateTime<Local>,
    pub direction: Direction,
    pub data: Vec<u8>,
}

impl MessageEntry {
    pub fn new(direction: Direction, data: impl Into<Vec<u8>>) -> Self {
        Self {
            timestamp: Local::now(),
            direction,
            data: data.into(),
        }
    }

    pub fn render(&self, mode: DisplayMode) -> String {
        mode.render(&self.data)
    }
}

/// How traffic bytes are turned into panel text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Text,
    Hex,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Text => DisplayMode::Hex,
            DisplayMode::Hex => DisplayMode::Text,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::Text => "text",
            DisplayMode::Hex => "hex",
        }
    }

    pub fn render(self, data: &[u8]) -> String {
        match self {
            DisplayMode::Text => printable_text(data),
            DisplayMode::Hex => data
                .iter()
                .map(|b| format!("{b:02X}"))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Lossy UTF-8 with every control byte but tab shown as its control picture,
/// so CR/LF stay visible inside a single panel line.
fn printable_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .chars()
        .map(|c| match c {
            '\t' => c,
            '\u{0}'..='\u{1f}' => char::from_u32(0x2400 + c as u32).unwrap_or('.'),
            '\u{7f}' => '\u{2421}',
            c if c.is_control() => '.',
            c => c,
        })
        .collect()
}

/// How the message line is turned into bytes before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Ascii,
    Hex,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::Ascii => InputMode::Hex,
            InputMode::Hex => InputMode::Ascii,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputMode::Ascii => "ascii",
            InputMode::Hex => "hex",
        }
    }
}

/// Terminator appended to ASCII lines on send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    None,
    Lf,
    Cr,
    CrLf,
}

impl LineEnding {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            LineEnding::None => b"",
            LineEnding::Lf => b"\n",
            LineEnding::Cr => b"\r",
            LineEnding::CrLf => b"\r\n",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LineEnding::None => "none",
            LineEnding::Lf => "LF",
            LineEnding::Cr => "CR",
            LineEnding::CrLf => "CRLF",
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            LineEnding::None => LineEnding::Lf,
            LineEnding::Lf => LineEnding::Cr,
            LineEnding::Cr => LineEnding::CrLf,
            LineEnding::CrLf => LineEnding::None,
        }
    }
}

impl std::str::FromStr for LineEnding {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(LineEnding::None),
            "lf" | "\\n" => Ok(LineEnding::Lf),
            "cr" | "\\r" => Ok(LineEnding::Cr),
            "crlf" | "\\r\\n" => Ok(LineEnding::CrLf),
            _ => Err(anyhow::anyhow!(
                "invalid line ending '{s}', expected none, lf, cr or crlf"
            )),
        }
    }
}

/// Parse hex payload string into bytes
pub fn parse_hex_payload(data: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    let mut current = String::new();

    for ch in data.chars() {
        if ch.is_ascii_hexdigit() {
            current.push(ch);
            if current.len() == 2 {
                if let Ok(value) = u8::from_str_radix(&current, 16) {
                    bytes.push(value);
                }
                current.clear();
            }
        } else {
            current.clear();
        }
    }

    bytes
}

/// Turn a typed line into the bytes written to the port.
///
/// Returns `None` when a hex line contains no complete byte.
pub fn encode_line(line: &str, mode: InputMode, ending: LineEnding) -> Option<Vec<u8>> {
    match mode {
        InputMode::Ascii => {
            let mut out = line.as_bytes().to_vec();
            out.extend_from_slice(ending.bytes());
            Some(out)
        }
        InputMode::Hex => Some(parse_hex_payload(line)).filter(|bytes| !bytes.is_empty()),
    }
}

/// Bounded scrollback with a view offset counted in entries from the bottom.
#[derive(Debug, Clone)]
pub struct Scrollback<T> {
    entries: VecDeque<T>,
    capacity: usize,
    offset: usize,
}

impl<T> Default for Scrollback<T> {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SCROLLBACK)
    }
}

impl<T> Scrollback<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            offset: 0,
        }
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push_back(entry);
        // Keep the lines being read in place while scrolled back, also when
        // the oldest entry is evicted.
        if self.offset > 0 {
            self.offset += 1;
        }
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.offset = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn max_offset(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = (self.offset + lines).min(self.max_offset());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = 0;
    }

    /// The `height` entries ending `offset` entries above the newest one.
    pub fn visible(&self, height: usize) -> impl Iterator<Item = &T> {
        let end = self.entries.len().saturating_sub(self.offset);
        let start = end.saturating_sub(height);
        self.entries.range(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrollback_evicts_oldest() {
        let mut sb = Scrollback::with_capacity(3);
        for i in 0..5 {
            sb.push(i);
        }
        assert_eq!(sb.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn scrolled_view_stays_put_when_lines_arrive() {
        let mut sb = Scrollback::with_capacity(100);
        for i in 0..10 {
            sb.push(i);
        }
        sb.scroll_up(4);
        assert_eq!(sb.visible(2).copied().collect::<Vec<_>>(), vec![4, 5]);
        sb.push(10);
        assert_eq!(sb.visible(2).copied().collect::<Vec<_>>(), vec![4, 5]);
        sb.scroll_to_bottom();
        assert_eq!(sb.visible(2).copied().collect::<Vec<_>>(), vec![9, 10]);
    }

    #[test]
    fn scrolled_view_stays_put_in_a_full_buffer() {
        let mut sb = Scrollback::with_capacity(10);
        for i in 0..10 {
            sb.push(i);
        }
        sb.scroll_up(4);
        assert_eq!(sb.visible(2).copied().collect::<Vec<_>>(), vec![4, 5]);
        sb.push(10);
        sb.push(11);
        assert_eq!(sb.len(), 10);
        assert_eq!(sb.visible(2).copied().collect::<Vec<_>>(), vec![4, 5]);

        // Once the lines being read are evicted the view pins to the oldest entry.
        for i in 12..20 {
            sb.push(i);
        }
        assert_eq!(sb.visible(2).copied().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn scroll_is_clamped() {
        let mut sb = Scrollback::with_capacity(10);
        sb.push("a");
        sb.push("b");
        sb.scroll_up(50);
        assert_eq!(sb.offset(), 1);
        assert_eq!(sb.visible(5).copied().collect::<Vec<_>>(), vec!["a"]);
        sb.scroll_down(50);
        assert_eq!(sb.offset(), 0);
        sb.clear();
        assert!(sb.is_empty());
        assert_eq!(sb.visible(5).count(), 0);
    }

    #[test]
    fn log_entries_carry_level_prefix() {
        let entry = LogEntry::new(LogLevel::Error, "No available com port found!");
        assert_eq!(entry.to_string(), "Error: No available com port found!");
    }

    #[test]
    fn display_modes() {
        let data = b"ok\x07\r\n";
        assert_eq!(DisplayMode::Text.render(data), "ok\u{2407}\u{240D}\u{240A}");
        assert_eq!(DisplayMode::Hex.render(data), "6F 6B 07 0D 0A");
        assert_eq!(DisplayMode::Text.render(b"a\tb\x7f"), "a\tb\u{2421}");
    }

    #[test]
    fn multi_line_chunk_keeps_its_breaks_visible() {
        assert_eq!(
            DisplayMode::Text.render(b"line1\nline2\r\n"),
            "line1\u{240A}line2\u{240D}\u{240A}"
        );
    }

    #[test]
    fn encodes_lines() {
        assert_eq!(
            encode_line("AT", InputMode::Ascii, LineEnding::CrLf),
            Some(b"AT\r\n".to_vec())
        );
        assert_eq!(
            encode_line("01 03 ff", InputMode::Hex, LineEnding::Lf),
            Some(vec![0x01, 0x03, 0xff])
        );
        assert_eq!(encode_line("zz", InputMode::Hex, LineEnding::None), None);
        assert_eq!(
            encode_line("", InputMode::Ascii, LineEnding::None),
            Some(Vec::new())
        );
    }

    #[test]
    fn hex_parser_skips_broken_pairs() {
        assert_eq!(parse_hex_payload("0a b 1C"), vec![0x0a, 0x1c]);
    }
}
