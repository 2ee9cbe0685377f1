/// Width of the rule closing a live stream block.
pub const RULE_WIDTH: usize = 77;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMarkers {
    pub ok: &'static str,
    pub fail: &'static str,
    pub done: &'static str,
    pub retry: &'static str,
    pub rule: String,
}

impl TextMarkers {
    pub fn unicode() -> Self {
        Self {
            ok: "✓",
            fail: "✗",
            done: "🏁",
            retry: "[Retrying...]",
            rule: "─".repeat(RULE_WIDTH),
        }
    }

    pub fn ascii() -> Self {
        Self {
            ok: "[OK]",
            fail: "[FAIL]",
            done: "[DONE]",
            retry: "[Retrying...]",
            rule: "-".repeat(RULE_WIDTH),
        }
    }
}

impl Default for TextMarkers {
    fn default() -> Self {
        Self::unicode()
    }
}
