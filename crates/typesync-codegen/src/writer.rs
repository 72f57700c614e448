use typesync_core::Result;

const INDENT: &str = "    ";

/// Indentation-aware text buffer for declaration output.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    depth: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation. Empty text writes a bare newline.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Write `header {`, the indented body, then `}`.
    pub fn in_brace<F>(&mut self, header: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.in_block(&format!("{} {{", header), "}", body)
    }

    /// Write `open`, the indented body, then `close`.
    pub fn in_block<F>(&mut self, open: &str, close: &str, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.line(open);
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        self.line(close);
        result
    }

    /// Write comma-separated lines, without a trailing comma on the last.
    pub fn comma_lines<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = String>,
    {
        let items: Vec<String> = items.into_iter().collect();
        let last = items.len().saturating_sub(1);
        for (i, item) in items.into_iter().enumerate() {
            if i == last {
                self.line(item);
            } else {
                self.line(format!("{},", item));
            }
        }
    }

    /// Write a doc comment if one is present.
    pub fn doc(&mut self, doc: Option<&str>) {
        let Some(doc) = doc.map(str::trim).filter(|d| !d.is_empty()) else {
            return;
        };
        if doc.contains('\n') {
            self.line("/**");
            for line in doc.lines() {
                self.line(format!(" * {}", line.trim()));
            }
            self.line(" */");
        } else {
            self.line(format!("/** {} */", doc));
        }
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}
