//! Line and field tokenizer.
//!
//! Text is split on `\n` into lines and each line on `,` into fields. There is
//! no quoting or unescaping: a quote is an ordinary character and every comma
//! is a delimiter.

/// Separator between fields of one line.
pub const FIELD_DELIMITER: char = ',';

/// Separator between lines.
pub const LINE_DELIMITER: char = '\n';

/// One tokenized line of CSV text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line: usize,
    fields: Vec<String>,
}

impl Row {
    /// Tokenize `text` as the given 1-based source line.
    pub fn from_line(line: usize, text: &str) -> Self {
        Self {
            line,
            fields: split_fields(text),
        }
    }

    /// Build a row from already separated fields.
    pub fn from_fields(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// 1-based line number this row came from.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `index`, if the row is long enough.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Join the fields back into one comma-separated line (no terminator).
    pub fn to_line(&self) -> String {
        self.fields.join(",")
    }
}

/// Split one line into fields.
///
/// A trailing comma ends the last field instead of starting an empty one, so
/// an empty line has no fields and `a,` has one.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = line.split(FIELD_DELIMITER).map(str::to_string).collect();
    if fields.last().is_some_and(String::is_empty) {
        fields.pop();
    }
    fields
}

/// CSV text split into its header and the remaining data lines.
#[derive(Debug, Clone)]
pub struct CsvText<'a> {
    header: Vec<String>,
    body: &'a str,
}

impl<'a> CsvText<'a> {
    /// Separate the header line from the data lines.
    ///
    /// Text without any line break is a header with no data rows.
    pub fn parse(text: &'a str) -> Self {
        let (header, body) = text.split_once(LINE_DELIMITER).unwrap_or((text, ""));
        Self {
            header: split_fields(header),
            body,
        }
    }

    /// Header column names in their original order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Tokenized data rows, numbered from line 2.
    ///
    /// A single trailing line break ends the last row rather than starting an
    /// empty one. Empty lines elsewhere are rows with no fields.
    pub fn rows(&self) -> impl Iterator<Item = Row> + 'a {
        let body = self.body;
        let lines = if body.is_empty() {
            None
        } else {
            let body = body.strip_suffix(LINE_DELIMITER).unwrap_or(body);
            Some(body.split(LINE_DELIMITER))
        };
        lines
            .into_iter()
            .flatten()
            .enumerate()
            .map(|(i, line)| Row::from_line(i + 2, line))
    }
}
