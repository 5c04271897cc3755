//! Source positions for document fields.
//!
//! YAML parsers in the serde ecosystem discard positions once a value is
//! built, so [`SourceMap`] recovers them with a line scan over the original
//! text. It understands block mappings and block sequences, the style brand
//! files are written in. Values inside flow collections (`{a: 1}`, `[a, b]`)
//! and block scalars are not indexed individually; lookups for them fall back
//! to the nearest indexed ancestor.
//!
//! Paths use dots between mapping keys and brackets for sequence items:
//!
//! ```text
//! color.palette.blue
//! typography.fonts[0].files[1].path
//! ```

use std::collections::HashMap;
use std::fmt;

/// A position in source text. `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset from the start of the text.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Appends a mapping key to a field path.
pub fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Appends a sequence index to a field path.
pub fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

/// Field path to source span index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    spans: HashMap<String, Vec<Span>>,
}

#[derive(Debug)]
enum FrameKind {
    Key,
    Item,
}

#[derive(Debug)]
struct Frame {
    indent: usize,
    path: String,
    kind: FrameKind,
    next_index: usize,
}

impl SourceMap {
    /// Builds the index for `text`.
    pub fn scan(text: &str) -> Self {
        let mut map = SourceMap::default();
        let mut stack: Vec<Frame> = Vec::new();
        let mut root_next_index = 0usize;
        // Lines more indented than this belong to a block scalar.
        let mut block_scalar_indent: Option<usize> = None;
        let mut offset = 0usize;

        for (line_no, raw_line) in text.split_inclusive('\n').enumerate() {
            let line_start = offset;
            offset += raw_line.len();
            let line = raw_line.trim_end_matches(['\n', '\r']);

            let indent = line.len() - line.trim_start_matches(' ').len();
            let content = &line[indent..];

            if let Some(block) = block_scalar_indent {
                if content.is_empty() || indent > block {
                    continue;
                }
                block_scalar_indent = None;
            }

            if content.is_empty()
                || content.starts_with('#')
                || content.starts_with("---")
                || content.starts_with("...")
            {
                continue;
            }

            let mut indent = indent;
            let mut content = content;

            // Sequence items; `- - x` nests one level per dash.
            while let Some(rest) = strip_dash(content) {
                while stack.last().is_some_and(|f| {
                    f.indent > indent || (f.indent == indent && matches!(f.kind, FrameKind::Item))
                }) {
                    stack.pop();
                }
                let (parent_path, index) = match stack.last_mut() {
                    Some(frame) => {
                        let index = frame.next_index;
                        frame.next_index += 1;
                        (frame.path.clone(), index)
                    }
                    None => {
                        let index = root_next_index;
                        root_next_index += 1;
                        (String::new(), index)
                    }
                };
                let path = index_path(&parent_path, index);
                map.record(
                    &path,
                    Span {
                        offset: line_start + indent,
                        line: line_no + 1,
                        column: indent + 1,
                    },
                );
                stack.push(Frame {
                    indent,
                    path,
                    kind: FrameKind::Item,
                    next_index: 0,
                });

                let skipped = content.len() - rest.len();
                indent += skipped;
                content = rest;
            }

            let Some((key, value)) = split_key(content) else {
                continue;
            };

            while stack.last().is_some_and(|f| f.indent >= indent) {
                stack.pop();
            }
            let parent = stack.last().map(|f| f.path.as_str()).unwrap_or("");
            let path = child_path(parent, &key);
            map.record(
                &path,
                Span {
                    offset: line_start + indent,
                    line: line_no + 1,
                    column: indent + 1,
                },
            );

            let value = value.trim();
            if value.starts_with('|') || value.starts_with('>') {
                block_scalar_indent = Some(indent);
            }
            stack.push(Frame {
                indent,
                path,
                kind: FrameKind::Key,
                next_index: 0,
            });
        }

        map
    }

    fn record(&mut self, path: &str, span: Span) {
        self.spans.entry(path.to_string()).or_default().push(span);
    }

    /// Span of the first occurrence of `path`, or of its nearest indexed
    /// ancestor.
    pub fn lookup(&self, path: &str) -> Option<Span> {
        self.lookup_nth(path, 0)
    }

    /// Span of the `n`th occurrence of `path` (duplicate keys record one span
    /// each), falling back to ancestors when `path` is not indexed.
    pub fn lookup_nth(&self, path: &str, n: usize) -> Option<Span> {
        if let Some(spans) = self.spans.get(path) {
            return spans.get(n).or_else(|| spans.first()).copied();
        }
        let mut current = path;
        while let Some(parent) = parent_path(current) {
            if let Some(span) = self.spans.get(parent).and_then(|s| s.first()) {
                return Some(*span);
            }
            current = parent;
        }
        None
    }

    /// Number of indexed paths.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    let cut = path.rfind(['.', '[']).unwrap_or(0);
    Some(&path[..cut])
}

fn strip_dash(content: &str) -> Option<&str> {
    if content == "-" {
        return Some("");
    }
    let rest = content.strip_prefix("- ")?;
    Some(rest.trim_start_matches(' '))
}

/// Splits `key: value` into the unquoted key and the raw value text.
fn split_key(content: &str) -> Option<(String, &str)> {
    let first = content.chars().next()?;
    if first == '"' || first == '\'' {
        let close = content[1..].find(first)? + 1;
        let key = content[1..close].to_string();
        let rest = content[close + 1..].trim_start();
        let value = rest.strip_prefix(':')?;
        if !value.is_empty() && !value.starts_with(' ') {
            return None;
        }
        return Some((key, value));
    }
    if matches!(first, '{' | '[' | '|' | '>' | '&' | '*' | '!' | '%' | '@' | '`') {
        return None;
    }

    let bytes = content.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && i > 0 && bytes[i - 1] == b' ' {
            return None;
        }
        if b == b':' && (i + 1 == bytes.len() || bytes[i + 1] == b' ') {
            let key = content[..i].trim_end();
            if key.is_empty() {
                return None;
            }
            return Some((key.to_string(), &content[i + 1..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
meta:
  name: Acme
color:
  palette:
    blue: \"#0085c3\"
  primary: blue
typography:
  fonts:
    - family: Open Sans
      source: google
    - family: Fira Code
      source: file
      files:
        - path: fira.woff2
";

    #[test]
    fn test_scan_mapping_paths() {
        let map = SourceMap::scan(DOC);
        assert_eq!(map.lookup("meta.name").unwrap().line, 2);
        assert_eq!(map.lookup("color.palette.blue").unwrap().line, 5);
        assert_eq!(map.lookup("color.palette.blue").unwrap().column, 5);
        assert_eq!(map.lookup("color.primary").unwrap().line, 6);
    }

    #[test]
    fn test_scan_sequence_paths() {
        let map = SourceMap::scan(DOC);
        assert_eq!(map.lookup("typography.fonts[0]").unwrap().line, 9);
        assert_eq!(map.lookup("typography.fonts[0].family").unwrap().line, 9);
        assert_eq!(map.lookup("typography.fonts[0].family").unwrap().column, 7);
        assert_eq!(map.lookup("typography.fonts[1].source").unwrap().line, 12);
        assert_eq!(
            map.lookup("typography.fonts[1].files[0].path").unwrap().line,
            14
        );
    }

    #[test]
    fn test_lookup_falls_back_to_ancestor() {
        let map = SourceMap::scan("color:\n  palette: {blue: '#00f'}\n");
        assert_eq!(map.lookup("color.palette.blue").unwrap().line, 2);
        assert!(map.lookup("meta.name").is_none());
    }

    #[test]
    fn test_duplicate_keys_keep_each_occurrence() {
        let map = SourceMap::scan("palette:\n  blue: '#00f'\n  blue: '#11f'\n");
        assert_eq!(map.lookup_nth("color.x", 0), None);
        assert_eq!(map.lookup_nth("palette.blue", 0).unwrap().line, 2);
        assert_eq!(map.lookup_nth("palette.blue", 1).unwrap().line, 3);
    }

    #[test]
    fn test_block_scalars_and_comments_are_skipped() {
        let text = "meta:\n  # comment: no\n  description: |\n    not: a key\n  name: Acme\n";
        let map = SourceMap::scan(text);
        assert!(map.spans.get("meta.not").is_none());
        assert_eq!(map.lookup("meta.name").unwrap().line, 5);
    }

    #[test]
    fn test_quoted_keys() {
        let map = SourceMap::scan("\"monospace-inline\":\n  family: Fira\n");
        assert_eq!(map.lookup("monospace-inline.family").unwrap().line, 2);
    }

    #[test]
    fn test_offsets_are_byte_positions() {
        let text = "a: 1\nbb:\n  c: 2\n";
        let map = SourceMap::scan(text);
        let span = map.lookup("bb.c").unwrap();
        assert_eq!(&text[span.offset..span.offset + 1], "c");
    }
}
