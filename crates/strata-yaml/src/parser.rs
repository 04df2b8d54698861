//! YAML parser that builds comment-carrying token trees.

use crate::comments::CommentSink;
use crate::{Document, Error, MapEntry, Result, SourceInfo, TokenValue, YamlToken, scalar_to_string};
use yaml_rust2::Yaml;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::Marker;

/// Parse a single YAML document from a string.
///
/// Returns a [`Document`] whose `root` is `None` when the input is empty or
/// contains only whitespace and comments.
///
/// # Errors
///
/// Returns [`Error::Parse`] when the underlying grammar is malformed.
pub fn parse(content: &str) -> Result<Document> {
    parse_impl(content, None)
}

/// Parse a single YAML document, tagging every node's source location with
/// the given filename.
pub fn parse_file(content: &str, filename: &str) -> Result<Document> {
    parse_impl(content, Some(filename))
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<Document> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = TokenBuilder::new(filename);

    // false = single document only
    parser.load(&mut builder, false).map_err(Error::from)?;

    let mut sink = CommentSink::new(content);
    let comments = sink.take_document_comments();
    let root = builder.root.map(|mut token| {
        attach_comments(&mut token, &mut sink);
        token
    });

    Ok(Document { root, comments })
}

/// Builder that implements MarkedEventReceiver to construct the token tree.
struct TokenBuilder {
    filename: Option<String>,

    /// Stack of containers being constructed.
    stack: Vec<BuildNode>,

    /// The completed root node.
    root: Option<YamlToken>,
}

/// A container node being constructed during parsing.
enum BuildNode {
    Sequence {
        start_marker: Marker,
        items: Vec<YamlToken>,
    },
    Mapping {
        start_marker: Marker,
        entries: Vec<(YamlToken, Option<YamlToken>)>,
    },
}

impl TokenBuilder {
    fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(|s| s.to_string()),
            stack: Vec::new(),
            root: None,
        }
    }

    fn push_complete(&mut self, token: YamlToken) {
        let Some(parent) = self.stack.last_mut() else {
            self.root = Some(token);
            return;
        };

        match parent {
            BuildNode::Sequence { items, .. } => items.push(token),
            BuildNode::Mapping { entries, .. } => match entries.last_mut() {
                Some((_, value @ None)) => *value = Some(token),
                _ => entries.push((token, None)),
            },
        }
    }

    fn make_source_info(&self, marker: &Marker) -> SourceInfo {
        let mut info = SourceInfo::from_marker(marker);
        if let Some(ref filename) = self.filename {
            info = info.with_file(filename.clone());
        }
        info
    }
}

impl MarkedEventReceiver for TokenBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(value, _style, _anchor_id, _tag) => {
                let token = YamlToken {
                    value: TokenValue::Scalar(parse_scalar_value(&value)),
                    source: self.make_source_info(&marker),
                    comments: Vec::new(),
                };
                self.push_complete(token);
            }

            Event::SequenceStart(_anchor_id, _tag) => {
                self.stack.push(BuildNode::Sequence {
                    start_marker: marker,
                    items: Vec::new(),
                });
            }

            Event::SequenceEnd => {
                let Some(BuildNode::Sequence { start_marker, items }) = self.stack.pop() else {
                    panic!("SequenceEnd without SequenceStart");
                };
                let token = YamlToken {
                    value: TokenValue::Sequence(items),
                    source: self.make_source_info(&start_marker),
                    comments: Vec::new(),
                };
                self.push_complete(token);
            }

            Event::MappingStart(_anchor_id, _tag) => {
                self.stack.push(BuildNode::Mapping {
                    start_marker: marker,
                    entries: Vec::new(),
                });
            }

            Event::MappingEnd => {
                let Some(BuildNode::Mapping { start_marker, entries }) = self.stack.pop() else {
                    panic!("MappingEnd without MappingStart");
                };

                let map_entries = entries
                    .into_iter()
                    .map(|(key, value)| {
                        let value = value.expect("mapping entry without value");
                        let key_text = key
                            .as_scalar()
                            .map(scalar_to_string)
                            .unwrap_or_default();
                        MapEntry {
                            key: key_text,
                            key_source: key.source,
                            value,
                        }
                    })
                    .collect();

                let token = YamlToken {
                    value: TokenValue::Mapping(map_entries),
                    source: self.make_source_info(&start_marker),
                    comments: Vec::new(),
                };
                self.push_complete(token);
            }

            Event::Alias(_anchor_id) => {
                // Anchors/aliases are not supported; an alias reads as null.
                let token = YamlToken {
                    value: TokenValue::Scalar(Yaml::Null),
                    source: self.make_source_info(&marker),
                    comments: Vec::new(),
                };
                self.push_complete(token);
            }
        }
    }
}

/// Walk the tree in document order, claiming the comment run above each node.
///
/// For a mapping entry, comments above the key line are attributed to the
/// entry's value, prepended before any comments the value claims itself.
fn attach_comments(token: &mut YamlToken, sink: &mut CommentSink) {
    match &mut token.value {
        TokenValue::Mapping(entries) => {
            for entry in entries.iter_mut() {
                let mut run = sink.take_before(entry.key_source.line);
                attach_comments(&mut entry.value, sink);
                run.append(&mut entry.value.comments);
                entry.value.comments = run;
            }
        }
        TokenValue::Sequence(items) => {
            for item in items.iter_mut() {
                let run = sink.take_before(item.source.line);
                attach_comments(item, sink);
                let mut merged = run;
                merged.append(&mut item.comments);
                item.comments = merged;
            }
        }
        TokenValue::Scalar(_) => {
            token.comments = sink.take_before(token.source.line);
        }
    }
}

/// Infer a typed scalar from its string form: integers, floats, booleans,
/// null, then string.
fn parse_scalar_value(value: &str) -> Yaml {
    if let Ok(i) = value.parse::<i64>() {
        return Yaml::Integer(i);
    }

    if value.parse::<f64>().is_ok() {
        return Yaml::Real(value.to_string());
    }

    match value {
        "true" | "True" | "TRUE" => return Yaml::Boolean(true),
        "false" | "False" | "FALSE" => return Yaml::Boolean(false),
        "null" | "Null" | "NULL" | "~" | "" => return Yaml::Null,
        _ => {}
    }

    Yaml::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        let doc = parse("hello").unwrap();
        let root = doc.root.unwrap();
        assert!(root.is_scalar());
        assert_eq!(root.as_scalar().unwrap().as_str(), Some("hello"));
    }

    #[test]
    fn test_parse_typed_scalars() {
        assert_eq!(
            parse("42").unwrap().root.unwrap().as_scalar().unwrap().as_i64(),
            Some(42)
        );
        assert_eq!(
            parse("true").unwrap().root.unwrap().as_scalar().unwrap().as_bool(),
            Some(true)
        );
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(parse("").unwrap().root.is_none());
        assert!(parse("   \n  \n").unwrap().root.is_none());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse("key: [unclosed").is_err());
    }

    #[test]
    fn test_parse_mapping() {
        let doc = parse("host: web01\nport: 8080").unwrap();
        let root = doc.root.unwrap();
        assert!(root.is_mapping());
        assert_eq!(root.len(), 2);
        assert_eq!(
            root.get("host").unwrap().as_scalar().unwrap().as_str(),
            Some("web01")
        );
        assert_eq!(
            root.get("port").unwrap().as_scalar().unwrap().as_i64(),
            Some(8080)
        );
    }

    #[test]
    fn test_nested_structure() {
        let doc = parse(
            r#"
app:
  name: frontend
  hosts:
    - alpha
    - beta
"#,
        )
        .unwrap();
        let root = doc.root.unwrap();

        let app = root.get("app").unwrap();
        assert!(app.is_mapping());

        let hosts = app.get("hosts").unwrap();
        assert!(hosts.is_sequence());
        assert_eq!(hosts.len(), 2);
    }

    #[test]
    fn test_line_numbers_are_exact() {
        // Comment attribution keys on exact line numbers, so an off-by-one
        // here silently detaches every comment run.
        let doc = parse("a: 1\nb: 2\nc: 3").unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.get("a").unwrap().source.line, 1);
        assert_eq!(root.get("b").unwrap().source.line, 2);
        assert_eq!(root.get("c").unwrap().source.line, 3);
    }

    #[test]
    fn test_source_positions() {
        let doc = parse_file("host: web01\nport: 8080", "nodes/web01.yml").unwrap();
        let root = doc.root.unwrap();

        let port = root.get("port").unwrap();
        assert_eq!(port.source.line, 2);
        assert_eq!(port.source.file.as_deref(), Some("nodes/web01.yml"));
    }

    #[test]
    fn test_comment_attached_to_entry_value() {
        let doc = parse("# the bind port\nport: 8080").unwrap();
        let root = doc.root.unwrap();
        let port = root.get("port").unwrap();
        assert_eq!(port.comments, vec!["the bind port".to_string()]);
    }

    #[test]
    fn test_comment_run_attributed_once() {
        let doc = parse("# one\n# two\na: 1\nb: 2").unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.get("a").unwrap().comments, vec!["one", "two"]);
        assert!(root.get("b").unwrap().comments.is_empty());
    }

    #[test]
    fn test_nested_comments() {
        let doc = parse(
            "# about app\napp:\n  # about the port\n  port: 8080\n",
        )
        .unwrap();
        let root = doc.root.unwrap();
        let app = root.get("app").unwrap();
        assert_eq!(app.comments, vec!["about app"]);
        assert_eq!(app.get("port").unwrap().comments, vec!["about the port"]);
    }

    #[test]
    fn test_sequence_item_comments() {
        let doc = parse("items:\n  # first\n  - a\n  - b\n").unwrap();
        let root = doc.root.unwrap();
        let items = root.get("items").unwrap().as_sequence().unwrap();
        assert_eq!(items[0].comments, vec!["first"]);
        assert!(items[1].comments.is_empty());
    }

    #[test]
    fn test_document_comments() {
        let doc = parse("# documents the file\n\nkey: value\n").unwrap();
        assert_eq!(doc.comments, vec!["documents the file"]);
        // Not also claimed by the first entry.
        assert!(doc.root.unwrap().get("key").unwrap().comments.is_empty());
    }

    #[test]
    fn test_leading_comment_without_blank_goes_to_first_node() {
        let doc = parse("# belongs to key\nkey: value\n").unwrap();
        assert!(doc.comments.is_empty());
        assert_eq!(
            doc.root.unwrap().get("key").unwrap().comments,
            vec!["belongs to key"]
        );
    }
}
