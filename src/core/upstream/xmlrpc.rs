//! Minimal XML-RPC codec for the legacy protocol
//!
//! Covers the value types the upstream emits: `int`/`i4`/`i8`, `boolean`,
//! `double`, `string`, `nil`, `array`, `struct`, `dateTime.iso8601` and
//! `base64` (both kept as strings), and untyped values.

use super::types::{FieldValue, Record};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum XmlRpcError {
    #[error("invalid XML: {0}")]
    Xml(String),

    #[error("unexpected element: expected {expected}, found {found}")]
    Unexpected { expected: String, found: String },

    #[error("invalid {kind} value: {value}")]
    InvalidScalar { kind: &'static str, value: String },

    #[error("unexpected end of document")]
    Eof,
}

/// Decoded method response
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(FieldValue),
    Fault { code: i64, message: String },
}

/// Serialize a method call
pub fn encode_call(method: &str, params: &[FieldValue]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        encode_value(param, &mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn encode_value(value: &FieldValue, out: &mut String) {
    out.push_str("<value>");
    match value {
        FieldValue::Null => out.push_str("<nil/>"),
        FieldValue::Bool(b) => {
            out.push_str("<boolean>");
            out.push(if *b { '1' } else { '0' });
            out.push_str("</boolean>");
        }
        FieldValue::Int(i) => {
            if i32::try_from(*i).is_ok() {
                out.push_str(&format!("<int>{}</int>", i));
            } else {
                out.push_str(&format!("<i8>{}</i8>", i));
            }
        }
        FieldValue::Float(f) => out.push_str(&format!("<double>{}</double>", f)),
        FieldValue::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        FieldValue::List(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(item, out);
            }
            out.push_str("</data></array>");
        }
        FieldValue::Map(map) => {
            out.push_str("<struct>");
            for (name, member) in map {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                encode_value(member, out);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open(String),
    Close(String),
    Empty(String),
    Text(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Open(name) => format!("<{}>", name),
            Token::Close(name) => format!("</{}>", name),
            Token::Empty(name) => format!("<{}/>", name),
            Token::Text(_) => "text".to_string(),
        }
    }
}

fn tokenize(xml: &str) -> Result<Vec<Token>, XmlRpcError> {
    let mut reader = Reader::from_str(xml);
    let mut tokens = Vec::new();
    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlRpcError::Xml(e.to_string()))?;
        match event {
            Event::Start(e) => {
                tokens.push(Token::Open(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ));
            }
            Event::End(e) => {
                tokens.push(Token::Close(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ));
            }
            Event::Empty(e) => {
                tokens.push(Token::Empty(
                    String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                ));
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| XmlRpcError::Xml(e.to_string()))?;
                push_text(&mut tokens, &text);
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                push_text(&mut tokens, &String::from_utf8_lossy(&raw));
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(tokens)
}

// Adjacent text and CDATA runs form one text node
fn push_text(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Text(existing)) = tokens.last_mut() {
        existing.push_str(text);
    } else {
        tokens.push(Token::Text(text.to_string()));
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn skip_whitespace(&mut self) {
        while let Some(Token::Text(text)) = self.tokens.get(self.pos) {
            if !text.trim().is_empty() {
                break;
            }
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Token, XmlRpcError> {
        let token = self.tokens.get(self.pos).cloned().ok_or(XmlRpcError::Eof)?;
        self.pos += 1;
        Ok(token)
    }

    fn next_structural(&mut self) -> Result<Token, XmlRpcError> {
        self.skip_whitespace();
        self.next_token()
    }

    fn peek_structural(&mut self) -> Option<&Token> {
        self.skip_whitespace();
        self.tokens.get(self.pos)
    }

    fn expect_open(&mut self, name: &str) -> Result<(), XmlRpcError> {
        match self.next_structural()? {
            Token::Open(found) if found == name => Ok(()),
            other => Err(XmlRpcError::Unexpected {
                expected: format!("<{}>", name),
                found: other.describe(),
            }),
        }
    }

    fn expect_close(&mut self, name: &str) -> Result<(), XmlRpcError> {
        match self.next_structural()? {
            Token::Close(found) if found == name => Ok(()),
            other => Err(XmlRpcError::Unexpected {
                expected: format!("</{}>", name),
                found: other.describe(),
            }),
        }
    }

    /// Raw text up to the closing tag, whitespace preserved
    fn text_until_close(&mut self, name: &str) -> Result<String, XmlRpcError> {
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => text.push_str(&t),
                Token::Close(found) if found == name => return Ok(text),
                other => {
                    return Err(XmlRpcError::Unexpected {
                        expected: format!("</{}>", name),
                        found: other.describe(),
                    });
                }
            }
        }
    }

    fn parse_method_response(&mut self) -> Result<MethodResponse, XmlRpcError> {
        self.expect_open("methodResponse")?;
        let response = match self.next_structural()? {
            Token::Open(tag) if tag == "params" => {
                self.expect_open("param")?;
                self.expect_open("value")?;
                let value = self.parse_value()?;
                self.expect_close("param")?;
                self.expect_close("params")?;
                MethodResponse::Success(value)
            }
            Token::Open(tag) if tag == "fault" => {
                self.expect_open("value")?;
                let value = self.parse_value()?;
                self.expect_close("fault")?;
                fault_from_value(value)
            }
            other => {
                return Err(XmlRpcError::Unexpected {
                    expected: "<params> or <fault>".to_string(),
                    found: other.describe(),
                });
            }
        };
        self.expect_close("methodResponse")?;
        Ok(response)
    }

    /// Parse the content of a `<value>` whose opening tag was consumed
    fn parse_value(&mut self) -> Result<FieldValue, XmlRpcError> {
        match self.next_token()? {
            Token::Close(tag) if tag == "value" => return Ok(FieldValue::String(String::new())),
            Token::Text(text) => {
                // Untyped value, or whitespace before a typed one
                match self.next_token()? {
                    Token::Close(tag) if tag == "value" => return Ok(FieldValue::String(text)),
                    Token::Open(tag) if text.trim().is_empty() => {
                        let value = self.parse_typed(&tag)?;
                        self.expect_close("value")?;
                        return Ok(value);
                    }
                    Token::Empty(tag) if text.trim().is_empty() => {
                        let value = empty_typed(&tag)?;
                        self.expect_close("value")?;
                        return Ok(value);
                    }
                    other => {
                        return Err(XmlRpcError::Unexpected {
                            expected: "</value>".to_string(),
                            found: other.describe(),
                        });
                    }
                }
            }
            Token::Open(tag) => {
                let value = self.parse_typed(&tag)?;
                self.expect_close("value")?;
                Ok(value)
            }
            Token::Empty(tag) => {
                let value = empty_typed(&tag)?;
                self.expect_close("value")?;
                Ok(value)
            }
            other => Err(XmlRpcError::Unexpected {
                expected: "value content".to_string(),
                found: other.describe(),
            }),
        }
    }

    /// Parse a typed element whose opening tag was consumed
    fn parse_typed(&mut self, tag: &str) -> Result<FieldValue, XmlRpcError> {
        match tag {
            "string" | "dateTime.iso8601" | "base64" => {
                Ok(FieldValue::String(self.text_until_close(tag)?))
            }
            "int" | "i4" | "i8" => {
                let text = self.text_until_close(tag)?;
                text.trim()
                    .parse::<i64>()
                    .map(FieldValue::Int)
                    .map_err(|_| XmlRpcError::InvalidScalar {
                        kind: "integer",
                        value: text,
                    })
            }
            "double" => {
                let text = self.text_until_close(tag)?;
                text.trim()
                    .parse::<f64>()
                    .map(FieldValue::Float)
                    .map_err(|_| XmlRpcError::InvalidScalar {
                        kind: "double",
                        value: text,
                    })
            }
            "boolean" => {
                let text = self.text_until_close(tag)?;
                match text.trim() {
                    "1" | "true" => Ok(FieldValue::Bool(true)),
                    "0" | "false" => Ok(FieldValue::Bool(false)),
                    _ => Err(XmlRpcError::InvalidScalar {
                        kind: "boolean",
                        value: text,
                    }),
                }
            }
            "nil" => {
                self.expect_close("nil")?;
                Ok(FieldValue::Null)
            }
            "array" => self.parse_array(),
            "struct" => self.parse_struct(),
            other => Err(XmlRpcError::Unexpected {
                expected: "value type".to_string(),
                found: format!("<{}>", other),
            }),
        }
    }

    fn parse_array(&mut self) -> Result<FieldValue, XmlRpcError> {
        let mut items = Vec::new();
        match self.next_structural()? {
            Token::Empty(tag) if tag == "data" => {}
            Token::Open(tag) if tag == "data" => loop {
                match self.next_structural()? {
                    Token::Open(tag) if tag == "value" => items.push(self.parse_value()?),
                    Token::Close(tag) if tag == "data" => break,
                    other => {
                        return Err(XmlRpcError::Unexpected {
                            expected: "<value> or </data>".to_string(),
                            found: other.describe(),
                        });
                    }
                }
            },
            other => {
                return Err(XmlRpcError::Unexpected {
                    expected: "<data>".to_string(),
                    found: other.describe(),
                });
            }
        }
        self.expect_close("array")?;
        Ok(FieldValue::List(items))
    }

    fn parse_struct(&mut self) -> Result<FieldValue, XmlRpcError> {
        let mut map = Record::new();
        loop {
            match self.next_structural()? {
                Token::Open(tag) if tag == "member" => {
                    self.expect_open("name")?;
                    let name = self.text_until_close("name")?;
                    self.expect_open("value")?;
                    let value = self.parse_value()?;
                    self.expect_close("member")?;
                    map.insert(name, value);
                }
                Token::Close(tag) if tag == "struct" => break,
                other => {
                    return Err(XmlRpcError::Unexpected {
                        expected: "<member> or </struct>".to_string(),
                        found: other.describe(),
                    });
                }
            }
        }
        Ok(FieldValue::Map(map))
    }
}

fn empty_typed(tag: &str) -> Result<FieldValue, XmlRpcError> {
    match tag {
        "nil" => Ok(FieldValue::Null),
        "string" | "dateTime.iso8601" | "base64" => Ok(FieldValue::String(String::new())),
        "array" => Ok(FieldValue::List(Vec::new())),
        "struct" => Ok(FieldValue::Map(Record::new())),
        other => Err(XmlRpcError::Unexpected {
            expected: "value type".to_string(),
            found: format!("<{}/>", other),
        }),
    }
}

fn fault_from_value(value: FieldValue) -> MethodResponse {
    let code = value
        .as_map()
        .and_then(|m| m.get("faultCode"))
        .and_then(FieldValue::as_i64)
        .unwrap_or_default();
    let message = value
        .as_map()
        .and_then(|m| m.get("faultString"))
        .and_then(FieldValue::as_str)
        .unwrap_or("unknown fault")
        .to_string();
    MethodResponse::Fault { code, message }
}

/// Parse a `methodResponse` document
pub fn decode_response(xml: &str) -> Result<MethodResponse, XmlRpcError> {
    let mut parser = Parser::new(tokenize(xml)?);
    let response = parser.parse_method_response()?;
    if let Some(trailing) = parser.peek_structural() {
        return Err(XmlRpcError::Unexpected {
            expected: "end of document".to_string(),
            found: trailing.describe(),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_call_shapes_params() {
        let mut kwargs = Record::new();
        kwargs.insert("limit".to_string(), FieldValue::Int(5));
        let xml = encode_call(
            "execute_kw",
            &[
                FieldValue::from("db"),
                FieldValue::Int(2),
                FieldValue::List(vec![FieldValue::Bool(true), FieldValue::Null]),
                FieldValue::Map(kwargs),
            ],
        );

        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("<methodName>execute_kw</methodName>"));
        assert!(xml.contains("<param><value><string>db</string></value></param>"));
        assert!(xml.contains("<value><int>2</int></value>"));
        assert!(xml.contains(
            "<array><data><value><boolean>1</boolean></value><value><nil/></value></data></array>"
        ));
        assert!(xml.contains("<member><name>limit</name><value><int>5</int></value></member>"));
    }

    #[test]
    fn test_encode_escapes_markup_and_wide_ints() {
        let xml = encode_call(
            "m",
            &[FieldValue::from("a < b & c"), FieldValue::Int(1 << 40)],
        );
        assert!(xml.contains("<string>a &lt; b &amp; c</string>"));
        assert!(xml.contains("<i8>1099511627776</i8>"));
    }

    #[test]
    fn test_decode_scalar_response() {
        let xml = r#"<?xml version='1.0'?>
<methodResponse>
<params>
<param>
<value><int>7</int></value>
</param>
</params>
</methodResponse>"#;
        assert_eq!(
            decode_response(xml).unwrap(),
            MethodResponse::Success(FieldValue::Int(7))
        );
    }

    #[test]
    fn test_decode_nested_records() {
        let xml = r#"<?xml version='1.0'?>
<methodResponse><params><param><value><array><data>
<value><struct>
<member><name>id</name><value><int>1</int></value></member>
<member><name>name</name><value><string> Azure &amp; Co </string></value></member>
<member><name>active</name><value><boolean>1</boolean></value></member>
<member><name>parent_id</name><value><boolean>0</boolean></value></member>
<member><name>ratio</name><value><double>0.5</double></value></member>
<member><name>ref</name><value>plain</value></member>
<member><name>tags</name><value><array><data/></array></value></member>
</struct></value>
</data></array></value></param></params></methodResponse>"#;

        let MethodResponse::Success(FieldValue::List(rows)) = decode_response(xml).unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(rows.len(), 1);
        let row = rows[0].as_map().unwrap();
        assert_eq!(row["id"], FieldValue::Int(1));
        assert_eq!(row["name"], FieldValue::from(" Azure & Co "));
        assert_eq!(row["active"], FieldValue::Bool(true));
        assert_eq!(row["parent_id"], FieldValue::Bool(false));
        assert_eq!(row["ratio"], FieldValue::Float(0.5));
        assert_eq!(row["ref"], FieldValue::from("plain"));
        assert_eq!(row["tags"], FieldValue::List(vec![]));
    }

    #[test]
    fn test_decode_fault() {
        let xml = r#"<?xml version='1.0'?>
<methodResponse><fault><value><struct>
<member><name>faultCode</name><value><int>1</int></value></member>
<member><name>faultString</name><value><string>Object res.nothing doesn't exist</string></value></member>
</struct></value></fault></methodResponse>"#;

        assert_eq!(
            decode_response(xml).unwrap(),
            MethodResponse::Fault {
                code: 1,
                message: "Object res.nothing doesn't exist".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_nil_and_empty_value() {
        let xml = "<methodResponse><params><param><value><nil/></value></param></params></methodResponse>";
        assert_eq!(
            decode_response(xml).unwrap(),
            MethodResponse::Success(FieldValue::Null)
        );

        let xml = "<methodResponse><params><param><value></value></param></params></methodResponse>";
        assert_eq!(
            decode_response(xml).unwrap(),
            MethodResponse::Success(FieldValue::String(String::new()))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_response("<html><body>Not Found</body></html>").is_err());
        assert!(decode_response("").is_err());
        assert!(matches!(
            decode_response(
                "<methodResponse><params><param><value><int>x</int></value></param></params></methodResponse>"
            ),
            Err(XmlRpcError::InvalidScalar { kind: "integer", .. })
        ));
    }
}
