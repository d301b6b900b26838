//! Flattening of SRU `searchRetrieve` responses into [`Record`]s.
//!
//! Gallica answers with Dublin Core records wrapped in an SRU envelope. The
//! response is walked as a stream of XML events: `numberOfRecords` gives the
//! total, every `dc:*` element inside a `record` becomes a field, and a
//! diagnostic `message` turns into a search error.

use super::SearchPage;
use super::record::Record;
use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Element whose text is being collected.
enum Capture {
    Total,
    Message,
    Field(String),
}

/// Split a qualified name into its prefix and local part.
fn split_name(name: &[u8]) -> (Option<&[u8]>, &[u8]) {
    match name.iter().position(|b| *b == b':') {
        Some(i) => (Some(&name[..i]), &name[i + 1..]),
        None => (None, name),
    }
}

/// Parse a complete `searchRetrieve` response.
pub fn parse_response(xml: &str) -> Result<SearchPage> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut total: Option<String> = None;
    let mut message: Option<String> = None;
    let mut records = Vec::new();
    let mut record: Option<Record> = None;
    let mut capture: Option<Capture> = None;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::Parse(format!("malformed SRU response: {}", e)))?;
        match event {
            Event::Start(e) => {
                let name = e.name();
                let (prefix, local) = split_name(name.as_ref());
                text.clear();
                capture = match local {
                    b"numberOfRecords" => Some(Capture::Total),
                    b"message" => Some(Capture::Message),
                    b"record" => {
                        record = Some(Record::default());
                        None
                    }
                    _ if prefix == Some(b"dc".as_slice()) && record.is_some() => Some(
                        Capture::Field(String::from_utf8_lossy(local).into_owned()),
                    ),
                    _ => None,
                };
            }
            Event::Text(t) if capture.is_some() => match t.unescape() {
                Ok(s) => text.push_str(&s),
                Err(_) => text.push_str(&String::from_utf8_lossy(&t)),
            },
            Event::CData(c) if capture.is_some() => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Event::End(e) => {
                let value = text.trim().to_string();
                text.clear();
                match capture.take() {
                    Some(Capture::Total) => total = Some(value),
                    Some(Capture::Message) => {
                        message.get_or_insert(value);
                    }
                    Some(Capture::Field(name)) => {
                        if let Some(r) = record.as_mut().filter(|_| !value.is_empty()) {
                            r.add_field(&name, value);
                        }
                    }
                    None => {
                        if split_name(e.name().as_ref()).1 == b"record" {
                            if let Some(mut r) = record.take() {
                                r.url = r.canonical_url_from_identifiers();
                                records.push(r);
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let Some(total) = total.filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
    else {
        return match message {
            Some(m) => Err(Error::Search(m)),
            None => Err(Error::Parse("missing numberOfRecords".to_string())),
        };
    };

    Ok(SearchPage {
        records,
        total_count: total,
    })
}
