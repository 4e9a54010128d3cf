use crate::error::{DecodeError, Error};
use crate::model::{Channel, Enclosure, Image, Item};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes an RSS 2.0 document into a [`Channel`].
///
/// Elements are matched by their full name, so `atom:link` never lands in
/// `link`. Unknown elements are skipped together with everything inside
/// them, missing ones leave the zero value in place. Only syntax problems
/// fail the decode.
pub fn from_reader<R: Read>(r: R) -> Result<Channel, Error> {
    let mut buf_rd = BufReader::new(r);
    let head = buf_rd.fill_buf().map_err(Error::transport)?;
    if head.starts_with(UTF8_BOM) {
        buf_rd.consume(UTF8_BOM.len());
    }
    decode(buf_rd)
}

fn decode<R: BufRead>(input: R) -> Result<Channel, Error> {
    // text is trimmed once a field is complete, not per event
    let mut reader = Reader::from_reader(input);

    let mut binder = Binder::default();
    let mut buf = Vec::new();

    loop {
        let step = match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => binder.start(&e),
            Ok(Event::Empty(e)) => binder.empty(&e),
            Ok(Event::End(_)) => {
                binder.end();
                Ok(())
            }
            Ok(Event::Text(e)) => e.unescape().map(|t| binder.text(&t)),
            Ok(Event::CData(e)) => reader
                .decoder()
                .decode(&e)
                .map(|t| binder.text(&t))
                .map_err(quick_xml::Error::from),
            Ok(Event::Decl(d)) => check_declaration(&d),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        };
        step.map_err(|e| xml_error(&reader, e))?;
        buf.clear();
    }

    let channel = binder.finish()?;
    log::debug!(
        "decoded channel {:?} with {} items",
        channel.title,
        channel.items.len()
    );
    Ok(channel)
}

// a read failure mid-document is the stream's fault, not the document's
fn xml_error<R>(reader: &Reader<R>, e: quick_xml::Error) -> Error {
    match e {
        quick_xml::Error::Io(io) => Error::transport(io),
        source => DecodeError::Xml {
            position: reader.buffer_position() as u64,
            source,
        }
        .into(),
    }
}

fn check_declaration(decl: &BytesDecl) -> quick_xml::Result<()> {
    decl.version()?;
    if let Some(encoding) = decl.encoding() {
        let encoding = encoding.map_err(quick_xml::Error::from)?;
        let label = String::from_utf8_lossy(&encoding);
        if !label.eq_ignore_ascii_case("utf-8")
            && !label.eq_ignore_ascii_case("utf8")
            && !label.eq_ignore_ascii_case("us-ascii")
        {
            log::warn!("feed declares encoding {}, reading it as utf-8", label);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParseState {
    Root,
    Channel,
    Image,
    SkipDays,
    SkipHours,
    Item,
    Enclosure,
    // leaf whose text belongs to the enclosing entity
    Field,
    Ignored,
}

impl ParseState {
    fn child(self, name: &[u8]) -> ParseState {
        match (self, name) {
            (ParseState::Root, b"channel") => ParseState::Channel,
            (ParseState::Channel, b"image") => ParseState::Image,
            (ParseState::Channel, b"skipDays") => ParseState::SkipDays,
            (ParseState::Channel, b"skipHours") => ParseState::SkipHours,
            (ParseState::Channel, b"item") => ParseState::Item,
            (ParseState::Item, b"enclosure") => ParseState::Enclosure,
            (ParseState::Root, _) | (ParseState::Field, _) | (ParseState::Ignored, _) => {
                ParseState::Ignored
            }
            _ => ParseState::Field,
        }
    }
}

struct Frame {
    state: ParseState,
    name: Vec<u8>,
}

#[derive(Default)]
struct Binder {
    channel: Channel,
    stack: Vec<Frame>,
    text: String,
    seen_root: bool,
}

impl Binder {
    fn start(&mut self, e: &BytesStart) -> quick_xml::Result<()> {
        let state = self.enter(e)?;
        if state == ParseState::Field {
            self.text.clear();
        }
        self.stack.push(Frame {
            state,
            name: e.name().as_ref().to_vec(),
        });
        Ok(())
    }

    fn empty(&mut self, e: &BytesStart) -> quick_xml::Result<()> {
        if self.enter(e)? == ParseState::Field {
            self.bind(e.name().as_ref(), String::new());
        }
        Ok(())
    }

    fn enter(&mut self, e: &BytesStart) -> quick_xml::Result<ParseState> {
        let state = match self.stack.last() {
            Some(parent) => parent.state.child(e.name().as_ref()),
            None => {
                self.seen_root = true;
                ParseState::Root
            }
        };
        match state {
            ParseState::Item => self.channel.items.push(Item::default()),
            ParseState::Enclosure => {
                if let Some(item) = self.channel.items.last_mut() {
                    read_enclosure_attrs(e, &mut item.enclosure)?;
                }
            }
            _ => {}
        }
        Ok(state)
    }

    fn text(&mut self, t: &str) {
        if let Some(Frame {
            state: ParseState::Field,
            ..
        }) = self.stack.last()
        {
            self.text.push_str(t);
        }
    }

    fn end(&mut self) {
        if let Some(frame) = self.stack.pop() {
            if frame.state == ParseState::Field {
                let text = self.text.trim().to_string();
                self.text.clear();
                self.bind(&frame.name, text);
            }
        }
    }

    // binds a leaf to the entity currently on top of the stack
    fn bind(&mut self, name: &[u8], text: String) {
        let parent = match self.stack.last() {
            Some(frame) => frame.state,
            None => return,
        };
        let channel = &mut self.channel;
        match parent {
            ParseState::Channel => bind_channel(channel, name, text),
            ParseState::Image => bind_image(&mut channel.image, name, text),
            ParseState::SkipDays => {
                if name == b"day" {
                    channel.skip_days.days.push(text);
                }
            }
            ParseState::SkipHours => {
                if name == b"hour" {
                    match text.parse::<i32>() {
                        Ok(hour) => channel.skip_hours.hours.push(hour),
                        Err(_) => log::debug!("skipping non-numeric <hour> {:?}", text),
                    }
                }
            }
            ParseState::Item => {
                if let Some(item) = channel.items.last_mut() {
                    bind_item(item, name, text);
                }
            }
            ParseState::Enclosure => {
                if let Some(item) = channel.items.last_mut() {
                    bind_enclosure(&mut item.enclosure, name, text);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Result<Channel, DecodeError> {
        if let Some(open) = self.stack.last() {
            return Err(DecodeError::Truncated(
                String::from_utf8_lossy(&open.name).into_owned(),
            ));
        }
        if !self.seen_root {
            return Err(DecodeError::Empty);
        }
        Ok(self.channel)
    }
}

fn bind_channel(c: &mut Channel, name: &[u8], text: String) {
    match name {
        b"title" => c.title = text,
        b"link" => c.link = text,
        b"description" => c.description = text,
        b"language" => c.language = text,
        b"pubDate" => c.pub_date = text,
        b"lastBuildDate" => c.last_build_date = text,
        b"category" => c.categories.push(text),
        b"copyright" => c.copyright = text,
        b"managingEditor" => c.managing_editor = text,
        b"webMaster" => c.web_master = text,
        b"generator" => c.generator = text,
        b"docs" => c.docs = text,
        b"ttl" => c.ttl = number("ttl", &text),
        b"rating" => c.rating = text,
        _ => {}
    }
}

fn bind_image(img: &mut Image, name: &[u8], text: String) {
    match name {
        b"url" => img.url = text,
        b"title" => img.title = text,
        b"link" => img.link = text,
        b"width" => img.width = number("width", &text),
        b"height" => img.height = number("height", &text),
        _ => {}
    }
}

fn bind_item(item: &mut Item, name: &[u8], text: String) {
    match name {
        b"guid" => item.guid = text,
        b"title" => item.title = text,
        b"link" => item.link = text,
        b"description" => item.description = text,
        b"author" => item.author = text,
        b"category" => item.categories.push(text),
        b"comments" => item.comments = text,
        b"pubDate" => item.pub_date = text,
        b"source" => item.source = text,
        _ => {}
    }
}

fn bind_enclosure(enc: &mut Enclosure, name: &[u8], text: String) {
    match name {
        b"url" => enc.url = text,
        b"length" => enc.length = number("length", &text),
        b"type" => enc.mime_type = text,
        _ => {}
    }
}

fn read_enclosure_attrs(e: &BytesStart, enc: &mut Enclosure) -> quick_xml::Result<()> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let value = attr.unescape_value()?;
        let value = value.trim();
        match attr.key.as_ref() {
            b"url" => enc.url = value.to_string(),
            b"length" => enc.length = number("length", value),
            b"type" => enc.mime_type = value.to_string(),
            _ => {}
        }
    }
    Ok(())
}

fn number<T: FromStr + Default>(field: &str, text: &str) -> T {
    match text.trim().parse() {
        Ok(n) => n,
        Err(_) => {
            if !text.is_empty() {
                log::debug!("non-numeric <{}> {:?}, using 0", field, text);
            }
            T::default()
        }
    }
}
