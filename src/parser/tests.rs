/*
** This file is a part of Jabbot (minimal XMPP client)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Jabbot is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

use super::*;

fn pop_element(parser: &mut StanzaParser) -> Element {
    match parser.pop() {
        Some(StreamElement::Element(element)) => element,
        other => panic!("element expected, got {other:?}"),
    }
}

fn parse_all(text: &str) -> Vec<StreamElement> {
    let mut parser = StanzaParser::new();
    parser.feed(text).unwrap();
    let mut items = Vec::new();
    while let Some(item) = parser.pop() {
        items.push(item);
    }
    items
}

fn check_splits(text: &str) {
    let expected = parse_all(text);
    assert!(!expected.is_empty());
    for (pos, _) in text.char_indices().skip(1) {
        let mut parser = StanzaParser::new();
        parser.feed(&text[..pos]).unwrap();
        parser.feed(&text[pos..]).unwrap();
        let mut items = Vec::new();
        while let Some(item) = parser.pop() {
            items.push(item);
        }
        assert_eq!(items, expected, "split at {pos}");
    }
}

#[test]
fn empty_input() {
    let mut parser = StanzaParser::new();
    assert_eq!(parser.feed(""), Ok(()));
    assert_eq!(parser.len(), 0);
    parser.feed("<a/>").unwrap();
    assert_eq!(parser.feed(""), Ok(()));
    assert_eq!(parser.len(), 1);
    assert_eq!(parser.feed_bytes(b""), Ok(()));
    assert_eq!(parser.len(), 1);
}

#[test]
fn simple() {
    let mut parser = StanzaParser::new();
    parser.feed("<simple></simple>").unwrap();
    assert_eq!(parser.len(), 1);
    assert_eq!(pop_element(&mut parser).tag(), "simple");
    assert!(parser.is_empty());

    parser.feed("<simple/>").unwrap();
    assert_eq!(pop_element(&mut parser).to_string(), "<simple/>");
}

#[test]
fn simple_with_text() {
    let mut parser = StanzaParser::new();
    parser.feed("<simple>this is some Text</simple>").unwrap();
    assert_eq!(pop_element(&mut parser).text(), "this is some Text");
}

#[test]
fn attributes() {
    let mut parser = StanzaParser::new();
    parser.feed("<simple x='bingo' y=\"bongo\"/>").unwrap();
    let element = pop_element(&mut parser);
    assert_eq!(element.attributes().count(), 2);
    assert_eq!(element.attribute("x"), Some("bingo"));
    assert_eq!(element.attribute("y"), Some("bongo"));

    let mut parser = StanzaParser::new();
    assert_eq!(
        parser.feed("<a x='1' x='2'/>"),
        Err(ParseError::BadXml(description::TAG_DUPLICATE_ATTRIBUTE))
    );
}

#[test]
fn incremental() {
    let mut parser = StanzaParser::new();
    assert_eq!(parser.feed("<simp"), Ok(()));
    assert_eq!(parser.len(), 0);
    parser.feed("le></simple>").unwrap();
    assert_eq!(parser.len(), 1);
    assert_eq!(pop_element(&mut parser).tag(), "simple");
}

#[test]
fn nested() {
    let mut parser = StanzaParser::new();
    parser.feed("<parent><child/><child/><child/></parent>").unwrap();
    assert_eq!(parser.len(), 1);
    let parent = pop_element(&mut parser);
    assert_eq!(parent.tag(), "parent");
    assert_eq!(parent.children().len(), 3);
}

#[test]
fn children_in_source_order() {
    let mut parser = StanzaParser::new();
    parser.feed("<p><a/><b>x</b><c k='v'/></p>").unwrap();
    let p = pop_element(&mut parser);
    let tags: Vec<&str> = p.children().iter().map(|c| c.tag()).collect();
    assert_eq!(tags, ["a", "b", "c"]);
}

#[test]
fn nested_incremental() {
    let mut parser = StanzaParser::new();
    parser.feed("<parent><chil").unwrap();
    parser.feed("d/><child/></parent><second>").unwrap();
    assert_eq!(parser.len(), 1);
    let parent = pop_element(&mut parser);
    assert_eq!(parent.children().len(), 2);

    parser.feed("</second>").unwrap();
    assert_eq!(parser.len(), 1);
    assert_eq!(pop_element(&mut parser).tag(), "second");
}

#[test]
fn open_tags_across_chunks() {
    let mut split = StanzaParser::new();
    split.feed("<a><b>").unwrap();
    assert_eq!(split.len(), 0);
    split.feed("</b></a>").unwrap();
    assert_eq!(split.len(), 1);

    let mut whole = StanzaParser::new();
    whole.feed("<a><b></b></a>").unwrap();
    let a = pop_element(&mut split);
    assert_eq!(a, pop_element(&mut whole));
    assert_eq!(a.tag(), "a");
    assert_eq!(a.children().len(), 1);
    assert_eq!(a.children()[0].tag(), "b");
}

#[test]
fn every_split_point() {
    check_splits("<message from='a@b/c' to='d@e'><body>Hi &amp; bye</body><x xmlns='jabber:x:data'/></message>");
    check_splits("<iq type='result' id='id0'><bind xmlns='urn:ietf:params:xml:ns:xmpp-bind'><jid>bot@localhost/bot</jid></bind></iq>");
    check_splits("<a><![CDATA[<raw>]]><!-- note --><b>çığ</b></a><c/>");
}

#[test]
fn byte_splits() {
    let text = "<body>Grüße, 世界</body>";
    let bytes = text.as_bytes();
    for pos in 1..bytes.len() {
        let mut parser = StanzaParser::new();
        parser.feed_bytes(&bytes[..pos]).unwrap();
        parser.feed_bytes(&bytes[pos..]).unwrap();
        assert_eq!(pop_element(&mut parser).text(), "Grüße, 世界", "split at {pos}");
    }

    let mut parser = StanzaParser::new();
    assert_eq!(
        parser.feed_bytes(b"<a>\xff</a>"),
        Err(ParseError::BadXml(description::UTF8_INVALID))
    );
}

#[test]
fn text_runs_are_concatenated() {
    let mut parser = StanzaParser::new();
    parser.feed("<a>one<b/>two<c/>three</a>").unwrap();
    let a = pop_element(&mut parser);
    assert_eq!(a.text(), "onetwothree");
    assert_eq!(a.to_string(), "<a><b/><c/>onetwothree</a>");
}

#[test]
fn mismatched_tags() {
    let mut parser = StanzaParser::new();
    assert_eq!(
        parser.feed("<this>xml</invalid>"),
        Err(ParseError::BadXml(description::TAG_MISMATCH))
    );
    assert_eq!(parser.len(), 0);

    let mut parser = StanzaParser::new();
    assert_eq!(
        parser.feed("<a></b>"),
        Err(ParseError::BadXml(description::TAG_MISMATCH))
    );
    assert_eq!(parser.len(), 0);
    // Unusable afterwards
    assert_eq!(parser.feed("<a/>"), Err(ParseError::NeedsReset));
    assert_eq!(parser.feed(""), Ok(()));
    parser.reset();
    assert_eq!(parser.feed("<a/>"), Ok(()));
    assert_eq!(parser.len(), 1);
}

#[test]
fn unexpected_end_tag() {
    let mut parser = StanzaParser::new();
    assert_eq!(
        parser.feed("</message>"),
        Err(ParseError::BadXml(description::TAG_UNEXPECTED_END))
    );
}

#[test]
fn stanzas_before_error_are_kept() {
    let mut parser = StanzaParser::new();
    assert!(parser.feed("<a/><b>x</c>").is_err());
    assert_eq!(parser.len(), 1);
    assert_eq!(pop_element(&mut parser).tag(), "a");
    assert_eq!(parser.location().bytes, "<a/><b>x</c>".len());
}

#[test]
fn start_stream() {
    let mut parser = StanzaParser::new();
    parser
        .feed(concat!(
            "<?xml version='1.0'?>",
            "<stream:stream xmlns:stream='http://etherx.jabber.org/streams' ",
            "version='1.0' from='localhost' ",
            "id='f57d29c0-acca-4eae-899c-f147e7287415' ",
            "xml:lang='en' xmlns='jabber:client'>",
            "<stream:features>",
            "<mechanisms xmlns='urn:ietf:params:xml:ns:xmpp-sasl'>",
            "<mechanism>PLAIN</mechanism>",
            "<mechanism>SCRAM-SHA-1</mechanism>",
            "</mechanisms>",
            "<auth xmlns='http://jabber.org/features/iq-auth'/>",
            "</stream:features>",
        ))
        .unwrap();
    assert_eq!(parser.len(), 2);

    let stream = pop_element(&mut parser);
    assert_eq!(stream.name(), "stream:stream");
    assert_eq!(stream.tag(), "stream");
    assert_eq!(stream.namespace(), "http://etherx.jabber.org/streams");
    assert_eq!(stream.attribute("xml:lang"), Some("en"));
    assert!(stream.children().is_empty());

    let features = pop_element(&mut parser);
    assert_eq!(features.tag(), "features");
    assert_eq!(features.namespace(), "http://etherx.jabber.org/streams");
    let mechanisms = features.find_child("mechanisms").unwrap();
    assert_eq!(mechanisms.namespace(), "urn:ietf:params:xml:ns:xmpp-sasl");
    assert_eq!(mechanisms.children()[0].text(), "PLAIN");
    assert_eq!(mechanisms.children()[0].namespace(), "urn:ietf:params:xml:ns:xmpp-sasl");
}

#[test]
fn stream_open_across_chunks() {
    let text = "<?xml version='1.0'?><stream:stream xmlns='jabber:client' xmlns:stream='http://etherx.jabber.org/streams'><message><body>hi</body></message>";
    for pos in 1..text.len() {
        let mut parser = StanzaParser::new();
        parser.feed(&text[..pos]).unwrap();
        parser.feed(&text[pos..]).unwrap();
        assert_eq!(parser.len(), 2, "split at {pos}");
        assert_eq!(pop_element(&mut parser).tag(), "stream");
        let message = pop_element(&mut parser);
        assert_eq!(message.namespace(), "jabber:client");
    }
}

#[test]
fn stream_end() {
    let items = parse_all("<stream:stream xmlns:stream='http://etherx.jabber.org/streams'><a/>\n</stream:stream>");
    assert_eq!(items.len(), 3);
    assert_eq!(items[2], StreamElement::End);
}

#[test]
fn whitespace_between_stanzas() {
    let mut parser = StanzaParser::new();
    parser.feed("<a/>\n  <b/>\n ").unwrap();
    parser.feed(" <c/>").unwrap();
    assert_eq!(parser.len(), 3);
    for tag in ["a", "b", "c"] {
        assert_eq!(pop_element(&mut parser).tag(), tag);
    }
}

#[test]
fn undeclared_prefix() {
    let mut parser = StanzaParser::new();
    parser.feed("<foo:bar/>").unwrap();
    let element = pop_element(&mut parser);
    assert_eq!(element.tag(), "bar");
    assert_eq!(element.namespace(), "foo");
}

#[test]
fn location() {
    let mut parser = StanzaParser::new();
    parser.feed("<a/>\n<b/>\n<c").unwrap();
    let location = parser.location();
    assert_eq!(location.bytes, 10);
    assert_eq!(location.lines, 2);
    assert_eq!(location.column, 0);
}
