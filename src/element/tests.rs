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

fn check_xml(element: &Element, expected: &str) {
    let xml = element.to_string();
    assert_eq!(xml, expected);
    // Verify that the capacity is measured correctly
    assert_eq!(xml.len(), xml.capacity());
    // Verify that the Display and to_string are same
    let xml2 = format!("{}", element);
    assert_eq!(xml2, expected);
}

#[test]
fn it_works() {
    let html = Element::new("html").with_child(
        Element::new("p").with_child(
            Element::new("b").with_child(Element::new("blink").with_text("lala")),
        ),
    );
    check_xml(&html, "<html><p><b><blink>lala</blink></b></p></html>");
}

#[test]
fn self_closing() {
    check_xml(&Element::new("presence"), "<presence/>");
    check_xml(
        &Element::new("x").with_attribute("xmlns", "http://jabber.org/protocol/muc"),
        "<x xmlns=\"http://jabber.org/protocol/muc\"/>",
    );
}

#[test]
fn text_after_children() {
    let element = Element::new("a")
        .with_text("tail")
        .with_child(Element::new("b"))
        .with_child(Element::new("c").with_text("x"));
    check_xml(&element, "<a><b/><c>x</c>tail</a>");
}

#[test]
fn escaping() {
    let element = Element::new("body")
        .with_attribute("title", "\"quoted\" & <tagged>")
        .with_text("1 < 2 && 'yes'");
    check_xml(
        &element,
        "<body title=\"&quot;quoted&quot; &amp; &lt;tagged&gt;\">1 &lt; 2 &amp;&amp; &apos;yes&apos;</body>",
    );
}

#[test]
fn attributes() {
    let mut a = Element::new("a");
    assert!(a.insert_attribute("i", "1").is_ok());
    assert_eq!(
        a.insert_attribute("i", "1"),
        Err(ElementError::DuplicateAttribute("i".to_string()))
    );
    assert!(a.insert_attribute("j", "2").is_ok());
    a.set_attribute("k", Some("3"));
    check_xml(&a, "<a i=\"1\" j=\"2\" k=\"3\"/>");

    {
        let mut iter = a.attributes();
        assert_eq!(iter.next(), Some(("i", "1")));
        assert_eq!(iter.next(), Some(("j", "2")));
        assert_eq!(iter.next(), Some(("k", "3")));
        assert_eq!(iter.next(), None);
    }

    a.set_attribute("i", Some("9"));
    a.set_attribute("j", None);
    a.set_attribute("x", None);
    check_xml(&a, "<a i=\"9\" k=\"3\"/>");
    assert_eq!(a.attribute("i"), Some("9"));
    assert_eq!(a.attribute("j"), None);
}

#[test]
fn names() {
    let features = Element::new("stream:features").with_namespace("http://etherx.jabber.org/streams");
    assert_eq!(features.name(), "stream:features");
    assert_eq!(features.tag(), "features");
    assert_eq!(features.prefix(), Some("stream"));
    assert_eq!(features.namespace(), "http://etherx.jabber.org/streams");

    let message = Element::new("message");
    assert_eq!(message.tag(), "message");
    assert_eq!(message.prefix(), None);
    assert_eq!(message.namespace(), "");
}

#[test]
fn navigation() {
    let iq = Element::new("iq").with_child(
        Element::new("bind")
            .with_child(Element::new("jid").with_text("bot@example.com/bot")),
    );
    let jid = iq
        .find_child("bind")
        .and_then(|bind| bind.find_child("jid"))
        .map(|jid| jid.text());
    assert_eq!(jid, Some("bot@example.com/bot"));
    assert!(iq.find_child("session").is_none());
    assert_eq!(iq.children().len(), 1);
    assert_eq!(iq.into_children()[0].tag(), "bind");
}

#[test]
fn pretty() {
    let element = Element::new("message")
        .with_attribute("to", "a@b")
        .with_child(Element::new("body").with_text("hi"))
        .with_child(Element::new("active"));
    assert_eq!(
        element.pretty().to_string(),
        concat!(
            "<message to=\"a@b\">\n",
            "    <body>\n",
            "        hi\n",
            "    </body>\n",
            "    <active/>\n",
            "</message>\n",
        )
    );
    assert_eq!(Element::new("show").pretty().to_string(), "<show/>\n");
}
