//! Line-assembly scenarios: field order, quoting, styling.

use glint::{err, Attr, Level, Options, PrettyHandler, Record, Source, Styles};
use glint_testhelpers::TestSink;
use jiff::civil::date;
use jiff::SignedDuration;

fn plain() -> Options {
    Options::default().with_styles(Styles::plain())
}

fn handler(options: Options) -> (PrettyHandler<TestSink>, TestSink) {
    let sink = TestSink::new();
    (PrettyHandler::with_options(sink.clone(), options), sink)
}

#[test]
fn minimal_line_is_byte_exact() {
    let (handler, sink) = handler(plain());
    handler
        .handle(&Record::new(Level::INFO, "boot").with_attr(Attr::int("port", 8080)))
        .unwrap();
    assert_eq!(sink.contents(), "INF boot port=8080\n");
}

#[test]
fn time_renders_with_the_configured_format() {
    let (handler, sink) = handler(plain());
    let time = date(2024, 1, 15).at(10, 30, 0, 0).in_tz("UTC").unwrap();
    handler
        .handle(&Record::new(Level::INFO, "boot").with_time(time))
        .unwrap();
    assert_eq!(sink.contents(), "10:30:00 INF boot\n");
}

#[test]
fn zero_time_is_omitted_entirely() {
    let (handler, sink) = handler(plain());
    handler.handle(&Record::new(Level::INFO, "boot")).unwrap();
    assert_eq!(sink.contents(), "INF boot\n");
}

#[test]
fn known_levels_use_three_letter_tags() {
    let (handler, sink) = handler(plain().with_level(Level::DEBUG));
    for (level, tag) in [
        (Level::DEBUG, "DBG"),
        (Level::INFO, "INF"),
        (Level::WARN, "WRN"),
        (Level::ERROR, "ERR"),
    ] {
        sink.clear();
        handler.handle(&Record::new(level, "m")).unwrap();
        assert_eq!(sink.contents(), format!("{tag} m\n"));
    }
}

#[test]
fn custom_levels_render_their_display_form() {
    let (handler, sink) = handler(plain());
    handler.handle(&Record::new(Level::new(2), "m")).unwrap();
    assert_eq!(sink.contents(), "INFO+2 m\n");
}

#[test]
fn string_values_are_quoted() {
    let (handler, sink) = handler(plain());
    handler
        .handle(&Record::new(Level::INFO, "open").with_attr(Attr::str("path", "/tmp/a b")))
        .unwrap();
    assert_eq!(sink.contents(), "INF open path=\"/tmp/a b\"\n");
}

#[test]
fn scalar_kinds_render_unquoted() {
    let (handler, sink) = handler(plain());
    handler
        .handle(
            &Record::new(Level::INFO, "tick")
                .with_attr(Attr::duration("elapsed", SignedDuration::from_secs(3723)))
                .with_attr(Attr::float("ratio", 2.5))
                .with_attr(Attr::bool("ok", false)),
        )
        .unwrap();
    assert_eq!(sink.contents(), "INF tick elapsed=1h2m3s ratio=2.5 ok=false\n");
}

#[test]
fn group_keys_flatten_with_dots() {
    let (handler, sink) = handler(plain());
    handler
        .handle(&Record::new(Level::INFO, "req").with_attr(Attr::group(
            "req",
            vec![
                Attr::str("method", "GET"),
                Attr::group("peer", vec![Attr::int("port", 443)]),
            ],
        )))
        .unwrap();
    assert_eq!(sink.contents(), "INF req req.method=\"GET\" req.peer.port=443\n");
}

#[test]
fn empty_group_key_is_transparent() {
    let (handler, sink) = handler(plain());
    handler
        .handle(
            &Record::new(Level::INFO, "m").with_attr(Attr::group("", vec![Attr::int("a", 1)])),
        )
        .unwrap();
    assert_eq!(sink.contents(), "INF m a=1\n");
}

#[test]
fn empty_attrs_are_skipped() {
    let (handler, sink) = handler(plain());
    handler
        .handle(
            &Record::new(Level::INFO, "m")
                .with_attr(Attr::empty())
                .with_attr(Attr::int("a", 1))
                .with_attr(Attr::empty()),
        )
        .unwrap();
    assert_eq!(sink.contents(), "INF m a=1\n");
}

#[test]
fn source_renders_basename_and_line() {
    let (handler, sink) = handler(plain().with_source(true).without_source_link());
    let record = Record::new(Level::INFO, "boot").with_source(Source {
        file: "src/net/listen.rs".into(),
        line: 42,
    });
    handler.handle(&record).unwrap();
    assert_eq!(sink.contents(), "INF <listen.rs:42> boot\n");
}

#[test]
fn source_link_wraps_the_label_in_a_hyperlink() {
    let (handler, sink) = handler(plain().with_source(true));
    let record = Record::new(Level::INFO, "boot").with_source(Source {
        file: "src/net/listen.rs".into(),
        line: 42,
    });
    handler.handle(&record).unwrap();
    let out = sink.contents();
    assert!(out.contains("\u{1b}]8;;file://src/net/listen.rs\u{1b}\\<listen.rs:42>\u{1b}]8;;\u{1b}\\"));
}

#[test]
fn source_disabled_by_default() {
    let (handler, sink) = handler(plain());
    let record = Record::new(Level::INFO, "boot").with_source(Source {
        file: "src/net/listen.rs".into(),
        line: 42,
    });
    handler.handle(&record).unwrap();
    assert_eq!(sink.contents(), "INF boot\n");
}

#[test]
fn err_attr_keeps_its_own_style_under_any_bundle() {
    let (handler, sink) = handler(plain());
    handler
        .handle(&Record::new(Level::ERROR, "fail").with_attr(err(std::io::Error::other("boom"))))
        .unwrap();
    let out = sink.contents();
    assert!(out.contains("err="));
    assert!(out.contains("\"boom\""));
    // the error style applies even though the bundle is plain
    assert!(out.contains('\u{1b}'));
}

#[test]
fn plain_styles_emit_no_escapes() {
    let (handler, sink) = handler(plain());
    handler
        .handle(
            &Record::new(Level::WARN, "m")
                .with_attr(Attr::int("a", 1))
                .with_attr(Attr::group("g", vec![Attr::str("b", "x")])),
        )
        .unwrap();
    assert!(!sink.contents().contains('\u{1b}'));
}

#[test]
fn default_styles_emit_escapes() {
    let (handler, sink) = handler(Options::default());
    handler
        .handle(&Record::new(Level::INFO, "m").with_attr(Attr::int("a", 1)))
        .unwrap();
    assert!(sink.contents().contains('\u{1b}'));
}

#[test]
fn multi_line_output_snapshot() {
    let (handler, sink) = handler(plain());
    let api = handler.with_attrs(vec![Attr::str("region", "eu-1")]);
    api.handle(&Record::new(Level::INFO, "boot")).unwrap();
    api.handle(
        &Record::new(Level::WARN, "degraded")
            .with_attr(Attr::duration("retry_in", SignedDuration::from_secs(5))),
    )
    .unwrap();
    insta::assert_snapshot!(sink.contents(), @r#"
    INF boot region="eu-1"
    WRN degraded region="eu-1" retry_in=5s
    "#);
}
