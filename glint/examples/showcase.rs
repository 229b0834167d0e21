//! Renders a handful of styled lines to stdout.

use glint::{err, service, Attr, Level, Options, PrettyHandler, Record};
use jiff::SignedDuration;

fn main() -> std::io::Result<()> {
    let root = PrettyHandler::with_options(
        std::io::stdout(),
        Options::default().with_level(Level::DEBUG).with_source(true),
    );

    root.handle(&Record::now(Level::DEBUG, "cache warmed").with_attr(Attr::int("entries", 812)))?;

    let api = root.with_attrs(vec![service("api"), Attr::str("region", "eu-1")]);
    api.handle(&Record::now(Level::INFO, "listening").with_attr(Attr::str("addr", "0.0.0.0:8080")))?;

    let req = api.with_group("req");
    req.handle(
        &Record::now(Level::WARN, "slow handshake")
            .with_attr(Attr::str("peer", "10.0.0.7"))
            .with_attr(Attr::duration("elapsed", SignedDuration::from_millis(1250))),
    )?;
    req.handle(
        &Record::now(Level::ERROR, "accept failed")
            .with_attr(err(std::io::Error::other("too many open files"))),
    )?;

    Ok(())
}
