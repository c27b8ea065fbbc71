#![allow(dead_code)]

use lowerkeys::RawHeader;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn raw<'a>(entries: impl IntoIterator<Item = (&'a str, Vec<&'a str>)>) -> RawHeader {
    entries
        .into_iter()
        .map(|(name, values)| {
            (
                name.to_string(),
                values.iter().map(|x| x.to_string()).collect(),
            )
        })
        .collect()
}

pub fn content_headers() -> RawHeader {
    raw([("Content-Type", vec!["foo"]), ("Content-Length", vec!["3"])])
}

pub fn colliding_headers() -> RawHeader {
    raw([("Content-Type", vec!["foo"]), ("cOnTenT-tYpE", vec!["foo"])])
}
