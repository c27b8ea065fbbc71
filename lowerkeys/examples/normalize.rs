use lowerkeys::{Header, RawHeader};

fn main() {
    env_logger::init();

    let mut raw = RawHeader::new();
    raw.insert("Content-Type".to_string(), vec!["text/html".to_string()]);
    raw.insert("X-Request-Id".to_string(), vec!["42".to_string()]);

    let header = match Header::using(&mut raw) {
        Ok(header) => header,
        Err(e) => {
            log::error!("cannot normalize headers: {e}");
            std::process::exit(1);
        }
    };
    header.add("Accept", "*/*");
    header.set("x-request-id", "43");

    for (name, value) in header.iter() {
        println!("{name}: {value}");
    }
}
