//! Splitting of the session bootstrap response.
//!
//! The body holds two JSON documents, `info` then `data`, each preceded by
//! its decimal length and a `;`.

use log::trace;
use serde_json::Deserializer;

use crate::json::Object;
use crate::Error;

/// Reads one `<len>;{...}` frame and returns the document and the rest of
/// the input.
fn next_document<'a>(input: &'a str, which: &str) -> Result<(Object, &'a str), Error> {
    let input = input.trim_start();
    let (len, rest) = input
        .split_once(';')
        .ok_or_else(|| Error::MalformedBootstrap(format!("no length prefix before {}", which)))?;
    if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedBootstrap(format!(
            "invalid length prefix \"{}\" before {}",
            len, which
        )));
    }

    let mut stream = Deserializer::from_str(rest).into_iter::<Object>();
    let doc = match stream.next() {
        Some(Ok(doc)) => doc,
        Some(Err(e)) => return Err(Error::MalformedBootstrap(format!("{} is not a JSON object: {}", which, e))),
        None => return Err(Error::MalformedBootstrap(format!("missing {} document", which))),
    };
    let consumed = stream.byte_offset();
    trace!("Read {} document ({} bytes, announced {})", which, consumed, len);
    Ok((doc, &rest[consumed..]))
}

/// Splits a bootstrap response body into its `(info, data)` pair.
pub fn split_bootstrap(text: &str) -> Result<(Object, Object), Error> {
    let (info, rest) = next_document(text, "info")?;
    let (data, _) = next_document(rest, "data")?;
    Ok((info, data))
}
