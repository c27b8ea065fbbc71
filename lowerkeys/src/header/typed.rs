use headers::HeaderValue;

use crate::typed_headers::Header as HttpHeader;

/// A header with a strongly typed representation.
///
/// Implemented for every [`headers::Header`].
pub trait TypedHeader {
    fn name() -> &'static str;

    fn encode(&self, values: &mut Vec<String>);

    fn encode_to_vec(&self) -> Vec<String> {
        let mut out = vec![];
        self.encode(&mut out);
        out
    }

    fn decode(values: &[String]) -> Result<Self, crate::typed_headers::Error>
    where
        Self: Sized;
}

struct HeaderValueProxy<'a> {
    target: &'a mut Vec<String>,
}

impl<'a> Extend<HeaderValue> for HeaderValueProxy<'a> {
    fn extend<T: IntoIterator<Item = HeaderValue>>(&mut self, iter: T) {
        self.target.extend(
            iter.into_iter()
                .map(|x| String::from_utf8_lossy(x.as_bytes()).into_owned()),
        )
    }
}

impl<H: HttpHeader> TypedHeader for H {
    fn name() -> &'static str {
        <Self as HttpHeader>::name().as_str()
    }

    fn encode(&self, values: &mut Vec<String>) {
        <Self as HttpHeader>::encode(self, &mut HeaderValueProxy { target: values });
    }

    fn decode(values: &[String]) -> Result<Self, crate::typed_headers::Error> {
        let values = values
            .iter()
            .map(|x| HeaderValue::from_str(x))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| crate::typed_headers::Error::invalid())?;
        <Self as HttpHeader>::decode(&mut values.iter())
    }
}
