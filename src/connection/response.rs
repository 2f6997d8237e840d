//! Response classification shared by both dispatch paths.

use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use serde_json::Value;

use crate::error::{MyenergiError, Result};

/// Response header naming the authoritative device-service host.
pub(crate) const ASN_HEADER: &str = "x_myenergi-asn";

/// The authoritative host announced by a hub-path response, if any.
pub(crate) fn authoritative_host(headers: &HeaderMap) -> Option<&str> {
    headers.get(ASN_HEADER).and_then(|value| value.to_str().ok())
}

/// Turn a raw HTTP outcome into a decoded JSON body or a taxonomy error:
/// 200 decodes the body, 401 is a credential rejection, anything else
/// carries its status code for the caller to inspect.
///
/// The body is read here, so a transport timeout can still strike after
/// the 200 status line; it must classify as a timeout, not a decode
/// failure.
pub(crate) async fn classify(response: Response) -> Result<Value> {
    match response.status() {
        StatusCode::OK => response.json().await.map_err(MyenergiError::from_reqwest),
        StatusCode::UNAUTHORIZED => Err(MyenergiError::WrongCredentials),
        status => Err(MyenergiError::Api {
            status: status.as_u16(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authoritative_host_reads_asn_header() {
        let mut headers = HeaderMap::new();
        headers.insert(ASN_HEADER, "s18.myenergi.net".parse().unwrap());
        assert_eq!(authoritative_host(&headers), Some("s18.myenergi.net"));
    }

    #[test]
    fn authoritative_host_absent() {
        assert_eq!(authoritative_host(&HeaderMap::new()), None);
    }
}
