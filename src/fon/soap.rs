//! SOAP 1.1 plumbing: envelope building, body extraction, and the HTTP
//! transport with bounded retry.

use std::future::Future;
use std::time::Duration;

use super::error::FonError;

/// SOAP 1.1 envelope namespace.
pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Production portal base URL. Service endpoints live under `/fon/ws/`.
pub const PRODUCTION_BASE: &str = "https://finanzonline.bmf.gv.at";

/// Wrap a request body in a SOAP 1.1 envelope.
pub fn envelope(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <soapenv:Envelope xmlns:soapenv=\"{SOAP_NS}\">\
         <soapenv:Body>{body}</soapenv:Body>\
         </soapenv:Envelope>"
    )
}

/// Extract the inner XML of the first `Body` element, prefix-agnostic.
pub fn body_content(xml: &str) -> Result<String, FonError> {
    let mut search = 0;
    while let Some(lt) = xml[search..].find('<') {
        let start = search + lt;
        let rest = &xml[start + 1..];
        let Some(gt) = rest.find('>') else { break };
        let tag = &rest[..gt];
        let name = tag
            .split([' ', '\t', '\n', '\r', '/'])
            .next()
            .unwrap_or_default();
        let local = name.rsplit(':').next().unwrap_or(name);
        if local == "Body" && !name.is_empty() && !tag.starts_with('/') {
            if tag.ends_with('/') {
                return Ok(String::new());
            }
            let content_start = start + 1 + gt + 1;
            let close = format!("</{name}>");
            let content_end = xml[content_start..]
                .find(&close)
                .map(|p| content_start + p)
                .ok_or_else(|| FonError::Codec("unterminated SOAP Body".into()))?;
            return Ok(xml[content_start..content_end].to_string());
        }
        search = start + 1;
    }
    Err(FonError::Codec("no SOAP Body element in response".into()))
}

/// Escape a text value for inclusion in a request body.
pub(crate) fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Flatten a service response into ordered `(leaf, text)` pairs, ignoring
/// namespaces and prefixes. Services with flat responses read their fields
/// from this; nested listings keep their own readers.
pub(crate) fn flat_fields(xml: &str) -> Result<Vec<(String, String)>, FonError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut fields = Vec::new();
    let mut current: Option<String> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                current = Some(name);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(name) = current.take() {
                    let text = e
                        .unescape()
                        .map_err(|err| FonError::Codec(format!("bad response text: {err}")))?;
                    fields.push((name, text.into_owned()));
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(FonError::Codec(format!("malformed response: {e}"))),
            _ => {}
        }
    }
    Ok(fields)
}

/// Look up a field in a flattened response.
pub(crate) fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Decode the `(rc, msg)` pair every service response carries. A missing rc
/// is a codec error; rc 0 yields `Ok(msg)`.
pub(crate) fn check_rc(fields: &[(String, String)]) -> Result<String, FonError> {
    let rc: i32 = field(fields, "rc")
        .ok_or_else(|| FonError::Codec("response is missing rc".into()))?
        .trim()
        .parse()
        .map_err(|_| FonError::Codec("non-numeric rc".into()))?;
    let msg = field(fields, "msg").unwrap_or_default().to_string();
    if rc == 0 {
        Ok(msg)
    } else {
        Err(FonError::protocol(rc, msg))
    }
}

/// A SOAP endpoint caller. The seam the services and the dashboard are
/// generic over; tests substitute a scripted implementation.
pub trait SoapTransport: Send + Sync {
    /// POST the envelope to the endpoint and return the raw response body.
    fn call(
        &self,
        endpoint: &str,
        envelope: &str,
    ) -> impl Future<Output = Result<String, FonError>> + Send;
}

/// Production transport on a pooled `reqwest` client.
///
/// Only transport failures and transient HTTP statuses (429, 5xx) are
/// retried, with exponential backoff `base * 2^(attempt-1)`. Everything
/// else propagates on the first attempt.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_override: Option<String>,
    max_retries: u32,
    backoff: Duration,
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Transport with the default timeout, three retries and 500ms backoff.
    pub fn new() -> Result<Self, FonError> {
        Self::builder().build()
    }

    fn resolve(&self, endpoint: &str) -> String {
        match &self.base_override {
            Some(base) => endpoint.replacen(PRODUCTION_BASE, base.trim_end_matches('/'), 1),
            None => endpoint.to_string(),
        }
    }

    async fn attempt(&self, url: &str, envelope: &str) -> Result<String, FonError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(envelope.to_string())
            .send()
            .await
            .map_err(|e| FonError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            response
                .text()
                .await
                .map_err(|e| FonError::Transport(e.to_string()))
        } else if status.as_u16() == 429 || status.is_server_error() {
            Err(FonError::HttpTransient {
                status: status.as_u16(),
            })
        } else {
            Err(FonError::HttpTerminal {
                status: status.as_u16(),
            })
        }
    }
}

impl SoapTransport for HttpTransport {
    async fn call(&self, endpoint: &str, envelope: &str) -> Result<String, FonError> {
        let url = self.resolve(endpoint);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.attempt(&url, envelope).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() && attempt <= self.max_retries => {
                    let delay = self.backoff * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying SOAP call"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::debug!(url = %url, attempt, error = %err, "SOAP call failed");
                    return Err(err);
                }
            }
        }
    }
}

/// Configuration for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
    base_override: Option<String>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff: Duration::from_millis(500),
            base_override: None,
        }
    }
}

impl HttpTransportBuilder {
    /// Per-attempt deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra attempts after the first (0 disables retry).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Backoff base; attempt n waits `base * 2^(n-1)`.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replace the production base URL, e.g. for a test portal.
    pub fn base_url(mut self, base: impl Into<String>) -> Self {
        self.base_override = Some(base.into());
        self
    }

    pub fn build(self) -> Result<HttpTransport, FonError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| FonError::Transport(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base_override: self.base_override,
            max_retries: self.max_retries,
            backoff: self.backoff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wraps_body() {
        let env = envelope("<ping/>");
        assert!(env.starts_with("<?xml"));
        assert!(env.contains("<soapenv:Body><ping/></soapenv:Body>"));
        assert!(env.contains(SOAP_NS));
    }

    #[test]
    fn body_content_is_prefix_agnostic() {
        for prefix in ["soapenv", "soap", "SOAP-ENV"] {
            let xml = format!(
                "<{prefix}:Envelope xmlns:{prefix}=\"{SOAP_NS}\">\
                 <{prefix}:Body><r><rc>0</rc></r></{prefix}:Body>\
                 </{prefix}:Envelope>"
            );
            assert_eq!(body_content(&xml).unwrap(), "<r><rc>0</rc></r>");
        }
    }

    #[test]
    fn body_content_without_prefix() {
        let xml = format!("<Envelope xmlns=\"{SOAP_NS}\"><Body><a/></Body></Envelope>");
        assert_eq!(body_content(&xml).unwrap(), "<a/>");
    }

    #[test]
    fn missing_body_is_codec_error() {
        assert!(matches!(
            body_content("<Envelope></Envelope>"),
            Err(FonError::Codec(_))
        ));
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(xml_escape("a<b&c\"d'e"), "a&lt;b&amp;c&quot;d&apos;e");
    }

    #[test]
    fn flat_fields_ignores_prefixes() {
        let fields = flat_fields("<ns2:r><ns2:rc>0</ns2:rc><msg>OK</msg></ns2:r>").unwrap();
        assert_eq!(field(&fields, "rc"), Some("0"));
        assert_eq!(field(&fields, "msg"), Some("OK"));
    }

    #[test]
    fn check_rc_lifts_nonzero_codes() {
        let ok = flat_fields("<r><rc>0</rc><msg>OK</msg></r>").unwrap();
        assert_eq!(check_rc(&ok).unwrap(), "OK");

        let expired = flat_fields("<r><rc>-1</rc><msg>Session abgelaufen</msg></r>").unwrap();
        assert!(matches!(check_rc(&expired), Err(FonError::SessionExpired)));

        let unknown = flat_fields("<r><rc>-77</rc><msg>?</msg></r>").unwrap();
        assert!(matches!(
            check_rc(&unknown),
            Err(FonError::Protocol { code: -77, .. })
        ));
    }

    #[test]
    fn missing_rc_is_codec_error() {
        let fields = flat_fields("<r><msg>no rc</msg></r>").unwrap();
        assert!(matches!(check_rc(&fields), Err(FonError::Codec(_))));
    }

    #[test]
    fn base_override_rewrites_production_urls() {
        let transport = HttpTransport::builder()
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(
            transport.resolve("https://finanzonline.bmf.gv.at/fon/ws/session"),
            "http://localhost:8080/fon/ws/session"
        );
    }
}
