use model::{Error, JsonValue};
use reqwest::StatusCode;
use url::Url;

/// A raw (unvalidated) response: status code plus parsed JSON body, or
/// `JsonValue::Null` for an empty body. Callers decide per-endpoint what
/// status codes are expected (a deployer interprets 404 as "absent", etc).
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: JsonValue,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_not_found(&self) -> bool {
        self.status.as_u16() == 404
    }
}

/// Thin wrapper over the orchestrator's `/v2/apps`, `/v2/deployments`, and
/// `/v2/groups` REST surface. All requests carry an `access_token` cookie.
/// TLS certificate verification is disabled unless `verify_tls` is set --
/// a conscious, explicit opt-out for self-signed clusters, never a silent
/// default for other HTTP usages in this toolchain.
pub struct Client {
    base_url: Url,
    access_token: String,
    http: reqwest::blocking::Client,
}

impl Client {
    pub fn new(base_url: Url, access_token: String, verify_tls: bool) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| Error::Http(format!("failed to build http client: {e}")))?;

        if !verify_tls {
            tracing::warn!("TLS certificate verification is disabled; pass --verify-tls to require valid certificates");
        }

        Ok(Self {
            base_url,
            access_token,
            http,
        })
    }

    pub fn get(&self, path: &str) -> Result<RawResponse, Error> {
        let url = self.join(path)?;
        self.send(self.http.get(url))
    }

    pub fn post(&self, path: &str, body: &JsonValue) -> Result<RawResponse, Error> {
        let url = self.join(path)?;
        self.send(self.http.post(url).json(body))
    }

    /// A POST carrying no request body at all (as opposed to a JSON `null`
    /// body), for endpoints like `restart` that take none.
    pub fn post_empty(&self, path: &str) -> Result<RawResponse, Error> {
        let url = self.join(path)?;
        self.send(self.http.post(url))
    }

    pub fn put(&self, path: &str, body: &JsonValue, query: &[(&str, &str)]) -> Result<RawResponse, Error> {
        let url = self.join(path)?;
        self.send(self.http.put(url).query(query).json(body))
    }

    pub fn delete(&self, path: &str) -> Result<RawResponse, Error> {
        let url = self.join(path)?;
        self.send(self.http.delete(url))
    }

    fn join(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid request path \"{path}\": {e}")))
    }

    fn send(&self, builder: reqwest::blocking::RequestBuilder) -> Result<RawResponse, Error> {
        let cookie = format!("access_token={}", self.access_token);
        tracing::debug!("sending orchestrator request");
        let response = builder
            .header(reqwest::header::COOKIE, cookie)
            .send()
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        let text = response.text().map_err(|e| Error::Http(e.to_string()))?;
        let body = if text.trim().is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(RawResponse { status, body })
    }
}
