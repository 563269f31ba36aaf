// Hand-crafted async client for the Dante Director GraphQL endpoint.
//
// Endpoint: POST {base}/graphql
// Auth: raw API key in the `Authorization` header

use std::collections::HashMap;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::query;
use crate::transport::TransportConfig;
use crate::types::{
    ClockControlInput, DomainDevices, DomainDevicesData, DomainSummary, DomainsData,
    GraphQlError, GraphQlRequest, GraphQlResponse, InputVariables, MutationResult,
};

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Dante Director query/mutation endpoint.
pub struct DirectorClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl DirectorClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects the key verbatim as a sensitive `Authorization` default header.
    pub fn from_api_key(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, key_value);

        let http = transport.build_client_with_headers(headers)?;
        let endpoint = Self::normalize_endpoint(base_url)?;

        Ok(Self { http, endpoint })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let endpoint = Self::normalize_endpoint(base_url)?;
        Ok(Self { http, endpoint })
    }

    /// Append `/graphql` unless the URL already points at it.
    fn normalize_endpoint(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/graphql") {
            url.set_path(&path);
        } else {
            url.set_path(&format!("{path}/graphql"));
        }

        Ok(url)
    }

    /// The fully-resolved GraphQL endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Fetch every domain with its aggregate status and device id list.
    pub async fn list_domains(&self) -> Result<Vec<DomainSummary>, Error> {
        let data: DomainsData = self.query(query::DOMAINS).await?;
        Ok(data.domains)
    }

    /// Fetch the full device inventory, grouped by domain.
    pub async fn list_domain_devices(&self) -> Result<Vec<DomainDevices>, Error> {
        let data: DomainDevicesData = self.query(query::DOMAIN_DEVICES).await?;
        Ok(data.domains)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Toggle one boolean clock preference on a single device.
    ///
    /// Any `errors` entry in the response, or `ok: false`, is a failure.
    pub async fn set_clock_preference(
        &self,
        mutation: &str,
        input_type: &str,
        device_id: &str,
        enabled: bool,
    ) -> Result<(), Error> {
        let document = query::clock_mutation(mutation, input_type);
        let variables = InputVariables {
            input: ClockControlInput { device_id, enabled },
        };

        let resp: GraphQlResponse<HashMap<String, Option<MutationResult>>> =
            self.execute(&document, Some(variables)).await?;

        if !resp.errors.is_empty() {
            return Err(graphql_error(&resp.errors));
        }

        let ok = resp
            .data
            .as_ref()
            .and_then(|data| data.get(mutation))
            .and_then(|result| result.as_ref())
            .and_then(|result| result.ok);

        match ok {
            Some(false) => Err(Error::GraphQl {
                messages: vec![format!("{mutation} returned ok=false")],
            }),
            _ => Ok(()),
        }
    }

    // ── Transport ────────────────────────────────────────────────────

    /// Run a query without variables and unwrap the `data` member.
    ///
    /// Partial responses (data + errors) keep the data and log the errors.
    async fn query<T: DeserializeOwned>(&self, document: &str) -> Result<T, Error> {
        let resp: GraphQlResponse<T> = self.execute::<T, ()>(document, None).await?;

        match resp.data {
            Some(data) => {
                if !resp.errors.is_empty() {
                    warn!(
                        errors = resp.errors.len(),
                        "partial GraphQL response, keeping data"
                    );
                }
                Ok(data)
            }
            None if resp.errors.is_empty() => Err(Error::MissingData),
            None => Err(graphql_error(&resp.errors)),
        }
    }

    async fn execute<T: DeserializeOwned, V: Serialize>(
        &self,
        document: &str,
        variables: Option<V>,
    ) -> Result<GraphQlResponse<T>, Error> {
        debug!("POST {}", self.endpoint);

        let body = GraphQlRequest {
            query: document,
            variables,
        };
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::InvalidApiKey);
        }

        let raw = resp.text().await?;
        let parsed = serde_json::from_str::<GraphQlResponse<T>>(&raw);

        // Authentication failures may arrive under any status code.
        if let Ok(ref envelope) = parsed {
            if let Some(err) = envelope.errors.iter().find(|e| e.is_unauthenticated()) {
                return Err(Error::Authentication {
                    message: err.message.clone(),
                });
            }
        }

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
            });
        }

        parsed.map_err(|e| {
            let preview: String = raw.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: raw,
            }
        })
    }
}

fn graphql_error(errors: &[GraphQlError]) -> Error {
    Error::GraphQl {
        messages: errors.iter().map(|e| e.message.clone()).collect(),
    }
}
