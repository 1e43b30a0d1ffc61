//! HTTP gateway to the data store holding transaction rows.
//!
//! The data store exposes tables through a PostgREST-style interface
//! (`GET {base_url}/rest/v1/{table}?select=*`). Both async and blocking
//! variants are generated behind feature flags, sharing one definition.

use crate::error::Result;
use crate::models::Transaction;

/// Path prefix of the REST interface.
#[cfg(any(feature = "async", feature = "blocking"))]
const REST_PREFIX: &str = "/rest/v1/";

/// Query selecting every column in id order.
#[cfg(any(feature = "async", feature = "blocking"))]
const SELECT_ALL: &str = "select=*&order=id.asc";

/// Header carrying the API key.
#[cfg(any(feature = "async", feature = "blocking"))]
const API_KEY_HEADER: &str = "apikey";

/// A source of the full transaction collection.
///
/// Implemented by [`BlockingTransactionGateway`]; tests and embedders can
/// supply their own.
pub trait DatasetGateway: core::fmt::Debug {
    /// Fetches every transaction row.
    ///
    /// An empty table is `Ok(vec![])`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the data store cannot be reached, rejects the
    /// request, or answers with an unreadable body.
    fn fetch(&self) -> Result<Vec<Transaction>>;
}

/// Generates a gateway client (async or blocking) with builder, methods,
/// and tests.
#[cfg(any(feature = "async", feature = "blocking"))]
macro_rules! define_gateway {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        response_type: $resp_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// API key for the data store.
            api_key: Option<SecretString>,
            /// Base URL of the data store.
            base_url: Option<String>,
            /// Table override.
            table: Option<String>,
        }

        impl $builder {
            /// Sets the API key sent with every request.
            #[inline]
            #[must_use]
            pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
                self.api_key = Some(SecretString::from(key.into()));
                self
            }

            /// Sets the base URL of the data store.
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Overrides the table name (default: `transactions`).
            #[inline]
            #[must_use]
            pub fn table<T: Into<String>>(mut self, table: T) -> Self {
                self.table = Some(table.into());
                self
            }

            /// Takes every setting from a [`GatewayConfig`].
            #[inline]
            #[must_use]
            pub fn config(mut self, config: GatewayConfig) -> Self {
                self.api_key = Some(config.api_key);
                self.base_url = Some(config.base_url);
                self.table = Some(config.table);
                self
            }

            /// Builds the gateway.
            ///
            /// # Errors
            ///
            /// Returns [`FetchError::MissingConfig`] if the API key or base
            /// URL was not provided.
            /// Returns [`FetchError::Http`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let api_key = self.api_key.ok_or(FetchError::MissingConfig(API_KEY_ENV))?;
                let base_url = self
                    .base_url
                    .ok_or(FetchError::MissingConfig(URL_ENV))?
                    .trim_end_matches('/')
                    .to_owned();
                let table = self.table.unwrap_or_else(|| DEFAULT_TABLE.to_owned());
                tracing::debug!(base_url = %base_url, table = %table, "building gateway");
                let http = <$http_type>::builder().build()?;

                Ok($client {
                    http,
                    api_key,
                    base_url,
                    table,
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// API key for the data store.
            api_key: SecretString,
            /// Base URL without trailing slash.
            base_url: String,
            /// Table holding the rows.
            table: String,
        }

        impl $client {
            /// Creates a new builder for configuring the gateway.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    api_key: None,
                    base_url: None,
                    table: None,
                }
            }

            /// Fetches every transaction row, ordered by id.
            ///
            /// # Errors
            ///
            /// Returns [`FetchError::AccessDenied`] on 401/403,
            /// [`FetchError::Api`] on any other non-success status,
            /// [`FetchError::Http`] if the request fails, and
            /// [`FetchError::Serialization`] if the body is not a list of
            /// transactions.
            #[inline]
            #[tracing::instrument(skip_all, fields(table = %self.table))]
            pub $($async_kw)? fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
                let url = format!(
                    "{}{REST_PREFIX}{}?{SELECT_ALL}",
                    self.base_url, self.table
                );
                tracing::debug!(url = %url, "fetching transactions");
                let key = self.api_key.expose_secret();
                let response: $resp_type = self
                    .http
                    .get(&url)
                    .header(API_KEY_HEADER, key)
                    .header(AUTHORIZATION, format!("Bearer {key}"))
                    .header(ACCEPT, "application/json")
                    .send()
                    $( .$await_ext )?
                    ?;

                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if status.is_success() {
                    let body = response.text() $( .$await_ext )? ?;
                    let rows: Vec<Transaction> =
                        serde_json::from_str(&body).map_err(FetchError::from)?;
                    tracing::debug!(rows = rows.len(), "parsed transactions");
                    Ok(rows)
                } else {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    tracing::debug!(status = status.as_u16(), message = %message, "fetch rejected");
                    Err(rejection(status, message))
                }
            }
        }

    };
}

/// Maps a non-success status to the matching error.
#[cfg(any(feature = "async", feature = "blocking"))]
fn rejection(status: reqwest::StatusCode, message: String) -> crate::error::FetchError {
    use crate::error::FetchError;

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        FetchError::AccessDenied {
            status: status.as_u16(),
            message,
        }
    } else {
        FetchError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(feature = "async")]
mod async_gateway {
    //! Async gateway to the data store.

    use reqwest::header::{ACCEPT, AUTHORIZATION};
    use secrecy::{ExposeSecret as _, SecretString};

    use super::{API_KEY_HEADER, REST_PREFIX, SELECT_ALL, rejection};
    use crate::config::{API_KEY_ENV, DEFAULT_TABLE, GatewayConfig, URL_ENV};
    use crate::error::{FetchError, Result};
    use crate::models::Transaction;

    define_gateway! {
        client_name: TransactionGateway,
        builder_name: TransactionGatewayBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        client_doc: "Async gateway to the transaction data store.\n\nUse [`TransactionGateway::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`TransactionGateway`].",
        async_kw: async,
        await_kw: await,
    }
}

#[cfg(feature = "blocking")]
mod blocking_gateway {
    //! Blocking (synchronous) gateway to the data store.

    use reqwest::header::{ACCEPT, AUTHORIZATION};
    use secrecy::{ExposeSecret as _, SecretString};

    use super::{API_KEY_HEADER, DatasetGateway, REST_PREFIX, SELECT_ALL, rejection};
    use crate::config::{API_KEY_ENV, DEFAULT_TABLE, GatewayConfig, URL_ENV};
    use crate::error::{FetchError, Result};
    use crate::models::Transaction;

    define_gateway! {
        client_name: BlockingTransactionGateway,
        builder_name: BlockingTransactionGatewayBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        client_doc: "Blocking (synchronous) gateway to the transaction data store.\n\nUse [`BlockingTransactionGateway::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`BlockingTransactionGateway`].",
    }

    impl DatasetGateway for BlockingTransactionGateway {
        #[inline]
        fn fetch(&self) -> Result<Vec<Transaction>> {
            self.fetch_transactions()
        }
    }
}

#[cfg(feature = "async")]
pub use async_gateway::{TransactionGateway, TransactionGatewayBuilder};
#[cfg(feature = "blocking")]
pub use blocking_gateway::{BlockingTransactionGateway, BlockingTransactionGatewayBuilder};
