// [libs/infra/http/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HTTP INFRASTRUCTURE REGISTRY (V3.0 - DOMINION SYNC)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL ADAPTADOR HTTP
 * =================================================================
 */

pub mod dns_bridge;
pub mod errors;
pub mod extract;
pub mod fetcher;
pub mod proxy;
pub mod validator;

pub use dns_bridge::PoolBackedResolver;
pub use errors::HttpError;
pub use extract::{content_hash, extract_snippet, extract_title};
pub use fetcher::{FetchOutcome, HttpFetcher};
pub use proxy::{InMemoryProxyManager, ProxyManager};
pub use validator::HttpValidator;
