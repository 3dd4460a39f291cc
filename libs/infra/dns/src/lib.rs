// [libs/infra/dns/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DNS INFRASTRUCTURE REGISTRY (V3.0 - DOMINION SYNC)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL ADAPTADOR DNS
 * =================================================================
 */

pub mod errors;
pub mod pool;
pub mod rate;
pub mod resolver;
pub mod syntax;
pub mod transport;
pub mod validator;

pub use errors::{DnsError, QueryFault};
pub use pool::ResolverPool;
pub use rate::RateLimiter;
pub use resolver::{parse_resolver, system_resolvers, ResolverTarget};
pub use syntax::is_valid_domain;
pub use validator::DnsValidator;
