// [libs/infra/http/src/fetcher.rs]
/*!
 * =================================================================
 * APARATO: PERSONA HTTP FETCHER (V3.7 - SOVEREIGN PROBE CLIENT)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CONSTRUCCIÓN POR-FETCH DEL CLIENTE Y LECTURA ACOTADA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PERSONA FIRST: UA, cabeceras, redirecciones, HTTP/2 y cookies se
 *    derivan de la persona con degradación a los defaults de la app.
 * 2. SCHEME FALLBACK: URLs sin esquema reciben https:// y, ante fallo
 *    total, un único reintento http://.
 * 3. BOUNDED BODY: La lectura del cuerpo (post-descompresión reqwest)
 *    se acota por MaxBodyReadBytes; EOF prematuro no es un fallo.
 * 4. HEALTH LOOP: El primer éxito certifica el proxy; el fallo total
 *    clasificado como proxy-related lo degrada ante el gestor.
 * =================================================================
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::redirect;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use dominion_domain_models::config::HttpValidatorConfig;
use dominion_domain_models::persona::{CookieMode, DnsPersonaConfig, HttpPersonaConfig};
use dominion_domain_models::proxy::Proxy;

use crate::dns_bridge::PoolBackedResolver;
use crate::errors::HttpError;
use crate::proxy::ProxyManager;

/// UA terminal cuando ni la persona ni la app declaran uno.
const BUILT_IN_USER_AGENT: &str = "Mozilla/5.0 (compatible; DominionProbe/3.0)";
const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Resultado crudo de un fetch exitoso.
#[derive(Debug)]
pub struct FetchOutcome {
    pub final_url: String,
    pub status_code: u16,
    pub headers: HeaderMap,
    /// Cuerpo post-descompresión acotado y transcodificado a UTF-8 si el
    /// charset declarado lo permite.
    pub body: Vec<u8>,
    pub duration_ms: u64,
    pub proxy_id: Option<Uuid>,
}

/// Fetcher HTTP dirigido por persona con dial DNS personalizado.
pub struct HttpFetcher {
    config: HttpValidatorConfig,
    proxy_manager: Option<Arc<dyn ProxyManager>>,
}

impl HttpFetcher {
    pub fn new(config: HttpValidatorConfig, proxy_manager: Option<Arc<dyn ProxyManager>>) -> Self {
        Self { config, proxy_manager }
    }

    pub fn config(&self) -> &HttpValidatorConfig {
        &self.config
    }

    /// Selección de salida: proxy explícito utilizable → gestor → directo.
    async fn select_proxy(&self, supplied: Option<Proxy>) -> Option<Proxy> {
        match supplied {
            Some(proxy) if proxy.is_usable() => Some(proxy),
            _ => match &self.proxy_manager {
                Some(manager) => manager.acquire().await,
                None => None,
            },
        }
    }

    /// Construye el cliente por-fetch a partir de la persona activa.
    fn build_client(
        &self,
        persona: &HttpPersonaConfig,
        dns_persona: Option<&DnsPersonaConfig>,
        proxy: Option<&Proxy>,
    ) -> Result<reqwest::Client, HttpError> {
        // 1. CABECERAS: defaults de la app, sobreescritas por la persona.
        let mut headers = HeaderMap::new();
        for (key, value) in self.config.default_headers.iter().chain(&persona.default_headers) {
            match (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %key, "⚠️  [PERSONA_CONFIG]: Unparseable header skipped."),
            }
        }
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        }
        if !headers.contains_key(ACCEPT_LANGUAGE) {
            headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));
        }

        // 2. USER-AGENT: persona → app → embebido.
        let user_agent = persona
            .user_agent
            .clone()
            .filter(|ua| !ua.is_empty())
            .or_else(|| {
                let app_default = self.config.default_user_agent.clone();
                if app_default.is_empty() { None } else { Some(app_default) }
            })
            .unwrap_or_else(|| BUILT_IN_USER_AGENT.to_string());
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(BUILT_IN_USER_AGENT)),
        );

        // 3. POLÍTICA DE REDIRECCIONES: el sentinela 'stop' entrega la
        // última respuesta al llamador en lugar de fallar.
        let follow = persona.follow_redirects.unwrap_or(self.config.follow_redirects);
        let redirect_policy = if follow {
            let max_redirects = if persona.max_redirects > 0 {
                persona.max_redirects
            } else {
                self.config.max_redirects
            } as usize;
            redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() > max_redirects {
                    attempt.stop()
                } else {
                    attempt.follow()
                }
            })
        } else {
            redirect::Policy::none()
        };

        let request_timeout = if persona.request_timeout_ms > 0 {
            persona.request_timeout_ms
        } else {
            self.config.request_timeout_ms
        };

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(redirect_policy)
            .timeout(Duration::from_millis(request_timeout))
            .danger_accept_invalid_certs(self.config.allow_insecure_tls);

        // 4. NEGOCIACIÓN HTTP/2 bajo control de la persona.
        if persona.http2_enabled == Some(false) {
            builder = builder.http1_only();
        }

        // 5. JAR DE COOKIES en modo sesión.
        if persona.cookie_mode == CookieMode::Session {
            builder = builder.cookie_store(true);
        }

        // 6. DIAL DNS PERSONALIZADO respaldado por el pool de la persona.
        if let Some(dns) = dns_persona {
            if !dns.resolvers.is_empty() {
                let bridge = PoolBackedResolver::new(dns)
                    .map_err(|fault| HttpError::RequestCreation(fault.to_string()))?;
                builder = builder.dns_resolver(Arc::new(bridge));
            }
        }

        // 7. SALIDA INTERMEDIADA
        if let Some(proxy) = proxy {
            let mut reqwest_proxy = reqwest::Proxy::all(proxy.url())
                .map_err(|fault| HttpError::RequestCreation(fault.to_string()))?;
            if let (Some(username), Some(password)) = (&proxy.username, &proxy.password) {
                reqwest_proxy = reqwest_proxy.basic_auth(username, password);
            }
            builder = builder.proxy(reqwest_proxy);
        }

        builder.build().map_err(|fault| HttpError::RequestCreation(fault.to_string()))
    }

    /// Ejecuta el sondeo completo de una URL bajo el token de cancelación.
    #[instrument(skip(self, persona, dns_persona, supplied_proxy, cancellation_token), fields(url = %url))]
    pub async fn fetch(
        &self,
        url: &str,
        persona: &HttpPersonaConfig,
        dns_persona: Option<&DnsPersonaConfig>,
        supplied_proxy: Option<Proxy>,
        cancellation_token: &CancellationToken,
    ) -> Result<FetchOutcome, HttpError> {
        let started = Instant::now();

        let selected_proxy = self.select_proxy(supplied_proxy).await;
        let proxy_id = selected_proxy.as_ref().map(|proxy| proxy.id);
        let client = self.build_client(persona, dns_persona, selected_proxy.as_ref())?;

        // 1. CANONICALIZACIÓN DE ESQUEMA
        let scheme_missing = !url.contains("://");
        let primary_url =
            if scheme_missing { format!("https://{}", url) } else { url.to_string() };

        // 2. INTENTO PRIMARIO + REINTENTO http:// ante fallo total
        let outcome = match self.attempt(&client, &primary_url, cancellation_token).await {
            Ok(success) => Ok(success),
            Err(primary_fault) => {
                if scheme_missing && !primary_fault.is_cancelled() {
                    let fallback_url = format!("http://{}", url);
                    debug!(%fallback_url, "🔻 [SCHEME_FALLBACK]: Retrying over plain HTTP.");
                    self.attempt(&client, &fallback_url, cancellation_token)
                        .await
                        .map_err(|_| primary_fault)
                } else {
                    Err(primary_fault)
                }
            }
        };

        // 3. RETROALIMENTACIÓN DE SALUD DEL PROXY
        if let (Some(proxy), Some(manager)) = (&selected_proxy, &self.proxy_manager) {
            match &outcome {
                Ok(_) => manager.report_health(proxy.id, true, None),
                Err(fault) => {
                    let fault_text = fault.to_string();
                    if manager.is_proxy_related_error(&fault_text, &proxy.address) {
                        manager.report_health(proxy.id, false, Some(&fault_text));
                    }
                }
            }
        }

        outcome.map(|(final_url, status_code, headers, body)| FetchOutcome {
            final_url,
            status_code,
            headers,
            body,
            duration_ms: started.elapsed().as_millis() as u64,
            proxy_id,
        })
    }

    async fn attempt(
        &self,
        client: &reqwest::Client,
        url: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<(String, u16, HeaderMap, Vec<u8>), HttpError> {
        let parsed_url = reqwest::Url::parse(url)
            .map_err(|fault| HttpError::InvalidUrl(format!("{}: {}", url, fault)))?;

        let request = client
            .get(parsed_url)
            .build()
            .map_err(|fault| HttpError::RequestCreation(fault.to_string()))?;

        let response = tokio::select! {
            _ = cancellation_token.cancelled() => return Err(HttpError::Cancelled),
            sent = client.execute(request) => sent.map_err(classify_send_fault)?,
        };

        let final_url = response.url().to_string();
        let status_code = response.status().as_u16();
        let headers = response.headers().clone();
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = self.read_bounded_body(response, cancellation_token).await?;
        let body = transcode_body(body, content_type.as_deref());

        Ok((final_url, status_code, headers, body))
    }

    /// Lectura del stream descomprimido acotada por MaxBodyReadBytes.
    async fn read_bounded_body(
        &self,
        response: reqwest::Response,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<u8>, HttpError> {
        let cap = self.config.max_body_read_bytes;
        let mut body: Vec<u8> = Vec::with_capacity(cap.min(64 * 1024));
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            if cancellation_token.is_cancelled() {
                return Err(HttpError::Cancelled);
            }

            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(fault) if fault.is_timeout() => return Err(HttpError::Timeout),
                Err(fault) => {
                    // EOF prematuro: el contenido parcial es evidencia válida.
                    debug!(error = %fault, "📦 [BODY_EOF]: Stream closed early, keeping partial body.");
                    break;
                }
            };

            let remaining = cap.saturating_sub(body.len());
            if remaining == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
            if body.len() >= cap {
                break;
            }
        }

        Ok(body)
    }
}

fn classify_send_fault(fault: reqwest::Error) -> HttpError {
    if fault.is_timeout() {
        HttpError::Timeout
    } else if fault.is_builder() {
        HttpError::RequestCreation(fault.to_string())
    } else {
        HttpError::FetchFailed(fault.to_string())
    }
}

/// Transcodifica el cuerpo al charset declarado en Content-Type, si existe
/// un decodificador; de lo contrario devuelve los bytes descomprimidos.
fn transcode_body(body: Vec<u8>, content_type: Option<&str>) -> Vec<u8> {
    let Some(content_type) = content_type else { return body };

    let charset_label = content_type
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset="))
        .next()
        .map(|label| label.trim_matches('"').to_string());

    let Some(label) = charset_label else { return body };
    let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) else { return body };
    if encoding == encoding_rs::UTF_8 {
        return body;
    }

    let (decoded, _, had_errors) = encoding.decode(&body);
    if had_errors {
        // Charset declarado inconsistente: conservamos los bytes crudos.
        return body;
    }
    decoded.into_owned().into_bytes()
}
