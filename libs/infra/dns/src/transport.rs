// [libs/infra/dns/src/transport.rs]
/*!
 * =================================================================
 * APARATO: DNS QUERY TRANSPORT (V3.4 - TRIPLE CHANNEL)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: EJECUCIÓN DE SUBCONSULTAS SOBRE UDP, TCP Y DoH
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DEDICATED SOCKET: Cada consulta UDP abre su propio socket efímero,
 *    sellando el robo de respuestas entre tareas concurrentes.
 * 2. TRUNCATION ESCALATION: El bit TC escala la consulta al canal TCP
 *    con prefijo de longitud de 2 bytes.
 * 3. BOUNDED DoH: El cuerpo dns-json se acota antes del parseo.
 * =================================================================
 */

use std::net::IpAddr;
use std::time::{Duration, Instant};

use hickory_proto::op::{Message, MessageType, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tracing::debug;

use crate::errors::QueryFault;
use crate::resolver::ResolverTarget;

/// Cota superior del cuerpo de una respuesta DoH.
const MAX_DOH_BODY_BYTES: usize = 64 * 1024;
/// Reintentos de recepción ante deriva de txid en el datagrama.
const UDP_TXID_RETRIES: usize = 3;
/// Buffer de recepción con margen para respuestas EDNS extendidas.
const UDP_RECV_BUFFER_BYTES: usize = 4096;

/// Ejecuta una subconsulta A o AAAA contra el destino decodificado.
pub async fn query_record(
    target: &ResolverTarget,
    domain: &str,
    record_type: RecordType,
    timeout: Duration,
    doh_client: &reqwest::Client,
) -> Result<Vec<IpAddr>, QueryFault> {
    match target {
        ResolverTarget::Udp(address) => query_udp(*address, domain, record_type, timeout).await,
        ResolverTarget::Doh(url) => query_doh(doh_client, url, domain, record_type).await,
    }
}

fn fqdn(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{}.", domain)
    }
}

fn build_query(domain: &str, record_type: RecordType, txid: u16) -> Result<Vec<u8>, QueryFault> {
    let name = Name::from_ascii(&fqdn(domain))
        .map_err(|fault| QueryFault::Protocol(format!("invalid name: {}", fault)))?;

    let mut message = Message::new();
    message.set_id(txid);
    message.set_recursion_desired(true);
    message.add_query(Query::query(name, record_type));

    message
        .to_vec()
        .map_err(|fault| QueryFault::Protocol(format!("serialization: {}", fault)))
}

/// Extrae las direcciones del tipo consultado y clasifica el Rcode.
fn harvest_answers(message: &Message, record_type: RecordType) -> Result<Vec<IpAddr>, QueryFault> {
    match message.response_code() {
        ResponseCode::NoError => {}
        ResponseCode::NXDomain => return Err(QueryFault::Nxdomain),
        ResponseCode::ServFail => {
            return Err(QueryFault::ServerMisbehaving("SERVFAIL".to_string()))
        }
        ResponseCode::Refused => return Err(QueryFault::Refused("REFUSED".to_string())),
        other => return Err(QueryFault::ServerMisbehaving(other.to_string())),
    }

    let ips: Vec<IpAddr> = message
        .answers()
        .iter()
        .filter(|record| record.record_type() == record_type)
        .filter_map(|record| match record.data() {
            RData::A(ipv4) => Some(IpAddr::V4(ipv4.0)),
            RData::AAAA(ipv6) => Some(IpAddr::V6(ipv6.0)),
            _ => None,
        })
        .collect();

    if ips.is_empty() {
        return Err(QueryFault::NoRecords);
    }
    Ok(ips)
}

async fn query_udp(
    resolver: std::net::SocketAddr,
    domain: &str,
    record_type: RecordType,
    timeout: Duration,
) -> Result<Vec<IpAddr>, QueryFault> {
    let txid: u16 = rand::random();
    let query_bytes = build_query(domain, record_type, txid)?;

    // Socket dedicado por consulta para evitar robo de respuestas.
    let bind_address = if resolver.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind_address)
        .await
        .map_err(|fault| QueryFault::Io(fault.to_string()))?;

    let start = Instant::now();
    socket
        .send_to(&query_bytes, resolver)
        .await
        .map_err(|fault| classify_io(&fault))?;

    let mut receive_buffer = vec![0u8; UDP_RECV_BUFFER_BYTES];
    for _ in 0..UDP_TXID_RETRIES {
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(QueryFault::Timeout);
        }
        let remaining = timeout - elapsed;

        match tokio::time::timeout(remaining, socket.recv_from(&mut receive_buffer)).await {
            Ok(Ok((length, _source))) => {
                let message = match Message::from_vec(&receive_buffer[..length]) {
                    Ok(message) => message,
                    Err(_) => continue, // trama corrupta, reintentar recv
                };
                if message.id() != txid || message.message_type() != MessageType::Response {
                    continue; // deriva de txid, reintentar recv
                }

                if message.truncated() {
                    debug!(%domain, "📡 [DNS_TC]: Truncated datagram, escalating to TCP.");
                    let tcp_remaining = timeout.saturating_sub(start.elapsed());
                    return query_tcp(resolver, &query_bytes, record_type, tcp_remaining).await;
                }

                return harvest_answers(&message, record_type);
            }
            Ok(Err(fault)) => return Err(classify_io(&fault)),
            Err(_) => return Err(QueryFault::Timeout),
        }
    }

    Err(QueryFault::Timeout)
}

async fn query_tcp(
    resolver: std::net::SocketAddr,
    query_bytes: &[u8],
    record_type: RecordType,
    timeout: Duration,
) -> Result<Vec<IpAddr>, QueryFault> {
    let exchange = async {
        let mut stream = TcpStream::connect(resolver).await.map_err(|fault| classify_io(&fault))?;

        // Prefijo de longitud de 2 bytes del protocolo DNS sobre TCP.
        let length_prefix = (query_bytes.len() as u16).to_be_bytes();
        stream.write_all(&length_prefix).await.map_err(|fault| classify_io(&fault))?;
        stream.write_all(query_bytes).await.map_err(|fault| classify_io(&fault))?;

        let mut response_length_bytes = [0u8; 2];
        stream
            .read_exact(&mut response_length_bytes)
            .await
            .map_err(|fault| classify_io(&fault))?;
        let response_length = u16::from_be_bytes(response_length_bytes) as usize;

        let mut response_buffer = vec![0u8; response_length];
        stream
            .read_exact(&mut response_buffer)
            .await
            .map_err(|fault| classify_io(&fault))?;

        let message = Message::from_vec(&response_buffer)
            .map_err(|fault| QueryFault::Protocol(format!("tcp frame: {}", fault)))?;
        harvest_answers(&message, record_type)
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(outcome) => outcome,
        Err(_) => Err(QueryFault::Timeout),
    }
}

fn classify_io(fault: &std::io::Error) -> QueryFault {
    match fault.kind() {
        std::io::ErrorKind::ConnectionRefused => QueryFault::Refused(fault.to_string()),
        std::io::ErrorKind::TimedOut => QueryFault::Timeout,
        _ => QueryFault::Io(fault.to_string()),
    }
}

// --- CANAL DoH (dns-json) ---

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u16,
    #[serde(rename = "Answer", default)]
    answers: Vec<DohAnswer>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "type")]
    record_type: u16,
    data: String,
}

fn record_type_code(record_type: RecordType) -> u16 {
    match record_type {
        RecordType::A => 1,
        RecordType::AAAA => 28,
        other => u16::from(other),
    }
}

fn rcode_name(code: u16) -> &'static str {
    match code {
        1 => "FORMERR",
        2 => "SERVFAIL",
        4 => "NOTIMP",
        5 => "REFUSED",
        _ => "UNKNOWN_RCODE",
    }
}

async fn query_doh(
    client: &reqwest::Client,
    endpoint: &str,
    domain: &str,
    record_type: RecordType,
) -> Result<Vec<IpAddr>, QueryFault> {
    let type_label = match record_type {
        RecordType::A => "A",
        RecordType::AAAA => "AAAA",
        _ => "A",
    };

    let response = client
        .get(endpoint)
        .query(&[("name", fqdn(domain).as_str()), ("type", type_label)])
        .header(reqwest::header::ACCEPT, "application/dns-json")
        .send()
        .await
        .map_err(classify_reqwest)?;

    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(classify_reqwest)?;
    if body.len() > MAX_DOH_BODY_BYTES {
        return Err(QueryFault::Protocol("oversized dns-json body".to_string()));
    }

    if status != 200 {
        let body_text = String::from_utf8_lossy(&body).to_ascii_lowercase();
        return Err(QueryFault::DohHttp {
            status,
            parameter_error: body_text.contains("parameter"),
        });
    }

    let decoded: DohResponse = serde_json::from_slice(&body)
        .map_err(|fault| QueryFault::Protocol(format!("dns-json: {}", fault)))?;

    match decoded.status {
        0 => {
            let wanted = record_type_code(record_type);
            let ips: Vec<IpAddr> = decoded
                .answers
                .iter()
                .filter(|answer| answer.record_type == wanted)
                .filter_map(|answer| answer.data.parse::<IpAddr>().ok())
                .collect();
            if ips.is_empty() {
                Err(QueryFault::NoRecords)
            } else {
                Ok(ips)
            }
        }
        3 => Err(QueryFault::Nxdomain),
        other => Err(QueryFault::ServerMisbehaving(rcode_name(other).to_string())),
    }
}

fn classify_reqwest(fault: reqwest::Error) -> QueryFault {
    if fault.is_timeout() {
        QueryFault::Timeout
    } else if fault.is_connect() {
        QueryFault::Refused(fault.to_string())
    } else {
        QueryFault::Io(fault.to_string())
    }
}
