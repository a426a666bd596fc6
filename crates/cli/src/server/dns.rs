use super::handler::QueryHandler;
use anyhow::Context;
use ferrous_chain_application::services::ZoneRouter;
use ferrous_chain_domain::config::ServerConfig;
use ferrous_chain_domain::DnsProtocol;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Largest UDP datagram accepted from a client.
const MAX_UDP_REQUEST: usize = 4096;

pub async fn start_dns_server(
    config: ServerConfig,
    router: Arc<ZoneRouter>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let ip: IpAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.bind_address))?;
    let socket_addr = SocketAddr::new(ip, config.dns_port);

    info!(bind_address = %socket_addr, "Starting DNS server");

    let udp_socket = Arc::new(create_udp_socket(socket_addr)?);
    info!(protocol = "UDP", "DNS server listening");

    let tcp_listener = create_tcp_listener(socket_addr)?;
    info!(protocol = "TCP", "DNS server listening");

    let handler = Arc::new(QueryHandler::new(
        router,
        Duration::from_millis(config.request_timeout_ms),
        shutdown.clone(),
    ));
    let idle_timeout = Duration::from_secs(config.tcp_idle_timeout_secs);

    info!("DNS server ready to accept queries");

    tokio::join!(
        run_udp(udp_socket, Arc::clone(&handler), shutdown.clone()),
        run_tcp(tcp_listener, handler, idle_timeout, shutdown),
    );

    info!("DNS server stopped");
    Ok(())
}

async fn run_udp(socket: Arc<UdpSocket>, handler: Arc<QueryHandler>, shutdown: CancellationToken) {
    let mut recv_buf = vec![0u8; MAX_UDP_REQUEST];

    loop {
        let (len, client) = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = socket.recv_from(&mut recv_buf) => match result {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "UDP recv error");
                    continue;
                }
            },
        };

        let packet: Arc<[u8]> = Arc::from(&recv_buf[..len]);
        let socket = Arc::clone(&socket);
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            if let Some(response) = handler.handle(&packet, DnsProtocol::Udp, client).await {
                if let Err(e) = socket.send_to(&response, client).await {
                    debug!(client = %client, error = %e, "UDP send failed");
                }
            }
        });
    }
}

async fn run_tcp(
    listener: TcpListener,
    handler: Arc<QueryHandler>,
    idle_timeout: Duration,
    shutdown: CancellationToken,
) {
    loop {
        let (stream, client) = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = listener.accept() => match result {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "TCP accept error");
                    continue;
                }
            },
        };

        let handler = Arc::clone(&handler);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                result = serve_connection(stream, client, &handler, idle_timeout) => {
                    if let Err(e) = result {
                        debug!(client = %client, error = %e, "TCP connection closed");
                    }
                }
            }
        });
    }
}

/// Serve length-prefixed requests on one connection until the client goes
/// quiet for `idle_timeout` or hangs up.
async fn serve_connection(
    mut stream: TcpStream,
    client: SocketAddr,
    handler: &QueryHandler,
    idle_timeout: Duration,
) -> std::io::Result<()> {
    loop {
        let len = match tokio::time::timeout(idle_timeout, stream.read_u16()).await {
            Ok(Ok(len)) => len as usize,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Ok(Err(e)) => return Err(e),
            Err(_) => return Ok(()),
        };

        let mut packet = vec![0u8; len];
        tokio::time::timeout(idle_timeout, stream.read_exact(&mut packet))
            .await
            .map_err(|_| std::io::Error::from(std::io::ErrorKind::TimedOut))??;

        let Some(response) = handler.handle(&packet, DnsProtocol::Tcp, client).await else {
            continue;
        };

        let mut framed = Vec::with_capacity(2 + response.len());
        framed.extend_from_slice(&(response.len() as u16).to_be_bytes());
        framed.extend_from_slice(&response);
        stream.write_all(&framed).await?;
    }
}

fn socket_domain(socket_addr: SocketAddr) -> Domain {
    if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    }
}

fn create_udp_socket(socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = Socket::new(socket_domain(socket_addr), Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}

fn create_tcp_listener(socket_addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(socket_domain(socket_addr), Type::STREAM, Some(Protocol::TCP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;
    socket.set_nonblocking(true)?;
    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}
