//! Heartbeat server and monitor exchanging packets over loopback UDP

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use deadman::{Heartbeat, STATUS_QUERY, Server, ServerConfig, StatusResponse};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deadman=trace")),
        )
        .init();

    let mut server = Server::bind(ServerConfig {
        bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
        variables: 4,
        read_timeout: Some(Duration::from_secs(1)),
        ..ServerConfig::default()
    })?;
    let addr = server.local_addr()?;

    let client = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))?;
    client.set_read_timeout(Some(Duration::from_secs(1)))?;

    // Two sources report in, one packet gets corrupted on the way
    client.send_to(&Heartbeat::new(0, 0x01, 0x10).encode(), addr)?;
    client.send_to(&Heartbeat::new(2, 0x02, 0x20).encode(), addr)?;
    let mut corrupt = Heartbeat::new(3, 0x03, 0x30).encode();
    corrupt[7] ^= 0xFF;
    client.send_to(&corrupt, addr)?;
    client.send_to(STATUS_QUERY, addr)?;

    while let Some(handled) = server.poll_once()? {
        println!("packet handled: {handled}");
        if server.table().stats().queries > 0 {
            break;
        }
    }

    let mut buf = [0u8; 64];
    let (len, _) = client.recv_from(&mut buf)?;
    let response = StatusResponse::decode(buf[..len].to_vec().into())?;

    println!("status response ({len} bytes, checksum {:#010x}):", response.checksum());
    for (index, entry) in response.entries().enumerate() {
        println!("  [{index}] {entry}");
    }
    println!("stats: {:?}", server.table().stats());

    Ok(())
}
