// Outbound address discovery: "connect" a datagram socket and read back the bound local address.
// A UDP connect only selects a route and source interface; no packet leaves the host.

use crate::models::SampleError;
use std::net::IpAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

pub(super) async fn outbound_address(target: &str, limit: Duration) -> Result<IpAddr, SampleError> {
    tokio::time::timeout(limit, probe(target))
        .await
        .map_err(|_| SampleError::Timeout(limit))?
}

async fn probe(target: &str) -> Result<IpAddr, SampleError> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
    socket.connect(target).await?;
    Ok(socket.local_addr()?.ip())
}
