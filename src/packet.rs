use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};

use async_trait::async_trait;
use pnet::util::MacAddr;
use tokio::net::UdpSocket;

use crate::error::{Error, Result};
use crate::mac;

pub const DEFAULT_PORT: u16 = 9;

const SYNC_STREAM: [u8; 6] = [0xff; 6];
const MAC_LEN: usize = 6;
const MAC_REPEAT: usize = 16;

pub const MAGIC_PACKET_LEN: usize = SYNC_STREAM.len() + MAC_LEN * MAC_REPEAT;

/// 6 x 0xFF followed by the target MAC 16 times.
pub struct MagicPacket([u8; MAGIC_PACKET_LEN]);

impl MagicPacket {
    pub fn new(target: MacAddr) -> Self {
        let mut packet = [0u8; MAGIC_PACKET_LEN];
        let mac = mac::octets(target);

        packet[..SYNC_STREAM.len()].copy_from_slice(&SYNC_STREAM);
        for block in packet[SYNC_STREAM.len()..].chunks_exact_mut(MAC_LEN) {
            block.copy_from_slice(&mac);
        }

        Self(packet)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[async_trait]
pub trait MagicPacketSender {
    async fn send(&self, target: MacAddr, broadcast: Ipv4Addr, port: u16) -> Result<()>;
}

/// Sends the packet as a single UDP datagram with SO_BROADCAST set.
#[derive(Debug, Default)]
pub struct UdpSender;

impl UdpSender {
    async fn transmit(packet: &MagicPacket, dest: SocketAddrV4) -> io::Result<()> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_broadcast(true)?;

        let sent = socket.send_to(packet.as_bytes(), dest).await?;
        if sent != MAGIC_PACKET_LEN {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {sent} of {MAGIC_PACKET_LEN} bytes"),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl MagicPacketSender for UdpSender {
    async fn send(&self, target: MacAddr, broadcast: Ipv4Addr, port: u16) -> Result<()> {
        let packet = MagicPacket::new(target);
        let dest = SocketAddrV4::new(broadcast, port);

        log::debug!("sending {} byte magic packet for {} to {}", MAGIC_PACKET_LEN, target, dest);
        Self::transmit(&packet, dest)
            .await
            .map_err(Error::MagicPacketSendFailed)?;
        log::trace!("magic packet for {} sent", target);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn is_magic_packet_for(payload: &[u8], target: [u8; 6]) -> bool {
        if payload.len() != MAGIC_PACKET_LEN {
            return false;
        }

        let blocks: Vec<&[u8]> = payload.chunks(6).collect();
        blocks[0] == SYNC_STREAM && blocks[1..].iter().all(|b| *b == target)
    }

    #[test]
    fn test_packet_len() {
        assert_eq!(MAGIC_PACKET_LEN, 102);
    }

    #[test]
    fn test_packet_layout() {
        let target = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];
        let pkt = MagicPacket::new(MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff));
        let bytes = pkt.as_bytes();

        assert_eq!(bytes.len(), 102);
        assert_eq!(&bytes[..6], &[0xff; 6]);
        assert_eq!(bytes[6..].chunks(6).count(), MAC_REPEAT);
        assert!(bytes[6..].chunks(6).all(|b| b == target));
    }

    #[test]
    fn test_packet_all_ff_mac() {
        let pkt = MagicPacket::new(MacAddr::broadcast());
        assert!(pkt.as_bytes().iter().all(|b| *b == 0xff));
    }

    #[tokio::test]
    async fn test_udp_send_single_datagram() {
        let receiver = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = receiver.local_addr().unwrap().port();
        let target = mac::parse("AA:BB:CC:DD:EE:FF").unwrap();

        UdpSender.send(target, Ipv4Addr::LOCALHOST, port).await.unwrap();

        let mut buf = [0u8; 512];
        let (len, _) = tokio::time::timeout(Duration::from_secs(5), receiver.recv_from(&mut buf))
            .await
            .expect("no datagram received")
            .unwrap();

        assert_eq!(len, MAGIC_PACKET_LEN);
        assert!(is_magic_packet_for(&buf[..len], [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]));
    }

    #[tokio::test]
    async fn test_send_failure_is_wrapped() {
        // port 0 is not a valid destination
        let target = mac::parse("AA:BB:CC:DD:EE:FF").unwrap();
        let res = UdpSender.send(target, Ipv4Addr::LOCALHOST, 0).await;
        assert!(matches!(res, Err(Error::MagicPacketSendFailed(_))));
    }
}
