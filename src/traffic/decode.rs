use std::net::IpAddr;

use chrono::Utc;
use etherparse::{InternetSlice, LinkSlice, SlicedPacket, TransportSlice};

use crate::error::DecodeError;
use crate::traffic::model::{PacketRecord, RawFrame};

/// Turns a raw Ethernet frame into a `PacketRecord`.
///
/// Only the link layer is mandatory. Network addresses stay `None` for frames
/// without an IP header, and the protocol label falls back layer by layer.
pub fn extract(interface: &str, frame: &RawFrame) -> Result<PacketRecord, DecodeError> {
    let sliced = SlicedPacket::from_ethernet(&frame.data)
        .map_err(|e| DecodeError::Malformed(format!("{:?}", e)))?;

    let (src_mac, dst_mac, ether_type) = link_layer(&sliced).ok_or(DecodeError::NoLinkLayer)?;
    let (src_ip, dst_ip) = network_layer(&sliced).unzip();

    Ok(PacketRecord {
        interface: interface.to_string(),
        src_mac,
        dst_mac,
        src_ip,
        dst_ip,
        protocol: protocol_label(&sliced, ether_type).to_string(),
        length: frame.wire_len,
        captured_at: Utc::now(),
    })
}

fn link_layer(sliced: &SlicedPacket) -> Option<(String, String, u16)> {
    match &sliced.link {
        Some(LinkSlice::Ethernet2(eth)) => Some((
            format_mac(eth.source()),
            format_mac(eth.destination()),
            eth.ether_type(),
        )),
        None => None,
    }
}

fn network_layer(sliced: &SlicedPacket) -> Option<(IpAddr, IpAddr)> {
    match &sliced.ip {
        Some(InternetSlice::Ipv4(h, _)) => {
            Some((h.source_addr().into(), h.destination_addr().into()))
        }
        Some(InternetSlice::Ipv6(h, _)) => {
            Some((h.source_addr().into(), h.destination_addr().into()))
        }
        None => None,
    }
}

fn protocol_label(sliced: &SlicedPacket, ether_type: u16) -> &'static str {
    let has_payload = !sliced.payload.is_empty();

    match &sliced.transport {
        Some(TransportSlice::Tcp(tcp)) => {
            if has_payload {
                if let Some(app) = tcp_service(tcp.source_port(), tcp.destination_port()) {
                    return app;
                }
            }
            return "TCP";
        }
        Some(TransportSlice::Udp(udp)) => {
            if has_payload {
                if let Some(app) = udp_service(udp.source_port(), udp.destination_port()) {
                    return app;
                }
            }
            return "UDP";
        }
        Some(TransportSlice::Icmpv4(_)) => return "ICMP",
        Some(TransportSlice::Icmpv6(_)) => return "ICMPV6",
        Some(TransportSlice::Unknown(_)) | None => {}
    }

    match &sliced.ip {
        Some(InternetSlice::Ipv4(..)) => "IPV4",
        Some(InternetSlice::Ipv6(..)) => "IPV6",
        None => match ether_type {
            0x0806 => "ARP",
            0x88CC => "LLDP",
            0x888E => "EAPOL",
            _ => "ETH",
        },
    }
}

fn tcp_service(src: u16, dst: u16) -> Option<&'static str> {
    let lookup = |port| match port {
        22 => Some("SSH"),
        53 => Some("DNS"),
        80 | 8080 => Some("HTTP"),
        443 => Some("TLS"),
        445 => Some("SMB"),
        _ => None,
    };
    lookup(dst).or_else(|| lookup(src))
}

fn udp_service(src: u16, dst: u16) -> Option<&'static str> {
    let lookup = |port| match port {
        53 => Some("DNS"),
        67 | 68 => Some("DHCP"),
        123 => Some("NTP"),
        1900 => Some("SSDP"),
        5353 => Some("MDNS"),
        _ => None,
    };
    lookup(dst).or_else(|| lookup(src))
}

fn format_mac(bytes: [u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
    )
}
