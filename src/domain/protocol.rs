//! IP protocol number registry.
//!
//! Maps IPv4 protocol / IPv6 next-header codes to display names.

use pnet::packet::ip::IpNextHeaderProtocols;

use crate::diagnostics::{Diagnostic, DiagnosticSink, NetworkKind};

/// Protocol codes the decoders care about.
pub mod codes {
    use super::IpNextHeaderProtocols;

    pub const HOPOPT: u8 = IpNextHeaderProtocols::Hopopt.0;
    pub const ICMP: u8 = IpNextHeaderProtocols::Icmp.0;
    pub const IGMP: u8 = IpNextHeaderProtocols::Igmp.0;
    pub const TCP: u8 = IpNextHeaderProtocols::Tcp.0;
    pub const UDP: u8 = IpNextHeaderProtocols::Udp.0;
    pub const IPV6: u8 = IpNextHeaderProtocols::Ipv6.0;
    pub const IPV6_ROUTE: u8 = IpNextHeaderProtocols::Ipv6Route.0;
    pub const IPV6_FRAG: u8 = IpNextHeaderProtocols::Ipv6Frag.0;
    pub const GRE: u8 = IpNextHeaderProtocols::Gre.0;
    pub const ESP: u8 = IpNextHeaderProtocols::Esp.0;
    pub const AH: u8 = IpNextHeaderProtocols::Ah.0;
    pub const ICMPV6: u8 = IpNextHeaderProtocols::Icmpv6.0;
    pub const IPV6_NO_NXT: u8 = IpNextHeaderProtocols::Ipv6NoNxt.0;
    pub const IPV6_OPTS: u8 = IpNextHeaderProtocols::Ipv6Opts.0;
    pub const SCTP: u8 = IpNextHeaderProtocols::Sctp.0;
}

/// Name shown for codes missing from the table.
pub const UNKNOWN: &str = "unknown";

/// Look up the display name for a protocol code.
///
/// Besides the base table (icmp, igmp, tcp, udp, ipv6) this names the codes
/// an IPv6 extension walk can end on: gre, esp, ah, icmpv6, none (59) and
/// sctp. Everything else is `None`.
pub fn lookup(code: u8) -> Option<&'static str> {
    let name = match code {
        codes::ICMP => "icmp",
        codes::IGMP => "igmp",
        codes::TCP => "tcp",
        codes::UDP => "udp",
        codes::IPV6 => "ipv6",
        codes::GRE => "gre",
        codes::ESP => "esp",
        codes::AH => "ah",
        codes::ICMPV6 => "icmpv6",
        codes::IPV6_NO_NXT => "none",
        codes::SCTP => "sctp",
        _ => return None,
    };
    Some(name)
}

/// Display name for a protocol code, warning through `sink` when unknown.
pub fn display_name(code: u8, network: NetworkKind, sink: &dyn DiagnosticSink) -> &'static str {
    match lookup(code) {
        Some(name) => name,
        None => {
            sink.emit(Diagnostic::UnknownProtocol { code, network });
            UNKNOWN
        }
    }
}

/// Whether the transport header starts with 16-bit source and destination ports.
pub fn has_ports(code: u8) -> bool {
    matches!(code, codes::TCP | codes::UDP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    #[test]
    fn test_fixed_table() {
        assert_eq!(lookup(1), Some("icmp"));
        assert_eq!(lookup(2), Some("igmp"));
        assert_eq!(lookup(6), Some("tcp"));
        assert_eq!(lookup(17), Some("udp"));
        assert_eq!(lookup(41), Some("ipv6"));
        assert_eq!(lookup(58), Some("icmpv6"));
    }

    #[test]
    fn test_unknown_code_warns_once() {
        let sink = CollectingSink::new();

        let name = display_name(253, NetworkKind::Ipv4, &sink);

        assert_eq!(name, UNKNOWN);
        assert_eq!(
            sink.take(),
            vec![Diagnostic::UnknownProtocol {
                code: 253,
                network: NetworkKind::Ipv4
            }]
        );
    }

    #[test]
    fn test_extended_codes_are_named() {
        let sink = CollectingSink::new();

        for (code, name) in [
            (47, "gre"),
            (50, "esp"),
            (51, "ah"),
            (58, "icmpv6"),
            (59, "none"),
            (132, "sctp"),
        ] {
            assert_eq!(display_name(code, NetworkKind::Ipv6, &sink), name);
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_codes_outside_both_tables_warn() {
        let sink = CollectingSink::new();

        for code in [0, 3, 253, 255] {
            assert_eq!(lookup(code), None);
            assert_eq!(display_name(code, NetworkKind::Ipv6, &sink), UNKNOWN);
        }
        assert_eq!(sink.len(), 4);
    }

    #[test]
    fn test_known_code_is_silent() {
        let sink = CollectingSink::new();

        assert_eq!(display_name(codes::UDP, NetworkKind::Ipv6, &sink), "udp");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_has_ports() {
        assert!(has_ports(codes::TCP));
        assert!(has_ports(codes::UDP));
        assert!(!has_ports(codes::ICMP));
        assert!(!has_ports(codes::SCTP));
    }
}
