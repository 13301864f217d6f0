//! Format predicates backed by lazily compiled patterns.

use regex::Regex;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

macro_rules! pattern {
    ($(#[$meta:meta])* $name:ident => $re:expr) => {
        $(#[$meta])*
        pub(crate) fn $name() -> &'static Regex {
            static CELL: OnceLock<Regex> = OnceLock::new();
            CELL.get_or_init(|| Regex::new($re).expect("built-in pattern compiles"))
        }
    };
}

pattern!(alpha => r"^[a-zA-Z]+$");
pattern!(alpha_dash => r"^[a-zA-Z0-9_-]+$");
pattern!(alpha_space => r"^[-a-zA-Z0-9_ ]+$");
pattern!(alpha_numeric => r"^[a-zA-Z0-9]+$");
pattern!(
    /// Visa, MasterCard, American Express, Diners Club, Discover and JCB.
    credit_card => r"^(?:4[0-9]{12}(?:[0-9]{3})?|[25][1-7][0-9]{14}|6(?:011|5[0-9][0-9])[0-9]{12}|3[47][0-9]{13}|3(?:0[0-5]|[68][0-9])[0-9]{11}|(?:2131|1800|35[0-9]{3})[0-9]{11})$"
);
pattern!(latitude => r"^[-+]?([1-8]?[0-9](\.[0-9]+)?|90(\.0+)?)$");
pattern!(longitude => r"^[-+]?(180(\.0+)?|((1[0-7][0-9])|([1-9]?[0-9]))(\.[0-9]+)?)$");
pattern!(
    coordinate => r"^[-+]?([1-8]?[0-9](\.[0-9]+)?|90(\.0+)?),\s*[-+]?(180(\.0+)?|((1[0-7][0-9])|([1-9]?[0-9]))(\.[0-9]+)?)$"
);
pattern!(
    css_color => r"(?i)^(#([0-9a-f]{3}){1,2}|(rgb|hsl)a\(([0-9]{1,3}%?,\s?){3}(1|0?\.[0-9]+)\)|(rgb|hsl)\([0-9]{1,3}%?(,\s?[0-9]{1,3}%?){2}\))$"
);
pattern!(
    /// `yyyy-mm-dd` or `yyyy/mm/dd`, leap days included.
    date_ymd => r"^(((19|20)([2468][048]|[13579][26]|0[48])|2000)[/-]02[/-]29|((19|20)[0-9]{2}[/-](0[469]|11)[/-](0[1-9]|[12][0-9]|30)|(19|20)[0-9]{2}[/-](0[13578]|1[02])[/-](0[1-9]|[12][0-9]|3[01])|(19|20)[0-9]{2}[/-]02[/-](0[1-9]|1[0-9]|2[0-8])))$"
);
pattern!(date_dmy => r"^(0?[1-9]|[12][0-9]|3[01])[/-](0?[1-9]|1[012])[/-][0-9]{4}$");
pattern!(
    email => r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
);
pattern!(float => r"^[+-]?([0-9]*\.?[0-9]+|[0-9]+\.?[0-9]*)([eE][+-]?[0-9]+)?$");
pattern!(mac_address => r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$");
pattern!(numeric => r"^[-+]?[0-9]+$");
pattern!(digits => r"^[0-9]+$");
pattern!(
    url => r"^((ftp|tcp|udp|wss?|https?)://)?(\S+(:\S*)?@)?(\[[0-9a-fA-F:.]+\]|localhost|[0-9]{1,3}(\.[0-9]{1,3}){3}|([a-zA-Z0-9\x{00a1}-\x{ffff}][a-zA-Z0-9\x{00a1}-\x{ffff}_-]*\.)+[a-zA-Z\x{00a1}-\x{ffff}]{2,})(:[0-9]{1,5})?(/[^\s?#]*)?(\?[^\s#]*)?(#\S*)?$"
);
pattern!(uuid => r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$");
pattern!(uuid_v3 => r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-3[0-9a-f]{3}-[0-9a-f]{4}-[0-9a-f]{12}$");
pattern!(uuid_v4 => r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$");
pattern!(uuid_v5 => r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-5[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$");

pub(crate) fn is_boolean(s: &str) -> bool {
    matches!(
        s,
        "1" | "0" | "t" | "f" | "T" | "F" | "true" | "false" | "TRUE" | "FALSE" | "True" | "False"
    )
}

pub(crate) fn is_json(s: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(s).is_ok()
}

pub(crate) fn is_ip(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}

pub(crate) fn is_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

pub(crate) fn is_ipv6(s: &str) -> bool {
    s.parse::<Ipv6Addr>().is_ok()
}
