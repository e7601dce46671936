//! WhatsApp click-to-chat links.
//!
//! Link format as documented at
//! https://faq.whatsapp.com/iphone/how-to-link-to-whatsapp-from-a-different-app/?lang=en
//!
//! Full example: `https://wa.me/15551234567?text=I%27m%20interested`
//! Number only:  `https://wa.me/15551234567`
//! Text only:    `https://wa.me/?text=urlencodedtext`

const BASE_URL: &str = "https://wa.me/";

pub fn create_link(phone_number: &str, message: &str) -> String {
    let mut link = String::from(BASE_URL);
    let number: String = phone_number.chars().filter(|c| !c.is_whitespace()).collect();
    link.push_str(&path_escape(&number));
    if !message.is_empty() {
        link.push_str("?text=");
        link.push_str(&path_escape(message));
    }
    link
}

/// Percent-encode a string as a URL path segment.
///
/// Unreserved characters and the path-segment sub-delimiters stay as-is;
/// everything else is encoded byte-wise, so multi-byte UTF-8 (emoji in
/// reminder texts) comes out as one escape per byte.
fn path_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for byte in value.bytes() {
        let c = byte as char;
        if byte.is_ascii_alphanumeric() || "-_.~$&+,:;=@".contains(c) {
            escaped.push(c);
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_and_text() {
        assert_eq!(
            create_link("15551234567", "I'm interested in your car for sale"),
            "https://wa.me/15551234567?text=I%27m%20interested%20in%20your%20car%20for%20sale"
        );
    }

    #[test]
    fn test_empty_phone_number() {
        assert_eq!(
            create_link("", "I'm interested in your car for sale"),
            "https://wa.me/?text=I%27m%20interested%20in%20your%20car%20for%20sale"
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(create_link("15551234567", ""), "https://wa.me/15551234567");
    }

    #[test]
    fn test_both_empty() {
        assert_eq!(create_link("", ""), "https://wa.me/");
    }

    #[test]
    fn test_emoji_text() {
        assert_eq!(
            create_link("", "Hallo \u{1F609}"),
            "https://wa.me/?text=Hallo%20%F0%9F%98%89"
        );
    }

    #[test]
    fn test_whitespace_stripped_from_number() {
        assert_eq!(
            create_link(" +49\t123\r456\n78 9 ", "test"),
            "https://wa.me/+49123456789?text=test"
        );
    }
}
