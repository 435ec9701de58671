use crate::command::CommandError;
use trust_dns_proto::rr::Name;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 253;

/// Parse a user supplied domain into a query [`Name`].
///
/// Non-ASCII labels are IDNA encoded one at a time. Structure and length are judged on the
/// resulting punycode name, so only a label that can't be mapped at all is an encoding error.
pub fn parse_domain(domain: &str) -> Result<Name, CommandError> {
    let ascii = if domain.is_ascii() {
        domain.to_string()
    } else {
        to_ascii(domain)?
    };
    if !is_domain_name(&ascii) {
        return Err(CommandError::InvalidDomain(domain.to_string()));
    }
    Name::from_ascii(&ascii).map_err(|_| CommandError::InvalidDomain(domain.to_string()))
}

fn to_ascii(domain: &str) -> Result<String, CommandError> {
    let (labels, root) = match domain.strip_suffix('.') {
        Some(labels) => (labels, "."),
        None => (domain, ""),
    };
    if labels.is_empty() || labels.split('.').any(str::is_empty) {
        return Err(CommandError::InvalidDomain(domain.to_string()));
    }
    let encoded = labels
        .split('.')
        .map(|label| {
            if label.is_ascii() {
                return Ok(label.to_string());
            }
            // NB: lengths are checked after encoding, by is_domain_name.
            idna::Config::default()
                .use_std3_ascii_rules(true)
                .transitional_processing(true)
                .verify_dns_length(false)
                .to_ascii(label)
                .map_err(|source| CommandError::EncodeDomain {
                    domain: domain.to_string(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encoded.join(".") + root)
}

/// Letters, digits and hyphens in non-empty dot separated labels. One trailing dot is allowed.
fn is_domain_name(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_empty() || domain.len() > MAX_NAME_LEN {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_host_names() {
        for domain in [
            "example.com",
            "EXAMPLE.com",
            "example.com.",
            "localhost",
            "a-b.c-d.example",
            "1.1.1.1",
            "xn--bcher-kva.de",
        ] {
            assert!(parse_domain(domain).is_ok(), "{domain} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for domain in [
            "not a domain!!",
            "not_a_domain!!",
            "example..com",
            ".example.com",
            ".",
            "",
            "exa mple.com",
            "example.com..",
        ] {
            assert!(
                matches!(parse_domain(domain), Err(CommandError::InvalidDomain(d)) if d == domain),
                "{domain:?} should be invalid"
            );
        }
    }

    #[test]
    fn enforces_label_length() {
        let ok = format!("{}.com", "a".repeat(MAX_LABEL_LEN));
        let too_long = format!("{}.com", "a".repeat(MAX_LABEL_LEN + 1));
        assert!(parse_domain(&ok).is_ok());
        assert!(matches!(
            parse_domain(&too_long),
            Err(CommandError::InvalidDomain(_))
        ));
    }

    #[test]
    fn enforces_name_length() {
        let label = "a".repeat(MAX_LABEL_LEN);
        let too_long = [label.as_str(); 5].join(".");
        assert!(too_long.len() > MAX_NAME_LEN);
        assert!(matches!(
            parse_domain(&too_long),
            Err(CommandError::InvalidDomain(_))
        ));
    }

    #[test]
    fn encodes_internationalized_names() {
        let name = parse_domain("bücher.de").unwrap();
        assert_eq!(name.to_ascii(), "xn--bcher-kva.de");
    }

    #[test]
    fn encodes_internationalized_fqdn() {
        let name = parse_domain("bücher.de.").unwrap();
        assert!(name.is_fqdn());
        assert_eq!(name.to_ascii(), "xn--bcher-kva.de.");
    }

    #[test]
    fn malformed_internationalized_names_are_invalid() {
        let long_label = format!("{}.de", "ü".repeat(70));
        for domain in [
            "bücher..de",
            ".bücher.de",
            "bücher.de..",
            long_label.as_str(),
            "bücher.a_b",
        ] {
            assert!(
                matches!(parse_domain(domain), Err(CommandError::InvalidDomain(d)) if d == domain),
                "{domain:?} should be invalid"
            );
        }
    }

    #[test]
    fn unmappable_labels_fail_to_encode() {
        assert!(matches!(
            parse_domain("bücher!.de"),
            Err(CommandError::EncodeDomain { domain, .. }) if domain == "bücher!.de"
        ));
    }
}
