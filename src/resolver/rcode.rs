//! Human readable DNS response codes.

use lazy_static::lazy_static;
use std::collections::HashMap;
use trust_dns_proto::op::ResponseCode;

lazy_static! {
    static ref RESPONSE_CODE_MESSAGES: HashMap<u16, &'static str> = HashMap::from([
        (u16::from(ResponseCode::FormErr), "Format error"),
        (u16::from(ResponseCode::ServFail), "Server failure"),
        (u16::from(ResponseCode::NXDomain), "Non-Existent domain"),
    ]);
}

/// Describe a non-successful response code. Returns `None` for `NOERROR`.
pub fn describe(code: ResponseCode) -> Option<String> {
    if code == ResponseCode::NoError {
        return None;
    }
    let code = u16::from(code);
    match RESPONSE_CODE_MESSAGES.get(&code) {
        Some(message) => Some((*message).to_string()),
        None => {
            tracing::warn!("non-common response code from DNS server: {code}");
            Some(format!("unknown response code ({code})"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_description() {
        assert_eq!(describe(ResponseCode::NoError), None);
    }

    #[test]
    fn known_codes() {
        assert_eq!(describe(ResponseCode::FormErr).unwrap(), "Format error");
        assert_eq!(describe(ResponseCode::ServFail).unwrap(), "Server failure");
        assert_eq!(
            describe(ResponseCode::NXDomain).unwrap(),
            "Non-Existent domain"
        );
    }

    #[test]
    fn every_failure_code_is_described() {
        for value in 1..=4095_u16 {
            let code: ResponseCode = value.into();
            let description = describe(code).unwrap();
            assert!(!description.is_empty());
        }
        assert_eq!(
            describe(ResponseCode::Refused).unwrap(),
            "unknown response code (5)"
        );
        assert_eq!(
            describe(ResponseCode::NotImp).unwrap(),
            "unknown response code (4)"
        );
    }
}
