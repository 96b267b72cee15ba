#[cfg(test)]
mod tests {
    use crate::state::{StateError, StateSigner};

    const NOW: i64 = 1_714_000_000;

    #[test]
    fn signed_state_identifies_the_user() {
        let signer = StateSigner::new("secret", 600);
        let token = signer.sign_at("alice", NOW).unwrap();
        assert_eq!(signer.verify_at(&token, NOW + 10).unwrap(), "alice");
    }

    #[test]
    fn state_from_another_secret_is_rejected() {
        let token = StateSigner::new("secret", 600).sign_at("alice", NOW).unwrap();
        let other = StateSigner::new("other-secret", 600);
        assert_eq!(other.verify_at(&token, NOW), Err(StateError::BadSignature));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let signer = StateSigner::new("secret", 600);
        let token = signer.sign_at("alice", NOW).unwrap();
        let forged_payload = signer
            .sign_at("mallory", NOW)
            .unwrap()
            .split_once('.')
            .map(|(payload, _)| payload.to_string())
            .unwrap();
        let signature = token.split_once('.').unwrap().1;
        let forged = format!("{}.{}", forged_payload, signature);
        assert_eq!(signer.verify_at(&forged, NOW), Err(StateError::BadSignature));
    }

    #[test]
    fn expired_state_is_rejected() {
        let signer = StateSigner::new("secret", 600);
        let token = signer.sign_at("alice", NOW).unwrap();
        assert!(signer.verify_at(&token, NOW + 600).is_ok());
        assert_eq!(signer.verify_at(&token, NOW + 601), Err(StateError::Expired));
        assert_eq!(signer.verify_at(&token, NOW - 3600), Err(StateError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        let signer = StateSigner::new("secret", 600);
        assert_eq!(signer.verify_at("no-dot-here", NOW), Err(StateError::Malformed));
        assert_eq!(signer.verify_at("abc.not-hex", NOW), Err(StateError::Malformed));
    }
}
