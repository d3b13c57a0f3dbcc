//! Tests for webhook message authentication.

use super::*;
use crate::auth::StaticSecretProvider;
use std::sync::Arc;

const TEST_SECRET: &str = "whsec_test123";
const PURCHASE_PAYLOAD: &[u8] = br#"{"type":"purchase.completed"}"#;

/// HMAC-SHA256("whsec_test123", `{"type":"purchase.completed"}`), hex encoded.
const PURCHASE_SIGNATURE: &str =
    "94655f089ba1437dd98593cda5a8512762099bc52b01ec01b7679a3dfb5bef2d";

fn authenticator() -> MessageAuthenticator {
    MessageAuthenticator::new(TEST_SECRET).expect("test secret is valid")
}

/// Replace the final character of a signature with a different hex digit.
fn flip_last_char(signature: &str) -> String {
    let mut flipped = signature[..signature.len() - 1].to_string();
    let last = signature.chars().last().unwrap();
    flipped.push(if last == '0' { '1' } else { '0' });
    flipped
}

// ============================================================================
// Construction
// ============================================================================

mod construction_tests {
    use super::*;

    #[test]
    fn test_empty_secret_fails_at_construction() {
        let result = MessageAuthenticator::new("");
        assert!(matches!(result, Err(ConfigError::EmptySecret { .. })));
    }

    #[test]
    fn test_empty_byte_secret_fails_at_construction() {
        let result = MessageAuthenticator::new(Vec::<u8>::new());
        assert!(matches!(result, Err(ConfigError::EmptySecret { .. })));
    }

    #[test]
    fn test_from_secret_matches_new() {
        let secret = WebhookSecret::new(TEST_SECRET).unwrap();
        let from_secret = MessageAuthenticator::from_secret(&secret).unwrap();

        assert_eq!(from_secret.sign(PURCHASE_PAYLOAD), PURCHASE_SIGNATURE);
    }

    #[test]
    fn test_from_provider_uses_provider_secret() {
        let provider = StaticSecretProvider::new()
            .with_webhook_secret(WebhookSecret::new(TEST_SECRET).unwrap());

        let authenticator =
            tokio_test::block_on(MessageAuthenticator::from_provider(&provider)).unwrap();

        assert_eq!(authenticator.sign(PURCHASE_PAYLOAD), PURCHASE_SIGNATURE);
    }

    /// A provider without a secret must fail construction, not yield an
    /// authenticator that accepts anything.
    #[tokio::test]
    async fn test_from_provider_without_secret_fails() {
        let provider = StaticSecretProvider::new();

        let result = MessageAuthenticator::from_provider(&provider).await;

        assert!(matches!(result, Err(ConfigError::Secret(_))));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let debug = format!("{:?}", authenticator());
        assert!(!debug.contains(TEST_SECRET));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_authenticator_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone + 'static>() {}
        assert_traits::<MessageAuthenticator>();
    }
}

// ============================================================================
// Signing
// ============================================================================

mod sign_tests {
    use super::*;

    #[test]
    fn test_sign_matches_golden_value() {
        assert_eq!(authenticator().sign(PURCHASE_PAYLOAD), PURCHASE_SIGNATURE);
    }

    #[test]
    fn test_sign_is_deterministic() {
        let auth = authenticator();
        let first = auth.sign(PURCHASE_PAYLOAD);
        for _ in 0..10 {
            assert_eq!(auth.sign(PURCHASE_PAYLOAD), first);
        }
    }

    #[test]
    fn test_sign_output_is_fixed_length_lowercase_hex() {
        let auth = authenticator();
        let large = vec![b'x'; 1024 * 1024];
        let payloads: [&[u8]; 4] = [b"", b"a", PURCHASE_PAYLOAD, &large];

        for payload in payloads {
            let signature = auth.sign(payload);
            assert_eq!(signature.len(), SIGNATURE_HEX_LEN);
            assert!(signature
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_sign_empty_payload() {
        assert_eq!(
            authenticator().sign(b""),
            "1b816c061265294d887f9d790208a6615a63cc59fbb55f291357fce51736d6c3"
        );
    }

    #[test]
    fn test_different_secrets_produce_different_signatures() {
        let first = MessageAuthenticator::new("secret-one").unwrap();
        let second = MessageAuthenticator::new("secret-two").unwrap();

        assert_ne!(first.sign(PURCHASE_PAYLOAD), second.sign(PURCHASE_PAYLOAD));
    }

    /// Key bytes are opaque: a non-UTF-8 secret works and differs from its
    /// lossy string form.
    #[test]
    fn test_binary_secret_is_supported() {
        let binary = MessageAuthenticator::new([0xffu8, 0xfe, 0x00, 0x01]).unwrap();
        let lossy = MessageAuthenticator::new("\u{fffd}\u{fffd}\u{0}\u{1}").unwrap();

        assert_ne!(binary.sign(PURCHASE_PAYLOAD), lossy.sign(PURCHASE_PAYLOAD));
    }
}

// ============================================================================
// Verification
// ============================================================================

mod verify_tests {
    use super::*;

    #[test]
    fn test_verify_accepts_own_signature() {
        let auth = authenticator();
        let signature = auth.sign(PURCHASE_PAYLOAD);
        assert!(auth.verify(PURCHASE_PAYLOAD, &signature));
    }

    #[test]
    fn test_verify_accepts_golden_signature() {
        assert!(authenticator().verify(PURCHASE_PAYLOAD, PURCHASE_SIGNATURE));
    }

    #[test]
    fn test_verify_rejects_flipped_last_character() {
        let tampered = flip_last_char(PURCHASE_SIGNATURE);
        assert!(!authenticator().verify(PURCHASE_PAYLOAD, &tampered));
    }

    #[test]
    fn test_verify_rejects_empty_signature() {
        assert!(!authenticator().verify(PURCHASE_PAYLOAD, ""));
    }

    #[test]
    fn test_verify_rejects_uppercase_signature() {
        let upper = PURCHASE_SIGNATURE.to_uppercase();
        assert!(!authenticator().verify(PURCHASE_PAYLOAD, &upper));
    }

    #[test]
    fn test_verify_rejects_truncated_signature() {
        let truncated = &PURCHASE_SIGNATURE[..SIGNATURE_HEX_LEN - 1];
        assert!(!authenticator().verify(PURCHASE_PAYLOAD, truncated));
    }

    /// A candidate that starts with the full correct signature but carries
    /// extra characters must not match.
    #[test]
    fn test_verify_rejects_overlong_signature() {
        let overlong = format!("{}00", PURCHASE_SIGNATURE);
        assert!(!authenticator().verify(PURCHASE_PAYLOAD, &overlong));
    }

    #[test]
    fn test_verify_rejects_prefixed_signature() {
        let prefixed = format!("sha256={}", PURCHASE_SIGNATURE);
        assert!(!authenticator().verify(PURCHASE_PAYLOAD, &prefixed));
    }

    #[test]
    fn test_verify_rejects_malformed_input_without_panicking() {
        let auth = authenticator();
        let malformed = [
            "not-hex-at-all",
            "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz",
            "\u{1F600}\u{1F600}",
            " ",
            "\0",
        ];

        for candidate in malformed {
            assert!(!auth.verify(PURCHASE_PAYLOAD, candidate), "{:?}", candidate);
        }
    }

    /// Every single-byte mutation of the payload must invalidate the signature.
    #[test]
    fn test_verify_detects_every_single_byte_mutation() {
        let auth = authenticator();

        for index in 0..PURCHASE_PAYLOAD.len() {
            let mut mutated = PURCHASE_PAYLOAD.to_vec();
            mutated[index] ^= 0x01;
            assert!(
                !auth.verify(&mutated, PURCHASE_SIGNATURE),
                "mutation at byte {} was not detected",
                index
            );
        }
    }

    /// Re-serializing the JSON changes the bytes and must not verify.
    #[test]
    fn test_verify_requires_raw_bytes() {
        let auth = authenticator();
        let reencoded = br#"{ "type": "purchase.completed" }"#;

        assert!(!auth.verify(reencoded, PURCHASE_SIGNATURE));
    }

    /// Simulates key rotation between signing and verifying.
    #[test]
    fn test_signature_fails_after_secret_rotation() {
        let before = authenticator();
        let signature = before.sign(PURCHASE_PAYLOAD);

        let after = MessageAuthenticator::new("whsec_rotated456").unwrap();

        assert!(!after.verify(PURCHASE_PAYLOAD, &signature));
        assert_eq!(
            after.sign(PURCHASE_PAYLOAD),
            "e279d72d7c144665de112d8fc7cd82483ba2209a9d87e316db5b19736b459ed3"
        );
    }

    #[test]
    fn test_concurrent_verification_shares_one_instance() {
        let auth = Arc::new(authenticator());

        let workers: Vec<_> = (0..8)
            .map(|i| {
                let auth = Arc::clone(&auth);
                std::thread::spawn(move || {
                    let payload = format!(r#"{{"type":"payout.processed","n":{}}}"#, i);
                    let signature = auth.sign(payload.as_bytes());
                    auth.verify(payload.as_bytes(), &signature)
                        && auth.verify(PURCHASE_PAYLOAD, PURCHASE_SIGNATURE)
                })
            })
            .collect();

        for worker in workers {
            assert!(worker.join().unwrap());
        }
    }
}

// ============================================================================
// Constant-time comparison
// ============================================================================

mod constant_time_tests {
    use super::*;

    #[test]
    fn test_equal_inputs_match() {
        assert!(constant_time_eq(
            PURCHASE_SIGNATURE.as_bytes(),
            PURCHASE_SIGNATURE.as_bytes()
        ));
    }

    /// Differences at the first, a middle, and the last position are all
    /// detected by the same full-length comparison.
    #[test]
    fn test_mismatch_detected_at_any_position() {
        for position in [0, SIGNATURE_HEX_LEN / 2, SIGNATURE_HEX_LEN - 1] {
            let mut candidate = PURCHASE_SIGNATURE.as_bytes().to_vec();
            candidate[position] = if candidate[position] == b'0' { b'1' } else { b'0' };

            assert!(!constant_time_eq(PURCHASE_SIGNATURE.as_bytes(), &candidate));
        }
    }

    /// A shorter candidate padded with zeros must not match an expected value
    /// that happens to end in the padding byte.
    #[test]
    fn test_padding_never_produces_a_match() {
        let mut expected = PURCHASE_SIGNATURE.as_bytes().to_vec();
        expected[SIGNATURE_HEX_LEN - 1] = 0;
        let candidate = &expected[..SIGNATURE_HEX_LEN - 1];

        assert!(!constant_time_eq(&expected, candidate));
    }
}
