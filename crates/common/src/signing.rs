//! Reply signing and verification.
//!
//! The digest is the lowercase hex SHA-256 of the canonical string described
//! in [`crate::canonical`]. Signing never fails: a missing secret signs with
//! the empty string. Verification only ever answers `true` or `false`; it
//! does not say why a reply was rejected.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::canonical::canonical_string;
use crate::constants::HASH_HEX_LEN;
use crate::failure::Failure;
use crate::reply::Reply;
use crate::secret_context::SecretContext;

/// Compute the signature digest of `reply` under `secret`.
///
/// The stored hash, if any, does not take part.
#[must_use]
pub fn compute_digest(reply: &Reply, secret: &str) -> String {
    let material = canonical_string(reply, secret);
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    hex::encode(hasher.finalize())
}

/// Sign `reply` with an explicit secret, replacing any previous hash.
pub fn sign_reply<'a>(reply: &'a mut Reply, secret: &str) -> &'a mut Reply {
    let digest = compute_digest(reply, secret);
    log::debug!("Signed reply with random {}", reply.random);
    reply.hash = Some(digest);
    reply
}

/// Check `reply` against the digest recomputed from its current fields.
///
/// Returns `false` for an unsigned reply, a wrong secret or any field that
/// changed after signing. The comparison runs in constant time.
#[must_use]
pub fn verify_reply(reply: &Reply, secret: &str) -> bool {
    let Some(transmitted) = reply.hash.as_deref() else {
        log::debug!("Rejected unsigned reply with random {}", reply.random);
        return false;
    };

    let computed = compute_digest(reply, secret);
    let valid = transmitted.len() == HASH_HEX_LEN
        && bool::from(computed.as_bytes().ct_eq(transmitted.as_bytes()));
    if !valid {
        log::debug!("Rejected reply with random {}", reply.random);
    }
    valid
}

impl Reply {
    /// Sign in place with an explicit secret.
    pub fn sign(&mut self, secret: &str) -> &mut Self {
        sign_reply(self, secret)
    }

    /// Sign and hand the reply back, for building and signing in one
    /// expression.
    #[must_use]
    pub fn signed(mut self, secret: &str) -> Self {
        sign_reply(&mut self, secret);
        self
    }

    /// Sign with the secret held by the request's context.
    pub fn sign_with_context(&mut self, context: &SecretContext) -> &mut Self {
        sign_reply(self, context.secret())
    }

    /// Verify against an explicit secret. Leaves the stored hash untouched.
    #[must_use]
    pub fn verify(&self, secret: &str) -> bool {
        verify_reply(self, secret)
    }

    /// Verify with the secret held by the request's context.
    #[must_use]
    pub fn verify_with_context(&self, context: &SecretContext) -> bool {
        verify_reply(self, context.secret())
    }

    /// [`Reply::success`], signed with the context's secret.
    #[must_use]
    pub fn success_and_sign(context: &SecretContext) -> Self {
        Self::success().signed(context.secret())
    }

    /// [`Reply::success_with`], signed with the context's secret.
    #[must_use]
    pub fn success_with_and_sign(
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
        context: &SecretContext,
    ) -> Self {
        Self::success_with(name, value).signed(context.secret())
    }

    /// [`Reply::error`], signed with the context's secret.
    #[must_use]
    pub fn error_and_sign(message: impl Into<String>, context: &SecretContext) -> Self {
        Self::error(message).signed(context.secret())
    }

    /// [`Reply::failure`], signed with the context's secret.
    #[must_use]
    pub fn failure_and_sign(failure: &Failure, context: &SecretContext) -> Self {
        Self::failure(failure).signed(context.secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::{json, Value};

    /// Simulate a transport hop that lets a receiver edit the JSON.
    fn tamper(reply: &Reply, edit: impl FnOnce(&mut Value)) -> Reply {
        let mut value = serde_json::to_value(reply).expect("should serialize");
        edit(&mut value);
        serde_json::from_value(value).expect("should deserialize")
    }

    fn signed_fixture() -> Reply {
        let mut reply = Reply::success_with("dummy", "foo");
        reply.add_result("shares", 12);
        reply.signed("mysecret")
    }

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        let reply: Reply = serde_json::from_value(json!({
            "success": true,
            "random": 0,
        }))
        .expect("should deserialize");

        // sha256("0{}true")
        let expected = hex::encode(Sha256::digest(b"0{}true"));
        let digest = compute_digest(&reply, "");
        assert_eq!(digest, expected);
        assert_eq!(digest.len(), HASH_HEX_LEN);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn unsigned_reply_has_no_hash_and_fails_verification() {
        let reply = Reply::success_with("dummy", "foo");
        assert!(reply.hash().is_none());
        assert!(!reply.verify("mysecret"));
        assert!(!reply.verify(""));
    }

    #[test]
    fn sign_then_verify_with_same_secret() {
        let reply = Reply::success_with("dummy", "foo").signed("mysecret");
        assert!(reply.hash().is_some());
        assert!(reply.verify("mysecret"));
    }

    #[test]
    fn verify_with_wrong_secret_fails() {
        let reply = Reply::success_with("dummy", "foo").signed("mysecret");
        assert!(!reply.verify("nosecrets"));
        assert!(reply.verify("mysecret"));
    }

    #[test]
    fn empty_secret_signs_and_verifies() {
        let reply = Reply::error("boom").signed("");
        assert!(reply.verify(""));
        assert!(!reply.verify("mysecret"));
    }

    #[test]
    fn repeated_verification_is_idempotent() {
        let reply = signed_fixture();
        let hash = reply.hash().map(str::to_string);

        assert!(reply.verify("mysecret"));
        assert_eq!(reply.hash().map(str::to_string), hash);
        assert!(reply.verify("mysecret"));
        assert_eq!(reply.hash().map(str::to_string), hash);

        assert!(!reply.verify("nosecrets"));
        assert_eq!(reply.hash().map(str::to_string), hash);
        assert!(!reply.verify("nosecrets"));
        assert!(reply.verify("mysecret"));
    }

    #[test]
    fn signing_is_deterministic() {
        let reply = signed_fixture();
        assert_eq!(
            compute_digest(&reply, "mysecret"),
            reply.hash().expect("should be signed")
        );

        let mut again = reply.clone();
        again.sign("mysecret");
        assert_eq!(again.hash(), reply.hash());
    }

    #[test]
    fn resigning_replaces_hash() {
        let mut reply = signed_fixture();
        let first = reply.hash().map(str::to_string);
        reply.sign("other");
        assert_ne!(reply.hash().map(str::to_string), first);
        assert!(reply.verify("other"));
        assert!(!reply.verify("mysecret"));
    }

    #[test]
    fn adding_result_after_signing_invalidates() {
        let mut reply = signed_fixture();
        reply.add_result("late", true);
        assert!(!reply.verify("mysecret"));
    }

    #[test]
    fn tampered_fields_fail_verification() {
        let reply = signed_fixture();
        assert!(tamper(&reply, |_| {}).verify("mysecret"));

        let flipped = tamper(&reply, |v| v["success"] = json!(false));
        assert!(!flipped.verify("mysecret"));

        let messaged = tamper(&reply, |v| v["message"] = json!("injected"));
        assert!(!messaged.verify("mysecret"));

        let edited = tamper(&reply, |v| v["results"]["dummy"] = json!("bar"));
        assert!(!edited.verify("mysecret"));

        let renonced = tamper(&reply, |v| v["random"] = json!(reply.random().wrapping_add(1)));
        assert!(!renonced.verify("mysecret"));
    }

    #[test]
    fn retyped_results_fail_verification() {
        let mut reply = Reply::success();
        reply.add_result("amount", 42);
        reply.add_result("ok", true);
        reply.add_result("note", Value::Null);
        let reply = reply.signed("mysecret");

        let retyped = tamper(&reply, |v| {
            v["results"]["amount"] = json!("42");
            v["results"]["ok"] = json!("true");
            v["results"]["note"] = json!("null");
        });
        assert!(!retyped.verify("mysecret"));

        let amount_only = tamper(&reply, |v| v["results"]["amount"] = json!("42"));
        assert!(!amount_only.verify("mysecret"));
    }

    #[test]
    fn forged_entry_split_fails_verification() {
        let reply = Reply::success_with("a", json!(["x, b=y"])).signed("mysecret");

        let forged = tamper(&reply, |v| {
            v["results"] = json!({ "a": "[\"x", "b": "y\"]" });
        });
        assert_eq!(forged.results().len(), 2);
        assert!(!forged.verify("mysecret"));
    }

    #[test]
    fn float_results_verify_after_json_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut samples = vec![916.680_838_648_638_7, 0.1, 1e-300, f64::MAX, f64::MIN_POSITIVE];
        samples.extend((0..2_000).map(|_| rng.gen::<f64>() * 1000.0));
        samples.extend(
            (0..2_000)
                .map(|_| f64::from_bits(rng.gen()))
                .filter(|x| x.is_finite()),
        );

        for x in samples {
            let reply = Reply::success_with("x", x).signed("mysecret");
            let json = reply.to_json().expect("should serialize");
            let parsed = Reply::from_json(&json).expect("should parse");
            assert!(parsed.verify("mysecret"), "{x} failed after round trip");
        }
    }

    #[test]
    fn malformed_hash_fails_verification() {
        let reply = signed_fixture();
        let short = tamper(&reply, |v| v["hash"] = json!("abc"));
        assert!(!short.verify("mysecret"));

        let upper = tamper(&reply, |v| {
            let hash = v["hash"].as_str().expect("hash string").to_uppercase();
            v["hash"] = json!(hash);
        });
        assert!(!upper.verify("mysecret"));
    }

    #[test]
    fn result_order_does_not_affect_signature() {
        let reply = signed_fixture();
        let reordered = tamper(&reply, |v| {
            let results = v["results"].as_object().expect("results object");
            let mut reversed = serde_json::Map::new();
            for (key, value) in results.iter().rev() {
                reversed.insert(key.clone(), value.clone());
            }
            v["results"] = Value::Object(reversed);
        });
        assert!(reordered.verify("mysecret"));
    }

    #[test]
    fn identical_content_signs_differently() {
        let a = Reply::success_with("dummy", "foo").signed("mysecret");
        let b = Reply::success_with("dummy", "foo").signed("mysecret");
        assert_ne!(a.random(), b.random());
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn context_secret_is_used_for_sign_and_verify() {
        let ctx = SecretContext::with_secret("mysecret");

        let reply = Reply::success_with_and_sign("foo", "bar", &ctx);
        assert!(!reply.verify("nosecrets"));
        assert!(reply.verify("mysecret"));
        assert!(reply.verify_with_context(&ctx));

        let other = SecretContext::with_secret("nosecrets");
        assert!(!reply.verify_with_context(&other));
    }

    #[test]
    fn unset_context_signs_with_empty_secret() {
        let ctx = SecretContext::new();
        let mut reply = Reply::success();
        reply.sign_with_context(&ctx);
        assert!(reply.verify(""));
    }

    #[test]
    fn child_context_verifies_parent_signature() {
        let mut parent = SecretContext::with_secret("A");
        let child = parent.spawn_child();
        let reply = Reply::error_and_sign("boom", &parent);

        parent.set_secret("B");
        assert!(reply.verify_with_context(&child));
        assert!(!reply.verify_with_context(&parent));
    }

    #[test]
    fn sign_and_construct_shortcuts() {
        let ctx = SecretContext::with_secret("mysecret");

        let plain = Reply::success_and_sign(&ctx);
        assert!(plain.is_successful() && plain.verify("mysecret"));

        let failed = Reply::failure_and_sign(&Failure::new("Timeout", "no answer"), &ctx);
        assert_eq!(failed.message(), Some("Timeout: no answer"));
        assert!(failed.verify_with_context(&ctx));
    }
}
