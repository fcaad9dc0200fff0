use listenlens::countries::country_name;
use listenlens::utils::*;
use std::collections::HashSet;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // 64 random bytes in unpadded base64url
    assert_eq!(verifier.len(), 86);

    // Only unreserved characters allowed by RFC 7636
    assert!(
        verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    );

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge_matches_rfc_example() {
    // Appendix B of RFC 7636
    let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    let challenge = generate_code_challenge(verifier);

    assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
}

#[test]
fn test_generate_code_challenge_is_deterministic() {
    let verifier = generate_code_verifier();

    let challenge1 = generate_code_challenge(&verifier);
    let challenge2 = generate_code_challenge(&verifier);

    assert_eq!(challenge1, challenge2);
    // SHA-256 digest in unpadded base64url
    assert_eq!(challenge1.len(), 43);
    assert!(!challenge1.contains('='));
}

#[test]
fn test_generate_session_id_unique() {
    let ids: HashSet<String> = (0..50).map(|_| generate_session_id()).collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn test_release_year() {
    assert_eq!(release_year(Some("2019-05-17")), 2019);
    assert_eq!(release_year(Some("1987-03")), 1987);
    assert_eq!(release_year(Some("1971")), 1971);

    // Missing or malformed dates fall back to 1900
    assert_eq!(release_year(None), 1900);
    assert_eq!(release_year(Some("")), 1900);
    assert_eq!(release_year(Some("n/a")), 1900);
    assert_eq!(release_year(Some("19")), 1900);
}

#[test]
fn test_escape_html() {
    assert_eq!(
        escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
        "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
    );
    assert_eq!(escape_html("Sigur Rós"), "Sigur Rós");
}

#[test]
fn test_sanitize_path_segment() {
    assert_eq!(sanitize_path_segment("user_01-a.b"), "user_01-a.b");
    assert_eq!(sanitize_path_segment("../../etc/passwd"), "_.._etc_passwd");
    assert_eq!(sanitize_path_segment("..hidden"), "hidden");
    assert_eq!(sanitize_path_segment("a b/c"), "a_b_c");
}

#[test]
fn test_country_name() {
    assert_eq!(country_name("DE"), Some("Germany"));
    assert_eq!(country_name("us"), Some("United States"));
    assert_eq!(country_name("XX"), None);
    assert_eq!(country_name(""), None);
}
