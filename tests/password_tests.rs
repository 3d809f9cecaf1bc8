use snippetbox::password;

// Hashing runs off the runtime thread, so it must also work on a
// single-threaded runtime.
#[tokio::test(flavor = "current_thread")]
async fn test_hash_and_verify_on_current_thread_runtime() {
    let hashed = password::hash("pa55word-long").await.unwrap();

    assert!(hashed.starts_with("$argon2"));
    assert!(password::verify("pa55word-long", &hashed).await.unwrap());
    assert!(!password::verify("wrong-password", &hashed).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_hashes_use_distinct_salts() {
    let (first, second) = tokio::join!(
        password::hash("pa55word-long"),
        password::hash("pa55word-long")
    );

    assert_ne!(first.unwrap(), second.unwrap());
}

#[tokio::test]
async fn test_malformed_hash_is_an_error() {
    assert!(password::verify("pa55word-long", "not-a-hash").await.is_err());
}
