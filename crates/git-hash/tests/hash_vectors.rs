use git_hash::hasher::Hasher;
use git_hash::ObjectId;

// ── SHA-1 raw digest test vectors ───────────────────────────────────

#[test]
fn sha1_empty_string() {
    let oid = Hasher::digest(b"").unwrap();
    assert_eq!(oid.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
}

#[test]
fn sha1_hello_world() {
    let oid = Hasher::digest(b"hello world").unwrap();
    assert_eq!(oid.to_hex(), "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed");
}

// ── git hash-object compatible test vectors ──────────────────────────
// These match `git hash-object --stdin` output.
// git prepends "blob <len>\0" to the content before hashing.

#[test]
fn git_hash_object_empty_blob() {
    let oid = Hasher::hash_object("blob", b"").unwrap();
    assert_eq!(oid.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
}

#[test]
fn git_hash_object_hello_world() {
    let oid = Hasher::hash_object("blob", b"hello world").unwrap();
    assert_eq!(oid.to_hex(), "95d09f2b10159347eece71399a7e2e907ea3df4f");
}

#[test]
fn git_hash_object_hello_world_newline() {
    let oid = Hasher::hash_object("blob", b"Hello, World!\n").unwrap();
    assert_eq!(oid.to_hex(), "8ab686eafeb1f44702738c8b0f24f2567c36da6d");
}

// ── Streaming hash (multi-chunk) ────────────────────────────────────

#[test]
fn streaming_matches_oneshot() {
    let data = b"the quick brown fox jumps over the lazy dog";
    let oneshot = Hasher::digest(data).unwrap();

    let mut hasher = Hasher::new();
    hasher.update(&data[..10]);
    hasher.update(&data[10..20]);
    hasher.update(&data[20..]);
    let streamed = hasher.finalize().unwrap();

    assert_eq!(oneshot, streamed);
}

// ── Write trait usage ───────────────────────────────────────────────

#[test]
fn write_trait() {
    use std::io::Write;

    let data = b"hello world";
    let expected = Hasher::digest(data).unwrap();

    let mut hasher = Hasher::new();
    hasher.write_all(data).unwrap();
    let result = hasher.finalize().unwrap();

    assert_eq!(expected, result);
}

// ── git object types ────────────────────────────────────────────────

#[test]
fn hash_object_tree_type() {
    let data = b"some content";
    let blob = Hasher::hash_object("blob", data).unwrap();
    let tree = Hasher::hash_object("tree", data).unwrap();
    let commit = Hasher::hash_object("commit", data).unwrap();

    assert_ne!(blob, tree);
    assert_ne!(blob, commit);
    assert_ne!(tree, commit);
}

// ── ObjectId from hash result ───────────────────────────────────────

#[test]
fn hash_result_display_parse_roundtrip() {
    let oid = Hasher::hash_object("blob", b"test content").unwrap();
    let hex = oid.to_string();
    let parsed: ObjectId = hex.parse().unwrap();
    assert_eq!(oid, parsed);
}
