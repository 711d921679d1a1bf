//! Parse compatibility tests — verify parsing of real-world config patterns.

use bstr::BStr;
use git_config::{ConfigFile, ConfigKey, ConfigScope};

#[test]
fn parse_typical_git_config() {
    let input = b"\
[core]
\trepositoryformatversion = 0
\tfilemode = true
\tbare = false
\tlogallrefupdates = true
[remote \"origin\"]
\turl = https://github.com/user/repo.git
\tfetch = +refs/heads/*:refs/remotes/origin/*
[branch \"main\"]
\tremote = origin
\tmerge = refs/heads/main
[user]
\tname = Alice
\temail = alice@example.com
";
    let file = ConfigFile::parse(input, None, ConfigScope::Local).unwrap();

    let key = ConfigKey::parse("core.bare").unwrap();
    assert_eq!(file.get(&key), Some(Some(BStr::new("false"))));

    let key = ConfigKey::parse("remote.origin.url").unwrap();
    assert_eq!(
        file.get(&key),
        Some(Some(BStr::new("https://github.com/user/repo.git")))
    );

    let key = ConfigKey::parse("user.name").unwrap();
    assert_eq!(file.get(&key), Some(Some(BStr::new("Alice"))));

    let key = ConfigKey::parse("branch.main.remote").unwrap();
    assert_eq!(file.get(&key), Some(Some(BStr::new("origin"))));
}

#[test]
fn parse_config_all_comment_styles() {
    let input = b"\
# Hash comment
; Semicolon comment
[section]
\tkey = value # Inline hash
\tkey2 = value2 ; Inline semicolon
\tkey3 = \"value3 # not a comment\"
\tkey4 = \"value4 ; not a comment\"
";
    let file = ConfigFile::parse(input, None, ConfigScope::Local).unwrap();

    let key = ConfigKey::parse("section.key").unwrap();
    assert_eq!(file.get(&key), Some(Some(BStr::new("value"))));

    let key = ConfigKey::parse("section.key3").unwrap();
    assert_eq!(
        file.get(&key),
        Some(Some(BStr::new("value3 # not a comment")))
    );
}

#[test]
fn parse_config_escape_sequences() {
    let input = b"[section]\n\tkey = \"tab\\there\\nnewline\"\n";
    let file = ConfigFile::parse(input, None, ConfigScope::Local).unwrap();

    let key = ConfigKey::parse("section.key").unwrap();
    assert_eq!(
        file.get(&key),
        Some(Some(BStr::new("tab\there\nnewline")))
    );
}

#[test]
fn parse_config_line_continuation() {
    let input = b"[section]\n\tkey = hello \\\n\t\tworld\n";
    let file = ConfigFile::parse(input, None, ConfigScope::Local).unwrap();

    let key = ConfigKey::parse("section.key").unwrap();
    let value = file.get(&key).unwrap().unwrap();
    let value_str = std::str::from_utf8(value.as_ref()).unwrap();
    assert!(value_str.contains("hello"));
    assert!(value_str.contains("world"));
}

#[test]
fn parse_config_boolean_variants() {
    let input = b"\
[section]
\tbool1
\tbool2 = true
\tbool6 = false
";
    let file = ConfigFile::parse(input, None, ConfigScope::Local).unwrap();

    let key = ConfigKey::parse("section.bool1").unwrap();
    assert_eq!(file.get(&key), Some(None));

    let key = ConfigKey::parse("section.bool2").unwrap();
    assert_eq!(file.get(&key), Some(Some(BStr::new("true"))));
}

#[test]
fn parse_config_multi_valued() {
    let input = b"\
[remote \"origin\"]
\tfetch = +refs/heads/*:refs/remotes/origin/*
\tfetch = +refs/tags/*:refs/tags/*
\tfetch = +refs/notes/*:refs/notes/*
";
    let file = ConfigFile::parse(input, None, ConfigScope::Local).unwrap();

    let key = ConfigKey::parse("remote.origin.fetch").unwrap();
    let values = file.get_all(&key);
    assert_eq!(values.len(), 3);
    assert_eq!(
        values[0],
        Some(BStr::new("+refs/heads/*:refs/remotes/origin/*"))
    );
}

#[test]
fn parse_empty_config() {
    let file = ConfigFile::parse(b"", None, ConfigScope::Local).unwrap();
    assert!(file.entries().is_empty());
}

#[test]
fn parse_config_with_bom() {
    let mut input = Vec::from(b"\xef\xbb\xbf" as &[u8]);
    input.extend_from_slice(b"[user]\n\tname = Alice\n");

    let file = ConfigFile::parse(&input, None, ConfigScope::Local).unwrap();
    let key = ConfigKey::parse("user.name").unwrap();
    assert_eq!(file.get(&key), Some(Some(BStr::new("Alice"))));
}
