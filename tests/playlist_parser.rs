//! Playlist parsing against files on disk

use std::io::Write;

use tempfile::NamedTempFile;
use tracing_test::traced_test;
use tvh_m3u_sync::{
    errors::ParseError,
    models::Channel,
    playlist::{MalformedPolicy, PlaylistParser},
};

const SAMPLE_PLAYLIST: &str = "\
#EXTM3U
#EXTINF:-1,Channel One
#EXTVLCOPT:program=1
udp://@239.1.1.1:1234
#EXTINF:-1,Channel Two
udp://@239.1.1.2:1234
";

fn playlist_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp playlist");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp playlist");
    file
}

fn parse_file(content: &str, policy: MalformedPolicy) -> Vec<Result<Channel, ParseError>> {
    let file = playlist_file(content);
    PlaylistParser::open(file.path(), policy)
        .expect("Failed to open playlist")
        .collect()
}

fn channels(content: &str) -> Vec<Channel> {
    parse_file(content, MalformedPolicy::Abort)
        .into_iter()
        .collect::<Result<_, _>>()
        .expect("Playlist should parse")
}

#[test]
fn test_sample_playlist() {
    let parsed = channels(SAMPLE_PLAYLIST);
    assert_eq!(parsed.len(), 2);

    assert_eq!(parsed[0].name.as_deref(), Some("Channel One"));
    assert_eq!(parsed[0].url, "udp://@239.1.1.1:1234");
    assert_eq!(parsed[0].extras.len(), 1);
    assert_eq!(parsed[0].extras["program"], "1");

    assert_eq!(parsed[1].name.as_deref(), Some("Channel Two"));
    assert_eq!(parsed[1].url, "udp://@239.1.1.2:1234");
    assert!(parsed[1].extras.is_empty());
}

#[test]
fn test_missing_header_yields_empty_sequence() {
    let content = SAMPLE_PLAYLIST.replace("#EXTM3U\n", "");
    assert!(channels(&content).is_empty());
}

#[test]
fn test_leading_junk_and_crlf_line_endings() {
    let content = "garbage line\r\n\r\n  #EXTM3U x-tvg-url=\"http://epg.lan/guide.xml\"\r\n\
                   #EXTINF:-1,Channel One\r\n   \r\nudp://@239.1.1.1:1234\r\n";
    let parsed = channels(content);
    assert_eq!(parsed, vec![Channel::new("Channel One", "udp://@239.1.1.1:1234")]);
}

#[test]
fn test_cr_only_line_endings() {
    let content = SAMPLE_PLAYLIST.replace('\n', "\r");
    let parsed = channels(&content);
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].url, "udp://@239.1.1.1:1234");
    assert_eq!(parsed[0].extras["program"], "1");
    assert_eq!(parsed[1].display_name(), "Channel Two");
}

#[test]
fn test_mixed_line_endings() {
    let content = "#EXTM3U\r\n#EXTINF:-1,Channel One\rudp://@239.1.1.1:1234\n\
                   #EXTINF:-1,Channel Two\r\nudp://@239.1.1.2:1234";
    let urls: Vec<String> = channels(content).into_iter().map(|c| c.url).collect();
    assert_eq!(urls, ["udp://@239.1.1.1:1234", "udp://@239.1.1.2:1234"]);
}

#[test]
fn test_vlcopt_last_write_wins() {
    let content = "#EXTM3U\n\
                   #EXTINF:-1,Tuned\n\
                   #EXTVLCOPT:program=1\n\
                   #EXTVLCOPT:miface-addr=eth1\n\
                   #EXTVLCOPT:program=4\n\
                   udp://@239.1.1.4:1234\n";
    let parsed = channels(content);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].extras.len(), 2);
    assert_eq!(parsed[0].extras["program"], "4");
    assert_eq!(parsed[0].extras["miface-addr"], "eth1");
}

#[test]
fn test_address_without_inf_has_no_name() {
    let parsed = channels("#EXTM3U\n#EXTGRP:News\nudp://@239.1.1.5:1234\n");
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].name, None);
    assert!(parsed[0].extras.is_empty());
}

#[test]
fn test_dangling_entry_at_end_is_dropped() {
    let content = format!("{SAMPLE_PLAYLIST}#EXTINF:-1,Channel Three\n#EXTVLCOPT:program=3\n");
    let parsed = channels(&content);
    assert_eq!(parsed.len(), 2);
    assert!(parsed.iter().all(|c| c.display_name() != "Channel Three"));
}

#[test]
fn test_missing_file_is_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.m3u");

    match PlaylistParser::open(&path, MalformedPolicy::Abort) {
        Err(ParseError::SourceUnavailable { path: reported, .. }) => assert_eq!(reported, path),
        Err(other) => panic!("expected SourceUnavailable, got {other:?}"),
        Ok(_) => panic!("expected SourceUnavailable, got a parser"),
    }
}

#[test]
fn test_malformed_directive_aborts_at_that_point() {
    let content = "#EXTM3U\n\
                   #EXTINF:-1,Good\n\
                   udp://@239.1.1.1:1234\n\
                   #EXTVLCOPT:no-equals-sign\n\
                   udp://@239.1.1.2:1234\n\
                   #EXTINF:-1,Never Reached\n\
                   udp://@239.1.1.3:1234\n";
    let results = parse_file(content, MalformedPolicy::Abort);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().url, "udp://@239.1.1.1:1234");
    match &results[1] {
        Err(ParseError::MalformedDirective {
            line_number, tag, ..
        }) => {
            assert_eq!(*line_number, 4);
            assert_eq!(tag, "VLCOPT");
        }
        other => panic!("expected MalformedDirective, got {other:?}"),
    }
}

#[test]
#[traced_test]
fn test_skip_malformed_entries() {
    let content = "#EXTM3U\n\
                   #EXTINF:no comma here\n\
                   udp://@239.1.1.1:1234\n\
                   #EXTINF:-1,Kept\n\
                   udp://@239.1.1.2:1234\n";
    let parsed: Vec<Channel> = parse_file(content, MalformedPolicy::SkipEntry)
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(parsed, vec![Channel::new("Kept", "udp://@239.1.1.2:1234")]);
    assert!(logs_contain("Skipping playlist entry"));
}

#[test]
fn test_parser_is_lazy() {
    // The second entry is malformed; the first is still yielded before the error.
    let file = playlist_file(
        "#EXTM3U\n#EXTINF:-1,First\nudp://@239.1.1.1:1234\n#EXTINF:bad\nudp://@239.1.1.2:1234\n",
    );
    let mut parser = PlaylistParser::open(file.path(), MalformedPolicy::Abort).unwrap();
    assert_eq!(parser.next().unwrap().unwrap().display_name(), "First");
    assert!(parser.next().unwrap().is_err());
    assert!(parser.next().is_none());
}
