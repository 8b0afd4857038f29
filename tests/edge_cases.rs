//! Edge case tests for chataudit
//!
//! These tests cover boundary conditions of the normalizer, timeline and
//! classifier that the end-to-end tests do not reach.

use chataudit::core::{
    ContentClassifier, UNKNOWN_SENDER, UrlCategory, UrlRule, UrlSource, analyze, normalize, normalize_and_dedup,
};
use chataudit::events::PipelineWarning;
use chataudit::parsing::default_timestamp_formats;
use chataudit::pipeline::Pipeline;
use chataudit::{RawAttachment, RawMessage};

fn formats() -> Vec<String> {
    default_timestamp_formats()
}

// =========================================================================
// Normalization
// =========================================================================

#[test]
fn test_unicode_senders_and_bodies() {
    let cases = [
        ("Иван", "Привет мир!"),
        ("田中太郎", "こんにちは世界！"),
        ("محمد", "مرحبا بالعالم"),
        ("User 🎉", "Hello 👋 World 🌍"),
    ];
    for (sender, body) in cases {
        let msg = normalize(RawMessage::new(body).with_sender(sender), &formats());
        assert_eq!(msg.sender(), sender);
        assert_eq!(msg.body(), body);
    }
}

#[test]
fn test_blank_sender_becomes_unknown() {
    let blank = normalize(RawMessage::new("hi").with_sender("   \n "), &formats());
    let missing = normalize(RawMessage::new("hi"), &formats());
    assert_eq!(blank.sender(), UNKNOWN_SENDER);
    assert_eq!(missing.sender(), UNKNOWN_SENDER);
    assert_eq!(blank.content_hash(), missing.content_hash());
}

#[test]
fn test_whitespace_variants_are_duplicates() {
    let raws = vec![
        RawMessage::new("hello   world").with_sender("Ann").with_timestamp("2024-01-01 09:00"),
        RawMessage::new("\n hello world\t")
            .with_sender(" Ann ")
            .with_timestamp("2024-01-01T09:00:00Z")
            .with_position(1),
    ];
    let unique = normalize_and_dedup(raws, &formats());
    assert_eq!(unique.messages.len(), 1);
    assert_eq!(unique.duplicates_removed, 1);
}

#[test]
fn test_same_body_different_time_is_kept() {
    let raws = vec![
        RawMessage::new("ok").with_sender("Ann").with_timestamp("2024-01-01 09:00"),
        RawMessage::new("ok").with_sender("Ann").with_timestamp("2024-01-01 09:01").with_position(1),
    ];
    assert_eq!(normalize_and_dedup(raws, &formats()).messages.len(), 2);
}

#[test]
fn test_unparsable_timestamp_keeps_raw_label() {
    let msg = normalize(RawMessage::new("x").with_timestamp("sometime Tuesday"), &formats());
    assert!(msg.timestamp().is_none());
    assert_eq!(msg.raw_timestamp.as_deref(), Some("sometime Tuesday"));
}

#[test]
fn test_untimed_duplicates_collapse() {
    let raws = vec![
        RawMessage::new("no time").with_sender("Ann"),
        RawMessage::new("no time").with_sender("Ann").with_position(1),
    ];
    let unique = normalize_and_dedup(raws, &formats());
    assert_eq!(unique.messages.len(), 1);
    assert_eq!(unique.untimed, 1);
}

// =========================================================================
// Timeline
// =========================================================================

#[test]
fn test_untimed_messages_go_last_in_source_order() {
    let raws = vec![
        RawMessage::new("untimed a").with_sender("A"),
        RawMessage::new("late").with_sender("B").with_timestamp("2024-01-01 10:00").with_position(1),
        RawMessage::new("untimed b").with_sender("C").with_position(2),
        RawMessage::new("early").with_sender("D").with_timestamp("2024-01-01 09:00").with_position(3),
    ];
    let messages = normalize_and_dedup(raws, &formats()).messages;
    let timing = analyze(&messages, None);

    let mut ranked: Vec<(usize, &str)> = timing
        .iter()
        .zip(&messages)
        .map(|(t, m)| (t.sequence_index, m.body()))
        .collect();
    ranked.sort();
    let order: Vec<&str> = ranked.into_iter().map(|(_, body)| body).collect();
    assert_eq!(order, ["early", "late", "untimed a", "untimed b"]);

    // Untimed messages never carry gap or drift annotations
    assert!(timing[0].gap_seconds.is_none());
    assert!(!timing[0].drift);
    assert!(timing[2].gap_seconds.is_none());
}

#[test]
fn test_gap_at_threshold_is_not_flagged() {
    let raws = vec![
        RawMessage::new("a").with_timestamp("2024-01-01 09:00"),
        RawMessage::new("b").with_timestamp("2024-01-01 10:00").with_position(1),
        RawMessage::new("c").with_timestamp("2024-01-01 11:00:01").with_position(2),
    ];
    let messages = normalize_and_dedup(raws, &formats()).messages;
    let timing = analyze(&messages, Some(3600));
    assert_eq!(timing[1].gap_seconds, Some(3600));
    assert!(!timing[1].gap_flagged);
    assert_eq!(timing[2].gap_seconds, Some(3601));
    assert!(timing[2].gap_flagged);
}

#[test]
fn test_equal_timestamps_keep_source_order() {
    let raws = vec![
        RawMessage::new("first").with_sender("A").with_timestamp("2024-01-01 09:00"),
        RawMessage::new("second").with_sender("B").with_timestamp("2024-01-01 09:00").with_position(1),
    ];
    let messages = normalize_and_dedup(raws, &formats()).messages;
    let timing = analyze(&messages, None);
    assert_eq!(timing[0].sequence_index, 0);
    assert_eq!(timing[1].sequence_index, 1);
    assert_eq!(timing[1].gap_seconds, Some(0));
    assert!(!timing[1].drift);
}

#[test]
fn test_empty_input_has_no_annotations() {
    assert!(analyze(&[], Some(60)).is_empty());
}

// =========================================================================
// URL classification
// =========================================================================

#[test]
fn test_repeated_url_keeps_each_position() {
    let classifier = ContentClassifier::default();
    let body = "https://a.example/ then https://b.example/ then https://a.example/";
    let urls = classifier.extract_urls(body, &[]);
    let positions: Vec<Option<usize>> = urls.iter().map(|u| u.position).collect();
    assert_eq!(positions, [Some(0), Some(24), Some(48)]);
    assert_eq!(urls[0].raw, urls[2].raw);
}

#[test]
fn test_trailing_punctuation_is_trimmed() {
    let classifier = ContentClassifier::default();
    let urls = classifier.extract_urls("Docs (https://contoso.sharepoint.com/a). Thanks!", &[]);
    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0].raw, "https://contoso.sharepoint.com/a");
}

#[test]
fn test_category_boundaries() {
    let classifier = ContentClassifier::default();
    let cases = [
        ("https://contoso.sharepoint.com/x", UrlCategory::SharePoint),
        ("https://onedrive.live.com/?id=1", UrlCategory::OneDrive),
        ("https://1drv.ms/u/s!abc", UrlCategory::OneDrive),
        ("https://teams.microsoft.com/l/meetup-join/19%3ameeting", UrlCategory::TeamsMeeting),
        ("https://outlook.office365.com/mail/inbox", UrlCategory::OrganizationalEmail),
        ("https://teams.microsoft.com/l/channel/abc", UrlCategory::Web),
        ("http://example.org", UrlCategory::Web),
        ("ftp://files.example.org/a.zip", UrlCategory::Other),
    ];
    for (raw, expected) in cases {
        assert_eq!(classifier.classify_str(raw).1, expected, "{}", raw);
    }
}

#[test]
fn test_custom_rule_takes_precedence() {
    let rule: UrlRule = "contoso.sharepoint.com=onedrive".parse().unwrap();
    let mut rules = vec![rule];
    rules.extend(chataudit::core::default_url_rules());
    let classifier = ContentClassifier::new(rules, 200);
    assert_eq!(
        classifier.classify_str("https://contoso.sharepoint.com/x").1,
        UrlCategory::OneDrive
    );
    assert_eq!(
        classifier.classify_str("https://fabrikam.sharepoint.com/x").1,
        UrlCategory::SharePoint
    );
}

#[test]
fn test_anchor_only_links_are_appended() {
    let classifier = ContentClassifier::default();
    let links = vec![
        "https://contoso.sharepoint.com/in-body".to_string(),
        "https://1drv.ms/anchor-only".to_string(),
        "/relative/path".to_string(),
    ];
    let urls = classifier.extract_urls("see https://contoso.sharepoint.com/in-body", &links);
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[1].raw, "https://1drv.ms/anchor-only");
    assert_eq!(urls[1].source, UrlSource::Link);
    assert_eq!(urls[1].position, None);
    assert_eq!(urls[1].category, UrlCategory::OneDrive);
}

// =========================================================================
// Attachments
// =========================================================================

#[test]
fn test_attachment_label_with_size_suffix() {
    let classifier = ContentClassifier::default();
    let att = classifier.attachment(&RawAttachment::new("Q3 report.pdf (1.2 MB)"));
    assert_eq!(att.name.as_deref(), Some("Q3 report.pdf"));
    assert_eq!(att.extension.as_deref(), Some("pdf"));
    assert!(!att.is_malformed());
}

#[test]
fn test_attachment_name_from_link() {
    let classifier = ContentClassifier::default();
    let att = classifier.attachment(
        &RawAttachment::new("Open file").with_link("https://x.example/files/Team%20Plan.PPTX?web=1"),
    );
    assert_eq!(att.name.as_deref(), Some("Team Plan.PPTX"));
    assert_eq!(att.extension.as_deref(), Some("pptx"));
}

#[test]
fn test_unreadable_attachment_keeps_raw_label() {
    let classifier = ContentClassifier::default();
    let long_label = "x".repeat(500);
    let att = classifier.attachment(&RawAttachment::new(long_label.clone()));
    assert!(att.is_malformed());
    assert_eq!(att.raw_label, long_label);
    assert!(att.kind.is_none());
}

#[test]
fn test_malformed_attachment_warning_end_to_end() {
    let html = format!(
        "<div class='message'><b>Ann</b><span class='time'>2024-01-01 09:00</span>\
         <div class='content'>see attached</div><div class='attachment' title='{}'></div></div>",
        "y".repeat(300)
    );
    let outcome = Pipeline::default().run_str(&html).unwrap();
    assert_eq!(outcome.report.stats.malformed_attachments, 1);
    assert!(outcome
        .warnings
        .iter()
        .any(|w| w.to_string().contains("attachment")));
}

// =========================================================================
// Irregular text content
// =========================================================================

fn senders_and_bodies(html: &str) -> Vec<(String, String)> {
    Pipeline::default()
        .run_str(html)
        .unwrap()
        .report
        .records
        .iter()
        .map(|r| (r.message.sender().to_string(), r.message.body().to_string()))
        .collect()
}

#[test]
fn test_less_than_in_body_keeps_every_message() {
    let html = "<html><body>\
        <div class='message'><span class='sender'>Ann</span><span class='time'>2024-01-01 09:00</span>\
        <div class='content'>if x < 5 then ok</div></div>\
        <div class='message'><span class='sender'>Ben</span><span class='time'>2024-01-01 09:01</span>\
        <div class='content'>love you <3</div></div>\
        <div class='message'><span class='sender'>Cy</span><span class='time'>2024-01-01 09:02</span>\
        <div class='content'>third</div></div>\
        </body></html>";

    let outcome = Pipeline::default().run_str(html).unwrap();
    assert!(!outcome
        .warnings
        .iter()
        .any(|w| matches!(w, PipelineWarning::RecoveredMarkup { .. })));
    assert_eq!(
        senders_and_bodies(html),
        vec![
            ("Ann".to_string(), "if x < 5 then ok".to_string()),
            ("Ben".to_string(), "love you <3".to_string()),
            ("Cy".to_string(), "third".to_string()),
        ]
    );
}

#[test]
fn test_accented_entities_in_sender_and_body() {
    let html = "<div class='message'><span class='sender'>Ren&eacute;</span>\
        <span class='time'>2024-01-01 09:00</span>\
        <div class='content'>caf&eacute; &amp; cr&egrave;me</div></div>";
    assert_eq!(
        senders_and_bodies(html),
        vec![("René".to_string(), "café & crème".to_string())]
    );
}

#[test]
fn test_encoded_and_plain_copies_are_duplicates() {
    let html = "<div class='message'><span class='sender'>Ren&eacute;</span>\
        <span class='time'>2024-01-01 09:00</span><div class='content'>caf&eacute; &amp; cr&egrave;me</div></div>\
        <div class='message'><span class='sender'>René</span>\
        <span class='time'>2024-01-01 09:00</span><div class='content'>café &amp; crème</div></div>";
    let outcome = Pipeline::default().run_str(html).unwrap();
    assert_eq!(outcome.report.records.len(), 1);
    assert_eq!(outcome.report.stats.duplicates_removed, 1);
}

#[test]
fn test_bare_ampersand_and_unknown_entity_stay_literal() {
    let html = "<div class='message'><span class='sender'>R&D team</span>\
        <span class='time'>2024-01-01 09:00</span>\
        <div class='content'>Q&A at 5 &bogus; &lt;ok&gt;</div></div>";
    assert_eq!(
        senders_and_bodies(html),
        vec![("R&D team".to_string(), "Q&A at 5 &bogus; <ok>".to_string())]
    );
}
