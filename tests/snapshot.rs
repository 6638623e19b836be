use browser_relay::snapshot::{Link, PageContent, BODY_TEXT_LIMIT, LINK_LIMIT};

#[test]
fn test_truncated_applies_limits() {
    let content = PageContent {
        body_text: "é".repeat(BODY_TEXT_LIMIT + 50),
        links: vec![Link::default(); LINK_LIMIT + 5],
        ..PageContent::default()
    }
    .truncated();

    assert_eq!(content.body_text.chars().count(), BODY_TEXT_LIMIT);
    assert_eq!(content.links.len(), LINK_LIMIT);
}

#[test]
fn test_snapshot_json_shape() {
    let json = r#"{
        "title": "Sign up",
        "url": "https://example.com/",
        "bodyText": "Create account",
        "links": [{"text": "Home", "href": "https://example.com/"}],
        "inputs": [{"type": "email", "name": "email"}],
        "buttons": [{"text": "Next", "type": "submit"}]
    }"#;
    let content: PageContent = serde_json::from_str(json).unwrap();

    assert_eq!(content.body_text, "Create account");
    assert_eq!(content.inputs[0].kind, "email");
    assert_eq!(content.buttons[0].kind, "submit");
    assert_eq!(content.links[0].id, "");
}

#[test]
fn test_unavailable_placeholder() {
    let content = PageContent::unavailable("target closed");
    assert_eq!(content.title, "Error");
    assert_eq!(content.url, "Error");
    assert_eq!(content.body_text, "Error getting page content: target closed");
    assert!(content.links.is_empty());
}
