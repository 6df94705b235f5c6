//! Tracking snippet template
//!
//! Used for the documentation sample and whenever the analytics backend
//! returns a script without its generated snippet.

const TEMPLATE: &str = r#"<script>
  (function() {
    const scriptId = {{SCRIPT_ID}};
    const userId = {{USER_ID}};
    const ipAddress = window.location.hostname;

    fetch({{TRACK_URL}}, {
      method: 'POST',
      headers: {
        'Content-Type': 'application/json',
      },
      body: JSON.stringify({
        scriptId,
        userId,
        ipAddress,
        timestamp: new Date().toISOString(),
        userAgent: navigator.userAgent
      })
    })
    .catch(console.error);
  })();
</script>"#;

/// Placeholder script id shown in the documentation sample
pub const SAMPLE_SCRIPT_ID: &str = "your_script_id";

/// Placeholder owner id shown in the documentation sample
pub const SAMPLE_USER_ID: &str = "your_user_id";

/// Snippet with the ids and endpoint substituted.
///
/// Values are inserted as JavaScript string literals, so an id can never
/// break out of its quotes.
pub fn render(track_url: &str, script_id: &str, owner_id: &str) -> String {
    TEMPLATE
        .replace("{{SCRIPT_ID}}", &js_string(script_id))
        .replace("{{USER_ID}}", &js_string(owner_id))
        .replace("{{TRACK_URL}}", &js_string(track_url))
}

/// Documentation sample with placeholder ids
pub fn sample(track_url: &str) -> String {
    render(track_url, SAMPLE_SCRIPT_ID, SAMPLE_USER_ID)
}

pub(crate) fn js_string(value: &str) -> String {
    // JSON string syntax is valid JS; `</` is escaped so the literal
    // cannot close the surrounding <script> element.
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}
