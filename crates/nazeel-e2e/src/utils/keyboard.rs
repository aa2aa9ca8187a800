use crate::driver::Element;
use crate::result::E2eResult;
use std::time::Duration;

/// Type `text` one character at a time, sleeping `interval` after each.
///
/// Masked inputs such as the Kendo date parts drop characters that arrive
/// faster than they re-render.
pub async fn send_keys_with_interval(element: &dyn Element, text: &str, interval: Duration) -> E2eResult<()> {
    let mut buf = [0u8; 4];
    for c in text.chars() {
        element.send_keys(c.encode_utf8(&mut buf)).await?;
        tokio::time::sleep(interval).await;
    }
    Ok(())
}
