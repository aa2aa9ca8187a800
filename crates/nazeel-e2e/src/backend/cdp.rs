//! Chromium over CDP.
//!
//! Elements are held as runtime remote objects rather than DOM node ids, so
//! a lookup scoped to a same-origin iframe yields handles that behave like
//! top-level ones. Cross-origin frames have no reachable `contentDocument`
//! and fail the switch with [`E2eError::NoSuchElement`].

use super::BrowserConfig;
use crate::driver::{Driver, Element, ElementRef, Key, Screenshot};
use crate::locator::By;
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    CallFunctionOnParams, EvaluateParams, ExceptionDetails, GetPropertiesParams, RemoteObject,
    RemoteObjectId,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

type SharedPage = Arc<Mutex<CdpPage>>;

const STALE_GUARD: &str = "if (!this.isConnected) throw new Error('stale element');";

// ============================================================================
// Runtime helpers
// ============================================================================

fn cdp_error(err: impl std::fmt::Display) -> E2eError {
    let message = err.to_string();
    if message.contains("Could not find object with given id") {
        E2eError::StaleElement { message }
    } else {
        E2eError::Script { message }
    }
}

fn exception_error(details: &ExceptionDetails) -> E2eError {
    let message = details
        .exception
        .as_ref()
        .and_then(|e| e.description.clone())
        .unwrap_or_else(|| details.text.clone());
    if message.contains("stale element") {
        E2eError::StaleElement { message }
    } else {
        E2eError::Script { message }
    }
}

async fn evaluate(page: &CdpPage, expression: String, by_value: bool) -> E2eResult<RemoteObject> {
    let mut params = EvaluateParams::new(expression);
    params.return_by_value = Some(by_value);
    params.await_promise = Some(true);
    let response = page.execute(params).await.map_err(cdp_error)?;
    if let Some(details) = &response.result.exception_details {
        return Err(exception_error(details));
    }
    Ok(response.result.result.clone())
}

async fn call_on(
    page: &CdpPage,
    object_id: &RemoteObjectId,
    body: &str,
    by_value: bool,
) -> E2eResult<RemoteObject> {
    let mut params = CallFunctionOnParams::new(format!("function() {{ {STALE_GUARD} {body} }}"));
    params.object_id = Some(object_id.clone());
    params.return_by_value = Some(by_value);
    let response = page.execute(params).await.map_err(cdp_error)?;
    if let Some(details) = &response.result.exception_details {
        return Err(exception_error(details));
    }
    Ok(response.result.result.clone())
}

/// Object ids of the entries of a remote JS array, in index order
async fn array_items(page: &CdpPage, array: &RemoteObject) -> E2eResult<Vec<RemoteObjectId>> {
    let Some(id) = array.object_id.clone() else {
        return Ok(Vec::new());
    };
    let mut params = GetPropertiesParams::new(id);
    params.own_properties = Some(true);
    let response = page.execute(params).await.map_err(cdp_error)?;
    let mut items: Vec<(usize, RemoteObjectId)> = response
        .result
        .result
        .iter()
        .filter_map(|p| {
            let index = p.name.parse::<usize>().ok()?;
            let object = p.value.as_ref()?.object_id.clone()?;
            Some((index, object))
        })
        .collect();
    items.sort_by_key(|(index, _)| *index);
    Ok(items.into_iter().map(|(_, id)| id).collect())
}

fn value_of(object: &RemoteObject) -> serde_json::Value {
    object.value.clone().unwrap_or(serde_json::Value::Null)
}

fn js_string(value: &str) -> E2eResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Windows virtual key code and DOM `code` for named keys
const fn key_codes(key: Key) -> Option<(i64, &'static str)> {
    match key {
        Key::Char(_) => None,
        Key::PageDown => Some((34, "PageDown")),
        Key::PageUp => Some((33, "PageUp")),
        Key::ArrowDown => Some((40, "ArrowDown")),
        Key::ArrowUp => Some((38, "ArrowUp")),
        Key::Enter => Some((13, "Enter")),
        Key::Tab => Some((9, "Tab")),
        Key::Escape => Some((27, "Escape")),
        Key::Backspace => Some((8, "Backspace")),
    }
}

async fn dispatch_key(page: &CdpPage, key: Key) -> E2eResult<()> {
    let mut down = DispatchKeyEventParams::new(DispatchKeyEventType::KeyDown);
    down.key = Some(key.dom_name());
    match key_codes(key) {
        Some((vk, code)) => {
            down.code = Some(code.to_string());
            down.windows_virtual_key_code = Some(vk);
            if key == Key::Enter {
                down.text = Some("\r".to_string());
            }
        }
        None => down.text = Some(key.dom_name()),
    }
    let mut up = DispatchKeyEventParams::new(DispatchKeyEventType::KeyUp);
    up.key = down.key.clone();
    up.code = down.code.clone();
    up.windows_virtual_key_code = down.windows_virtual_key_code;

    page.execute(down).await.map_err(cdp_error)?;
    page.execute(up).await.map_err(cdp_error)?;
    Ok(())
}

async fn type_text(page: &CdpPage, text: &str) -> E2eResult<()> {
    for c in text.chars() {
        dispatch_key(page, Key::Char(c)).await?;
    }
    Ok(())
}

// ============================================================================
// Element
// ============================================================================

/// Click geometry reported by the page
#[derive(Debug, Deserialize)]
struct ClickTarget {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    clear: bool,
    hit: String,
}

const CLICK_TARGET: &str = "this.scrollIntoView({block: 'center', inline: 'center'}); \
    const r = this.getBoundingClientRect(); \
    let x = r.left + r.width / 2, y = r.top + r.height / 2; \
    const hit = this.ownerDocument.elementFromPoint(x, y); \
    const clear = hit === this || this.contains(hit); \
    let win = this.ownerDocument.defaultView; \
    while (win && win.frameElement) { \
      const f = win.frameElement.getBoundingClientRect(); x += f.left; y += f.top; win = win.parent; \
    } \
    return { x, y, width: r.width, height: r.height, clear, \
      hit: hit ? hit.outerHTML.slice(0, 120) : 'nothing' };";

const IS_DISPLAYED: &str = "const s = getComputedStyle(this); \
    const r = this.getBoundingClientRect(); \
    return s.display !== 'none' && s.visibility !== 'hidden' && r.width > 0 && r.height > 0;";

/// Element handle backed by a runtime remote object
#[derive(Debug, Clone)]
pub struct CdpElement {
    page: SharedPage,
    object_id: RemoteObjectId,
    locator: String,
}

impl CdpElement {
    fn into_ref(self) -> ElementRef {
        Arc::new(self)
    }

    async fn call(&self, body: &str) -> E2eResult<serde_json::Value> {
        let page = self.page.lock().await;
        let object = call_on(&page, &self.object_id, body, true).await?;
        Ok(value_of(&object))
    }

    async fn query(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let page = self.page.lock().await;
        let body = format!("return {};", by.to_query_all("this"));
        let array = call_on(&page, &self.object_id, &body, false).await?;
        let ids = array_items(&page, &array).await?;
        drop(page);
        Ok(ids
            .into_iter()
            .map(|object_id| {
                CdpElement {
                    page: Arc::clone(&self.page),
                    object_id,
                    locator: by.to_string(),
                }
                .into_ref()
            })
            .collect())
    }
}

#[async_trait]
impl Element for CdpElement {
    async fn click(&self) -> E2eResult<()> {
        let target: ClickTarget = serde_json::from_value(self.call(CLICK_TARGET).await?)?;
        if target.width <= 0.0 || target.height <= 0.0 {
            return Err(E2eError::ElementNotInteractable {
                message: format!("{} has no size", self.locator),
            });
        }
        if !target.clear {
            return Err(E2eError::ClickIntercepted {
                message: format!("{} covered by {}", self.locator, target.hit),
            });
        }

        let page = self.page.lock().await;
        for kind in [
            DispatchMouseEventType::MousePressed,
            DispatchMouseEventType::MouseReleased,
        ] {
            let mut params = DispatchMouseEventParams::new(kind, target.x, target.y);
            params.button = Some(MouseButton::Left);
            params.click_count = Some(1);
            page.execute(params).await.map_err(cdp_error)?;
        }
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> E2eResult<()> {
        self.call("this.focus();").await?;
        let page = self.page.lock().await;
        type_text(&page, text).await
    }

    async fn clear(&self) -> E2eResult<()> {
        self.call(
            "this.focus(); this.value = ''; \
             this.dispatchEvent(new Event('input', {bubbles: true})); \
             this.dispatchEvent(new Event('change', {bubbles: true}));",
        )
        .await?;
        Ok(())
    }

    async fn submit(&self) -> E2eResult<()> {
        self.call("const f = this.form || this.closest('form'); if (f) f.requestSubmit();")
            .await?;
        Ok(())
    }

    async fn text(&self) -> E2eResult<String> {
        let value = self.call("return this.innerText ?? this.textContent ?? '';").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, name: &str) -> E2eResult<Option<String>> {
        let body = format!(
            "const n = {}; const p = this[n]; \
             if (p !== undefined && p !== null && typeof p !== 'object' && typeof p !== 'function') \
               return String(p); \
             return this.getAttribute(n);",
            js_string(name)?
        );
        Ok(self.call(&body).await?.as_str().map(str::to_string))
    }

    async fn css_value(&self, property: &str) -> E2eResult<String> {
        let body = format!(
            "return getComputedStyle(this).getPropertyValue({});",
            js_string(property)?
        );
        Ok(self
            .call(&body)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn is_displayed(&self) -> E2eResult<bool> {
        Ok(self.call(IS_DISPLAYED).await?.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self) -> E2eResult<bool> {
        Ok(self
            .call("return !this.disabled;")
            .await?
            .as_bool()
            .unwrap_or(true))
    }

    async fn scroll_into_view(&self) -> E2eResult<()> {
        self.call("this.scrollIntoView({block: 'center', inline: 'nearest'});")
            .await?;
        Ok(())
    }

    async fn find_element(&self, by: &By) -> E2eResult<ElementRef> {
        self.query(by)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| E2eError::NoSuchElement {
                locator: by.to_string(),
            })
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        self.query(by).await
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Browser driven over CDP
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Mutex<CdpBrowser>,
    page: SharedPage,
    frame: Mutex<Option<By>>,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch chromium and open a blank tab
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be started
    pub async fn launch(config: BrowserConfig) -> E2eResult<Self> {
        let mut builder = CdpConfig::builder().window_size(config.window_size.0, config.window_size.1);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }

        for arg in &config.args {
            builder = builder.arg(arg.as_str());
        }

        let cdp_config = builder.build().map_err(|message| E2eError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| E2eError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::BrowserLaunch {
                message: e.to_string(),
            })?;

        debug!(headless = config.headless, window = ?config.window_size, "browser launched");
        Ok(Self {
            browser: Mutex::new(browser),
            page: Arc::new(Mutex::new(page)),
            frame: Mutex::new(None),
            handle,
        })
    }

    /// Expression for the document finds are scoped to; null when the frame is gone
    async fn root(&self) -> String {
        match self.frame.lock().await.as_ref() {
            None => "document".to_string(),
            Some(frame) => format!(
                "(() => {{ const f = {}[0]; return f && f.contentDocument ? f.contentDocument : null; }})()",
                frame.to_query_all("document")
            ),
        }
    }

    async fn query(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        let root = self.root().await;
        let expression = format!(
            "(() => {{ const root = {root}; if (!root) throw new Error('frame detached'); return {}; }})()",
            by.to_query_all("root")
        );
        let page = self.page.lock().await;
        let array = evaluate(&page, expression, false).await?;
        let ids = array_items(&page, &array).await?;
        drop(page);
        Ok(ids
            .into_iter()
            .map(|object_id| {
                CdpElement {
                    page: Arc::clone(&self.page),
                    object_id,
                    locator: by.to_string(),
                }
                .into_ref()
            })
            .collect())
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        *self.frame.lock().await = None;
        let page = self.page.lock().await;
        page.goto(url).await.map_err(|e| E2eError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let page = self.page.lock().await;
        let url = page.url().await.map_err(cdp_error)?;
        Ok(url.unwrap_or_default())
    }

    async fn title(&self) -> E2eResult<String> {
        let page = self.page.lock().await;
        let title = page.get_title().await.map_err(cdp_error)?;
        Ok(title.unwrap_or_default())
    }

    async fn find_element(&self, by: &By) -> E2eResult<ElementRef> {
        self.query(by)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| E2eError::NoSuchElement {
                locator: by.to_string(),
            })
    }

    async fn find_elements(&self, by: &By) -> E2eResult<Vec<ElementRef>> {
        self.query(by).await
    }

    async fn active_element(&self) -> E2eResult<ElementRef> {
        let root = self.root().await;
        let expression = format!(
            "(() => {{ const root = {root}; if (!root) throw new Error('frame detached'); \
             return root.activeElement || root.body; }})()"
        );
        let page = self.page.lock().await;
        let object = evaluate(&page, expression, false).await?;
        drop(page);
        let object_id = object.object_id.ok_or_else(|| E2eError::NoSuchElement {
            locator: "active element".to_string(),
        })?;
        Ok(CdpElement {
            page: Arc::clone(&self.page),
            object_id,
            locator: "active element".to_string(),
        }
        .into_ref())
    }

    async fn execute_script(&self, script: &str) -> E2eResult<serde_json::Value> {
        let page = self.page.lock().await;
        let object = evaluate(&page, format!("(() => {{ {script} }})()"), true).await?;
        Ok(value_of(&object))
    }

    async fn perform(&self, keys: &[Key]) -> E2eResult<()> {
        let page = self.page.lock().await;
        for key in keys {
            dispatch_key(&page, *key).await?;
        }
        Ok(())
    }

    async fn switch_to_frame(&self, by: &By) -> E2eResult<()> {
        let expression = format!(
            "(() => {{ const f = {}[0]; return !!(f && f.contentDocument); }})()",
            by.to_query_all("document")
        );
        let reachable = {
            let page = self.page.lock().await;
            value_of(&evaluate(&page, expression, true).await?)
        };
        if reachable.as_bool() != Some(true) {
            return Err(E2eError::NoSuchElement {
                locator: by.to_string(),
            });
        }
        *self.frame.lock().await = Some(by.clone());
        Ok(())
    }

    async fn switch_to_default_content(&self) -> E2eResult<()> {
        *self.frame.lock().await = None;
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Screenshot> {
        let page = self.page.lock().await;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot = page
            .execute(params)
            .await
            .map_err(|e| E2eError::Screenshot {
                message: e.to_string(),
            })?;

        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| E2eError::Screenshot {
                message: e.to_string(),
            })?;
        Ok(Screenshot::new(data))
    }

    async fn quit(&self) -> E2eResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        self.handle.abort();
        closed.map_err(|e| E2eError::BrowserLaunch {
            message: format!("close failed: {e}"),
        })?;
        Ok(())
    }
}
