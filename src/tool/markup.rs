//! Page markup for the preview tool.

use super::params::{Profile, ToolParams};
use tracing::warn;

const TITLE: &str = "Publisher tools Offerwall demo";

const AD_TAG_SCRIPT: &str = r#"<script async src="https://securepubads.g.doubleclick.net/tag/js/gpt.js" crossorigin="anonymous"></script>"#;

const STYLE: &str = r"
      body {
        font-family: system-ui, sans-serif;
        padding: 1rem;
      }

      form {
        display: flex;
        flex-direction: column;
        gap: 1rem;
        max-width: 600px;
        flex-wrap: wrap;

        label {
          font-weight: bold;
          display: flex;
          gap: 0.2rem;
        }

        input {
          flex-grow: 1;
        }

        > div {
          border: 1px solid #ccc;
          border-radius: 5px;
          padding: 0.5rem;

          p {
            margin: 0.2rem 0;
            font-size: smaller;
          }
        }

        button {
          cursor: pointer;
          background: navy;
          color: #fff;
          border: none;
          width: fit-content;
          border-radius: 5px;
          padding: 0.5rem 1rem;
          font-size: 1.2rem;
        }
      }
";

/// Render the full preview page for the given parameters.
#[must_use]
pub fn render_page(params: &ToolParams, cdn_host: &str) -> String {
    let mut head = String::from(AD_TAG_SCRIPT);
    if let Some(script) = render_init_script(params, cdn_host) {
        head.push('\n');
        head.push_str(&script);
    }

    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{TITLE}</title>
    <style>{STYLE}</style>
    {head}
  </head>
  <body>
    <h1>{TITLE}</h1>
{form}
  </body>
</html>
"#,
        form = render_form(params),
    )
}

/// The offerwall init script tag, when every parameter is valid.
#[must_use]
pub fn render_init_script(params: &ToolParams, cdn_host: &str) -> Option<String> {
    let (_, wallet_address, profile) = params.complete()?;
    let Some(url) = params.script_url(cdn_host) else {
        warn!("CDN host {cdn_host:?} does not form a valid script URL");
        return None;
    };

    Some(format!(
        r#"<script id="wmt-offerwall-init-script" type="module" src="{}" data-wallet-address="{}" data-tag="{}"></script>"#,
        escape(url.as_str()),
        escape(wallet_address),
        profile.as_str(),
    ))
}

/// The configuration form, pre-filled with the valid parameters.
#[must_use]
pub fn render_form(params: &ToolParams) -> String {
    let src = params.src.as_ref().map(ToString::to_string).unwrap_or_default();
    let wallet_address = params.wallet_address.as_deref().unwrap_or_default();

    let options: String = Profile::ALL
        .into_iter()
        .map(|profile| {
            let selected = if params.profile == Some(profile) {
                " selected"
            } else {
                ""
            };
            format!(
                "          <option value=\"{id}\"{selected}>{id}</option>\n",
                id = profile.as_str(),
            )
        })
        .collect();

    format!(
        r#"    <form action="/tool" method="GET">
      <div>
        <label>
          <span>Script source:</span>
          <input name="src" value="{src}" type="text" list="src-options" required pattern="staging|production|[0-9]+" />
        </label>
        <datalist id="src-options">
          <option value="staging" />
          <option value="production" />
        </datalist>
        <p>
          One of the following: <code>staging</code>, <code>production</code>, or
          a Pull Request Number (e.g. <code>1234</code>).
        </p>
      </div>

      <div>
        <label>
          <span>Wallet address:</span>
          <input name="wa" required value="{wallet_address}" type="url" />
        </label>
        <p>Full wallet address URL</p>
      </div>

      <div>
        <label>
          <span>Profile ID:</span>
          <select name="profile" required>
{options}          </select>
        </label>
        <p>Offerwall profile ID</p>
      </div>

      <button type="submit">Show preview</button>
    </form>"#,
        src = escape(&src),
        wallet_address = escape(wallet_address),
    )
}

/// Escape text for use inside HTML attribute values and text nodes.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
