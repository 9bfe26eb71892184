//! One-shot markers a server-rendered admin page carries: the anti-forgery
//! token and flash messages left by the previous request.

use std::{cell::RefCell, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str};
use tracing::{debug, warn};

use crate::{
    application::{
        bulk::{BulkError, CsrfToken},
        toast::{FlashMessage, ToastKind},
    },
    config::CsrfSettings,
    infra::error::InfraError,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMarkers {
    pub csrf: Option<CsrfToken>,
    pub flashes: Vec<FlashMessage>,
}

impl PageMarkers {
    /// Token for state-changing forms; its absence blocks the submission.
    pub fn require_csrf(&self) -> Result<&CsrfToken, BulkError> {
        self.csrf.as_ref().ok_or(BulkError::MissingCsrf)
    }
}

const KINDS: usize = ToastKind::ALL.len();

/// First non-empty occurrence of each marker, per source.
#[derive(Default)]
struct Found {
    csrf_meta: Option<String>,
    csrf_input: Option<String>,
    flash_meta: [Option<String>; KINDS],
    flash_input: [Option<String>; KINDS],
    flash_body: [Option<String>; KINDS],
}

fn kind_index(name: &str) -> Option<usize> {
    let kind = name.strip_prefix("flash-")?;
    ToastKind::ALL
        .iter()
        .position(|candidate| candidate.as_variant() == kind)
}

/// Scan page markup for markers.
///
/// Each marker is looked up in a `<meta>` element first, then a hidden
/// `<input>`, then (flashes only) a `data-flash-*` attribute on `<body>`.
/// Empty values count as absent.
pub fn extract_markers(html: &str, csrf: &CsrfSettings) -> Result<PageMarkers, InfraError> {
    let found = Rc::new(RefCell::new(Found::default()));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("meta[name]", {
                    let found = Rc::clone(&found);
                    let meta_name = csrf.meta_name.clone();
                    move |el| {
                        let Some(name) = el.get_attribute("name") else {
                            return Ok(());
                        };
                        let content = el.get_attribute("content").unwrap_or_default();
                        let mut found = found.borrow_mut();
                        if name == meta_name {
                            keep_first(&mut found.csrf_meta, content);
                        } else if let Some(index) = kind_index(&name) {
                            keep_first(&mut found.flash_meta[index], content);
                        }
                        Ok(())
                    }
                }),
                element!("input[name]", {
                    let found = Rc::clone(&found);
                    let param = csrf.param.clone();
                    move |el| {
                        let Some(name) = el.get_attribute("name") else {
                            return Ok(());
                        };
                        let value = el.get_attribute("value").unwrap_or_default();
                        let mut found = found.borrow_mut();
                        if name == param {
                            keep_first(&mut found.csrf_input, value);
                        } else if let Some(index) = kind_index(&name) {
                            keep_first(&mut found.flash_input[index], value);
                        }
                        Ok(())
                    }
                }),
                element!("body", {
                    let found = Rc::clone(&found);
                    move |el| {
                        let mut found = found.borrow_mut();
                        for (index, kind) in ToastKind::ALL.iter().enumerate() {
                            let attribute = format!("data-flash-{}", kind.as_variant());
                            if let Some(value) = el.get_attribute(&attribute) {
                                keep_first(&mut found.flash_body[index], value);
                            }
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| InfraError::markup(err.to_string()))?;

    let found = found.take();
    let token = first_present([found.csrf_meta, found.csrf_input]);
    let csrf = match token {
        Some(value) => Some(CsrfToken::new(csrf.param.clone(), value)),
        None => {
            warn!(
                target = "docdesk::infra::markers",
                meta = %csrf.meta_name,
                "page carries no anti-forgery token"
            );
            None
        }
    };

    let Found {
        flash_meta,
        flash_input,
        flash_body,
        ..
    } = found;
    let flashes: Vec<FlashMessage> = ToastKind::ALL
        .into_iter()
        .zip(flash_meta)
        .zip(flash_input)
        .zip(flash_body)
        .filter_map(|(((kind, meta), input), body)| {
            first_present([meta, input, body]).map(|text| FlashMessage { kind, text })
        })
        .collect();
    if !flashes.is_empty() {
        debug!(
            target = "docdesk::infra::markers",
            count = flashes.len(),
            "flash messages found"
        );
    }

    Ok(PageMarkers { csrf, flashes })
}

fn keep_first(slot: &mut Option<String>, value: String) {
    if slot.is_none() && !value.trim().is_empty() {
        *slot = Some(value);
    }
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|value| decode_entities(value.trim()))
        .find(|value| !value.is_empty())
}

/// Attribute values come back undecoded.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
