//! URL derivations for the write and activation endpoints.

use url::Url;

use crate::error::AdtError;

/// Query parameter carrying the transport request number.
pub const CORRNR_PARAM: &str = "corrNr";

/// Path prefix every ADT resource lives under.
pub const ADT_ROOT_MARKER: &str = "/sap/bc/adt";

const SOURCE_SEGMENT: &str = "/source/";

/// Set `key=value` in the query, replacing any existing `key` and keeping
/// every other parameter in order.
pub fn with_query_param(url: &Url, key: &str, value: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut out = url.clone();
    out.set_query(None);
    {
        let mut pairs = out.query_pairs_mut();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(key, value);
    }
    out
}

/// `<text endpoint before "/source/">/activation?corrNr=<id>`.
pub fn direct_activation_url(object_url: &Url, corrnr: &str) -> Result<Url, AdtError> {
    let raw = object_url.as_str();
    let head = raw.split(SOURCE_SEGMENT).next().unwrap_or(raw);
    let head = head.split('?').next().unwrap_or(head);
    let target = format!("{}/activation", head.trim_end_matches('/'));
    let url = Url::parse(&target).map_err(|source| AdtError::InvalidUrl {
        url: target.clone(),
        source,
    })?;
    Ok(with_query_param(&url, CORRNR_PARAM, corrnr))
}

/// Object root path: query dropped, `/source/...` suffix dropped.
///
/// `https://h/sap/bc/adt/programs/programs/Z_TEST1/source/main?version=inactive`
/// becomes `/sap/bc/adt/programs/programs/Z_TEST1`.
pub fn object_root_path(object_url: &Url) -> String {
    let path = object_url.path();
    let root = match path.find(SOURCE_SEGMENT) {
        Some(idx) => &path[..idx],
        None => path,
    };
    root.to_string()
}

/// Central activation service URL and the object URI the envelope names.
///
/// The service lives at `<prefix up to /sap/bc/adt>/activation` on the same
/// scheme and authority as the object.
pub fn service_activation_target(
    object_url: &Url,
    corrnr: &str,
) -> Result<(Url, String), AdtError> {
    let rel_uri = object_root_path(object_url);
    let idx = rel_uri
        .find(ADT_ROOT_MARKER)
        .ok_or_else(|| AdtError::NotAdtUrl {
            url: object_url.to_string(),
            marker: ADT_ROOT_MARKER,
        })?;
    let adt_root = &rel_uri[..idx + ADT_ROOT_MARKER.len()];

    let mut service = object_url.clone();
    service.set_query(None);
    service.set_fragment(None);
    service.set_path(&format!("{adt_root}/activation"));
    let service = with_query_param(&service, "method", "activate");
    let service = with_query_param(&service, CORRNR_PARAM, corrnr);
    Ok((service, rel_uri))
}

/// Object-reference envelope posted to the central activation service.
pub fn object_references_xml(rel_uri: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <adtcore:objectReferences xmlns:adtcore=\"http://www.sap.com/adt/core\">\n  \
         <adtcore:objectReference adtcore:uri=\"{}\"/>\n\
         </adtcore:objectReferences>\n",
        xml_escape_attr(rel_uri)
    )
}

fn xml_escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
