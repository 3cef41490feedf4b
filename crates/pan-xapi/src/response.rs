//! Response parsing for the XML management API.
//!
//! Every API response is a `<response status="...">` document. This module
//! validates the envelope once and exposes path-based accessors for the
//! pieces the callers care about: result subtrees, `<member>` lists, message
//! lines, and commit job ids.

use roxmltree::{Document, Node};

use crate::error::{Result, XapiError};

/// The status attribute of an API response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The request was accepted.
    Success,
    /// The request was rejected.
    Error,
}

impl ResponseStatus {
    /// Get the wire value of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A parsed API response.
///
/// The envelope (root element, status attribute, optional code) is validated
/// at construction; the body is kept verbatim and re-walked by the accessors,
/// which is cheap for the small documents the management API returns.
#[derive(Debug, Clone)]
pub struct XapiResponse {
    status: ResponseStatus,
    code: Option<u32>,
    raw: String,
}

impl XapiResponse {
    /// Parse a response body.
    ///
    /// Fails if the body is not well-formed XML, the root element is not
    /// `<response>`, or the status attribute is missing or unknown.
    pub fn parse(body: &str) -> Result<Self> {
        let doc = Document::parse(body)?;
        let root = doc.root_element();
        if root.tag_name().name() != "response" {
            return Err(XapiError::device(
                None,
                format!("unexpected root element '{}'", root.tag_name().name()),
            ));
        }
        let status = match root.attribute("status") {
            Some("success") => ResponseStatus::Success,
            Some("error") => ResponseStatus::Error,
            Some(other) => {
                return Err(XapiError::device(
                    None,
                    format!("unknown response status '{other}'"),
                ));
            }
            None => {
                return Err(XapiError::device(None, "response missing status attribute"));
            }
        };
        let code = root.attribute("code").and_then(|c| c.parse().ok());
        Ok(Self {
            status,
            code,
            raw: body.to_string(),
        })
    }

    /// Get the response status.
    #[must_use]
    pub const fn status(&self) -> ResponseStatus {
        self.status
    }

    /// Get the API code attribute, if present.
    #[must_use]
    pub const fn code(&self) -> Option<u32> {
        self.code
    }

    /// Check if the response status is `success`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, ResponseStatus::Success)
    }

    /// Get the raw response body.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Turn an error-status response into a device error.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            let message = self.error_message();
            Err(XapiError::device(self.code, message))
        }
    }

    /// Get the message carried by an error response.
    #[must_use]
    pub fn error_message(&self) -> String {
        let lines = self.msg_lines();
        if lines.is_empty() {
            "unspecified error".to_string()
        } else {
            lines.join("; ")
        }
    }

    /// Collect the text of every node matching `path` under the root.
    #[must_use]
    pub fn texts(&self, path: &[&str]) -> Vec<String> {
        self.walk(|root| {
            nodes_at(root, path)
                .into_iter()
                .filter_map(|n| n.text())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
    }

    /// Get the text of the first node matching `path`, if any.
    #[must_use]
    pub fn first_text(&self, path: &[&str]) -> Option<String> {
        self.texts(path).into_iter().next()
    }

    /// Get the tag names of the element children of the first node at `path`.
    #[must_use]
    pub fn child_element_names(&self, path: &[&str]) -> Vec<String> {
        self.walk(|root| {
            nodes_at(root, path).first().map_or_else(Vec::new, |node| {
                node.children()
                    .filter(Node::is_element)
                    .map(|c| c.tag_name().name().to_string())
                    .collect()
            })
        })
    }

    /// Get the `<member>` texts under the result element.
    #[must_use]
    pub fn members(&self) -> Vec<String> {
        self.texts(&["result", "member"])
    }

    /// Get the message lines of the response.
    ///
    /// Messages appear either as `<msg>` text, as `<msg><line>` lists, or as
    /// `<result><msg><line>` lists depending on the request kind; all three
    /// shapes are collected.
    #[must_use]
    pub fn msg_lines(&self) -> Vec<String> {
        let mut lines = self.texts(&["msg", "line"]);
        lines.extend(self.texts(&["result", "msg", "line"]));
        if lines.is_empty() {
            if let Some(text) = self.first_text(&["msg"]) {
                lines.push(text);
            }
        }
        lines
    }

    /// Get the enqueued commit job id, if the response carries one.
    #[must_use]
    pub fn job_id(&self) -> Option<u64> {
        self.first_text(&["result", "job"])
            .and_then(|t| t.parse().ok())
    }

    /// Re-parse the stored body and hand the root element to `f`.
    ///
    /// The body parsed successfully at construction, so a re-parse failure is
    /// unreachable; accessors degrade to an empty result rather than panic.
    fn walk<R: Default>(&self, f: impl FnOnce(Node<'_, '_>) -> R) -> R {
        Document::parse(&self.raw).map_or_else(|_| R::default(), |doc| f(doc.root_element()))
    }
}

/// Descend `path` from `root`, fanning out over every matching element.
fn nodes_at<'a, 'input>(root: Node<'a, 'input>, path: &[&str]) -> Vec<Node<'a, 'input>> {
    let mut current = vec![root];
    for name in path {
        let mut next = Vec::new();
        for node in current {
            next.extend(
                node.children()
                    .filter(|c| c.is_element() && c.tag_name().name() == *name),
            );
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_success_envelope() {
        let resp = XapiResponse::parse(r#"<response status="success" code="19"/>"#).unwrap();
        assert_eq!(resp.status(), ResponseStatus::Success);
        assert_eq!(resp.code(), Some(19));
        assert!(resp.is_success());
    }

    #[test]
    fn parse_rejects_unknown_root() {
        let err = XapiResponse::parse("<reply/>").unwrap_err();
        assert!(err.to_string().contains("reply"));
    }

    #[test]
    fn parse_rejects_missing_status() {
        assert!(XapiResponse::parse("<response/>").is_err());
    }

    #[test]
    fn parse_rejects_invalid_xml() {
        assert!(matches!(
            XapiResponse::parse("<response status="),
            Err(XapiError::Xml(_))
        ));
    }

    #[test]
    fn error_status_into_result() {
        let resp = XapiResponse::parse(
            r#"<response status="error" code="403"><msg>invalid credential</msg></response>"#,
        )
        .unwrap();
        let err = resp.into_result().unwrap_err();
        assert!(err.to_string().contains("invalid credential"));
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn child_element_names_lists_ciphers() {
        let body = r#"<response status="success"><result><mgmt><aes128-cbc/><aes256-ctr/></mgmt></result></response>"#;
        let resp = XapiResponse::parse(body).unwrap();
        assert_eq!(
            resp.child_element_names(&["result", "mgmt"]),
            vec!["aes128-cbc", "aes256-ctr"]
        );
    }

    #[test]
    fn child_element_names_empty_subtree() {
        let body = r#"<response status="success"><result/></response>"#;
        let resp = XapiResponse::parse(body).unwrap();
        assert!(resp.child_element_names(&["result", "mgmt"]).is_empty());
    }

    #[test]
    fn members_collects_texts() {
        let body = r#"<response status="success"><result><member>Restarting management server</member></result></response>"#;
        let resp = XapiResponse::parse(body).unwrap();
        assert_eq!(resp.members(), vec!["Restarting management server"]);
    }

    #[test]
    fn msg_lines_from_plain_text() {
        let body = r#"<response status="success" code="20"><msg>command succeeded</msg></response>"#;
        let resp = XapiResponse::parse(body).unwrap();
        assert_eq!(resp.msg_lines(), vec!["command succeeded"]);
    }

    #[test]
    fn msg_lines_from_line_list() {
        let body = r#"<response status="success"><result><msg><line>first</line><line>second</line></msg></result></response>"#;
        let resp = XapiResponse::parse(body).unwrap();
        assert_eq!(resp.msg_lines(), vec!["first", "second"]);
    }

    #[test]
    fn job_id_from_commit_response() {
        let body = r#"<response status="success" code="19"><result><msg><line>Commit job enqueued with jobid 42</line></msg><job>42</job></result></response>"#;
        let resp = XapiResponse::parse(body).unwrap();
        assert_eq!(resp.job_id(), Some(42));
    }

    #[test]
    fn job_id_absent_for_element_job() {
        // Job status responses nest the job details; there is no id text
        // directly under <job>.
        let body = r#"<response status="success"><result><job><id>42</id><status>FIN</status></job></result></response>"#;
        let resp = XapiResponse::parse(body).unwrap();
        assert_eq!(resp.job_id(), None);
        assert_eq!(
            resp.first_text(&["result", "job", "status"]),
            Some("FIN".to_string())
        );
    }
}
